use crate::commands::export::write_file;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::{dated_name, generate_report, with_extension};
use crate::model::Product;
use chrono::Utc;
use std::path::Path;

/// Writes the inventory report over `products` to `dir`. Without a name the file
/// is called `inventory-report-<date>.json`.
pub fn run(
    products: &[Product],
    low_stock_threshold: i64,
    dir: &Path,
    name: Option<&str>,
) -> Result<CmdResult> {
    let now = Utc::now();
    let base = name
        .map(str::to_string)
        .unwrap_or_else(|| dated_name("inventory-report", now.date_naive()));
    let path = dir.join(with_extension(base, "json"));

    let report = generate_report(products, low_stock_threshold, now);
    write_file(&path, &report.to_json()?)?;

    tracing::info!(
        path = %path.display(),
        total = report.summary.total_products,
        "inventory report written"
    );

    let mut result = CmdResult::default();
    let details = format!(
        "{} products, {} low stock, {} out of stock",
        report.summary.total_products,
        report.summary.low_stock_count,
        report.summary.out_of_stock_count
    );
    result.add_message(
        CmdMessage::success(format!("Inventory report written to {}", path.display()))
            .with_details(details),
    );
    Ok(result
        .with_affected_products(report.low_stock_products)
        .with_output_path(path))
}
