//! Export formats.
//!
//! These are the only bit-exact surfaces of the application; files produced here
//! must stay byte-compatible with earlier exports:
//!
//! - **CSV**: `ID,Name,Description,Price,Quantity` header (optional), one row per
//!   product, text fields wrapped in double quotes verbatim, rows joined by `\n`
//!   with no trailing newline. Missing or zero ids are written empty; missing or
//!   zero prices and quantities are written as `0`.
//! - **JSON**: pretty-printed array with two-space indentation; missing fields are
//!   omitted.
//! - **Report**: a JSON object with aggregate figures, the low-stock and
//!   out-of-stock products and a generation timestamp.
//!
//! Numbers are printed without a fractional part when they are integral.

use crate::error::Result;
use crate::model::{format_js_number, serialize_js_f64, Product};
use crate::summary::round_half_up;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const CSV_HEADER: &str = "ID,Name,Description,Price,Quantity";
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{}' (expected csv or json)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub include_headers: bool,
    /// Base name without extension. `None` means `products-<date>`.
    pub filename: Option<String>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            include_headers: true,
            filename: None,
        }
    }

    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.include_headers = false;
        self
    }

    /// Final file name including the extension.
    pub fn file_name(&self, today: NaiveDate) -> String {
        let base = self
            .filename
            .clone()
            .unwrap_or_else(|| dated_name("products", today));
        with_extension(base, self.format.extension())
    }
}

/// Appends `.ext` unless `name` already ends with it.
pub fn with_extension(name: String, ext: &str) -> String {
    let suffix = format!(".{}", ext);
    if name.ends_with(&suffix) {
        name
    } else {
        name + &suffix
    }
}

/// `<prefix>-YYYY-MM-DD`
pub fn dated_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}", prefix, date.format("%Y-%m-%d"))
}

pub fn render(products: &[Product], options: &ExportOptions) -> Result<String> {
    match options.format {
        ExportFormat::Csv => Ok(to_csv(products, options.include_headers)),
        ExportFormat::Json => to_json(products),
    }
}

pub fn to_csv(products: &[Product], include_headers: bool) -> String {
    let mut rows = Vec::with_capacity(products.len() + 1);
    if include_headers {
        rows.push(CSV_HEADER.to_string());
    }
    rows.extend(products.iter().map(csv_row));
    rows.join("\n")
}

fn csv_row(product: &Product) -> String {
    let id = match product.id {
        Some(id) if id != 0 => id.to_string(),
        _ => String::new(),
    };
    let quantity = product.effective_quantity();
    [
        id,
        format!("\"{}\"", product.name.as_deref().unwrap_or("")),
        format!("\"{}\"", product.description.as_deref().unwrap_or("")),
        format_js_number(product.effective_price()),
        quantity.to_string(),
    ]
    .join(",")
}

pub fn to_json(products: &[Product]) -> Result<String> {
    Ok(serde_json::to_string_pretty(products)?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_products: usize,
    #[serde(serialize_with = "serialize_js_f64")]
    pub total_value: f64,
    #[serde(serialize_with = "serialize_js_f64")]
    pub average_price: f64,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: ReportSummary,
    pub low_stock_products: Vec<Product>,
    pub out_of_stock_products: Vec<Product>,
    pub generated_at: String,
}

impl InventoryReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds the inventory report over `products`.
///
/// Products with fewer than `low_stock_threshold` units are low stock; products
/// with none are also out of stock.
pub fn generate_report(
    products: &[Product],
    low_stock_threshold: i64,
    generated_at: DateTime<Utc>,
) -> InventoryReport {
    let total_products = products.len();
    let total_value: f64 = products
        .iter()
        .map(|p| p.effective_price() * p.effective_quantity() as f64)
        .sum();
    let average_price = if total_products > 0 {
        products.iter().map(|p| p.effective_price()).sum::<f64>() / total_products as f64
    } else {
        0.0
    };

    let low_stock_products: Vec<Product> = products
        .iter()
        .filter(|p| p.effective_quantity() < low_stock_threshold)
        .cloned()
        .collect();
    let out_of_stock_products: Vec<Product> = products
        .iter()
        .filter(|p| p.effective_quantity() == 0)
        .cloned()
        .collect();

    InventoryReport {
        summary: ReportSummary {
            total_products,
            total_value,
            average_price: round_half_up(average_price * 100.0) / 100.0,
            low_stock_count: low_stock_products.len(),
            out_of_stock_count: out_of_stock_products.len(),
        },
        low_stock_products,
        out_of_stock_products,
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
