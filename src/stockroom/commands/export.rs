use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::export::{self, ExportOptions};
use crate::model::Product;
use chrono::Utc;
use std::fs;
use std::path::Path;

/// Writes `products` to a file in `dir` using `options`.
pub fn run(products: &[Product], options: &ExportOptions, dir: &Path) -> Result<CmdResult> {
    let file_name = options.file_name(Utc::now().date_naive());
    let path = dir.join(file_name);
    let content = export::render(products, options)?;
    write_file(&path, &content)?;

    tracing::info!(
        path = %path.display(),
        format = %options.format,
        count = products.len(),
        "products exported"
    );

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} products to {}",
        products.len(),
        path.display()
    )));
    Ok(result
        .with_affected_products(products.to_vec())
        .with_output_path(path))
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}
