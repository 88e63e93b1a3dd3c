use crate::commands::{CmdMessage, CmdResult};
use crate::model::ProductDraft;
use crate::store::ProductStore;

/// The demo inventory: "Product i" / "Description i" with price and quantity `i + 1`.
pub fn sample_products(count: usize) -> Vec<ProductDraft> {
    (0..count)
        .map(|i| {
            let n = i + 1;
            ProductDraft::new(format!("Product {}", i), n as f64, n as i64)
                .with_description(format!("Description {}", i))
        })
        .collect()
}

pub fn run<S: ProductStore>(store: &mut S, count: usize) -> CmdResult {
    let added: Vec<_> = sample_products(count)
        .into_iter()
        .map(|draft| store.add(draft))
        .collect();
    tracing::info!(count = added.len(), "sample products loaded");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("Loaded {} products", added.len())));
    result.with_affected_products(added)
}
