use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StockroomError};
use crate::model::ProductDraft;
use crate::store::ProductStore;

/// Checks the add form: a non-blank name, a positive price and a non-negative
/// quantity are required. The description is optional.
pub fn validate(draft: &ProductDraft) -> Result<()> {
    let name = draft.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(StockroomError::Validation("name is required".into()));
    }

    match draft.price {
        None => return Err(StockroomError::Validation("price is required".into())),
        Some(p) if !p.is_finite() || p <= 0.0 => {
            return Err(StockroomError::Validation(
                "price must be greater than 0".into(),
            ))
        }
        Some(_) => {}
    }

    match draft.quantity {
        None => Err(StockroomError::Validation("quantity is required".into())),
        Some(q) if q < 0 => Err(StockroomError::Validation(
            "quantity cannot be negative".into(),
        )),
        Some(_) => Ok(()),
    }
}

pub fn run<S: ProductStore>(store: &mut S, draft: ProductDraft) -> Result<CmdResult> {
    validate(&draft)?;
    let product = store.add(draft);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Product added ({}): {}",
        product.id.unwrap_or_default(),
        product.display_name()
    )));
    Ok(result.with_affected_products(vec![product]))
}
