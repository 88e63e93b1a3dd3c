use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StockroomError};
use crate::store::ProductStore;

pub fn run<S: ProductStore>(store: &mut S, id: u64) -> Result<CmdResult> {
    let product = store
        .remove(id)
        .ok_or(StockroomError::ProductNotFound(id))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Product deleted ({}): {}",
        id,
        product.display_name()
    )));
    Ok(result.with_affected_products(vec![product]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn removes_only_the_matching_product() {
        let mut store = StoreFixture::new().with_products(3).store;
        let result = run(&mut store, 2).unwrap();

        assert_eq!(result.affected_products[0].display_name(), "Product 1");
        let ids: Vec<_> = store.list().iter().filter_map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = StoreFixture::new().with_products(1).store;
        let err = run(&mut store, 9).unwrap_err();
        assert!(matches!(err, StockroomError::ProductNotFound(9)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleting_twice_fails_the_second_time() {
        let mut store = StoreFixture::new().with_products(2).store;
        run(&mut store, 1).unwrap();
        assert!(run(&mut store, 1).is_err());
    }
}
