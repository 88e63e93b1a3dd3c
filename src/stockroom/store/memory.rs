use super::ProductStore;
use crate::model::{Product, ProductDraft};

#[derive(Debug)]
pub struct InMemoryStore {
    products: Vec<Product>,
    next_id: u64,
    revision: u64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            next_id: 1,
            revision: 0,
        }
    }
}

impl ProductStore for InMemoryStore {
    fn list(&self) -> Vec<Product> {
        self.products.clone()
    }

    fn add(&mut self, draft: ProductDraft) -> Product {
        let product = Product {
            id: Some(self.next_id),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            quantity: draft.quantity,
        };
        self.next_id += 1;
        self.revision += 1;
        self.products.push(product.clone());
        tracing::debug!(id = ?product.id, "product added");
        product
    }

    fn remove(&mut self, id: u64) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == Some(id))?;
        self.revision += 1;
        tracing::debug!(id, "product removed");
        Some(self.products.remove(index))
    }

    fn get(&self, id: u64) -> Option<Product> {
        self.products.iter().find(|p| p.id == Some(id)).cloned()
    }

    fn len(&self) -> usize {
        self.products.len()
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// Adds `count` products named "Product i" with price and quantity `i + 1`.
        pub fn with_products(mut self, count: usize) -> Self {
            for i in 0..count {
                let n = i + 1;
                let draft = ProductDraft::new(format!("Product {}", i), n as f64, n as i64)
                    .with_description(format!("Description {}", i));
                self.store.add(draft);
            }
            self
        }

        pub fn with_product(mut self, name: &str, price: f64, quantity: i64) -> Self {
            self.store.add(ProductDraft::new(name, price, quantity));
            self
        }

        pub fn with_out_of_stock(mut self, name: &str, price: f64) -> Self {
            self.store.add(ProductDraft::new(name, price, 0));
            self
        }
    }
}
