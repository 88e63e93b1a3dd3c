//! # Storage Layer
//!
//! The [`ProductStore`] trait is the authoritative, ordered sequence of product
//! records. Everything above it (commands, the filter pipeline) reads snapshots
//! through [`ProductStore::list`] and never holds references into the store.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: the only backend. Products live for the lifetime
//!   of the process; there is no persistence.
//!
//! ## Ids
//!
//! Ids are assigned on insert, start at 1 and are never reused, even after the
//! record holding them is removed.
//!
//! ## Revisions
//!
//! Every mutation bumps [`ProductStore::revision`]. Observers that cache derived
//! data compare revisions instead of comparing whole lists.

use crate::model::{Product, ProductDraft};

pub mod memory;

/// Abstract interface for product storage.
pub trait ProductStore {
    /// Snapshot of all products in insertion order
    fn list(&self) -> Vec<Product>;

    /// Append a product, assigning it a fresh id
    fn add(&mut self, draft: ProductDraft) -> Product;

    /// Remove the product with the given id. Returns the removed record, or
    /// `None` when no product has that id.
    fn remove(&mut self, id: u64) -> Option<Product>;

    /// Look up a single product
    fn get(&self, id: u64) -> Option<Product>;

    /// Number of stored products
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic counter bumped by every mutation
    fn revision(&self) -> u64;
}
