//! Filter criteria store.
//!
//! Holds the single current [`FilterCriteria`] and tells subscribers about every
//! change. Updates are shallow patches; nothing is validated here, so inverted
//! bounds are stored as given and simply produce an empty view downstream.
//!
//! Subscribers run synchronously inside [`CriteriaStore::update`] and receive the
//! new value by reference. They must not call back into the store.

use crate::model::{CriteriaPatch, FilterCriteria};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FilterCriteria)>;

pub struct CriteriaStore {
    current: FilterCriteria,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Default for CriteriaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CriteriaStore {
    pub fn new() -> Self {
        Self::with_criteria(FilterCriteria::default())
    }

    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            current: criteria,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> &FilterCriteria {
        &self.current
    }

    /// Merge `patch` over the current criteria and notify subscribers.
    pub fn update(&mut self, patch: &CriteriaPatch) {
        self.current.merge(patch);
        tracing::debug!(criteria = ?self.current, "filter criteria updated");
        self.emit();
    }

    /// Reset every field to its default and notify subscribers.
    pub fn clear(&mut self) {
        self.update(&CriteriaPatch::replace_all(&FilterCriteria::default()));
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&FilterCriteria) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&mut self) {
        let current = &self.current;
        for (_, listener) in self.listeners.iter_mut() {
            listener(current);
        }
    }
}

impl std::fmt::Debug for CriteriaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriteriaStore")
            .field("current", &self.current)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SortField, SortOrder};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(store: &mut CriteriaStore) -> Rc<RefCell<Vec<FilterCriteria>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        store.subscribe(move |c| s.borrow_mut().push(c.clone()));
        seen
    }

    #[test]
    fn update_merges_and_notifies_with_full_value() {
        let mut store = CriteriaStore::new();
        let seen = recording(&mut store);

        store.update(&CriteriaPatch::default().search("lamp"));
        store.update(&CriteriaPatch::default().sort_order(SortOrder::Desc));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].search_term, "lamp");
        assert_eq!(seen[1].sort_order, SortOrder::Desc);
        assert_eq!(store.current(), &seen[1]);
    }

    #[test]
    fn clear_restores_defaults_in_one_notification() {
        let mut store = CriteriaStore::new();
        store.update(
            &CriteriaPatch::default()
                .search("x")
                .min_price(Some(1.0))
                .max_quantity(Some(3.0))
                .sort_by(SortField::Id)
                .sort_order(SortOrder::Desc),
        );
        let seen = recording(&mut store);

        store.clear();

        assert_eq!(store.current(), &FilterCriteria::default());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn accepts_inverted_bounds() {
        let mut store = CriteriaStore::new();
        store.update(
            &CriteriaPatch::default()
                .min_price(Some(50.0))
                .max_price(Some(10.0)),
        );
        assert_eq!(store.current().min_price, Some(50.0));
        assert_eq!(store.current().max_price, Some(10.0));
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut store = CriteriaStore::new();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let id = store.subscribe(move |_| *h.borrow_mut() += 1);

        store.update(&CriteriaPatch::default().search("a"));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.update(&CriteriaPatch::default().search("b"));

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn every_update_notifies_even_without_change() {
        let mut store = CriteriaStore::new();
        let seen = recording(&mut store);
        store.update(&CriteriaPatch::default());
        store.update(&CriteriaPatch::default());
        assert_eq!(seen.borrow().len(), 2);
    }
}
