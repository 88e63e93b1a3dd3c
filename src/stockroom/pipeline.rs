//! # Reactive View Pipeline
//!
//! [`ViewPipeline`] keeps the derived product view up to date without
//! recomputing on every keystroke.
//!
//! ```text
//!  CriteriaStore ──update──▶ criteria_changed ─┐
//!                                              ├─▶ (re)start quiescence window
//!  ProductStore  ──add/rm──▶ products_changed ─┘            │
//!                                                           ▼ window elapsed
//!                          engine::apply(current list, latest criteria)
//!                                                           │
//!                                        summarize ─────────┤
//!                                                           ▼
//!                                        publish FilteredView to listeners
//! ```
//!
//! Every change cancels the pending timer and schedules a new one, so a burst of
//! changes inside the window results in exactly one recomputation, using the
//! values of the last change. A superseded computation is never delivered.
//!
//! The product list is read from the store when the window elapses, never
//! captured when the pipeline is connected, so the view cannot go stale after
//! products are added or removed.

use crate::criteria::{CriteriaStore, SubscriptionId};
use crate::engine;
use crate::model::{FilterCriteria, FilterSummary, Product};
use crate::store::ProductStore;
use crate::summary::summarize;
use crate::timer::{TimerId, TimerQueue};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// One published result of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub criteria: FilterCriteria,
    pub products: Vec<Product>,
    pub summary: FilterSummary,
    /// Store revision the view was computed from.
    pub revision: u64,
}

type ViewListener = Box<dyn FnMut(&FilteredView)>;

#[derive(Default)]
struct PipelineState {
    latest: FilterCriteria,
    pending: Option<TimerId>,
    view: Option<FilteredView>,
    recomputations: usize,
}

pub struct ViewPipeline<S: ProductStore + 'static> {
    me: Weak<ViewPipeline<S>>,
    store: Rc<RefCell<S>>,
    timers: Rc<TimerQueue>,
    debounce: Duration,
    state: RefCell<PipelineState>,
    listeners: RefCell<Vec<ViewListener>>,
    publishing: Cell<bool>,
}

impl<S: ProductStore + 'static> ViewPipeline<S> {
    pub fn new(store: Rc<RefCell<S>>, timers: Rc<TimerQueue>, debounce: Duration) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            store,
            timers,
            debounce,
            state: RefCell::new(PipelineState::default()),
            listeners: RefCell::new(Vec::new()),
            publishing: Cell::new(false),
        })
    }

    /// Subscribe to `criteria` and schedule the first computation with its
    /// current value.
    pub fn connect(&self, criteria: &mut CriteriaStore) -> SubscriptionId {
        let me = self.me.clone();
        let id = criteria.subscribe(move |c| {
            if let Some(pipeline) = me.upgrade() {
                pipeline.criteria_changed(c);
            }
        });
        self.criteria_changed(criteria.current());
        id
    }

    /// Record new criteria and restart the quiescence window.
    pub fn criteria_changed(&self, criteria: &FilterCriteria) {
        self.state.borrow_mut().latest = criteria.clone();
        self.restart_window();
    }

    /// The product list changed; recompute once the window elapses.
    pub fn products_changed(&self) {
        self.restart_window();
    }

    /// Register a listener for published views.
    pub fn subscribe(&self, listener: impl FnMut(&FilteredView) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Run a pending recomputation right away. Returns `false` if nothing was pending.
    pub fn flush(&self) -> bool {
        let pending = self.state.borrow_mut().pending.take();
        match pending {
            Some(id) => {
                self.timers.cancel(id);
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Latest published view, if the pipeline has produced one yet.
    pub fn view(&self) -> Option<FilteredView> {
        self.state.borrow().view.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// How many times the engine has actually run.
    pub fn recomputations(&self) -> usize {
        self.state.borrow().recomputations
    }

    fn restart_window(&self) {
        let superseded = self.state.borrow_mut().pending.take();
        if let Some(id) = superseded {
            self.timers.cancel(id);
            tracing::trace!(%id, "pending view computation superseded");
        }

        let me = self.me.clone();
        let id = self.timers.schedule(self.debounce, move || {
            if let Some(pipeline) = me.upgrade() {
                pipeline.window_elapsed();
            }
        });
        self.state.borrow_mut().pending = Some(id);
    }

    fn window_elapsed(&self) {
        self.state.borrow_mut().pending = None;
        self.recompute();
    }

    fn recompute(&self) {
        let criteria = self.state.borrow().latest.clone();
        let (all, revision) = {
            let store = self.store.borrow();
            (store.list(), store.revision())
        };

        let products = engine::apply(&all, &criteria);
        let summary = summarize(&all, &products);
        tracing::debug!(
            total = summary.total,
            shown = summary.filtered,
            revision,
            "view recomputed"
        );

        let view = FilteredView {
            criteria,
            products,
            summary,
            revision,
        };
        {
            let mut state = self.state.borrow_mut();
            state.view = Some(view);
            state.recomputations += 1;
        }
        self.publish();
    }

    /// Deliver the latest view to every listener. Listeners may call back into
    /// the pipeline; a view computed meanwhile is delivered in one more round.
    fn publish(&self) {
        if self.publishing.replace(true) {
            return;
        }
        loop {
            let (view, round) = {
                let state = self.state.borrow();
                (state.view.clone(), state.recomputations)
            };
            let Some(view) = view else { break };

            let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
            for listener in listeners.iter_mut() {
                listener(&view);
            }
            {
                let mut slot = self.listeners.borrow_mut();
                let added = std::mem::replace(&mut *slot, listeners);
                slot.extend(added);
            }

            if self.state.borrow().recomputations == round {
                break;
            }
        }
        self.publishing.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CriteriaPatch, ProductDraft, SortField};
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use crate::timer::ManualClock;

    struct Harness {
        clock: ManualClock,
        timers: Rc<TimerQueue>,
        store: Rc<RefCell<InMemoryStore>>,
        criteria: CriteriaStore,
        pipeline: Rc<ViewPipeline<InMemoryStore>>,
        delivered: Rc<RefCell<Vec<FilteredView>>>,
    }

    impl Harness {
        fn new(store: InMemoryStore) -> Self {
            let clock = ManualClock::new();
            let timers = Rc::new(TimerQueue::new(clock.clone()));
            let store = Rc::new(RefCell::new(store));
            let mut criteria = CriteriaStore::new();
            let pipeline = ViewPipeline::new(store.clone(), timers.clone(), DEFAULT_DEBOUNCE);
            pipeline.connect(&mut criteria);

            let delivered = Rc::new(RefCell::new(Vec::new()));
            let d = delivered.clone();
            pipeline.subscribe(move |v| d.borrow_mut().push(v.clone()));

            Self {
                clock,
                timers,
                store,
                criteria,
                pipeline,
                delivered,
            }
        }

        fn advance(&self, ms: u64) {
            self.clock.advance_ms(ms);
            self.timers.run_due();
        }
    }

    fn apple_banana() -> InMemoryStore {
        StoreFixture::new()
            .with_product("Apple", 10.0, 5)
            .with_product("Banana", 5.0, 0)
            .store
    }

    #[test]
    fn first_view_arrives_after_the_window() {
        let h = Harness::new(apple_banana());
        assert!(h.pipeline.is_pending());
        assert!(h.pipeline.view().is_none());

        h.advance(299);
        assert!(h.pipeline.view().is_none());

        h.advance(1);
        let view = h.pipeline.view().unwrap();
        assert_eq!(view.products.len(), 2);
        assert_eq!(view.summary.total, 2);
        assert_eq!(h.delivered.borrow().len(), 1);
    }

    #[test]
    fn burst_of_updates_recomputes_once_with_last_values() {
        let mut h = Harness::new(apple_banana());
        h.advance(300);
        assert_eq!(h.pipeline.recomputations(), 1);

        h.criteria.update(&CriteriaPatch::default().search("b"));
        h.advance(100);
        h.criteria.update(&CriteriaPatch::default().search("ba"));
        h.advance(100);
        h.criteria
            .update(&CriteriaPatch::default().search("app").sort_by(SortField::Price));

        // The first update's window would have ended here.
        h.advance(150);
        assert_eq!(h.pipeline.recomputations(), 1);

        h.advance(150);
        assert_eq!(h.pipeline.recomputations(), 2);
        assert_eq!(h.delivered.borrow().len(), 2);

        let view = h.pipeline.view().unwrap();
        assert_eq!(view.criteria.search_term, "app");
        assert_eq!(view.criteria.sort_by, SortField::Price);
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].display_name(), "Apple");
    }

    #[test]
    fn superseded_computation_is_never_delivered() {
        let mut h = Harness::new(apple_banana());
        h.advance(100);
        h.criteria.update(&CriteriaPatch::default().min_quantity(Some(1.0)));
        h.advance(250);
        assert!(h.delivered.borrow().is_empty());

        h.advance(50);
        let delivered = h.delivered.borrow();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].criteria.min_quantity, Some(1.0));
        assert_eq!(delivered[0].summary.hidden, 1);
    }

    #[test]
    fn reads_current_product_list_at_recompute_time() {
        let mut h = Harness::new(apple_banana());
        h.advance(300);

        // Mutate the store without telling the pipeline; the next criteria
        // change must still see the new product.
        h.store.borrow_mut().add(ProductDraft::new("Cherry", 2.0, 9));
        h.criteria.update(&CriteriaPatch::default().sort_by(SortField::Price));
        h.advance(300);

        let view = h.pipeline.view().unwrap();
        let names: Vec<_> = view.products.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Cherry", "Banana", "Apple"]);
        assert_eq!(view.summary.total, 3);
    }

    #[test]
    fn product_changes_trigger_a_debounced_recompute() {
        let h = Harness::new(apple_banana());
        h.advance(300);

        h.store.borrow_mut().remove(1);
        h.pipeline.products_changed();
        assert!(h.pipeline.is_pending());

        h.advance(300);
        let view = h.pipeline.view().unwrap();
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.revision, h.store.borrow().revision());
    }

    #[test]
    fn flush_runs_pending_work_immediately() {
        let mut h = Harness::new(apple_banana());
        h.criteria.update(&CriteriaPatch::default().search("ban"));

        assert!(h.pipeline.flush());
        assert!(!h.pipeline.is_pending());
        assert_eq!(h.pipeline.view().unwrap().products.len(), 1);
        assert_eq!(h.timers.pending(), 0);

        assert!(!h.pipeline.flush());
        assert_eq!(h.pipeline.recomputations(), 1);
    }

    #[test]
    fn listeners_may_call_back_into_the_pipeline() {
        let h = Harness::new(apple_banana());
        let weak = Rc::downgrade(&h.pipeline);
        let store = h.store.clone();
        let late = Rc::new(Cell::new(0));
        let l = late.clone();
        let mut reacted = false;
        h.pipeline.subscribe(move |_| {
            if reacted {
                return;
            }
            reacted = true;
            let Some(pipeline) = weak.upgrade() else {
                return;
            };
            let l = l.clone();
            pipeline.subscribe(move |_| l.set(l.get() + 1));
            store.borrow_mut().add(ProductDraft::new("Cherry", 2.0, 9));
            pipeline.products_changed();
            pipeline.flush();
        });

        h.advance(300);

        assert_eq!(h.pipeline.recomputations(), 2);
        assert_eq!(h.pipeline.view().unwrap().products.len(), 3);
        let delivered = h.delivered.borrow();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[1].summary.total, 3);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn empty_store_publishes_empty_view_and_zero_summary() {
        let h = Harness::new(InMemoryStore::new());
        h.advance(300);
        let view = h.pipeline.view().unwrap();
        assert!(view.products.is_empty());
        assert_eq!(view.summary, FilterSummary::default());
    }

    #[test]
    fn dropped_pipeline_leaves_timers_harmless() {
        let h = Harness::new(apple_banana());
        let Harness {
            clock,
            timers,
            pipeline,
            ..
        } = h;
        drop(pipeline);
        clock.advance_ms(300);
        assert_eq!(timers.run_due(), 1);
    }
}
