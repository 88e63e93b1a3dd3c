//! # API Facade
//!
//! [`StockroomApi`] is the single entry point for every UI operation. It owns the
//! whole application context: the product store, the criteria store, the view
//! pipeline, the timer queue and the notification center. There are no globals;
//! a UI creates one `StockroomApi` and routes every user action through it.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the matching function in `commands/*.rs`
//! - **Signals** the view pipeline when the product list changes
//! - **Reports failures** to the notification center before returning them
//!
//! It does no printing; callers get a [`CmdResult`] or an error back and read
//! notifications through [`StockroomApi::notifications`].
//!
//! ## Time
//!
//! The API never blocks on its own. Debounced recomputes, notification expiry
//! and the sample load are timers; the UI drives them with [`StockroomApi::tick`]
//! or waits for a settled view with [`StockroomApi::settle`].
//!
//! ## Generic Over ProductStore
//!
//! `StockroomApi<S: ProductStore>` is generic over the storage backend so tests
//! can plug in prepared stores.

use crate::commands;
use crate::config::StockroomConfig;
use crate::criteria::CriteriaStore;
use crate::error::{Result, StockroomError};
use crate::export::ExportOptions;
use crate::model::{CriteriaPatch, FilterSummary, Product, ProductDraft};
use crate::notify::{Notification, NotificationCenter};
use crate::pipeline::{FilteredView, ViewPipeline};
use crate::store::ProductStore;
use crate::timer::{Clock, TimerId, TimerQueue};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Message shown when the add form is rejected; the specific problem goes into
/// the notification details.
pub const INVALID_FORM_MESSAGE: &str = "Please fill in all required fields correctly";

pub struct StockroomApi<S: ProductStore + 'static> {
    config: StockroomConfig,
    store: Rc<RefCell<S>>,
    criteria: CriteriaStore,
    pipeline: Rc<ViewPipeline<S>>,
    timers: Rc<TimerQueue>,
    notifications: Rc<NotificationCenter>,
    load_timer: Rc<Cell<Option<TimerId>>>,
}

impl<S: ProductStore + 'static> StockroomApi<S> {
    pub fn new(store: S, config: StockroomConfig, clock: impl Clock + 'static) -> Self {
        let timers = Rc::new(TimerQueue::new(clock));
        let store = Rc::new(RefCell::new(store));
        let notifications = NotificationCenter::new(timers.clone(), config.notification_ttl());
        let pipeline = ViewPipeline::new(store.clone(), timers.clone(), config.debounce());

        let mut criteria = CriteriaStore::new();
        pipeline.connect(&mut criteria);

        Self {
            config,
            store,
            criteria,
            pipeline,
            timers,
            notifications,
            load_timer: Rc::new(Cell::new(None)),
        }
    }

    pub fn add_product(&mut self, draft: ProductDraft) -> Result<CmdResult> {
        let result = commands::add::run(&mut *self.store.borrow_mut(), draft);
        let result = self.reported(result)?;
        self.pipeline.products_changed();
        Ok(result)
    }

    pub fn delete_product(&mut self, id: u64) -> Result<CmdResult> {
        let result = commands::delete::run(&mut *self.store.borrow_mut(), id);
        let result = self.reported(result)?;
        self.pipeline.products_changed();
        Ok(result)
    }

    pub fn update_filter(&mut self, patch: &CriteriaPatch) -> Result<CmdResult> {
        let result = commands::filter::run(&mut self.criteria, patch);
        self.reported(result)
    }

    pub fn search(&mut self, term: impl Into<String>) -> Result<CmdResult> {
        self.update_filter(&CriteriaPatch::default().search(term))
    }

    pub fn clear_filters(&mut self) -> Result<CmdResult> {
        let result = commands::filter::clear(&mut self.criteria);
        self.reported(result)
    }

    /// Settle and list the derived view.
    pub fn list(&self) -> CmdResult {
        self.settle();
        commands::list::run(self.pipeline.view().as_ref())
    }

    /// Latest published view, without waiting for pending work.
    pub fn view(&self) -> Option<FilteredView> {
        self.pipeline.view()
    }

    pub fn summary(&self) -> Option<FilterSummary> {
        self.settle();
        self.pipeline.view().map(|v| v.summary)
    }

    /// Export the currently shown products.
    pub fn export(&self, options: &ExportOptions) -> Result<CmdResult> {
        self.settle();
        let products = self.pipeline.view().map(|v| v.products).unwrap_or_default();
        let result = commands::export::run(&products, options, &self.config.export_dir());
        self.reported(result)
    }

    /// Write the inventory report over every product, filtered or not.
    pub fn report(&self, name: Option<&str>) -> Result<CmdResult> {
        self.settle();
        let products = self.products();
        let result = commands::report::run(
            &products,
            self.config.low_stock_threshold,
            &self.config.export_dir(),
            name,
        );
        self.reported(result)
    }

    /// Load the sample inventory after the configured delay.
    pub fn schedule_sample_load(&self) -> TimerId {
        let store = self.store.clone();
        let pipeline = Rc::downgrade(&self.pipeline);
        let notifications = Rc::downgrade(&self.notifications);
        let load_timer = self.load_timer.clone();
        let count = self.config.sample_products;

        let id = self.timers.schedule(self.config.load_delay(), move || {
            load_timer.set(None);
            let result = commands::load::run(&mut *store.borrow_mut(), count);
            if let Some(pipeline) = pipeline.upgrade() {
                pipeline.products_changed();
            }
            if let Some(center) = notifications.upgrade() {
                for message in result.messages {
                    center.add(message.content, message.level, message.details, None);
                }
            }
        });
        self.load_timer.set(Some(id));
        tracing::debug!(%id, delay = ?self.config.load_delay(), "sample load scheduled");
        id
    }

    pub fn is_loading(&self) -> bool {
        self.load_timer.get().is_some()
    }

    /// Fire timers that are due now. Returns how many fired.
    pub fn tick(&self) -> usize {
        self.timers.run_due()
    }

    /// Wait for a pending sample load, then bring the view up to date.
    pub fn settle(&self) {
        let load_deadline = self.load_timer.get().and_then(|id| self.timers.deadline(id));
        if let Some(deadline) = load_deadline {
            self.timers.run_until(deadline);
        }
        self.timers.run_due();
        self.pipeline.flush();
    }

    /// Snapshot of every stored product in insertion order.
    pub fn products(&self) -> Vec<Product> {
        self.store.borrow().list()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.list()
    }

    /// Dismiss a notification by id or by a unique id prefix.
    pub fn dismiss(&self, id: &str) -> Result<CmdResult> {
        let matches: Vec<String> = self
            .notifications
            .list()
            .into_iter()
            .map(|n| n.id)
            .filter(|nid| !id.is_empty() && nid.starts_with(id))
            .collect();

        let result = match matches.as_slice() {
            [only] => {
                self.notifications.remove(only);
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::info("Notification dismissed"));
                Ok(result)
            }
            [] => Err(StockroomError::Api(format!("No notification matches '{}'", id))),
            _ => Err(StockroomError::Api(format!(
                "'{}' matches {} notifications",
                id,
                matches.len()
            ))),
        };
        self.reported(result)
    }

    pub fn dismiss_all(&self) -> CmdResult {
        let count = self.notifications.list().len();
        self.notifications.clear_all();
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(format!("Dismissed {} notifications", count)));
        result
    }

    pub fn config(&self) -> CmdResult {
        CmdResult::default().with_config(self.config.clone())
    }

    pub fn criteria(&self) -> &CriteriaStore {
        &self.criteria
    }

    fn reported<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report_error(err);
        }
        result
    }

    fn report_error(&self, err: &StockroomError) {
        tracing::debug!(error = %err, "operation failed");
        match err {
            StockroomError::Validation(problem) => {
                self.notifications
                    .warning(INVALID_FORM_MESSAGE, Some(problem.clone()));
            }
            StockroomError::Io(e) => {
                self.notifications
                    .error("Could not write file", Some(e.to_string()));
            }
            other => {
                self.notifications
                    .add(other.to_string(), other.severity(), None, None);
            }
        }
    }
}

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};
