//! # Stockroom Architecture
//!
//! Stockroom is a small in-memory inventory manager. Its centre is the
//! **derived product view**: the current filter criteria plus the product list go
//! through a filter/sort engine and a summary calculator, and the result is kept
//! up to date by a debounced pipeline. Everything else (adding, deleting,
//! exporting, notifications) is plumbing around that view.
//!
//! The library is UI agnostic. The `stockroom` binary is an interactive terminal
//! shell built on top of it; nothing below the API layer knows about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses shell lines, prints views and notifications       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the context: stores, pipeline, timers, toasts       │
//! │  - Reports failures as notifications                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Validation, store mutations, file output                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (criteria, engine, summary, pipeline, timer, store)   │
//! │  - Pure functions and single-threaded observers             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Everything runs on one thread. Shared state is `Rc<RefCell<_>>`, so the
//! context is `!Send` and the compiler refuses to move it across threads. Time
//! based behaviour (debounce, toast expiry, the sample load) is a callback on a
//! [`timer::TimerQueue`] that the UI drives explicitly.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Logic for each user operation
//! - [`criteria`]: The observable filter criteria store
//! - [`engine`]: Filter and sort
//! - [`summary`]: Shown/hidden counts
//! - [`pipeline`]: Debounced recomputation of the derived view
//! - [`timer`]: Deferred callbacks and clocks
//! - [`notify`]: Toast-style notification center
//! - [`export`]: CSV, JSON and inventory report formats
//! - [`store`]: Product storage
//! - [`model`]: Core data types
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod store;
pub mod summary;
pub mod timer;
