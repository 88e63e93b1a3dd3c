//! # Commands
//!
//! One module per user operation. Each `run` takes the pieces of state it needs
//! explicitly, does the work, and returns a [`CmdResult`] describing what
//! happened. Commands never print; user-facing text travels as [`CmdMessage`]s
//! and the caller decides how to show them.
//!
//! Failures are returned as [`crate::error::StockroomError`]; turning them into
//! notifications is the job of the API facade.

use crate::config::StockroomConfig;
use crate::model::{FilterCriteria, FilterSummary, Product};
use std::fmt;
use std::path::PathBuf;

pub mod add;
pub mod delete;
pub mod export;
pub mod filter;
pub mod list;
pub mod load;
pub mod report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageLevel::Info => "info",
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
    pub details: Option<String>,
}

impl CmdMessage {
    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
            details: None,
        }
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_products: Vec<Product>,
    pub listed_products: Vec<Product>,
    pub summary: Option<FilterSummary>,
    pub criteria: Option<FilterCriteria>,
    pub output_paths: Vec<PathBuf>,
    pub config: Option<StockroomConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_products(mut self, products: Vec<Product>) -> Self {
        self.affected_products = products;
        self
    }

    pub fn with_listed_products(mut self, products: Vec<Product>) -> Self {
        self.listed_products = products;
        self
    }

    pub fn with_summary(mut self, summary: FilterSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_paths.push(path);
        self
    }

    pub fn with_config(mut self, config: StockroomConfig) -> Self {
        self.config = Some(config);
        self
    }
}
