use crate::commands::MessageLevel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockroomError {
    #[error("Product not found: {0}")]
    ProductNotFound(u64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl StockroomError {
    /// Notification level used when this error is reported to the user.
    ///
    /// A missing product or a rejected form is a warning; anything else is an error.
    pub fn severity(&self) -> MessageLevel {
        match self {
            StockroomError::ProductNotFound(_) | StockroomError::Validation(_) => {
                MessageLevel::Warning
            }
            _ => MessageLevel::Error,
        }
    }
}

pub type Result<T> = std::result::Result<T, StockroomError>;
