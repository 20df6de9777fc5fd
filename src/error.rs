//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn embedding_error_display() {
        let e = AppError::Embedding("endpoint unreachable".into());
        assert!(e.to_string().contains("embedding error"));
        assert!(e.to_string().contains("endpoint unreachable"));
    }

    #[test]
    fn knowledge_base_error_display() {
        let e = AppError::KnowledgeBase("duplicate entity key".into());
        assert!(e.to_string().contains("duplicate entity key"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        // satisfies std::error::Error trait
        let _: &dyn Error = &e;
    }
}
