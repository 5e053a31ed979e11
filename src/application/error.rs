use std::error::Error as StdError;

use thiserror::Error;

use crate::application::remote::PayloadError;
use crate::application::repos::RepoError;
use crate::application::sync::SyncError;
use crate::infra::error::InfraError;

/// Error message chain captured for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// Messages joined outermost first.
    pub fn chain(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::Payload(_) => 2,
            AppError::Sync(SyncError::NotFound { .. })
            | AppError::Sync(SyncError::Repo(RepoError::NotFound))
            | AppError::Repo(RepoError::NotFound) => 3,
            AppError::Infra(InfraError::Io(_)) => 74,
            _ => 1,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemId;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(AppError::validation("bad").exit_code(), 2);
        assert_eq!(
            AppError::from(SyncError::not_found("item", ItemId::new(1))).exit_code(),
            3
        );
        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
    }

    #[test]
    fn report_walks_the_source_chain() {
        let io = std::io::Error::other("disk gone");
        let error = AppError::from(InfraError::from(io));
        let report = error.report();
        assert_eq!(report.messages[0], "io error: disk gone");
        assert!(report.chain().starts_with("io error: disk gone"));
    }
}
