//! Orchestration errors
//!
//! `EngineError` wraps the error of whichever layer failed, so callers can
//! still match on the underlying `ComposeError` or `AllocationError`.

use crate::config::ConfigError;
use docket_core::{AllocationError, ComposeError, StoreError};
use thiserror::Error;

/// Result alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Engine failures
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template or record could not be fetched
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Composition failed
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Numbering failed
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Document cannot be sent for signature
    #[error("document cannot be sent for signature: {0}")]
    NotSignable(String),
}

impl EngineError {
    /// True for failures that happened before a number could be consumed
    pub fn is_before_allocation(&self) -> bool {
        !matches!(
            self,
            EngineError::Allocation(_) | EngineError::Compose(ComposeError::Allocation(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{DocumentType, RenderError, SectionKind};

    #[test]
    fn test_transparent_display() {
        let err: EngineError = StoreError::not_found("template", "msa").into();
        assert_eq!(err.to_string(), "template not found: msa");

        let err: EngineError = ComposeError::SectionFailed(
            SectionKind::Legal,
            RenderError::UnresolvedVariable("customer.email".into()),
        )
        .into();
        assert_eq!(
            err.to_string(),
            "legal section failed: unresolved variable 'customer.email'"
        );
    }

    #[test]
    fn test_is_before_allocation() {
        let err: EngineError = AllocationError::Exhausted(DocumentType::Invoice).into();
        assert!(!err.is_before_allocation());
        let err = EngineError::NotSignable("no email".into());
        assert!(err.is_before_allocation());
    }
}
