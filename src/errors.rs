// Copyright (c) 2025 - Cowboy AI, Inc.
//! Unified error taxonomy for ledger operations
//!
//! Four failure families, all user-visible and typed:
//!
//! 1. **Validation** — malformed input, event never built
//! 2. **Precondition** — a guard rule rejected the event against the
//!    current projections, event never appended
//! 3. **NotFound** — a referenced device/agent/owner does not resolve
//! 4. **DomainInvariant** — the requested projection is not meaningful
//!    yet (e.g. durability before Recycle)
//!
//! Store-level version conflicts get their own variant because they are
//! retryable by the caller, unlike the four domain families.

use thiserror::Error;

pub use crate::domain::invariants::{PreconditionError, ValidationError};
pub use crate::event_store::EventStoreError;
pub use crate::projection::DomainInvariantError;
pub use crate::registry::NotFoundError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Top-level error for all ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input was malformed before any rule could be evaluated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A guard rule rejected the event
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// A referenced entity does not exist
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The projection is not meaningful for this device yet
    #[error(transparent)]
    DomainInvariant(#[from] DomainInvariantError),

    /// Event store rejected the append (concurrent writer won)
    #[error(transparent)]
    Store(#[from] EventStoreError),
}

impl LedgerError {
    /// Whether the caller may retry the operation verbatim
    ///
    /// Only version conflicts are retryable: the guard decision was made
    /// against a history that grew underneath us. The four domain
    /// families require the caller to change the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Store(EventStoreError::VersionConflict { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceId;

    #[test]
    fn test_version_conflict_is_retryable() {
        let err = LedgerError::Store(EventStoreError::VersionConflict {
            device: DeviceId::new(),
            expected: 3,
            actual: 4,
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let err = LedgerError::NotFound(NotFoundError::Device("abc".to_string()));
        assert!(!err.is_retryable());
    }
}
