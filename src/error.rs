//! Error types for the composition engine.

use crate::model::access::AccessMask;
use crate::model::Id;
use itertools::Itertools;
use thiserror::Error;

/// Errors returned by the engine's top-level operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced product, material, operation or order row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Id },

    /// The sub-product graph loops back onto a product already being expanded.
    #[error("cyclic composition: {}", .path.iter().join(" -> "))]
    CyclicComposition { path: Vec<Id> },

    /// The record store or order ledger failed.
    #[error("persistence error: {0:#}")]
    Persistence(#[from] anyhow::Error),

    /// Input data violates an invariant, e.g. a negative quantity.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller lacks the capability the operation requires.
    #[error("access denied: capability {required:#x} required")]
    AccessDenied { required: AccessMask },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        EngineError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = EngineError::CyclicComposition {
            path: vec![1, 2, 3, 1],
        };
        assert_eq!(err.to_string(), "cyclic composition: 1 -> 2 -> 3 -> 1");
    }

    #[test]
    fn test_persistence_keeps_cause() {
        let cause = anyhow::anyhow!("connection reset").context("Failed to fetch product");
        let err = EngineError::from(cause);
        assert_eq!(
            err.to_string(),
            "persistence error: Failed to fetch product: connection reset"
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            EngineError::not_found("product", 42).to_string(),
            "product not found: 42"
        );
    }
}
