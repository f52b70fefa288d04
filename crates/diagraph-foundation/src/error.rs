//! A four-category error taxonomy: Validation,
//! Consistency, Resource, and Cancellation. Cancellation is not represented
//! here as an error variant — it is not an error, so call sites
//! model it as a plain enum/bool result instead (see `diagraph-interaction`
//! and `diagraph-animation`).

use thiserror::Error;

/// The category an [`Error`] belongs to, used to decide propagation policy:
/// Validation errors are caller-visible; Consistency errors are quarantined
/// and reported asynchronously; Resource errors degrade a layer to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Consistency,
    Resource,
}

/// The workspace-wide error type. Each crate keeps a smaller local error
/// enum where it helps call sites (see `diagraph-reactive::SignalError`,
/// `diagraph-selection::SelectionError`) and converts into this type at the
/// facade boundary (`diagraph-engine`).
#[derive(Error, Debug, Clone)]
#[must_use = "errors should be handled or propagated"]
pub enum Error {
    /// Reference to a block/anchor/connection id that does not exist.
    #[error("unknown id: {kind} {id:?}")]
    UnknownId { kind: &'static str, id: String },

    /// A duplicate id was supplied where ids must be unique.
    #[error("duplicate id: {kind} {id:?}")]
    DuplicateId { kind: &'static str, id: String },

    /// A structural invariant was violated (e.g. block width/height <= 0).
    #[error("invalid {kind}: {context}")]
    InvalidValue { kind: &'static str, context: String },

    /// A cyclic dependency was detected in a `Computed` graph, or a
    /// recursive render was attempted — both are Consistency errors
    /// and never unwind past the scheduler.
    #[error("consistency violation: {context}")]
    Consistency { context: String },

    /// A drawing context (canvas/HTML surface) could not be acquired.
    #[error("resource unavailable: {context}")]
    Resource { context: String },

    /// A generic internal error with no more specific category.
    #[error("internal error: {context}")]
    Internal { context: String },
}

impl Error {
    pub fn unknown_id(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::UnknownId {
            kind,
            id: id.to_string(),
        }
    }

    pub fn duplicate_id(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::DuplicateId {
            kind,
            id: id.to_string(),
        }
    }

    pub fn invalid_value(kind: &'static str, context: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            context: context.into(),
        }
    }

    pub fn consistency(context: impl Into<String>) -> Self {
        Self::Consistency {
            context: context.into(),
        }
    }

    pub fn resource(context: impl Into<String>) -> Self {
        Self::Resource {
            context: context.into(),
        }
    }

    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }

    /// Classify the error by category, for callers that branch on
    /// propagation policy (e.g. whether to surface synchronously or
    /// quarantine a subtree).
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownId { .. } | Self::DuplicateId { .. } | Self::InvalidValue { .. } => {
                ErrorCategory::Validation
            }
            Self::Consistency { .. } | Self::Internal { .. } => ErrorCategory::Consistency,
            Self::Resource { .. } => ErrorCategory::Resource,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_caller_visible_category() {
        assert_eq!(
            Error::unknown_id("block", "A").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::invalid_value("block", "w<=0").category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn consistency_errors_quarantine_category() {
        assert_eq!(
            Error::consistency("cyclic computed").category(),
            ErrorCategory::Consistency
        );
    }
}
