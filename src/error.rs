//! # Marker Error Types
//!
//! Errors surfaced by the marker integration layer. Registry, decoration and
//! invalidation operations are total and never fail; the only fallible steps
//! are context lookup and provider lifecycle transitions.

use thiserror::Error;

/// Errors that can occur while wiring markers into a view system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// A context was required but no provider is present in the scope chain.
    #[error("no provider for `{key}` in the enclosing scope")]
    ProviderMissing {
        /// Key the lookup was made under.
        key: &'static str,
    },

    /// A provider exists under the key but holds a value of another type.
    #[error("provider for `{key}` holds a value of a different type")]
    ContextTypeMismatch {
        /// Key the lookup was made under.
        key: &'static str,
    },

    /// `mount` was called on a provider that is already mounted.
    #[error("view integration provider is already mounted")]
    AlreadyMounted,
}

/// Result type for marker integration operations.
pub type Result<T> = std::result::Result<T, MarkerError>;
