//! Error conditions surfaced across the pool allocator, tree, and storage facade.
//!
//! Only two conditions are ever returned to a caller: an exhausted pool and a
//! malformed [`Config`](crate::config::Config). An invalid identifier or a
//! readback that doesn't match what was ref'd are caller bugs, not recoverable
//! conditions, so they stay as debug assertions or no-ops — see `storage.rs`.

use thiserror::Error;

/// Errors returned by the interning core.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pool allocator is at `max_nodes` capacity and the free list is empty.
    #[error("attribute pool exhausted at {capacity} nodes")]
    OutOfMemory {
        /// The configured node capacity that was reached.
        capacity: u32,
    },

    /// A [`Config`](crate::config::Config) failed validation.
    #[error("invalid pool configuration: {reason}")]
    InvalidConfig {
        /// Human-readable reason the configuration was rejected.
        reason: &'static str,
    },
}

/// Convenience alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
