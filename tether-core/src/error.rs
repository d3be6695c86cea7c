//! Error types.
//!
//! The runtime itself has almost nothing that can fail: errors raised by
//! effect bodies, getters and callbacks belong to the caller and pass through
//! untouched. What is left are the borrow conflicts a reactive reference can
//! hit when its slot is accessed re-entrantly.

use std::cell::{BorrowError, BorrowMutError};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Error)]
pub enum ReactiveError {
    /// The value is being written, so it cannot be read.
    ///
    /// Only reachable from the `Drop` of a value being replaced in the same
    /// reference.
    #[error("reactive reference is being written: {0}")]
    Borrow(#[from] BorrowError),

    /// The value is being read or written, so it cannot be written.
    #[error("reactive reference is in use and cannot be written: {0}")]
    BorrowMut(#[from] BorrowMutError),
}
