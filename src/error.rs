// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors returned by scope operations.

use crate::scope::ScopeID;

/// Failure of a [`Scope`](crate::scope::Scope) operation.
///
/// All variants describe a programming error in the caller: the operation had
/// no effect on the sink and is never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// No scope is open on the calling thread.
    #[error("no scope is open on the current thread")]
    NoActiveScope,

    /// A parameter name was absent (empty).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The scope was already closed.
    #[error("scope {0} is closed")]
    AlreadyClosed(ScopeID),

    /// A scope was closed while a scope nested inside it was still open.
    #[error("scope {closing} cannot be closed while scope {current} is current")]
    OutOfOrderClose {
        /// The scope whose close was attempted.
        closing: ScopeID,
        /// The innermost scope open on this thread.
        current: ScopeID,
    },
}
