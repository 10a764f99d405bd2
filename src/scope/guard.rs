// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drop-based scope closing.

use std::ops::Deref;

use super::scope_impl::Scope;
use crate::error::ScopeError;

/// Closes its [`Scope`] when dropped, including during unwinding.
///
/// Returned by [`Scope::enter`].  The guard dereferences to the scope, so parameters
/// can be set on it directly.
///
/// # Examples
///
/// ```rust
/// use logwise_mdc::{Scope, ThreadLocalSink};
///
/// {
///     let order = Scope::enter(Some("order"));
///     order.put("id", 1234).unwrap();
///     assert_eq!(ThreadLocalSink::get("order.id").as_deref(), Some("1234"));
/// }
/// assert!(!Scope::has_current());
/// assert_eq!(ThreadLocalSink::get("order.id"), None);
/// ```
///
/// Nested guards drop in reverse order of creation, which is exactly the order scopes
/// have to close in.  A close that fails inside `drop` (for example because a scope
/// opened with [`Scope::create`] inside this one was never closed) cannot be returned
/// to the caller; it is logged as a warning instead.  Use [`ScopeGuard::close`] to
/// observe the error.
#[must_use = "the scope closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    scope: Scope,
    armed: bool,
}

impl Scope {
    /// Opens a new scope like [`Scope::create`] and returns a guard that closes it.
    pub fn enter(namespace: Option<&str>) -> ScopeGuard {
        ScopeGuard {
            scope: Scope::create(namespace),
            armed: true,
        }
    }
}

impl ScopeGuard {
    /// The guarded scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Closes the scope now, reporting any failure.
    pub fn close(mut self) -> Result<(), ScopeError> {
        self.armed = false;
        self.scope.close()
    }
}

impl Deref for ScopeGuard {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl AsRef<Scope> for ScopeGuard {
    fn as_ref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.armed || self.scope.is_closed() {
            return;
        }
        if let Err(e) = self.scope.close() {
            let message = e.to_string();
            logwise::warn_sync!(
                "ScopeGuard could not close its scope: {message}",
                message = message
            );
        }
    }
}
