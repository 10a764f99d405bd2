// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-local scope management for hierarchical context parameters.
//!
//! A scope is a level in a per-thread stack.  Parameters set in a scope are published to
//! the global [`Sink`](crate::Sink) under the scope's key prefix and stay in force until
//! the scope removes them or closes.  Because every scope links to the scope that was
//! current when it opened, a log line emitted on a thread carries the parameters of the
//! innermost scope and all of its ancestors.
//!
//! # Overview
//!
//! - [`Scope`]: a level of the stack.  Create, nest, put, get, remove, close.
//! - [`ScopeGuard`]: closes its scope on drop.
//! - [`ScopedInvocation`]: runs a closure inside a scope preloaded with parameters.
//!
//! # Thread-Local Scope Stack
//!
//! Each thread has its own current scope.  Opening a scope makes it current; closing it
//! makes its parent current again:
//!
//! ```rust
//! use logwise_mdc::Scope;
//!
//! assert!(!Scope::has_current());
//! let root = Scope::enter(None);
//! let child = Scope::enter(Some("child"));
//! assert_eq!(Scope::current().unwrap(), *child);
//! assert_eq!(Scope::root().unwrap(), *root);
//! drop(child);
//! assert_eq!(Scope::current().unwrap(), *root);
//! ```
//!
//! Scopes close in the reverse of the order they were opened.  Closing a scope while one
//! nested inside it is still open is refused with
//! [`ScopeError::OutOfOrderClose`](crate::ScopeError::OutOfOrderClose).
//!
//! # Namespaces
//!
//! A scope opened with a namespace extends its parent's prefix by `namespace.`; a scope
//! opened without one keeps its parent's prefix.
//!
//! # Shadowing
//!
//! When a nested scope publishes a key that an enclosing scope also defines, the nested
//! value wins while the nested scope holds it.  Once the nested scope removes the key or
//! closes, the nearest enclosing definition is published again:
//!
//! ```rust
//! use logwise_mdc::{Scope, ThreadLocalSink};
//!
//! let outer = Scope::enter(None);
//! outer.put("stage", "parse").unwrap();
//! {
//!     let inner = Scope::enter(None);
//!     inner.put("stage", "validate").unwrap();
//!     assert_eq!(ThreadLocalSink::get("stage").as_deref(), Some("validate"));
//! }
//! assert_eq!(ThreadLocalSink::get("stage").as_deref(), Some("parse"));
//! ```
//!
//! # Other Threads
//!
//! Scopes never cross threads.  A thread spawned inside a scope starts with no current
//! scope and an empty [`ThreadLocalSink`](crate::ThreadLocalSink) mirror.
//!
//! ```compile_fail
//! fn assert_send<T: Send>() {}
//! assert_send::<logwise_mdc::Scope>();
//! ```

mod guard;
mod invocation;
mod scope_impl;


pub use guard::ScopeGuard;
pub use invocation::ScopedInvocation;
pub use scope_impl::{Scope, ScopeID};
