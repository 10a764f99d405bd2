// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running a closure inside a freshly opened scope.

use super::scope_impl::{Scope, check_name};
use crate::error::ScopeError;
use crate::value::Value;

/// Collects parameters, then runs work inside a new scope that holds them.
///
/// Created by [`Scope::with`].  The scope opens when [`run`](ScopedInvocation::run) or
/// [`call`](ScopedInvocation::call) is invoked and closes when the closure returns or
/// unwinds.
///
/// ```rust
/// use logwise_mdc::{Scope, ThreadLocalSink};
///
/// let total = Scope::with(Some("component"))
///     .param("param1", "value1")?
///     .param("param2", 2)?
///     .run(|| {
///         assert_eq!(ThreadLocalSink::render(), "component.param1=value1 component.param2=2");
///         40 + 2
///     })?;
/// assert_eq!(total, 42);
/// assert!(ThreadLocalSink::snapshot().is_empty());
/// # Ok::<(), logwise_mdc::ScopeError>(())
/// ```
#[must_use = "nothing happens until run or call is invoked"]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopedInvocation {
    namespace: Option<String>,
    params: Vec<(String, Value)>,
}

impl Scope {
    /// Starts building a [`ScopedInvocation`] whose scope uses `namespace`.
    pub fn with(namespace: Option<&str>) -> ScopedInvocation {
        ScopedInvocation {
            namespace: namespace.map(str::to_string),
            params: Vec::new(),
        }
    }
}

impl ScopedInvocation {
    /// Queues a parameter for the scope.  An empty name is rejected immediately.
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ScopeError> {
        check_name(name)?;
        self.params.push((name.to_string(), value.into()));
        Ok(self)
    }

    fn open(self) -> Result<super::ScopeGuard, ScopeError> {
        let guard = Scope::enter(self.namespace.as_deref());
        for (name, value) in self.params {
            guard.put(&name, value)?;
        }
        Ok(guard)
    }

    /// Opens the scope, runs `task`, and closes the scope.
    pub fn run<T>(self, task: impl FnOnce() -> T) -> Result<T, ScopeError> {
        let guard = self.open()?;
        let output = task();
        guard.close()?;
        Ok(output)
    }

    /// Opens the scope, runs the fallible `task`, and closes the scope.
    ///
    /// The scope is closed before the task's result is returned.  If both the task and
    /// the close fail, the task's error wins.
    pub fn call<T, E>(self, task: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<ScopeError>,
    {
        let guard = self.open()?;
        let output = task();
        let closed = guard.close();
        let value = output?;
        closed?;
        Ok(value)
    }
}
