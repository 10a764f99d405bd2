// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core Scope implementation.

use crate::error::ScopeError;
use crate::global_sink::global_sink;
use crate::sink::Sink;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) static SCOPE_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a scope.
///
/// IDs are drawn from a process-wide counter, so a scope created later always has a
/// larger ID than one created earlier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeID(pub(crate) u64);

impl Display for ScopeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Internal scope data, shared by every clone of a [`Scope`] handle.
#[derive(Debug)]
pub(crate) struct ScopeInner {
    pub(crate) parent: Option<Scope>,
    pub(crate) scope_id: u64,
    /// Prepended to every local name to form the key the sink sees. Never changes.
    pub(crate) prefix: String,
    /// Parameters this scope defined itself, in declaration order.  `None` once closed.
    pub(crate) own: RefCell<Option<Vec<(String, Value)>>>,
}

/// A level in the thread's stack of context parameter scopes.
///
/// A `Scope` holds the parameters defined while it is open.  Every
/// [`put`](Scope::put) and [`remove`](Scope::remove) is mirrored to the global
/// [`Sink`], so log lines emitted on this thread carry the parameters of the
/// current scope and all of its ancestors.
///
/// `Scope` is a cheap handle: clones refer to the same scope, and equality and
/// hashing are by identity.  Scopes are confined to the thread that created them;
/// the handle is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```rust
/// use logwise_mdc::{Scope, ThreadLocalSink};
///
/// let outer = Scope::create(None);
/// outer.put("user", "alice").unwrap();
///
/// let inner = Scope::create(Some("db"));
/// inner.put("table", "orders").unwrap();
/// assert_eq!(ThreadLocalSink::render(), "db.table=orders user=alice");
///
/// inner.close().unwrap();
/// assert_eq!(ThreadLocalSink::render(), "user=alice");
/// outer.close().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Scope {
    pub(crate) inner: Rc<ScopeInner>,
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}scope {}",
            "  ".repeat(self.nesting_level()),
            self.scope_id()
        )?;
        if !self.inner.prefix.is_empty() {
            write!(f, " ({})", self.inner.prefix)?;
        }
        Ok(())
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Scope>> = const { RefCell::new(None) };
}

/// The registry slot, or `Err` once the thread is tearing down its locals.
fn try_current_scope() -> Result<Option<Scope>, std::thread::AccessError> {
    CURRENT.try_with(|current| current.borrow().clone())
}

fn current_scope() -> Option<Scope> {
    try_current_scope().ok().flatten()
}

fn replace_current(scope: Option<Scope>) {
    // after the registry is destroyed there is no current pointer left to update
    let _previous = CURRENT.try_with(|current| current.replace(scope));
}

pub(crate) fn check_name(name: &str) -> Result<(), ScopeError> {
    if name.is_empty() {
        Err(ScopeError::InvalidArgument("parameter name must not be empty"))
    } else {
        Ok(())
    }
}

impl Scope {
    /// Opens a new scope nested in the current one and makes it current.
    ///
    /// With a non-empty `namespace`, keys defined in the new scope are published as
    /// `<parent prefix><namespace>.<name>`.  Without one the new scope shares its
    /// parent's prefix but still tracks, and on close withdraws, only its own keys.
    ///
    /// The scope must be [closed](Scope::close) before its parent.  Prefer
    /// [`Scope::enter`], which closes on drop.
    ///
    /// ```rust
    /// use logwise_mdc::Scope;
    ///
    /// let a = Scope::create(Some("a"));
    /// let pfx = Scope::create(Some("pfx"));
    /// assert_eq!(pfx.prefix(), "a.pfx.");
    /// let plain = Scope::create(None);
    /// assert_eq!(plain.prefix(), "a.pfx.");
    /// plain.close().unwrap();
    /// pfx.close().unwrap();
    /// a.close().unwrap();
    /// ```
    pub fn create(namespace: Option<&str>) -> Scope {
        let parent = current_scope();
        let prefix = {
            let parent_prefix = parent.as_ref().map(Scope::prefix).unwrap_or("");
            match namespace {
                Some(namespace) if !namespace.is_empty() => {
                    format!("{parent_prefix}{namespace}.")
                }
                _ => parent_prefix.to_string(),
            }
        };
        let scope_id = SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let scope = Scope {
            inner: Rc::new(ScopeInner {
                parent,
                scope_id,
                prefix,
                own: RefCell::new(Some(Vec::new())),
            }),
        };
        logwise::trace_sync!(
            "open MDC scope {id} prefix {prefix}",
            id = scope_id,
            prefix = scope.prefix()
        );
        replace_current(Some(scope.clone()));
        scope
    }

    /// Returns the innermost open scope on this thread.
    pub fn current() -> Result<Scope, ScopeError> {
        current_scope().ok_or(ScopeError::NoActiveScope)
    }

    /// Whether any scope is open on this thread.
    pub fn has_current() -> bool {
        CURRENT
            .try_with(|current| current.borrow().is_some())
            .unwrap_or(false)
    }

    /// Returns the outermost open scope on this thread.
    pub fn root() -> Result<Scope, ScopeError> {
        let mut scope = Scope::current()?;
        while let Some(parent) = scope.parent() {
            scope = parent;
        }
        Ok(scope)
    }

    /// Sets a parameter in the current scope.  Equivalent to `Scope::current()?.put(name, value)`.
    pub fn param(name: &str, value: impl Into<Value>) -> Result<(), ScopeError> {
        Scope::current()?.put(name, value)?;
        Ok(())
    }

    /// Sets a parameter in the root scope, so it stays in force until the root closes
    /// regardless of which nested scopes open and close meanwhile.
    ///
    /// ```rust
    /// use logwise_mdc::{Scope, ThreadLocalSink};
    ///
    /// let root = Scope::create(None);
    /// let nested = Scope::create(Some("job"));
    /// Scope::root_param("request_id", "r-9").unwrap();
    /// nested.close().unwrap();
    /// assert_eq!(ThreadLocalSink::get("request_id").as_deref(), Some("r-9"));
    /// root.close().unwrap();
    /// assert_eq!(ThreadLocalSink::get("request_id"), None);
    /// ```
    pub fn root_param(name: &str, value: impl Into<Value>) -> Result<(), ScopeError> {
        Scope::root()?.put(name, value)?;
        Ok(())
    }

    /// The enclosing scope, or `None` for a root scope.
    pub fn parent(&self) -> Option<Scope> {
        self.inner.parent.clone()
    }

    /// The key prefix, e.g. `"a.pfx."`, or `""` when no namespace applies.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    #[inline]
    pub fn scope_id(&self) -> ScopeID {
        ScopeID(self.inner.scope_id)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.own.borrow().is_none()
    }

    /// The number of ancestors of this scope; a root scope has level 0.
    pub fn nesting_level(&self) -> usize {
        let mut level = 0;
        let mut current = self;
        while let Some(parent) = &current.inner.parent {
            level += 1;
            current = parent;
        }
        level
    }

    fn full_key(&self, name: &str) -> String {
        format!("{}{}", self.inner.prefix, name)
    }

    /// Defines `name` in this scope and publishes it as `prefix + name`.
    ///
    /// A [`Value::Null`] value is stored, but leaves the sink without an entry for the key.
    /// Returns `self` so calls can be chained.
    pub fn put(&self, name: &str, value: impl Into<Value>) -> Result<&Scope, ScopeError> {
        let value = value.into();
        let rendered = value.to_sink_string();
        {
            let mut own = self.inner.own.borrow_mut();
            let own = own
                .as_mut()
                .ok_or(ScopeError::AlreadyClosed(self.scope_id()))?;
            check_name(name)?;
            match own.iter().position(|(local, _)| local == name) {
                Some(index) => own[index].1 = value,
                None => own.push((name.to_string(), value)),
            }
        }
        global_sink().put(&self.full_key(name), rendered.as_deref());
        Ok(self)
    }

    /// Returns the value this scope itself defined for `name`.
    ///
    /// Ancestors are not consulted: a name defined only by an enclosing scope yields `None`.
    pub fn get(&self, name: &str) -> Result<Option<Value>, ScopeError> {
        let own = self.inner.own.borrow();
        let own = own
            .as_ref()
            .ok_or(ScopeError::AlreadyClosed(self.scope_id()))?;
        check_name(name)?;
        Ok(own
            .iter()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value.clone()))
    }

    /// Removes `name` from this scope and withdraws it from the sink.
    ///
    /// If an enclosing scope defines the same full key, its value is published again.
    pub fn remove(&self, name: &str) -> Result<&Scope, ScopeError> {
        {
            let mut own = self.inner.own.borrow_mut();
            let own = own
                .as_mut()
                .ok_or(ScopeError::AlreadyClosed(self.scope_id()))?;
            check_name(name)?;
            if let Some(index) = own.iter().position(|(local, _)| local == name) {
                own.remove(index);
            }
        }
        self.withdraw(global_sink().as_ref(), name);
        Ok(self)
    }

    /// Closes this scope: withdraws every parameter it defined, restoring any ancestor
    /// values they shadowed, and makes the parent current again.
    ///
    /// Only the current scope can be closed.  Closing a scope while a scope nested in it
    /// is still open fails with [`ScopeError::OutOfOrderClose`]; closing twice fails
    /// with [`ScopeError::AlreadyClosed`].  A failed close has no effect.
    ///
    /// A scope closed while its thread is exiting, after the thread's scope registry has
    /// been destroyed (for example a [`ScopeGuard`](crate::ScopeGuard) kept in a
    /// `thread_local!`), still withdraws its keys and succeeds.
    pub fn close(&self) -> Result<(), ScopeError> {
        if self.is_closed() {
            return Err(ScopeError::AlreadyClosed(self.scope_id()));
        }
        match try_current_scope() {
            Ok(Some(current)) if current == *self => {}
            Ok(Some(current)) => {
                return Err(ScopeError::OutOfOrderClose {
                    closing: self.scope_id(),
                    current: current.scope_id(),
                });
            }
            Ok(None) => return Err(ScopeError::NoActiveScope),
            // thread exit destroyed the registry first; the keys still have to be withdrawn
            Err(_) => {}
        }

        let own = self.inner.own.borrow_mut().take().unwrap_or_default();
        let sink = global_sink();
        for (name, _) in &own {
            self.withdraw(sink.as_ref(), name);
        }
        replace_current(self.inner.parent.clone());

        logwise::trace_sync!("closed MDC scope {id}", id = self.inner.scope_id);
        Ok(())
    }

    fn withdraw(&self, sink: &dyn Sink, name: &str) {
        let full_key = self.full_key(name);
        sink.remove(&full_key);
        if let Some(parent) = &self.inner.parent {
            parent.restore(sink, &full_key);
        }
    }

    /// Republishes the nearest definition of `full_key`, starting at this scope and
    /// walking toward the root.
    fn restore(&self, sink: &dyn Sink, full_key: &str) {
        let mut candidate = Some(self);
        while let Some(scope) = candidate {
            let Some(local) = full_key.strip_prefix(scope.prefix()) else {
                return;
            };
            let found = scope.inner.own.borrow().as_ref().and_then(|own| {
                own.iter()
                    .find(|(name, _)| name == local)
                    .map(|(_, value)| value.to_sink_string())
            });
            if let Some(rendered) = found {
                sink.put(full_key, rendered.as_deref());
                return;
            }
            candidate = scope.inner.parent.as_ref();
        }
    }
}
