// SPDX-License-Identifier: MIT OR Apache-2.0

//! The default sink: a per-thread mirror of context parameters.
//!
//! Each thread owns a sorted map of fully-qualified keys to strings.  Because scopes are
//! confined to the thread that opened them, this map always reflects exactly the
//! parameters in force on that thread.  Log formatters read it through
//! [`ThreadLocalSink::snapshot`], [`ThreadLocalSink::get`] or [`ThreadLocalSink::render`].

use crate::sink::Sink;
use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static THREAD_MDC: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

/**
A sink that writes into the calling thread's mirror.

```rust
use logwise_mdc::{Scope, ThreadLocalSink};

let scope = Scope::create(Some("http"));
scope.put("method", "GET").unwrap();
assert_eq!(ThreadLocalSink::get("http.method").as_deref(), Some("GET"));
assert_eq!(ThreadLocalSink::render(), "http.method=GET");
scope.close().unwrap();
assert!(ThreadLocalSink::snapshot().is_empty());
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ThreadLocalSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone/Copy/PartialEq/Eq/Hash/Default: derived, zero-sized struct
// - Display: NOT implemented - render() describes the thread's data, not the sink
// - Send/Sync: automatic; the data lives in thread-local storage, not in the struct

impl ThreadLocalSink {
    pub const fn new() -> Self {
        Self {}
    }

    /// Copies the calling thread's parameters.
    pub fn snapshot() -> BTreeMap<String, String> {
        THREAD_MDC
            .try_with(|mdc| mdc.borrow().clone())
            .unwrap_or_default()
    }

    /// Looks up one fully-qualified key on the calling thread.
    pub fn get(key: &str) -> Option<String> {
        THREAD_MDC
            .try_with(|mdc| mdc.borrow().get(key).cloned())
            .ok()
            .flatten()
    }

    /// Renders the calling thread's parameters as space-separated `key=value` pairs,
    /// sorted by key.
    pub fn render() -> String {
        THREAD_MDC
            .try_with(|mdc| {
                let mdc = mdc.borrow();
                let mut out = String::new();
                for (key, value) in mdc.iter() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                out
            })
            .unwrap_or_default()
    }

    /// Discards the calling thread's parameters without touching any scope.
    pub fn clear() {
        let _ = THREAD_MDC.try_with(|mdc| mdc.borrow_mut().clear());
    }
}

impl Sink for ThreadLocalSink {
    fn put(&self, key: &str, value: Option<&str>) {
        // during thread teardown the map may already be gone; nothing left to mirror into
        let _ = THREAD_MDC.try_with(|mdc| {
            let mut mdc = mdc.borrow_mut();
            match value {
                Some(value) => {
                    mdc.insert(key.to_string(), value.to_string());
                }
                None => {
                    mdc.remove(key);
                }
            }
        });
    }

    fn remove(&self, key: &str) {
        let _ = THREAD_MDC.try_with(|mdc| {
            mdc.borrow_mut().remove(key);
        });
    }
}
