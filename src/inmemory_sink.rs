// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides a sink that keeps context parameters in a process-shared map
//! instead of forwarding them to a logging subsystem.  It is intended for:
//!
//! - Unit testing code that opens scopes
//! - Asserting on the exact sequence of sink calls (see [`SinkEvent`])
//!
//! Unlike [`ThreadLocalSink`](crate::ThreadLocalSink), every thread writes into the same
//! map, so tests that install an `InMemorySink` globally should not run concurrently with
//! other scope-opening tests.

use crate::sink::Sink;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// One call received by an [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SinkEvent {
    Put { key: String, value: Option<String> },
    Remove { key: String },
}

/// A sink that stores parameters in memory and journals every call.
///
/// # Example
///
/// ```rust
/// use logwise_mdc::{InMemorySink, Scope, SinkEvent, global_sink::set_global_sink};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let previous = set_global_sink(sink.clone());
///
/// let scope = Scope::create(None);
/// scope.put("request", 17).unwrap();
/// assert_eq!(sink.get("request").as_deref(), Some("17"));
/// scope.close().unwrap();
///
/// assert!(sink.is_empty());
/// assert_eq!(
///     sink.drain_events(),
///     vec![
///         SinkEvent::Put { key: "request".to_string(), value: Some("17".to_string()) },
///         SinkEvent::Remove { key: "request".to_string() },
///     ]
/// );
///
/// set_global_sink(previous);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySink {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, String>,
    events: Vec<SinkEvent>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Default: derived
// - Clone: NOT implemented - share through Arc so every holder sees the same map
// - PartialEq/Eq/Hash: NOT implemented - comparing mutex-guarded state is racy
// - Send/Sync: automatic through parking_lot::Mutex

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current entries.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.state.lock().entries.clone()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.state.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Drops all entries and the event journal.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.events.clear();
    }

    /// Returns the journal of calls received since the last drain, oldest first, and
    /// empties it.  Entries are unaffected.
    pub fn drain_events(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.state.lock().events)
    }
}

impl Sink for InMemorySink {
    fn put(&self, key: &str, value: Option<&str>) {
        let mut state = self.state.lock();
        match value {
            Some(value) => {
                state.entries.insert(key.to_string(), value.to_string());
            }
            None => {
                state.entries.remove(key);
            }
        }
        state.events.push(SinkEvent::Put {
            key: key.to_string(),
            value: value.map(str::to_string),
        });
    }

    fn remove(&self, key: &str) {
        let mut state = self.state.lock();
        state.entries.remove(key);
        state.events.push(SinkEvent::Remove {
            key: key.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_records_calls_in_order() {
        let sink = InMemorySink::new();
        sink.put("a", Some("1"));
        sink.put("a", None);
        sink.remove("b");
        assert!(sink.is_empty());
        assert_eq!(
            sink.drain_events(),
            vec![
                SinkEvent::Put {
                    key: "a".to_string(),
                    value: Some("1".to_string())
                },
                SinkEvent::Put {
                    key: "a".to_string(),
                    value: None
                },
                SinkEvent::Remove {
                    key: "b".to_string()
                },
            ]
        );
        assert!(sink.drain_events().is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let sink = std::sync::Arc::new(InMemorySink::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || sink.put(&format!("k{i}"), Some("v")))
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread should complete");
        }
        assert_eq!(sink.len(), 4);
        sink.clear();
        assert!(sink.snapshot().is_empty());
    }
}
