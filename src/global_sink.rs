// SPDX-License-Identifier: MIT OR Apache-2.0

//! Global sink management.
//!
//! Every scope on every thread publishes its parameters to one process-wide [`Sink`].
//! This module owns that slot.
//!
//! # Default Behavior
//!
//! The first access resolves a default sink from the `LOGWISE_MDC_SINK` environment
//! variable (see [`SinkKind`]).  When the variable is unset the default is
//! [`ThreadLocalSink`], which needs no configuration.
//!
//! # Replacement
//!
//! [`set_global_sink`] swaps the sink and hands back the previous one.  Replacing the
//! sink is a configuration-time operation: scopes that were opened under the old sink
//! will withdraw their keys from the new one when they close.  Configure the sink before
//! opening scopes, or restore the previous sink once the scopes using the replacement are
//! closed (the usual pattern in tests).
//!
//! ```
//! use logwise_mdc::global_sink::{global_sink, set_global_sink};
//! use logwise_mdc::InMemorySink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! let previous = set_global_sink(sink.clone());
//! global_sink().put("k", Some("v"));
//! assert_eq!(sink.get("k").as_deref(), Some("v"));
//! set_global_sink(previous);
//! ```
//!
//! # Thread Safety
//!
//! Reads take a shared lock just long enough to clone an `Arc`, so put/remove calls from
//! many threads don't serialise on the slot; the sink itself handles its own concurrency.

use crate::noop_sink::NoopSink;
use crate::sink::Sink;
use crate::thread_local_sink::ThreadLocalSink;
use parking_lot::RwLock;
use std::env::VarError;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Environment variable consulted when the global sink is first resolved.
pub const SINK_ENV_VAR: &str = "LOGWISE_MDC_SINK";

static GLOBAL_SINK: OnceLock<RwLock<Arc<dyn Sink>>> = OnceLock::new();

/// The built-in sinks selectable through [`SINK_ENV_VAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SinkKind {
    /// [`ThreadLocalSink`]; accepts `thread_local` or `thread-local`.
    #[default]
    ThreadLocal,
    /// [`NoopSink`]; accepts `none` or `noop`.
    Noop,
}

/// A [`SINK_ENV_VAR`] value that names no known sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sink kind {0:?}")]
pub struct UnknownSinkKind(pub String);

impl FromStr for SinkKind {
    type Err = UnknownSinkKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "thread_local" | "thread-local" => Ok(SinkKind::ThreadLocal),
            "none" | "noop" => Ok(SinkKind::Noop),
            _ => Err(UnknownSinkKind(s.to_string())),
        }
    }
}

impl SinkKind {
    /// Reads [`SINK_ENV_VAR`].  An unset variable selects the default; an unknown value
    /// is reported and also selects the default.
    pub fn from_env() -> SinkKind {
        SinkKind::resolve(std::env::var(SINK_ENV_VAR))
    }

    /// Interprets a lookup of [`SINK_ENV_VAR`] the way [`SinkKind::from_env`] does.
    pub fn resolve(var: Result<String, VarError>) -> SinkKind {
        match var {
            Ok(raw) => raw.parse().unwrap_or_else(|e: UnknownSinkKind| {
                let message = e.to_string();
                logwise::warn_sync!(
                    "LOGWISE_MDC_SINK: {message}; using the thread-local sink",
                    message = message
                );
                SinkKind::default()
            }),
            Err(_) => SinkKind::default(),
        }
    }

    /// Builds the sink this kind names.
    pub fn build(self) -> Arc<dyn Sink> {
        match self {
            SinkKind::ThreadLocal => Arc::new(ThreadLocalSink::new()),
            SinkKind::Noop => Arc::new(NoopSink::new()),
        }
    }
}

fn slot() -> &'static RwLock<Arc<dyn Sink>> {
    GLOBAL_SINK.get_or_init(|| {
        let kind = SinkKind::from_env();
        let kind_name = format!("{:?}", kind);
        logwise::debuginternal_sync!("resolved default MDC sink {kind}", kind = kind_name);
        RwLock::new(kind.build())
    })
}

/// Returns the sink scopes currently publish to.
///
/// ```
/// use logwise_mdc::global_sink::global_sink;
///
/// let sink = global_sink();
/// println!("Sink: {:?}", sink);
/// ```
pub fn global_sink() -> Arc<dyn Sink> {
    slot().read().clone()
}

/// Installs `sink` as the process-wide sink and returns the one it replaced.
pub fn set_global_sink(sink: Arc<dyn Sink>) -> Arc<dyn Sink> {
    let description = format!("{:?}", sink);
    logwise::debuginternal_sync!("installing MDC sink {sink}", sink = description);
    std::mem::replace(&mut *slot().write(), sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sink_kinds() {
        assert_eq!("thread_local".parse(), Ok(SinkKind::ThreadLocal));
        assert_eq!("Thread-Local".parse(), Ok(SinkKind::ThreadLocal));
        assert_eq!("".parse(), Ok(SinkKind::ThreadLocal));
        assert_eq!(" noop ".parse(), Ok(SinkKind::Noop));
        assert_eq!("none".parse(), Ok(SinkKind::Noop));
        assert_eq!(
            "log4j".parse::<SinkKind>(),
            Err(UnknownSinkKind("log4j".to_string()))
        );
    }

    #[test]
    fn resolve_unset_and_known_values() {
        assert_eq!(
            SinkKind::resolve(Err(VarError::NotPresent)),
            SinkKind::ThreadLocal
        );
        assert_eq!(SinkKind::resolve(Ok("noop".to_string())), SinkKind::Noop);
        assert_eq!(
            SinkKind::resolve(Ok("thread-local".to_string())),
            SinkKind::ThreadLocal
        );
    }

    #[test]
    fn resolve_unknown_value_warns_and_falls_back() {
        use logwise::{InMemoryLogger, add_global_logger};

        let logger = Arc::new(InMemoryLogger::new());
        add_global_logger(logger.clone());

        assert_eq!(
            SinkKind::resolve(Ok("log4j".to_string())),
            SinkKind::ThreadLocal
        );
        let logs = logger.drain_logs();
        assert!(logs.contains("LOGWISE_MDC_SINK"));
        assert!(logs.contains("log4j"));
    }

    #[test]
    fn build_matches_kind() {
        assert_eq!(format!("{:?}", SinkKind::Noop.build()), "NoopSink");
        assert_eq!(
            format!("{:?}", SinkKind::ThreadLocal.build()),
            "ThreadLocalSink"
        );
    }
}
