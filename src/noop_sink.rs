// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::sink::Sink;

/**
A sink that discards every parameter.

Selected with `LOGWISE_MDC_SINK=none` when no logging subsystem consumes context
parameters; scopes still track their values, so [`Scope::get`](crate::Scope::get) keeps
working.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoopSink {}

impl NoopSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Sink for NoopSink {
    fn put(&self, _key: &str, _value: Option<&str>) {}

    fn remove(&self, _key: &str) {}
}
