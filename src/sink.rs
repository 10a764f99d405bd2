//SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Debug;

/**
The destination that mirrors context parameters into a logging subsystem.

Scopes call the sink with fully-qualified keys (namespace prefix included).  A sink is
process-wide and is called from every thread that opens scopes, so implementations must
tolerate concurrent calls.  Calls are expected to be cheap and non-blocking.
*/
pub trait Sink: Debug + Send + Sync {
    /**
    Publishes `value` under `key`.

    `None` means the parameter has no value; the sink should hold no entry for `key`.
    */
    fn put(&self, key: &str, value: Option<&str>);

    /**
    Withdraws `key`.  Removing an absent key is a no-op.
    */
    fn remove(&self, key: &str);
}

/*
Boilerplate notes.

# Sink

Clone on Sink doesn't make sense; sinks are shared through Arc.
PartialEq/Eq/Hash raise the same data-vs-provenance question as loggers do, skip them.
Default is up to the implementation.
Send/Sync are required because the global slot hands the same sink to every thread.
*/
