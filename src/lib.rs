//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# logwise_mdc

Scoped diagnostic context parameters ("MDC") for Rust.

# The problem

A log line on its own rarely says which request, job, or user it belongs to.  Passing
that information to every call site that logs is tedious, and forgetting it once is
enough to make a trace useless.

Logging frameworks in other ecosystems solve this with a *mapped diagnostic context*: a
per-thread map of key/value pairs that every log line carries.  A flat map is easy to
corrupt, though.  If a helper sets `stage=validate` and then clears it, the caller's
`stage=parse` is gone too.

# Scopes

logwise_mdc organizes the map as a stack of scopes.  Each scope owns the parameters it
defined.  When a scope removes a parameter, or closes, the nearest enclosing definition
of that key comes back:

```rust
use logwise_mdc::{Scope, ThreadLocalSink};

let request = Scope::enter(None);
request.put("stage", "parse").unwrap();
{
    let helper = Scope::enter(None);
    helper.put("stage", "validate").unwrap();
    assert_eq!(ThreadLocalSink::get("stage").as_deref(), Some("validate"));
}
assert_eq!(ThreadLocalSink::get("stage").as_deref(), Some("parse"));
```

Scopes may carry a namespace, which prefixes every key they define:

```rust
use logwise_mdc::{Scope, ThreadLocalSink};

let db = Scope::enter(Some("db"));
db.put("table", "orders").unwrap();
assert_eq!(ThreadLocalSink::render(), "db.table=orders");
```

# Sinks

Parameters are mirrored into a process-wide [`Sink`].  By default that is the
[`ThreadLocalSink`], a per-thread map.  logwise does not read that map on its own: a
logger or formatter that wants the parameters on each line calls
[`ThreadLocalSink::render`] (or [`ThreadLocalSink::snapshot`] / [`ThreadLocalSink::get`])
itself.  Tests typically install an [`InMemorySink`]; see [`global_sink`].

```rust
use logwise_mdc::{Scope, ThreadLocalSink};

let job = Scope::enter(Some("job"));
job.put("id", 42_u64).unwrap();
let line = format!("{} [{}]", "started", ThreadLocalSink::render());
assert_eq!(line, "started [job.id=42]");
```

# Multithreading

Scopes are confined to the thread that opened them ([`Scope`] is not `Send`).  A thread
spawned inside a scope starts without one.
*/

mod error;
pub mod global_sink;
mod inmemory_sink;
mod noop_sink;
pub mod scope;
mod sink;
mod thread_local_sink;
mod value;

logwise::declare_logging_domain!();

pub use error::ScopeError;
pub use global_sink::{global_sink, set_global_sink};
pub use inmemory_sink::{InMemorySink, SinkEvent};
pub use noop_sink::NoopSink;
pub use scope::{Scope, ScopeGuard, ScopeID, ScopedInvocation};
pub use sink::Sink;
pub use thread_local_sink::ThreadLocalSink;
pub use value::Value;
