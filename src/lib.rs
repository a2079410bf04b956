//! query-perf: advisory diagnostics for DOM-query usage
//!
//! Instruments a host query library's lookup/bind/unbind primitives, routes
//! every observed call through pluggable analyzers, and aggregates recurring
//! calls into ranked performance tables.

pub mod aggregate;
pub mod analyzers;
pub mod bus;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod host;
pub mod interceptor;
pub mod record;
pub mod replay;
pub mod reporter;

pub use aggregate::{AggregateRow, Aggregator, SortKey};
pub use analyzers::{AnalyzerRegistry, Warning, WarningKind};
pub use config::Config;
pub use context::InstrumentationContext;
pub use error::{Error, Result};
pub use host::{Handler, HostHooks, HostOps, Matches};
pub use record::{CallKind, CallRecord};
pub use reporter::Report;

/// Set up instrumentation over a host's primitives.
pub fn instrument(hooks: HostHooks, config: Config) -> anyhow::Result<InstrumentationContext> {
    Ok(InstrumentationContext::init(hooks, config)?)
}
