//! Replay recorded call traces through the pipeline.
//!
//! A trace is a JSON array of host calls with their observed match counts and
//! durations. Replay drives them through a scripted host built around a
//! [`ManualClock`], so the report is deterministic - the console fallback for
//! environments with no live overlay.

use crate::aggregate::SortKey;
use crate::clock::ManualClock;
use crate::config::Config;
use crate::context::InstrumentationContext;
use crate::error::{Error, Result};
use crate::host::{Handler, HostHooks, Matches, NodeId};
use crate::reporter::Report;
use serde::Deserialize;
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// One recorded host call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TraceEntry {
    Find {
        selector: String,
        #[serde(default)]
        matched: usize,
        #[serde(default)]
        duration_ms: u64,
        /// Scoped-root context; lookups carrying one are not analyzed.
        #[serde(default)]
        context: Option<NodeId>,
    },
    Bind {
        selector: String,
        event: String,
        #[serde(default)]
        matched: usize,
        #[serde(default)]
        duration_ms: u64,
    },
    Unbind {
        selector: String,
        event: String,
    },
}

/// Load a trace file.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::trace(path, e.to_string()))
}

/// Drive a trace through a fresh instrumentation context and report on it.
///
/// The scripted host consumes one `(duration, matched)` script per driven
/// call; lookups the analyzers issue themselves see an unscripted host and
/// match nothing.
pub fn replay(entries: &[TraceEntry], config: &Config) -> Result<Report> {
    run(entries, config, None)
}

/// Like [`replay`], then re-rank both tables by `key` before snapshotting -
/// the CLI's stand-in for a renderer column click.
pub fn replay_sorted(entries: &[TraceEntry], config: &Config, key: SortKey) -> Result<Report> {
    run(entries, config, Some(key))
}

fn run(entries: &[TraceEntry], config: &Config, sort: Option<SortKey>) -> Result<Report> {
    let clock = Rc::new(ManualClock::new());
    let script: Rc<Cell<Option<(u64, usize)>>> = Rc::new(Cell::new(None));

    let hooks = scripted_hooks(Rc::clone(&clock), Rc::clone(&script));
    let ctx = InstrumentationContext::init_with_clock(hooks, config.clone(), clock)?;

    for entry in entries {
        match entry {
            TraceEntry::Find {
                selector,
                matched,
                duration_ms,
                context,
            } => {
                script.set(Some((*duration_ms, *matched)));
                ctx.ops().find(selector, *context);
            }
            TraceEntry::Bind {
                selector,
                event,
                matched,
                duration_ms,
            } => {
                script.set(Some((*duration_ms, *matched)));
                let target = Matches::new(selector.clone(), (0..*matched as u64).collect());
                ctx.ops().bind(&target, event, &Handler::new(|_| {}));
            }
            TraceEntry::Unbind { selector, event } => {
                script.set(None);
                let target = Matches::new(selector.clone(), vec![]);
                ctx.ops().unbind(&target, event, None);
            }
        }
    }

    // End of trace stands in for document-ready.
    ctx.run_dom_analysis();

    if let Some(key) = sort {
        ctx.sort_selectors_by(key);
        ctx.sort_handlers_by(key);
    }

    Ok(ctx.report())
}

fn scripted_hooks(clock: Rc<ManualClock>, script: Rc<Cell<Option<(u64, usize)>>>) -> HostHooks {
    let find_clock = Rc::clone(&clock);
    let find_script = Rc::clone(&script);
    let bind_script = script;

    HostHooks {
        find: Some(Rc::new(move |selector: &str, _context| {
            match find_script.take() {
                Some((duration_ms, matched)) => {
                    find_clock.advance(duration_ms);
                    Matches::new(selector, (0..matched as u64).collect())
                }
                None => Matches::new(selector, vec![]),
            }
        })),
        bind: Some(Rc::new(move |target: &Matches, _event, _handler| {
            if let Some((duration_ms, _)) = bind_script.take() {
                clock.advance(duration_ms);
            }
            target.clone()
        })),
        unbind: Some(Rc::new(|target: &Matches, _event, _handler| target.clone())),
    }
}
