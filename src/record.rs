//! One observed interception event.

use serde::Serialize;

/// Which host operation produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Selection,
    Bind,
    Unbind,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallKind::Selection => write!(f, "selection"),
            CallKind::Bind => write!(f, "bind"),
            CallKind::Unbind => write!(f, "unbind"),
        }
    }
}

/// Snapshot of a single instrumented host call.
///
/// Created by the interceptor at the moment the wrapped call completes,
/// consumed once by the analyzer registry and the aggregator, then discarded;
/// only aggregates outlive it.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub kind: CallKind,
    /// Selector text, possibly empty when the host cannot supply one.
    pub selector: String,
    /// Event type; present only for bind/unbind records.
    pub event_type: Option<String>,
    /// Number of elements the call matched.
    pub matched: usize,
    /// Wall-clock duration; clock-resolution ties round down to zero.
    pub duration_ms: u64,
}

impl CallRecord {
    pub fn selection(selector: impl Into<String>, matched: usize, duration_ms: u64) -> Self {
        Self {
            kind: CallKind::Selection,
            selector: selector.into(),
            event_type: None,
            matched,
            duration_ms,
        }
    }

    pub fn bind(
        selector: impl Into<String>,
        event_type: impl Into<String>,
        matched: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            kind: CallKind::Bind,
            selector: selector.into(),
            event_type: Some(event_type.into()),
            matched,
            duration_ms,
        }
    }
}
