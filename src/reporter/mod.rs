pub mod console;
pub mod json;

use crate::aggregate::AggregateRow;
use crate::analyzers::Warning;
use serde::Serialize;

/// Point-in-time snapshot of everything the pipeline has observed: analyzer
/// warnings plus the top rows of both ranked tables.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub warnings: Vec<Warning>,
    pub selectors: Vec<AggregateRow>,
    pub handlers: Vec<AggregateRow>,
}
