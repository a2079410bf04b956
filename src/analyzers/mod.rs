pub mod dom_rules;
pub mod event_rules;
pub mod selector_rules;

use crate::config::Config;
use crate::host::HostOps;
use crate::record::{CallKind, CallRecord};
use serde::Serialize;

/// Category of a finding, matching the analyzer collection that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Selector,
    Event,
    Dom,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::Selector => write!(f, "selector"),
            WarningKind::Event => write!(f, "event"),
            WarningKind::Dom => write!(f, "DOM"),
        }
    }
}

/// A finding reported by an analyzer.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// What the finding is about: a selector, an event type, or a document
    /// feature.
    pub subject: String,
    pub message: String,
}

impl Warning {
    pub fn selector(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Selector,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn event(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Event,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn dom(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Dom,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Inspects element lookups. `&mut self` lets an analyzer keep private state
/// across calls (the repeated-selector rule tracks the previous lookup);
/// the record itself is read-only.
pub trait SelectorAnalyzer {
    /// Unique identifier, used for config gating and the `rules` listing.
    fn id(&self) -> &'static str;

    /// One-line description of what this analyzer flags.
    fn description(&self) -> &'static str;

    /// Return a human-readable warning, or `None` for no finding.
    fn inspect(&mut self, selector: &str, matched: usize, duration_ms: u64) -> Option<String>;
}

/// Inspects event-handler bindings.
pub trait EventAnalyzer {
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn inspect(
        &mut self,
        event_type: &str,
        matched: usize,
        duration_ms: u64,
        selector: &str,
    ) -> Option<String>;
}

/// Inspects global document state. Runs exactly once, after the document is
/// fully loaded, with interception paused - DOM analyzers query the host
/// through the original unwrapped ops.
pub trait DomAnalyzer {
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn inspect(&mut self, ops: &HostOps) -> Option<String>;
}

/// Ids of all built-in analyzers, for config validation and CLI listing.
pub fn registry_ids() -> Vec<&'static str> {
    let registry = AnalyzerRegistry::with_defaults(&Config::default());
    let mut ids: Vec<&'static str> = registry.selector.iter().map(|a| a.id()).collect();
    ids.extend(registry.event.iter().map(|a| a.id()));
    ids.extend(registry.dom.iter().map(|a| a.id()));
    ids
}

/// Three independent append-only collections of analyzers.
#[derive(Default)]
pub struct AnalyzerRegistry {
    selector: Vec<Box<dyn SelectorAnalyzer>>,
    event: Vec<Box<dyn EventAnalyzer>>,
    dom: Vec<Box<dyn DomAnalyzer>>,
}

impl AnalyzerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the built-in analyzers, minus any the config
    /// disables.
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::new();

        for analyzer in selector_rules::defaults() {
            if config.analyzer_enabled(analyzer.id()) {
                registry.add_selector_analyzer(analyzer);
            }
        }
        for analyzer in event_rules::defaults(config) {
            if config.analyzer_enabled(analyzer.id()) {
                registry.add_event_analyzer(analyzer);
            }
        }
        for analyzer in dom_rules::defaults() {
            if config.analyzer_enabled(analyzer.id()) {
                registry.add_dom_analyzer(analyzer);
            }
        }

        registry
    }

    pub fn add_selector_analyzer(&mut self, analyzer: Box<dyn SelectorAnalyzer>) {
        self.selector.push(analyzer);
    }

    pub fn add_event_analyzer(&mut self, analyzer: Box<dyn EventAnalyzer>) {
        self.event.push(analyzer);
    }

    pub fn add_dom_analyzer(&mut self, analyzer: Box<dyn DomAnalyzer>) {
        self.dom.push(analyzer);
    }

    /// Run the collection matching the record's kind, in registration order,
    /// and collect the findings. Unbind records dispatch nowhere.
    pub fn dispatch(&mut self, record: &CallRecord) -> Vec<Warning> {
        let mut warnings = Vec::new();

        match record.kind {
            CallKind::Selection => {
                for analyzer in &mut self.selector {
                    if let Some(message) =
                        analyzer.inspect(&record.selector, record.matched, record.duration_ms)
                    {
                        warnings.push(Warning::selector(record.selector.clone(), message));
                    }
                }
            }
            CallKind::Bind => {
                let event_type = record.event_type.as_deref().unwrap_or("");
                for analyzer in &mut self.event {
                    if let Some(message) = analyzer.inspect(
                        event_type,
                        record.matched,
                        record.duration_ms,
                        &record.selector,
                    ) {
                        warnings.push(Warning::event(event_type.to_string(), message));
                    }
                }
            }
            CallKind::Unbind => {}
        }

        warnings
    }

    /// Run every DOM analyzer once against the document.
    pub fn run_dom_analyzers(&mut self, ops: &HostOps) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for analyzer in &mut self.dom {
            if let Some(message) = analyzer.inspect(ops) {
                warnings.push(Warning::dom(analyzer.id().to_string(), message));
            }
        }
        warnings
    }

    /// (id, description) pairs for every registered analyzer, for listing.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        let mut out: Vec<(&'static str, &'static str)> = Vec::new();
        out.extend(self.selector.iter().map(|a| (a.id(), a.description())));
        out.extend(self.event.iter().map(|a| (a.id(), a.description())));
        out.extend(self.dom.iter().map(|a| (a.id(), a.description())));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSelectorAnalyzer {
        finding: Option<&'static str>,
    }

    impl SelectorAnalyzer for FixedSelectorAnalyzer {
        fn id(&self) -> &'static str {
            "fixed"
        }

        fn description(&self) -> &'static str {
            "always returns a fixed finding"
        }

        fn inspect(&mut self, _: &str, _: usize, _: u64) -> Option<String> {
            self.finding.map(String::from)
        }
    }

    #[test]
    fn test_dispatch_selection_runs_selector_analyzers() {
        let mut registry = AnalyzerRegistry::new();
        registry.add_selector_analyzer(Box::new(FixedSelectorAnalyzer {
            finding: Some("slow"),
        }));
        registry.add_selector_analyzer(Box::new(FixedSelectorAnalyzer { finding: None }));

        let warnings = registry.dispatch(&CallRecord::selection(".foo", 1, 0));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Selector);
        assert_eq!(warnings[0].subject, ".foo");
        assert_eq!(warnings[0].message, "slow");
    }

    #[test]
    fn test_dispatch_bind_skips_selector_analyzers() {
        let mut registry = AnalyzerRegistry::new();
        registry.add_selector_analyzer(Box::new(FixedSelectorAnalyzer {
            finding: Some("slow"),
        }));

        let warnings = registry.dispatch(&CallRecord::bind(".foo", "click", 3, 0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_dispatch_unbind_goes_nowhere() {
        let mut registry = AnalyzerRegistry::with_defaults(&Config::default());
        let record = CallRecord {
            kind: CallKind::Unbind,
            selector: ".foo".to_string(),
            event_type: Some("click".to_string()),
            matched: 3,
            duration_ms: 0,
        };
        assert!(registry.dispatch(&record).is_empty());
    }

    #[test]
    fn test_with_defaults_honors_config_gating() {
        let mut config = Config::default();
        config.analyzers.insert("pseudo-class".to_string(), false);

        let registry = AnalyzerRegistry::with_defaults(&config);
        let ids: Vec<&str> = registry.describe().iter().map(|(id, _)| *id).collect();
        assert!(!ids.contains(&"pseudo-class"));
        assert!(ids.contains(&"repeated-selector"));
        assert!(ids.contains(&"delegation"));
        assert!(ids.contains(&"submit-control"));
    }

    #[test]
    fn test_registry_ids_cover_builtins() {
        let ids = registry_ids();
        for expected in [
            "pseudo-class",
            "nested-id",
            "id-descendant",
            "id-child",
            "repeated-selector",
            "delegation",
            "submit-control",
        ] {
            assert!(ids.contains(&expected), "missing {}", expected);
        }
    }
}
