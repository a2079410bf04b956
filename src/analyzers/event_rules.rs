//! Built-in event-binding analyzers.

use super::EventAnalyzer;
use crate::config::Config;

/// Flags a single bind call whose match set exceeds the configured threshold;
/// one delegated handler on an ancestor usually beats many direct bindings.
pub struct DelegationRule {
    threshold: usize,
}

impl DelegationRule {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl EventAnalyzer for DelegationRule {
    fn id(&self) -> &'static str {
        "delegation"
    }

    fn description(&self) -> &'static str {
        "Suggests event delegation when one bind covers many elements"
    }

    fn inspect(
        &mut self,
        event_type: &str,
        matched: usize,
        _duration_ms: u64,
        selector: &str,
    ) -> Option<String> {
        (matched > self.threshold).then(|| {
            format!(
                "a `{}` handler was bound to `{}` which matched {} elements; \
                 handlers bound to many similar elements can often be replaced \
                 with event delegation",
                event_type, selector, matched
            )
        })
    }
}

/// The default event analyzer set, in dispatch order.
pub fn defaults(config: &Config) -> Vec<Box<dyn EventAnalyzer>> {
    vec![Box::new(DelegationRule::new(
        config.thresholds.delegation_matches,
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegation_threshold_is_strict() {
        let mut rule = DelegationRule::new(2);
        // Exactly at the threshold: no finding.
        assert!(rule.inspect("click", 2, 0, ".item").is_none());
        // Strictly above: finding.
        let finding = rule.inspect("click", 3, 0, ".item").unwrap();
        assert!(finding.contains("`click`"));
        assert!(finding.contains("`.item`"));
        assert!(finding.contains('3'));
    }

    #[test]
    fn test_delegation_threshold_configurable() {
        let mut config = Config::default();
        config.thresholds.delegation_matches = 10;

        let mut rules = defaults(&config);
        assert!(rules[0].inspect("click", 10, 0, ".item").is_none());
        assert!(rules[0].inspect("click", 11, 0, ".item").is_some());
    }
}
