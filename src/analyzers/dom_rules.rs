//! Built-in one-shot document analyzers.

use super::DomAnalyzer;
use crate::host::HostOps;

/// Flags form controls named or id'd `submit`; they shadow the form's own
/// `submit` method and break programmatic submission.
pub struct SubmitControlRule;

impl DomAnalyzer for SubmitControlRule {
    fn id(&self) -> &'static str {
        "submit-control"
    }

    fn description(&self) -> &'static str {
        "Flags form controls named or id'd \"submit\""
    }

    fn inspect(&mut self, ops: &HostOps) -> Option<String> {
        let bad = ops.find("form :input[name=submit], form :input[id=submit]", None);
        (!bad.is_empty()).then(|| {
            format!(
                "{} form control(s) named or id'd \"submit\"; this interferes \
                 with the form's submit event",
                bad.len()
            )
        })
    }
}

/// The default DOM analyzer set, in dispatch order.
pub fn defaults() -> Vec<Box<dyn DomAnalyzer>> {
    vec![Box::new(SubmitControlRule)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostHooks, Matches};
    use std::rc::Rc;

    fn host_matching(count: usize) -> HostOps {
        HostHooks {
            find: Some(Rc::new(move |selector, _| {
                Matches::new(selector, (0..count as u64).collect())
            })),
            bind: Some(Rc::new(|target: &Matches, _, _| target.clone())),
            unbind: Some(Rc::new(|target: &Matches, _, _| target.clone())),
        }
        .into_ops()
        .unwrap()
    }

    #[test]
    fn test_clean_document_passes() {
        let mut rule = SubmitControlRule;
        assert!(rule.inspect(&host_matching(0)).is_none());
    }

    #[test]
    fn test_submit_named_control_flagged() {
        let mut rule = SubmitControlRule;
        let finding = rule.inspect(&host_matching(1)).unwrap();
        assert!(finding.contains("submit"));
    }
}
