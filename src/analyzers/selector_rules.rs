//! Built-in selector analyzers.
//!
//! The pattern rules are configuration data more than logic: a regex over the
//! selector text plus an advice template, with `$n` capture substitution so
//! the advice can quote the offending fragments back at the developer.

use super::SelectorAnalyzer;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PSEUDO_CLASS: Regex = Regex::new(r"(:\w+)").unwrap();
    static ref NESTED_ID: Regex = Regex::new(r"^.+(#\w+)").unwrap();
    static ref ID_DESCENDANT: Regex = Regex::new(r"^(#\w+) ([^>].+)").unwrap();
    static ref ID_CHILD: Regex = Regex::new(r"^(#\w+) > (.+)").unwrap();
}

/// Regex-based anti-pattern rule over selector text.
pub struct SelectorPatternRule {
    id: &'static str,
    description: &'static str,
    pattern: &'static Regex,
    advice: &'static str,
}

impl SelectorAnalyzer for SelectorPatternRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn inspect(&mut self, selector: &str, _matched: usize, _duration_ms: u64) -> Option<String> {
        let caps = self.pattern.captures(selector)?;
        let mut advice = String::new();
        caps.expand(self.advice, &mut advice);
        Some(advice)
    }
}

/// Flags the same selector issued twice in a row with the same result
/// cardinality - the result should have been stored in a variable.
#[derive(Default)]
pub struct RepeatedSelectorRule {
    previous: Option<(String, usize)>,
}

impl SelectorAnalyzer for RepeatedSelectorRule {
    fn id(&self) -> &'static str {
        "repeated-selector"
    }

    fn description(&self) -> &'static str {
        "Flags identical consecutive lookups; store the result in a variable"
    }

    fn inspect(&mut self, selector: &str, matched: usize, _duration_ms: u64) -> Option<String> {
        let repeated = matches!(
            &self.previous,
            Some((prev, count)) if prev == selector && *count == matched
        );
        self.previous = Some((selector.to_string(), matched));

        repeated.then(|| {
            format!(
                "`{}` used multiple times in a row; store the result in a variable",
                selector
            )
        })
    }
}

/// The default selector analyzer set, in dispatch order.
pub fn defaults() -> Vec<Box<dyn SelectorAnalyzer>> {
    vec![
        Box::new(SelectorPatternRule {
            id: "pseudo-class",
            description: "Flags pseudo-class selectors, which are slow",
            pattern: &PSEUDO_CLASS,
            advice: "pseudo-selectors like `$1` are slow",
        }),
        Box::new(SelectorPatternRule {
            id: "nested-id",
            description: "Flags an ID selector nested after another selector fragment",
            pattern: &NESTED_ID,
            advice: "don't nest an ID selector in another selector; query `$1` directly",
        }),
        Box::new(SelectorPatternRule {
            id: "id-descendant",
            description: "Flags an ID selector followed by a descendant selector",
            pattern: &ID_DESCENDANT,
            advice: "don't follow an ID selector with other selectors; query `$1` and find `$2` from it",
        }),
        Box::new(SelectorPatternRule {
            id: "id-child",
            description: "Flags an ID selector followed by a child combinator",
            pattern: &ID_CHILD,
            advice: "don't follow an ID selector with other selectors; query `$1` and take its children `$2`",
        }),
        Box::new(RepeatedSelectorRule::default()),
    ]
}
