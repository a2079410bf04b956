use crate::reporter::Report;
use anyhow::Result;

pub fn report(report: &Report) -> Result<()> {
    println!("{}", format(report)?);
    Ok(())
}

/// Format a report as a JSON string without printing.
pub fn format(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateRow;
    use crate::analyzers::Warning;

    fn test_report() -> Report {
        Report {
            warnings: vec![Warning::selector(
                "#bar .baz",
                "don't follow an ID selector with other selectors",
            )],
            selectors: vec![AggregateRow {
                name: ".foo".to_string(),
                calls: 3,
                total_millis: 9,
                average_millis: 3,
            }],
            handlers: vec![],
        }
    }

    #[test]
    fn test_format_contains_fields() {
        let result = format(&test_report()).unwrap();
        assert!(result.contains(r#""kind": "selector""#));
        assert!(result.contains(r##""subject": "#bar .baz""##));
        assert!(result.contains(r#""name": ".foo""#));
        assert!(result.contains(r#""calls": 3"#));
        assert!(result.contains(r#""total_millis": 9"#));
        assert!(result.contains(r#""average_millis": 3"#));
    }

    #[test]
    fn test_format_is_valid_json() {
        let result = format(&test_report()).unwrap();

        // Should parse back as valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert!(parsed.is_object());
        assert_eq!(parsed["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["handlers"].as_array().unwrap().len(), 0);
    }
}
