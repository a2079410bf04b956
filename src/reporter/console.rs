use crate::aggregate::AggregateRow;
use crate::analyzers::WarningKind;
use crate::reporter::Report;
use colored::Colorize;

pub fn report(report: &Report) {
    if report.warnings.is_empty() {
        println!("{}", "No anti-patterns found.".green());
    } else {
        for warning in &report.warnings {
            let kind = match warning.kind {
                WarningKind::Selector => "selector".yellow().bold(),
                WarningKind::Event => "event".yellow().bold(),
                WarningKind::Dom => "DOM".yellow().bold(),
            };
            println!(
                "{} {}{} {}",
                "warning:".yellow().bold(),
                kind,
                ":".bold(),
                warning.message
            );
            println!("  {} {}", "-->".blue(), warning.subject);
            println!();
        }
        println!(
            "{}",
            format!("Found {} warning(s)", report.warnings.len()).yellow()
        );
        println!();
    }

    print_table("Selectors", &report.selectors);
    print_table("Handlers", &report.handlers);
}

fn print_table(title: &str, rows: &[AggregateRow]) {
    if rows.is_empty() {
        return;
    }

    println!("{}", title.bold().underline());
    println!("{}", format_table(rows));
}

/// Render rows as a plain text table (no colors); column widths adapt to
/// content.
fn format_table(rows: &[AggregateRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("Selector/Event".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "  {:<name_width$}  {:>8}  {:>10}  {:>12}\n",
        "Selector/Event", "Calls", "Total (ms)", "Average (ms)"
    );
    for row in rows {
        out.push_str(&format!(
            "  {:<name_width$}  {:>8}  {:>10}  {:>12}\n",
            row.name, row.calls, row.total_millis, row.average_millis
        ));
    }
    out
}
