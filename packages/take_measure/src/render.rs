//! Tabular rendering of latency summaries for humans.

use crate::LatencySummary;
use crate::latency_summary::format_ms;

const HEADER: [&str; 8] = ["name", "n", "fail", "mean", "p90", "p99", "min", "max"];
const COLUMN_SEPARATOR: &str = "  ";
const NO_RESULTS: &str = "(no results)";

/// A latency summary labeled with the name of what was measured.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedSummary {
    name: String,
    summary: LatencySummary,
}

impl NamedSummary {
    /// Labels `summary` with `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, summary: LatencySummary) -> Self {
        Self {
            name: name.into(),
            summary,
        }
    }

    /// Label for the row, e.g. the name of the operation or configuration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The summary rendered in the row.
    #[must_use]
    pub fn summary(&self) -> &LatencySummary {
        &self.summary
    }

    fn cells(&self) -> [String; 8] {
        let s = &self.summary;

        [
            self.name.clone(),
            s.count().to_string(),
            s.failures().to_string(),
            format_ms(s.mean()),
            format_ms(s.p90()),
            format_ms(s.p99()),
            format_ms(s.min()),
            format_ms(s.max()),
        ]
    }
}

/// Renders the summaries as a plain-text table with space-padded columns.
///
/// Values are in milliseconds with two decimals. Absent values are shown as `-`. An empty
/// input renders as `(no results)`.
///
/// # Examples
///
/// ```
/// use take_measure::{DurationAggregator, NamedSummary, summary_table};
///
/// let aggregator = DurationAggregator::new();
/// aggregator.add(1.5);
///
/// let table = summary_table(&[NamedSummary::new("lookup", aggregator.summary())]);
/// assert!(table.starts_with("name"));
/// ```
#[must_use]
pub fn summary_table(rows: &[NamedSummary]) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let body: Vec<[String; 8]> = rows.iter().map(NamedSummary::cells).collect();

    let mut widths = HEADER.map(str::len);
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();

    push_padded_line(&mut out, &HEADER, &widths);
    push_padded_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);

    for row in &body {
        push_padded_line(&mut out, row, &widths);
    }

    out
}

/// Renders the summaries as a markdown table.
///
/// An empty input renders as `(no results)`.
#[must_use]
pub fn summary_table_markdown(rows: &[NamedSummary]) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();

    push_markdown_line(&mut out, &HEADER);
    push_markdown_line(&mut out, &HEADER.map(|_| "---"));

    for row in rows {
        push_markdown_line(&mut out, &row.cells());
    }

    out
}

fn push_padded_line(out: &mut String, cells: &[impl AsRef<str>], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR);

    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_markdown_line(out: &mut String, cells: &[impl AsRef<str>]) {
    out.push('|');

    for cell in cells {
        out.push(' ');
        out.push_str(cell.as_ref());
        out.push_str(" |");
    }

    out.push('\n');
}
