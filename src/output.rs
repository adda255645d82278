//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Build progress
//!
//! One line per published page, in publish order:
//!
//! ```text
//! CREATED PAGE: "Entry_01"
//! CREATED PAGE: "Entry_02"
//! CREATED TOC: "List_of_Entries"
//! CREATED CATEGORY: "Math"
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Published 2 pages from 2 rows, 1 category page
//! Categories
//!     Math (2)
//! ```
//!
//! ## Columns
//!
//! ```text
//! 01) Name
//! 02) Country
//! ...
//! 12) Summary
//! ```
//!
//! ## Check
//!
//! ```text
//! Outline
//! = Applicant Name =
//! = Contents =
//! = Proposal =
//!     == Executive Summary ==
//!
//! 3 rows → 3 pages
//! Categories
//!     Math (2)
//!     Other (1)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.

use crate::assemble::heading;
use crate::batch::{BatchReport, BuildEvent, CheckReport};
use crate::categories::{CategorySort, CategoryTable};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Category listing shared by the build and check summaries.
///
/// Categories appear largest first; the uncategorized bucket shows as
/// `(uncategorized)`.
fn category_lines(categories: &CategoryTable) -> Vec<String> {
    if categories.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Categories".to_string()];
    for (name, pages) in categories.sorted(CategorySort::Size, None) {
        let name = if name.is_empty() { "(uncategorized)" } else { name };
        lines.push(format!("{}{} ({})", indent(1), name, pages.len()));
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event.
pub fn format_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::PageCreated { title } => vec![format!("CREATED PAGE: \"{title}\"")],
        BuildEvent::TocCreated { title } => vec![format!("CREATED TOC: \"{title}\"")],
        BuildEvent::CategoryCreated { name } => vec![format!("CREATED CATEGORY: \"{name}\"")],
    }
}

/// Format the end-of-build summary.
pub fn format_report(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Published {} from {}, {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.rows_total, "row", "rows"),
        plural(report.category_pages.len(), "category page", "category pages"),
    )];
    lines.extend(category_lines(&report.categories));
    lines
}

/// Print the end-of-build summary to stdout.
pub fn print_report(report: &BatchReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Format numbered column headers.
///
/// `headers` is 1-indexed (slot 0 is skipped). Numbers are zero-padded to the
/// digit count of the column count.
pub fn format_columns(headers: &[String]) -> Vec<String> {
    let count = headers.len().saturating_sub(1);
    let width = count.to_string().len();
    headers
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, header)| format!("{i:0width$}) {header}"))
        .collect()
}

/// Print numbered column headers to stdout.
pub fn print_columns(headers: &[String]) {
    for line in format_columns(headers) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the outline and category preview of a check run.
///
/// Sections are indented one level per nesting step below level 1.
pub fn format_check(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Outline".to_string()];
    for entry in &report.outline {
        let depth = entry.level.saturating_sub(1);
        lines.push(format!(
            "{}{}",
            indent(depth),
            heading(entry.level, &entry.title).trim()
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} \u{2192} {}",
        plural(report.rows_total, "row", "rows"),
        plural(report.pages, "page", "pages")
    ));
    lines.extend(category_lines(&report.categories));
    lines
}

/// Print a check report to stdout.
pub fn print_check(report: &CheckReport) {
    for line in format_check(report) {
        println!("{}", line);
    }
}
