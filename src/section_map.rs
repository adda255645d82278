//! Section-map compiler.
//!
//! A section map describes the outline shared by every generated page: which
//! sections exist, how deeply they nest, and which columns land in each one.
//!
//! ```text
//! .   Applicant {1}        ← level-1 section, title uses header of column 1
//! # a comment              ← discarded
//! | {1}                    ← content line: cell 1 of the current row
//! .   Contents
//! | __TOC__
//! .   Proposal
//! ..  Executive Summary    ← level-2 section
//! | {12}
//! ```
//!
//! Line kinds:
//!
//! - **Dots** open a new section. The dot count is the level, the rest of the
//!   line (leading whitespace trimmed) is the title template.
//! - **Pipe** appends a content line to the most recently opened section. One
//!   whitespace character (space or tab) directly after the pipe is dropped.
//!   A content line before any section opens an implicit level-0 section.
//! - **`#`** as the first non-whitespace character marks a comment.
//! - Blank lines are ignored. Anything else is an error.
//!
//! Column numbers always refer to the original CSV columns. The compiler never
//! renumbers; it only decides which placeholders appear where.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionMapError {
    #[error("invalid line {line} in sec_map: '{text}'")]
    InvalidLine { line: usize, text: String },
}

/// One compiled node of the section map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionDescriptor {
    /// Nesting depth: 1 for top-level sections, 0 for the implicit leading section.
    pub level: usize,
    /// Title template, substituted against the header row.
    pub title: String,
    /// Content templates, substituted against the sanitized row.
    pub content_lines: Vec<String>,
}

impl SectionDescriptor {
    pub fn new(level: usize, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            content_lines: Vec::new(),
        }
    }
}

/// Classified section-map line.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Open { level: usize, title: &'a str },
    Content(&'a str),
    Skip,
}

fn classify(line: &str) -> Option<Line<'_>> {
    if line.starts_with('.') {
        let title = line.trim_start_matches('.');
        let level = line.len() - title.len();
        return Some(Line::Open {
            level,
            title: title.trim_start(),
        });
    }
    if let Some(rest) = line.strip_prefix('|') {
        return Some(Line::Content(rest.strip_prefix(char::is_whitespace).unwrap_or(rest)));
    }
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Some(Line::Skip);
    }
    None
}

/// Compile section-map text into descriptors, in document order.
///
/// With no section map, every column gets its own level-1 section titled by
/// its header.
pub fn compile<S: AsRef<str>>(
    sec_map: Option<&str>,
    headers: &[S],
) -> Result<Vec<SectionDescriptor>, SectionMapError> {
    let Some(text) = sec_map else {
        return Ok(one_section_per_column(headers.len()));
    };

    text.lines()
        .enumerate()
        .try_fold(Vec::new(), |mut sections: Vec<SectionDescriptor>, (i, raw)| {
            match classify(raw) {
                Some(Line::Open { level, title }) => {
                    sections.push(SectionDescriptor::new(level, title));
                }
                Some(Line::Content(content)) => {
                    if sections.is_empty() {
                        sections.push(SectionDescriptor::new(0, ""));
                    }
                    if let Some(current) = sections.last_mut() {
                        current.content_lines.push(content.to_string());
                    }
                }
                Some(Line::Skip) => {}
                None => {
                    return Err(SectionMapError::InvalidLine {
                        line: i + 1,
                        text: raw.to_string(),
                    });
                }
            }
            Ok(sections)
        })
}

/// `header_count` includes the unused slot 0.
fn one_section_per_column(header_count: usize) -> Vec<SectionDescriptor> {
    (1..header_count)
        .map(|i| SectionDescriptor {
            level: 1,
            title: format!("{{{i}}}"),
            content_lines: vec![format!("{{{i}}}")],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_HEADERS: [&str; 0] = [];

    fn levels(sections: &[SectionDescriptor]) -> Vec<usize> {
        sections.iter().map(|s| s.level).collect()
    }

    #[test]
    fn nested_sections_with_content() {
        let sections = compile(Some(".A\n| {1}\n..B\n| {2}"), &NO_HEADERS).unwrap();
        assert_eq!(
            sections,
            vec![
                SectionDescriptor {
                    level: 1,
                    title: "A".into(),
                    content_lines: vec!["{1}".into()],
                },
                SectionDescriptor {
                    level: 2,
                    title: "B".into(),
                    content_lines: vec!["{2}".into()],
                },
            ]
        );
    }

    #[test]
    fn level_matches_dot_count() {
        let map = ".   One\n...  Three\n..Two\n.....Five\n.";
        let sections = compile(Some(map), &NO_HEADERS).unwrap();
        assert_eq!(levels(&sections), vec![1, 3, 2, 5, 1]);
    }

    #[test]
    fn title_leading_whitespace_trimmed() {
        let sections = compile(Some(".   Applicant {1}"), &NO_HEADERS).unwrap();
        assert_eq!(sections[0].title, "Applicant {1}");
    }

    #[test]
    fn dots_only_gives_empty_title() {
        let sections = compile(Some(".."), &NO_HEADERS).unwrap();
        assert_eq!(sections[0].level, 2);
        assert_eq!(sections[0].title, "");
        assert!(sections[0].content_lines.is_empty());
    }

    #[test]
    fn single_space_after_pipe_dropped() {
        let sections = compile(Some(".S\n| one\n|two\n|   three"), &NO_HEADERS).unwrap();
        assert_eq!(sections[0].content_lines, vec!["one", "two", "  three"]);
    }

    #[test]
    fn single_tab_after_pipe_dropped() {
        let sections = compile(Some(".S\n|\tone\n|\t\ttwo"), &NO_HEADERS).unwrap();
        assert_eq!(sections[0].content_lines, vec!["one", "\ttwo"]);
    }

    #[test]
    fn content_before_section_creates_implicit_level_zero() {
        let sections = compile(Some("| intro {1}\n. Body\n| {2}"), &NO_HEADERS).unwrap();
        assert_eq!(levels(&sections), vec![0, 1]);
        assert_eq!(sections[0].title, "");
        assert_eq!(sections[0].content_lines, vec!["intro {1}"]);
    }

    #[test]
    fn comments_and_blank_lines_discarded() {
        let map = "# heading comment\n. A\n   # indented comment\n\n   \n| {1}";
        let sections = compile(Some(map), &NO_HEADERS).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content_lines, vec!["{1}"]);
    }

    #[test]
    fn invalid_line_reports_text_and_line_number() {
        let err = compile(Some(". A\n| {1}\n12"), &NO_HEADERS).unwrap_err();
        assert_eq!(
            err,
            SectionMapError::InvalidLine {
                line: 3,
                text: "12".into()
            }
        );
        assert!(err.to_string().contains("'12'"));
    }

    #[test]
    fn indented_section_line_is_invalid() {
        assert!(compile(Some("  . A"), &NO_HEADERS).is_err());
    }

    #[test]
    fn missing_map_gives_one_section_per_column() {
        let headers = ["", "Name", "City"];
        let sections = compile(None, &headers).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].title, "{1}");
        assert_eq!(sections[0].content_lines, vec!["{1}"]);
        assert_eq!(sections[1].title, "{2}");
        assert_eq!(sections[1].content_lines, vec!["{2}"]);
    }

    #[test]
    fn missing_map_without_columns_is_empty() {
        let headers = [""];
        assert!(compile(None, &headers).unwrap().is_empty());
    }

    #[test]
    fn content_attaches_to_most_recent_section() {
        let map = ". A\n.. B\n| b1\n. C\n| c1\n| c2";
        let sections = compile(Some(map), &NO_HEADERS).unwrap();
        assert!(sections[0].content_lines.is_empty());
        assert_eq!(sections[1].content_lines, vec!["b1"]);
        assert_eq!(sections[2].content_lines, vec!["c1", "c2"]);
    }

    #[test]
    fn crlf_lines_are_handled() {
        let sections = compile(Some(". A\r\n| {1}\r\n"), &NO_HEADERS).unwrap();
        assert_eq!(sections[0].title, "A");
        assert_eq!(sections[0].content_lines, vec!["{1}"]);
    }
}
