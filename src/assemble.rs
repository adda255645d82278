//! Page assembly: one row in, one wiki page out.
//!
//! For each row the assembler:
//!
//! 1. sanitizes every cell once;
//! 2. rewrites the category cell into category links (when a category column
//!    is configured and the cell is not empty);
//! 3. builds the page identifier from the title template and the *raw* row;
//! 4. renders every section of the compiled section map;
//! 5. files the page under its category;
//! 6. publishes the page through the ledger, then files it in the
//!    uncategorized bucket if no category claimed it.
//!
//! Steps 1–4 are pure and exposed separately as [`PageAssembler::render`] so
//! the outline can be previewed without publishing anything.
//!
//! ## Section bodies
//!
//! | Content lines | Substituted text | Output |
//! |---------------|------------------|--------|
//! | none | n/a | heading + `"\n"` (structural section) |
//! | some | not all empty | heading + `"\n" + line + "\n"` per line |
//! | some | all empty | omitted, or heading + `"\n" + placeholder + "\n"` with keep-empty |

use crate::categories::CategoryTable;
use crate::placeholder::{FormatError, substitute};
use crate::publish::{PublishError, PublishLedger, Publisher};
use crate::sanitize::Sanitizer;
use crate::section_map::SectionDescriptor;
use crate::source::Row;
use crate::title::{category_name, page_title};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("row {row}: {source}")]
    Format {
        row: usize,
        #[source]
        source: FormatError,
    },
    #[error("row {row}: category column {column} is beyond the row's {width} columns")]
    CategoryColumnOutOfRange {
        row: usize,
        column: usize,
        width: usize,
    },
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Per-batch page settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblySettings {
    /// Page title template, substituted against the raw row.
    pub title_tmpl: String,
    /// 1-based category column.
    pub cat_col: Option<usize>,
    /// Placeholder body for sections whose columns are all empty.
    /// `None` omits such sections.
    pub keep_empty: Option<String>,
}

/// A rendered page that has not been published yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub identifier: String,
    pub body: String,
    /// Escaped category name, when the row had one.
    pub category: Option<String>,
}

/// Renders rows against a compiled section map.
pub struct PageAssembler<'a, S> {
    sections: &'a [SectionDescriptor],
    headers: &'a [String],
    settings: &'a AssemblySettings,
    sanitizer: S,
}

impl<'a, S: Sanitizer> PageAssembler<'a, S> {
    pub fn new(
        sections: &'a [SectionDescriptor],
        headers: &'a [String],
        settings: &'a AssemblySettings,
        sanitizer: S,
    ) -> Self {
        Self {
            sections,
            headers,
            settings,
            sanitizer,
        }
    }

    /// Sanitize, categorize, and render one row without side effects.
    pub fn render(&self, row: &Row) -> Result<RenderedPage, AssembleError> {
        let format_err = |source| AssembleError::Format {
            row: row.number,
            source,
        };

        let identifier =
            page_title(&substitute(&self.settings.title_tmpl, &row.cells).map_err(format_err)?);

        let mut cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| self.sanitizer.sanitize(cell))
            .collect();

        let category = match self.settings.cat_col {
            Some(column) => {
                let width = cells.len().saturating_sub(1);
                let cell = cells
                    .get_mut(column)
                    .ok_or(AssembleError::CategoryColumnOutOfRange {
                        row: row.number,
                        column,
                        width,
                    })?;
                categorize_cell(cell)
            }
            None => None,
        };

        let mut body = String::new();
        for section in self.sections {
            if let Some(text) = self.render_section(section, &cells).map_err(format_err)? {
                body.push_str(&text);
            }
        }

        Ok(RenderedPage {
            identifier,
            body,
            category,
        })
    }

    /// Render, publish, and record one row.
    ///
    /// Returns the page identifier.
    pub fn assemble<P: Publisher>(
        &self,
        row: &Row,
        categories: &mut CategoryTable,
        ledger: &mut PublishLedger<P>,
    ) -> Result<String, AssembleError> {
        let page = self.render(row)?;
        let before = categories.memberships();
        if let Some(category) = &page.category {
            categories.record(category, &page.identifier);
        }

        ledger.publish(&page.identifier, &page.body)?;

        if categories.memberships() == before {
            categories.record_uncategorized(&page.identifier);
        }
        Ok(page.identifier)
    }

    fn render_section(
        &self,
        section: &SectionDescriptor,
        cells: &[String],
    ) -> Result<Option<String>, FormatError> {
        let lines = section
            .content_lines
            .iter()
            .map(|line| substitute(line, cells))
            .collect::<Result<Vec<_>, _>>()?;

        let text = if lines.is_empty() {
            "\n".to_string()
        } else if lines.iter().all(String::is_empty) {
            match &self.settings.keep_empty {
                Some(placeholder) => format!("\n{placeholder}\n"),
                None => return Ok(None),
            }
        } else {
            lines.iter().map(|line| format!("\n{line}\n")).collect()
        };

        let title = substitute(&section.title, self.headers)?;
        Ok(Some(format!("{}{text}", heading(section.level, &title))))
    }
}

/// Wiki heading with `level` balanced `=` markers.
pub fn heading(level: usize, title: &str) -> String {
    let marks = "=".repeat(level);
    format!("{marks} {title} {marks}")
}

/// Replace a category cell with category links and return the category name.
///
/// Blank cells are left alone and yield no category.
fn categorize_cell(cell: &mut String) -> Option<String> {
    if cell.trim().is_empty() {
        return None;
    }
    let name = category_name(cell);
    *cell = format!("[[:Category:{name}|{name}]]\n[[Category:{name}]]");
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::DEFAULT_GENERATOR_URL;
    use crate::sanitize::WikiSanitizer;
    use crate::section_map::compile;
    use crate::test_helpers::{MockPublisher, row, strings};

    fn settings(title_tmpl: &str, cat_col: Option<usize>) -> AssemblySettings {
        AssemblySettings {
            title_tmpl: title_tmpl.into(),
            cat_col,
            keep_empty: None,
        }
    }

    fn render(
        map: &str,
        headers: &[&str],
        settings: &AssemblySettings,
        cells: &[&str],
    ) -> Result<RenderedPage, AssembleError> {
        let headers = strings(headers);
        let sections = compile(Some(map), &headers).unwrap();
        let assembler = PageAssembler::new(&sections, &headers, settings, WikiSanitizer::default());
        assembler.render(&row(1, cells))
    }

    // =========================================================================
    // Section rendering
    // =========================================================================

    #[test]
    fn nested_sections_render_with_balanced_headings() {
        let page = render(
            ".A\n| {1}\n..B\n| {2}",
            &["", "H1", "H2"],
            &settings("{0}", None),
            &["01", "x", "y"],
        )
        .unwrap();
        assert_eq!(page.body, "= A =\nx\n== B ==\ny\n");
    }

    #[test]
    fn section_titles_use_headers_not_row_values() {
        let s = settings("{0}", None);
        let a = render(". About {1}\n| {1}", &["", "Name"], &s, &["1", "Ada"]).unwrap();
        let b = render(". About {1}\n| {1}", &["", "Name"], &s, &["2", "Grace"]).unwrap();
        assert!(a.body.starts_with("= About Name =\n"));
        assert!(b.body.starts_with("= About Name =\n"));
    }

    #[test]
    fn multiple_content_lines_each_wrapped() {
        let page = render(
            ". S\n| {1}\n| {2}",
            &["", "A", "B"],
            &settings("{0}", None),
            &["1", "a", "b"],
        )
        .unwrap();
        assert_eq!(page.body, "= S =\na\n\nb\n");
    }

    #[test]
    fn structural_section_always_emitted() {
        let page = render(
            ". Contents\n. Body\n| {1}",
            &["", "A"],
            &settings("{0}", None),
            &["1", ""],
        )
        .unwrap();
        assert_eq!(page.body, "= Contents =\n");
    }

    #[test]
    fn empty_section_omitted_by_default() {
        let page = render(
            ". Filled\n| {1}\n. Empty\n| {2}",
            &["", "A", "B"],
            &settings("{0}", None),
            &["1", "a", ""],
        )
        .unwrap();
        assert_eq!(page.body, "= Filled =\na\n");
    }

    #[test]
    fn empty_section_kept_with_placeholder() {
        let mut s = settings("{0}", None);
        s.keep_empty = Some("''(none)''".into());
        let page = render(". Empty\n| {1}\n| {2}", &["", "A", "B"], &s, &["1", "", "null"]).unwrap();
        assert_eq!(page.body, "= Empty =\n''(none)''\n");
    }

    #[test]
    fn partially_filled_section_keeps_empty_lines() {
        let page = render(
            ". S\n| {1}\n| {2}",
            &["", "A", "B"],
            &settings("{0}", None),
            &["1", "", "b"],
        )
        .unwrap();
        assert_eq!(page.body, "= S =\n\n\nb\n");
    }

    #[test]
    fn implicit_level_zero_section() {
        let page = render("| intro {1}", &["", "A"], &settings("{0}", None), &["1", "x"]).unwrap();
        assert_eq!(page.body, "  \nintro x\n");
    }

    #[test]
    fn content_is_sanitized() {
        let page = render(
            ". Link\n| {1}",
            &["", "URL"],
            &settings("{0}", None),
            &["1", r#"<a href="http://a.b">site</a>"#],
        )
        .unwrap();
        assert_eq!(page.body, "= Link =\n[http://a.b site]\n");
    }

    #[test]
    fn no_section_map_renders_every_column() {
        let headers = strings(&["", "Name", "City"]);
        let sections = compile(None, &headers).unwrap();
        let s = settings("{1}", None);
        let assembler = PageAssembler::new(&sections, &headers, &s, WikiSanitizer::default());
        let page = assembler.render(&row(1, &["1", "Ada", "London"])).unwrap();
        assert_eq!(page.body, "= Name =\nAda\n= City =\nLondon\n");
    }

    // =========================================================================
    // Identifier
    // =========================================================================

    #[test]
    fn identifier_from_raw_row() {
        let page = render(
            ". S\n| {1}",
            &["", "Name"],
            &settings("Entry_{0}_{1}", None),
            &["007", "null"],
        )
        .unwrap();
        // The raw cell is used even though the sanitized one is empty.
        assert_eq!(page.identifier, "Entry_007_null");
    }

    #[test]
    fn identifier_is_escaped() {
        let page = render(
            ". S\n| {1}",
            &["", "Name"],
            &settings("Entry_72_{1}", None),
            &["72", "Foo_Bar_]Baz[."],
        )
        .unwrap();
        assert_eq!(page.identifier, "Entry_72_Foo_Bar_-Baz-.");
    }

    #[test]
    fn title_placeholder_out_of_range_is_error() {
        let result = render(". S\n| {1}", &["", "A"], &settings("{5}", None), &["1", "a"]);
        assert!(matches!(
            result,
            Err(AssembleError::Format {
                row: 1,
                source: FormatError::OutOfRange { index: 5, .. }
            })
        ));
    }

    #[test]
    fn content_placeholder_out_of_range_is_error() {
        let result = render(". S\n| {9}", &["", "A"], &settings("{0}", None), &["1", "a"]);
        assert!(matches!(result, Err(AssembleError::Format { .. })));
    }

    #[test]
    fn heading_markers() {
        assert_eq!(heading(1, "A"), "= A =");
        assert_eq!(heading(3, "Deep"), "=== Deep ===");
        assert_eq!(heading(0, ""), "  ");
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[test]
    fn category_cell_rewritten_to_links() {
        let page = render(
            ". Kind\n| {2}",
            &["", "Name", "Kind"],
            &settings("{1}", Some(2)),
            &["1", "a", "Büro [x]"],
        )
        .unwrap();
        assert_eq!(page.category.as_deref(), Some("Buro -x-"));
        assert_eq!(
            page.body,
            "= Kind =\n[[:Category:Buro -x-|Buro -x-]]\n[[Category:Buro -x-]]\n"
        );
    }

    #[test]
    fn category_recorded_even_when_not_displayed() {
        let page = render(
            ". Name\n| {1}",
            &["", "Name", "Kind"],
            &settings("{1}", Some(2)),
            &["1", "a", "Cat1"],
        )
        .unwrap();
        assert_eq!(page.category.as_deref(), Some("Cat1"));
        assert!(!page.body.contains("Category"));
    }

    #[test]
    fn blank_category_cell_has_no_category() {
        for blank in ["", "  ", "NULL"] {
            let page = render(
                ". Name\n| {1}",
                &["", "Name", "Kind"],
                &settings("{1}", Some(2)),
                &["1", "a", blank],
            )
            .unwrap();
            assert_eq!(page.category, None, "{blank:?}");
        }
    }

    #[test]
    fn category_column_beyond_row_is_error() {
        let result = render(
            ". Name\n| {1}",
            &["", "Name"],
            &settings("{1}", Some(4)),
            &["1", "a"],
        );
        assert!(matches!(
            result,
            Err(AssembleError::CategoryColumnOutOfRange {
                row: 1,
                column: 4,
                width: 1
            })
        ));
    }

    // =========================================================================
    // assemble()
    // =========================================================================

    #[test]
    fn assemble_publishes_and_records_categories() {
        let headers = strings(&["", "Name", "Kind"]);
        let sections = compile(Some(". Name\n| {1}"), &headers).unwrap();
        let s = settings("{1}", Some(2));
        let assembler = PageAssembler::new(&sections, &headers, &s, WikiSanitizer::default());

        let mut categories = CategoryTable::new();
        let mut ledger = PublishLedger::new(MockPublisher::new(), DEFAULT_GENERATOR_URL);
        for (n, cells) in [["1", "a", "Cat1"], ["2", "b", "Cat1"], ["3", "c", ""]]
            .iter()
            .enumerate()
        {
            assembler
                .assemble(&row(n + 1, cells), &mut categories, &mut ledger)
                .unwrap();
        }

        assert_eq!(categories.get("Cat1").unwrap(), ["a", "b"]);
        assert_eq!(categories.get("").unwrap(), ["c"]);
        assert_eq!(ledger.published(), ["a", "b", "c"]);
    }

    #[test]
    fn assemble_without_category_column_files_everything_uncategorized() {
        let headers = strings(&["", "Name"]);
        let sections = compile(None, &headers).unwrap();
        let s = settings("{1}", None);
        let assembler = PageAssembler::new(&sections, &headers, &s, WikiSanitizer::default());
        let mut categories = CategoryTable::new();
        let mut ledger = PublishLedger::new(MockPublisher::new(), DEFAULT_GENERATOR_URL);

        assembler
            .assemble(&row(1, &["1", "a"]), &mut categories, &mut ledger)
            .unwrap();
        assert_eq!(categories.get("").unwrap(), ["a"]);
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn assemble_duplicate_identifier_is_error() {
        let headers = strings(&["", "Name"]);
        let sections = compile(None, &headers).unwrap();
        let s = settings("{1}", None);
        let assembler = PageAssembler::new(&sections, &headers, &s, WikiSanitizer::default());
        let mut categories = CategoryTable::new();
        let mut ledger = PublishLedger::new(MockPublisher::new(), DEFAULT_GENERATOR_URL);

        assembler
            .assemble(&row(1, &["1", "same"]), &mut categories, &mut ledger)
            .unwrap();
        let result = assembler.assemble(&row(2, &["2", "same"]), &mut categories, &mut ledger);
        assert!(matches!(
            result,
            Err(AssembleError::Publish(PublishError::DuplicatePage(_)))
        ));
    }
}
