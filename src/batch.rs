//! Batch driver: every row, then the TOC, then the category pages.
//!
//! ```text
//! sec_map ──compile──► sections ─┐
//!                                ▼
//! RowSource ──► Row ──► PageAssembler ──► PublishLedger ──► Publisher
//!                          │
//!                          └──► CategoryTable ──finalize──► TOC page
//!                                                        └► Category:X pages
//! ```
//!
//! Rows are processed strictly in order and each publish completes before
//! the next row starts. Any error aborts the batch; pages published before
//! the error stay published.
//!
//! Progress is reported as [`BuildEvent`]s over an optional channel so the
//! caller decides how (and whether) to display it.

use crate::assemble::{AssembleError, PageAssembler};
use crate::categories::CategoryTable;
use crate::config::BatchConfig;
use crate::placeholder::substitute;
use crate::publish::{PublishError, PublishLedger, Publisher};
use crate::sanitize::Sanitizer;
use crate::section_map::{SectionMapError, compile};
use crate::source::{Row, RowSource, SourceError, pad_width};
use serde::Serialize;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    SectionMap(#[from] SectionMapError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    PageCreated { title: String },
    TocCreated { title: String },
    CategoryCreated { name: String },
}

/// Summary of a finished batch, written as `manifest.json` next to the pages.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Data rows in the source, pared or not.
    pub rows_total: usize,
    /// Row pages in publish order.
    pub pages: Vec<String>,
    pub toc: String,
    /// Finalized category table the TOC was rendered from.
    pub categories: CategoryTable,
    pub category_pages: Vec<String>,
}

/// Does `number` survive paring? Every row survives without a pare factor.
fn keep_row(number: usize, pare: Option<NonZeroUsize>) -> bool {
    pare.is_none_or(|n| number % n.get() == 0)
}

/// Convert every row of `source` into a page, then publish the TOC and the
/// category pages.
pub fn run_batch<R, S, P>(
    source: &R,
    config: &BatchConfig,
    sanitizer: S,
    ledger: &mut PublishLedger<P>,
    pare: Option<NonZeroUsize>,
    events: Option<Sender<BuildEvent>>,
) -> Result<BatchReport, BatchError>
where
    R: RowSource,
    S: Sanitizer,
    P: Publisher,
{
    let emit = |event: BuildEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    let headers = source.headers();
    let sections = compile(config.sec_map.as_deref(), headers)?;
    let settings = config.assembly_settings();
    let assembler = PageAssembler::new(&sections, headers, &settings, sanitizer);
    let width = pad_width(source.row_count());

    let mut categories = CategoryTable::new();
    let mut pages = Vec::new();

    for (i, fields) in source.rows()?.enumerate() {
        let fields = fields?;
        let number = i + 1;
        if !keep_row(number, pare) {
            continue;
        }
        let row = Row::new(number, width, fields);
        let title = assembler.assemble(&row, &mut categories, ledger)?;
        emit(BuildEvent::PageCreated {
            title: title.clone(),
        });
        pages.push(title);
    }

    categories.finalize(config.default_cat.as_deref());
    let index = categories.render_index(config.cat_sort, config.last_cat.as_deref());
    ledger.publish(&config.toc_name, &index)?;
    emit(BuildEvent::TocCreated {
        title: config.toc_name.clone(),
    });

    let mut category_pages = Vec::new();
    if config.cat_col.is_some() {
        for name in categories.container_names() {
            let identifier = format!("Category:{name}");
            ledger.publish(&identifier, "")?;
            emit(BuildEvent::CategoryCreated {
                name: name.to_string(),
            });
            category_pages.push(identifier);
        }
    }

    Ok(BatchReport {
        rows_total: source.row_count(),
        pages,
        toc: config.toc_name.clone(),
        categories,
        category_pages,
    })
}

// ============================================================================
// Check
// ============================================================================

/// One section of the compiled outline, title resolved against the headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: usize,
    pub title: String,
    /// Unsubstituted content templates.
    pub content_lines: Vec<String>,
}

/// Result of a dry validation run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub outline: Vec<OutlineEntry>,
    pub rows_total: usize,
    pub pages: usize,
    pub categories: CategoryTable,
}

/// Render every row without publishing, catching everything a real batch
/// would fail on: section-map syntax, placeholders, the category column, and
/// duplicate identifiers (the TOC and category pages included).
pub fn check<R, S>(
    source: &R,
    config: &BatchConfig,
    sanitizer: S,
    pare: Option<NonZeroUsize>,
) -> Result<CheckReport, BatchError>
where
    R: RowSource,
    S: Sanitizer,
{
    let headers = source.headers();
    let sections = compile(config.sec_map.as_deref(), headers)?;
    let settings = config.assembly_settings();
    let assembler = PageAssembler::new(&sections, headers, &settings, sanitizer);
    let width = pad_width(source.row_count());

    let mut seen = HashSet::new();
    let mut claim = |identifier: &str| {
        if seen.insert(identifier.to_string()) {
            Ok(())
        } else {
            Err(PublishError::DuplicatePage(identifier.to_string()))
        }
    };

    let mut categories = CategoryTable::new();
    let mut pages = 0;
    for (i, fields) in source.rows()?.enumerate() {
        let fields = fields?;
        let number = i + 1;
        if !keep_row(number, pare) {
            continue;
        }
        let page = assembler.render(&Row::new(number, width, fields))?;
        claim(&page.identifier)?;
        match &page.category {
            Some(category) => categories.record(category, &page.identifier),
            None => categories.record_uncategorized(&page.identifier),
        }
        pages += 1;
    }

    categories.finalize(config.default_cat.as_deref());
    claim(&config.toc_name)?;
    if config.cat_col.is_some() {
        for name in categories.container_names() {
            claim(&format!("Category:{name}"))?;
        }
    }

    let mut outline = Vec::with_capacity(sections.len());
    for section in &sections {
        // Row 0 is the header row.
        let title = substitute(&section.title, headers)
            .map_err(|source| AssembleError::Format { row: 0, source })?;
        outline.push(OutlineEntry {
            level: section.level,
            title,
            content_lines: section.content_lines.clone(),
        });
    }

    Ok(CheckReport {
        outline,
        rows_total: source.row_count(),
        pages,
        categories,
    })
}
