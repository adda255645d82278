//! Publishing: where generated pages go.
//!
//! [`Publisher`] is the create-or-update seam. The batch never talks to a
//! publisher directly; every page goes through a [`PublishLedger`], which
//!
//! - rejects a second page with an identifier already used in this batch,
//! - appends the attribution footer to the body,
//! - attaches the standard edit summary.
//!
//! Two publishers ship with the crate:
//!
//! | Publisher | Output |
//! |-----------|--------|
//! | [`DirectoryPublisher`] | one `<identifier>.wiki` file per page |
//! | [`DryRunPublisher`] | framed pages on any `Write`, for review |

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Generator name used in the footer and edit summary.
pub const GENERATOR_NAME: &str = "tablewiki";

/// Link target for the footer when none is configured.
pub const DEFAULT_GENERATOR_URL: &str = "https://crates.io/crates/tablewiki";

/// Width of the `#` separator between pages in dry-run output.
const DRY_RUN_RULE_WIDTH: usize = 78;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tried to publish page '{0}' a second time")]
    DuplicatePage(String),
    #[error("unable to write page: {0}")]
    Sink(String),
}

/// Create-or-update sink for finished pages.
pub trait Publisher {
    /// Store `body` under `identifier`, replacing any earlier version.
    fn publish(&mut self, identifier: &str, body: &str, summary: &str) -> Result<(), PublishError>;
}

/// Footer appended to every generated page.
pub fn colophon(generator_url: &str) -> String {
    format!(
        "\n\n<span style=\"font-size:75%\" >'''Colophon:''' This page was generated by \
         [{generator_url} {GENERATOR_NAME}]. Manual changes to this page might be \
         overwritten by a subsequent run of {GENERATOR_NAME}.</span>\n"
    )
}

/// Edit summary recorded with every publish.
pub fn edit_summary(generator_url: &str) -> String {
    format!("Page generated by {GENERATOR_NAME} ({generator_url}).")
}

/// Batch-wide wrapper around a [`Publisher`].
///
/// Tracks identifiers in publish order so duplicates fail fast.
#[derive(Debug)]
pub struct PublishLedger<P> {
    sink: P,
    seen: HashSet<String>,
    published: Vec<String>,
    colophon: String,
    summary: String,
}

impl<P: Publisher> PublishLedger<P> {
    pub fn new(sink: P, generator_url: &str) -> Self {
        Self {
            sink,
            seen: HashSet::new(),
            published: Vec::new(),
            colophon: colophon(generator_url),
            summary: edit_summary(generator_url),
        }
    }

    /// Publish one page with the footer appended.
    pub fn publish(&mut self, identifier: &str, body: &str) -> Result<(), PublishError> {
        if !self.seen.insert(identifier.to_string()) {
            return Err(PublishError::DuplicatePage(identifier.to_string()));
        }
        let text = format!("{body}{}", self.colophon);
        self.sink.publish(identifier, &text, &self.summary)?;
        self.published.push(identifier.to_string());
        Ok(())
    }

    /// Identifiers in publish order.
    pub fn published(&self) -> &[String] {
        &self.published
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn into_inner(self) -> P {
        self.sink
    }
}

// ============================================================================
// Directory sink
// ============================================================================

/// Writes each page to `<dir>/<identifier>.wiki`.
///
/// Identifiers may contain `/` (subpages), which is encoded as `%2F` so every
/// page stays a single flat file. A literal `%` is encoded as `%25` first,
/// keeping the mapping reversible.
#[derive(Debug)]
pub struct DirectoryPublisher {
    root: PathBuf,
}

impl DirectoryPublisher {
    /// Create the output directory if needed.
    pub fn new(root: &Path) -> Result<Self, PublishError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path a page with `identifier` is written to.
    pub fn page_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{}.wiki", file_stem(identifier)))
    }
}

fn file_stem(identifier: &str) -> String {
    identifier.replace('%', "%25").replace('/', "%2F")
}

impl Publisher for DirectoryPublisher {
    fn publish(&mut self, identifier: &str, body: &str, _summary: &str) -> Result<(), PublishError> {
        if identifier.trim().is_empty() {
            return Err(PublishError::Sink("page identifier is empty".into()));
        }
        fs::write(self.page_path(identifier), body)?;
        Ok(())
    }
}

// ============================================================================
// Dry-run sink
// ============================================================================

/// Writes framed pages to a stream instead of storing them.
///
/// ```text
/// ~~~~~~~~~
/// Entry_001
/// ~~~~~~~~~
///
/// = Name =
/// ...
///
/// ##############################################################################
/// ```
#[derive(Debug)]
pub struct DryRunPublisher<W: Write> {
    out: W,
}

impl<W: Write> DryRunPublisher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Publisher for DryRunPublisher<W> {
    fn publish(&mut self, identifier: &str, body: &str, _summary: &str) -> Result<(), PublishError> {
        let rule = "~".repeat(identifier.chars().count());
        write!(
            self.out,
            "{rule}\n{identifier}\n{rule}\n\n{body}\n{}\n\n",
            "#".repeat(DRY_RUN_RULE_WIDTH)
        )?;
        Ok(())
    }
}
