//! Shared test utilities for the tablewiki test suite.
//!
//! Provides row and header builders, CSV fixtures on disk, and a recording
//! [`MockPublisher`] so batch tests can assert on exactly what was published
//! without touching the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_fixture("Name,Kind\nAda,Math\n");
//! let mut ledger = PublishLedger::new(MockPublisher::new(), DEFAULT_GENERATOR_URL);
//! // ... run the batch ...
//! assert_eq!(ledger.sink().identifiers(), vec!["Ada", "TOC"]);
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

use crate::publish::{PublishError, Publisher};
use crate::source::Row;

// =========================================================================
// Builders
// =========================================================================

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A row whose cells (slot 0 included) are given verbatim.
pub fn row(number: usize, cells: &[&str]) -> Row {
    Row {
        number,
        cells: strings(cells),
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Path of the CSV written by [`write_fixture`] inside its temp directory.
pub fn fixture_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("input.csv")
}

/// Write `content` as `input.csv` in a fresh temp directory.
pub fn write_fixture(content: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(fixture_path(&tmp), content).unwrap();
    tmp
}

/// Small applicant sheet with three categorized rows and one uncategorized.
pub const APPLICANTS_CSV: &str = "\
Name,Country,Kind,Summary
Ada Lovelace,UK,Math,\"<p>Engines <a href=\"\"http://a.example/ae\"\">analytical</a></p>\"
Grace Hopper,US,Computing,Compilers
Emmy Noether,DE,Math,null
Alan Turing,UK,,Machines
";

// =========================================================================
// Mock publisher
// =========================================================================

/// One recorded publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPage {
    pub identifier: String,
    pub body: String,
    pub summary: String,
}

/// Publisher that records every call in order.
///
/// `fail_on` makes the publish of one identifier return a sink error, for
/// exercising abort paths.
#[derive(Debug, Default)]
pub struct MockPublisher {
    pages: Vec<PublishedPage>,
    fail_on: Option<String>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(identifier: &str) -> Self {
        Self {
            pages: Vec::new(),
            fail_on: Some(identifier.to_string()),
        }
    }

    pub fn pages(&self) -> &[PublishedPage] {
        &self.pages
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.identifier.as_str()).collect()
    }

    /// Body of the page published under `identifier`.
    pub fn body(&self, identifier: &str) -> &str {
        self.pages
            .iter()
            .find(|p| p.identifier == identifier)
            .map(|p| p.body.as_str())
            .unwrap_or_else(|| panic!("page not published: {identifier}"))
    }
}

impl Publisher for MockPublisher {
    fn publish(&mut self, identifier: &str, body: &str, summary: &str) -> Result<(), PublishError> {
        if self.fail_on.as_deref() == Some(identifier) {
            return Err(PublishError::Sink(format!("refused {identifier}")));
        }
        self.pages.push(PublishedPage {
            identifier: identifier.to_string(),
            body: body.to_string(),
            summary: summary.to_string(),
        });
        Ok(())
    }
}

/// Strip the attribution footer from a published body.
pub fn without_colophon(body: &str) -> &str {
    body.split("\n\n<span style=\"font-size:75%\" >")
        .next()
        .unwrap_or(body)
}
