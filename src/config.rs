//! Batch configuration.
//!
//! Handles loading and validating the `tablewiki.toml` file that describes how
//! rows become pages. Everything except the title template and the TOC name
//! is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! title_tmpl = "Entry_{0}_{1}"   # Page title; {0} is the padded row number
//! toc_name = "List_of_Entries"   # Title of the generated TOC page
//!
//! cat_col = 3                    # 1-based column holding each row's category
//! default_cat = "Other"          # Name for uncategorized rows (when categories exist)
//! last_cat = "Other"             # Category always listed last in the TOC
//! cat_sort = "size"              # "size" or "alpha"
//! keep_empty = "''(none)''"      # Body for sections whose columns are all empty
//! null_as_value = false          # Keep literal "null" cells
//! generator_url = "https://..."  # Link target in the page footer
//!
//! sec_map = """
//! . Applicant {1}
//! | {1}
//! . Contents
//! | __TOC__
//! """
//!
//! [csv]
//! delimiter = ","
//! quotechar = '"'
//! ```
//!
//! Unknown keys are rejected to catch typos early. `--cat-sort` and
//! `--null-as-value` on the command line override the file.

use crate::categories::CategorySort;
use crate::publish::DEFAULT_GENERATOR_URL;
use crate::section_map;
use crate::source::CsvDialect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Batch configuration loaded from `tablewiki.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Page title template, substituted against the raw row.
    pub title_tmpl: String,
    /// Title of the table-of-contents page.
    pub toc_name: String,
    /// 1-based column holding each row's category.
    pub cat_col: Option<usize>,
    /// Name given to uncategorized pages when other categories exist.
    pub default_cat: Option<String>,
    /// Category forced to the end of the TOC.
    pub last_cat: Option<String>,
    /// Placeholder body for sections whose columns are all empty.
    pub keep_empty: Option<String>,
    pub cat_sort: CategorySort,
    /// Keep cells that contain only `null` instead of blanking them.
    pub null_as_value: bool,
    /// Section map; without one every column becomes its own section.
    pub sec_map: Option<String>,
    /// Link target for the generator name in each page's footer.
    pub generator_url: String,
    pub csv: CsvConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            title_tmpl: String::new(),
            toc_name: String::new(),
            cat_col: None,
            default_cat: None,
            last_cat: None,
            keep_empty: None,
            cat_sort: CategorySort::default(),
            null_as_value: false,
            sec_map: None,
            generator_url: DEFAULT_GENERATOR_URL.to_string(),
            csv: CsvConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Validate required keys and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title_tmpl.trim().is_empty() {
            return Err(ConfigError::Validation("title_tmpl must not be empty".into()));
        }
        if self.toc_name.trim().is_empty() {
            return Err(ConfigError::Validation("toc_name must not be empty".into()));
        }
        if self.cat_col == Some(0) {
            return Err(ConfigError::Validation(
                "cat_col is 1-based and must be at least 1".into(),
            ));
        }
        if let Some(map) = &self.sec_map {
            let no_headers: [&str; 0] = [];
            section_map::compile(Some(map), &no_headers)
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        self.csv.dialect()?;
        Ok(())
    }

    /// Page settings handed to the assembler.
    pub fn assembly_settings(&self) -> crate::assemble::AssemblySettings {
        crate::assemble::AssemblySettings {
            title_tmpl: self.title_tmpl.clone(),
            cat_col: self.cat_col,
            keep_empty: self.keep_empty.clone(),
        }
    }
}

/// CSV dialect settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Field separator.
    pub delimiter: char,
    /// Quote character for fields containing the delimiter or newlines.
    pub quotechar: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quotechar: '"',
        }
    }
}

impl CsvConfig {
    /// Reader dialect. Both characters must be single-byte ASCII and distinct.
    pub fn dialect(&self) -> Result<CsvDialect, ConfigError> {
        let byte = |key: &str, c: char| {
            u8::try_from(c)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| ConfigError::Validation(format!("csv.{key} must be ASCII")))
        };
        let delimiter = byte("delimiter", self.delimiter)?;
        let quote = byte("quotechar", self.quotechar)?;
        if delimiter == quote {
            return Err(ConfigError::Validation(
                "csv.delimiter and csv.quotechar must differ".into(),
            ));
        }
        Ok(CsvDialect { delimiter, quote })
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<BatchConfig, ConfigError> {
    let config: BatchConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file. The file must exist.
pub fn load_config(path: &Path) -> Result<BatchConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `tablewiki.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tablewiki Configuration
# =======================
# Every CSV row becomes one wiki page. This file says how.
# Only title_tmpl and toc_name are required.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Pages
# ---------------------------------------------------------------------------

# Title of each row's page. {N} is replaced with column N of the row
# (1-based); {0} is the row number, zero-padded to the width of the row count.
# Use {{ and }} for literal braces.
title_tmpl = "Entry_{0}"

# Title of the generated table-of-contents page.
toc_name = "List_of_Entries"

# Body used for sections whose columns are all empty. Without it, such
# sections are left off the page.
# keep_empty = "''(no data)''"

# Keep cells whose entire content is "null" instead of treating them as empty.
null_as_value = false

# Link target for "tablewiki" in the footer of every generated page.
generator_url = "https://crates.io/crates/tablewiki"

# ---------------------------------------------------------------------------
# Categories
# ---------------------------------------------------------------------------

# 1-based column holding each row's category. The cell is replaced with
# category links, and one Category:NAME page is created per category.
# cat_col = 3

# Name for pages without a category, used once any category exists.
# default_cat = "Other"

# Category listed last in the TOC regardless of sort order.
# last_cat = "Other"

# TOC order: "size" (largest first, then alphabetical) or "alpha".
cat_sort = "size"

# ---------------------------------------------------------------------------
# Section map
# ---------------------------------------------------------------------------
# Outline shared by every page. Without a section map, each column gets its
# own top-level section titled by its header.
#
#   . Title        opens a section; the dot count is the level
#   | text {N}     adds a content line to the current section
#   # comment      ignored, as are blank lines
#
# Section titles substitute {N} against the header row, content lines
# against the row.
#
# sec_map = """
# . Applicant {1}
# | {1}
# . Contents
# | __TOC__
# . Proposal
# .. Executive Summary
# | {12}
# """

# ---------------------------------------------------------------------------
# CSV dialect
# ---------------------------------------------------------------------------
[csv]
delimiter = ","
quotechar = '"'
"##
}
