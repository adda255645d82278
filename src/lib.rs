//! # tablewiki
//!
//! Turns every row of a CSV file into a structured wiki page. A small section
//! map describes the outline shared by all pages; each row fills it in. Along
//! the way pages are filed into categories, and a table-of-contents page plus
//! one page per category are generated at the end.
//!
//! # Pipeline
//!
//! ```text
//! 1. Compile   sec_map  →  sections           (once per batch)
//! 2. Assemble  row      →  page               (once per row, in order)
//! 3. Index     categories → TOC + Category:X  (once, after the last row)
//! ```
//!
//! Everything in a batch shares two pieces of state owned by the driver: the
//! [`categories::CategoryTable`] and the [`publish::PublishLedger`]. Both are
//! passed by `&mut` into per-row assembly. Processing is single-threaded and
//! any error ends the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`section_map`] | Compiles the section-map text into section descriptors |
//! | [`placeholder`] | `{N}` substitution against a row or the header row |
//! | [`sanitize`] | HTML-to-wiki cell cleanup behind the `Sanitizer` trait |
//! | [`title`] | Page title and category name escaping |
//! | [`assemble`] | Renders one row into a page and files it |
//! | [`categories`] | Category bookkeeping, sorting, and the TOC page |
//! | [`source`] | `RowSource` trait and the CSV implementation |
//! | [`publish`] | `Publisher` trait, the duplicate-checking ledger, directory and dry-run sinks |
//! | [`batch`] | Drives a whole batch; also the publish-free `check` |
//! | [`config`] | `tablewiki.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Column Numbers Never Move
//!
//! `{N}` always means column N of the CSV as a spreadsheet user counts it,
//! starting at 1. Rows and headers carry an extra slot 0 (the zero-padded row
//! number, and an empty string respectively) so no index arithmetic is ever
//! needed. The section map only decides *which* placeholders appear *where*.
//!
//! ## Titles Are Addresses
//!
//! A page title is its permanent wiki address. Titles are transliterated to
//! ASCII, stripped of characters MediaWiki forbids, and cut to 255 bytes
//! before use. Two rows that end up with the same title are an error rather
//! than a silent overwrite.
//!
//! ## Publishing Is a Seam
//!
//! The core never writes files. Pages go through the [`publish::Publisher`]
//! trait, so the same batch can land in a directory of `.wiki` files, be
//! printed for review, or be recorded in tests.

pub mod assemble;
pub mod batch;
pub mod categories;
pub mod config;
pub mod output;
pub mod placeholder;
pub mod publish;
pub mod sanitize;
pub mod section_map;
pub mod source;
pub mod title;

#[cfg(test)]
pub(crate) mod test_helpers;
