//! Category bookkeeping and the table-of-contents page.
//!
//! While rows are assembled, every page lands in exactly one bucket of the
//! [`CategoryTable`]: the category named by its category cell, or the reserved
//! uncategorized bucket (the empty name). Once all rows are in:
//!
//! 1. [`CategoryTable::finalize`] folds the uncategorized bucket into a real
//!    category when other categories exist. A lone uncategorized bucket stays
//!    as is and simply renders without a heading.
//! 2. [`CategoryTable::sorted`] orders categories for display.
//! 3. [`CategoryTable::render_index`] produces the TOC page text.
//!
//! ## Ordering
//!
//! | Mode | Primary key | Tie-break |
//! |------|-------------|-----------|
//! | `size` | member count, descending | name, case-insensitive, then exact |
//! | `alpha` | name, case-insensitive | exact name |
//!
//! In both modes the configured *last category* (matched case-insensitively,
//! surrounding whitespace ignored) is always placed at the end.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Bucket for pages that fell into no category.
pub const UNCATEGORIZED: &str = "";

/// Name given to the uncategorized bucket when no default category is configured.
pub const FALLBACK_CATEGORY: &str = "tablewiki Miscellaneous Default Category";

/// How categories are ordered on the TOC page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CategorySort {
    /// Largest categories first, alphabetical within the same size.
    #[default]
    Size,
    /// Strictly alphabetical.
    Alpha,
}

/// Category name → page titles, in the order the pages were created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTable {
    entries: BTreeMap<String, Vec<String>>,
    /// Set by `finalize` when it saw more than one bucket, so the TOC keeps
    /// its headings after a merge leaves a single category.
    #[serde(skip)]
    headed: bool,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `page` to `category`, creating the category on first use.
    pub fn record(&mut self, category: &str, page: &str) {
        self.entries
            .entry(category.to_string())
            .or_default()
            .push(page.to_string());
    }

    pub fn record_uncategorized(&mut self, page: &str) {
        self.record(UNCATEGORIZED, page);
    }

    /// Total number of memberships across all buckets.
    pub fn memberships(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of buckets, the uncategorized one included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.entries.get(category).map(Vec::as_slice)
    }

    /// Names of categories that should get a category page.
    ///
    /// The uncategorized bucket never does: an empty category title is not a
    /// valid page.
    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| *name != UNCATEGORIZED)
    }

    /// Fold the uncategorized bucket into `default_category` (or
    /// [`FALLBACK_CATEGORY`]) when there is more than one bucket.
    ///
    /// If the target category already exists, the uncategorized pages are
    /// appended to it.
    pub fn finalize(&mut self, default_category: Option<&str>) {
        if self.entries.len() <= 1 {
            return;
        }
        self.headed = true;
        let Some(orphans) = self.entries.remove(UNCATEGORIZED) else {
            return;
        };
        let target = default_category
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_CATEGORY);
        self.entries
            .entry(target.to_string())
            .or_default()
            .extend(orphans);
    }

    /// Categories in display order.
    pub fn sorted(&self, sort: CategorySort, last_category: Option<&str>) -> Vec<(&str, &[String])> {
        let last = last_category.map(fold_name);
        let is_last = |name: &str| last.as_deref() == Some(fold_name(name).as_str());

        let mut categories: Vec<(&str, &[String])> = self
            .entries
            .iter()
            .map(|(name, pages)| (name.as_str(), pages.as_slice()))
            .collect();

        categories.sort_by(|(a, a_pages), (b, b_pages)| {
            is_last(a)
                .cmp(&is_last(b))
                .then_with(|| match sort {
                    CategorySort::Size => b_pages.len().cmp(&a_pages.len()),
                    CategorySort::Alpha => Ordering::Equal,
                })
                .then_with(|| fold_name(a).cmp(&fold_name(b)))
                .then_with(|| a.cmp(b))
        });
        categories
    }

    /// Render the TOC page body.
    ///
    /// With more than one bucket (counted before [`finalize`](Self::finalize)
    /// merged any), each category gets a `==== Name (count) ====` heading. Pages are listed as wiki links, alphabetically within their
    /// category.
    pub fn render_index(&self, sort: CategorySort, last_category: Option<&str>) -> String {
        let headed = self.headed || self.entries.len() > 1;
        let mut text = String::new();

        for (name, pages) in self.sorted(sort, last_category) {
            if headed {
                text.push_str(&format!("==== {} ({}) ====\n\n", name, pages.len()));
            }
            let mut pages: Vec<&String> = pages.iter().collect();
            pages.sort();
            for page in pages {
                text.push_str(&format!("* [[{}]]\n", page));
            }
            text.push('\n');
        }
        text
    }
}

fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}
