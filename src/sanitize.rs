//! Cell sanitization: HTML snippets → wiki text.
//!
//! CSV exports from form tools usually carry HTML fragments in their cells.
//! Before any section logic sees a row, every cell passes through a
//! [`Sanitizer`] once. The stock [`WikiSanitizer`]:
//!
//! - drops `<tbody>` / `</tbody>`, which MediaWiki does not render;
//! - rewrites `<a href="D">T</a>` into the external-link form `[D T]`, with
//!   any markup inside `T` stripped and entities decoded;
//! - treats a cell whose whole content is `null` (any case) as empty, unless
//!   null-as-value is enabled.
//!
//! Sanitizing already-sanitized text is a no-op.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Pure function from a raw cell to wiki-ready text.
pub trait Sanitizer {
    fn sanitize(&self, cell: &str) -> String;
}

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>.*?</a\s*>").expect("anchor pattern must compile"));

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector must parse"));

static TBODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?tbody\s*>").expect("tbody pattern must compile"));

/// Stock sanitizer targeting MediaWiki markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiSanitizer {
    /// Keep a literal `null` cell instead of treating it as empty.
    pub null_as_value: bool,
}

impl WikiSanitizer {
    pub fn new(null_as_value: bool) -> Self {
        Self { null_as_value }
    }
}

impl Sanitizer for WikiSanitizer {
    fn sanitize(&self, cell: &str) -> String {
        if cell.is_empty() {
            return String::new();
        }
        let cell = wikify_anchors(&TBODY.replace_all(cell, ""));
        if cell.eq_ignore_ascii_case("null") && !self.null_as_value {
            return String::new();
        }
        cell
    }
}

/// Rewrite every href-bearing anchor as `[href text]`.
///
/// Each anchor is parsed as an HTML fragment, so only a real `href`
/// attribute counts and the link text comes out with markup stripped and
/// entities decoded. Anchors without an `href` (named targets) are left
/// untouched.
pub fn wikify_anchors(html: &str) -> String {
    ANCHOR
        .replace_all(html, |caps: &regex::Captures| {
            let anchor = &caps[0];
            let fragment = Html::parse_fragment(anchor);
            match fragment.select(&LINK).next() {
                Some(link) => {
                    let href = link.value().attr("href").unwrap_or_default();
                    let text: String = link.text().collect();
                    format!("[{} {}]", href, text.trim())
                }
                None => anchor.to_string(),
            }
        })
        .into_owned()
}
