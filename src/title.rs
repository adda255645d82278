//! Page identifier escaping.
//!
//! Page titles double as permanent wiki addresses, so they are normalized
//! before use:
//!
//! 1. **Transliteration** to plain ASCII (`Zoë Müller` → `Zoe Muller`).
//! 2. **Forbidden characters** `# < > [ ] { | }` become `-`.
//! 3. **Length**: MediaWiki caps titles at 255 *bytes*, not characters.
//!    Trailing characters are dropped until the title fits.
//! 4. **Entity fixup**: MediaWiki decodes `&amp;` to `&` and then reads that
//!    `&` as the start of another entity when a `;` follows somewhere later,
//!    rejecting the title. Wrapping each `&amp;` in underscores breaks that
//!    second parse.
//!
//! Category names go through steps 1–3 only.

use regex::Regex;
use std::sync::LazyLock;

/// Longest page title MediaWiki accepts, in bytes.
pub const MAX_TITLE_BYTES: usize = 255;

const FORBIDDEN: [char; 8] = ['#', '<', '>', '[', ']', '{', '|', '}'];

static AMP_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&amp;.*;").expect("entity pattern must compile"));

/// Convert non-ASCII text to its nearest plain-ASCII equivalent.
pub fn transliterate(s: &str) -> String {
    deunicode::deunicode(s)
}

/// Replace forbidden characters with `-` and truncate to [`MAX_TITLE_BYTES`].
pub fn escape_page_title(s: &str) -> String {
    let mut escaped: String = s
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '-' } else { c })
        .collect();
    while escaped.len() > MAX_TITLE_BYTES {
        escaped.pop();
    }
    escaped
}

/// Wrap `&amp;` in underscores when an entity-like `;` follows it.
pub fn defuse_ampersand_entities(title: &str) -> String {
    if !AMP_ENTITY.is_match(title) {
        return title.to_string();
    }
    title
        .replace("&amp;", "_&amp;_")
        .replace("&amp;__", "&amp;_")
        .replace("__&amp;", "_&amp;")
}

/// Full page-title pipeline: transliterate, escape, defuse, truncate.
///
/// Truncation runs again after the fixup since the added underscores can push
/// a title that just fit back over the limit.
pub fn page_title(raw: &str) -> String {
    let escaped = escape_page_title(&transliterate(raw));
    escape_page_title(&defuse_ampersand_entities(&escaped))
}

/// Category-name pipeline: transliterate, escape, truncate.
pub fn category_name(raw: &str) -> String {
    escape_page_title(&transliterate(raw))
}
