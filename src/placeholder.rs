//! Positional placeholder substitution.
//!
//! Templates reference values by position with `{N}`. The same engine serves
//! every template in the crate, only the value sequence changes:
//!
//! | Template | Substituted against |
//! |----------|---------------------|
//! | `title_tmpl` (page identifier) | raw row, `{0}` = padded row number |
//! | section title | header row |
//! | section content line | sanitized row |
//!
//! `{{` and `}}` produce literal braces. Anything else inside braces is an
//! error: there are no named fields, no format specs and no auto-numbering.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("placeholder {{{index}}} is out of range in '{template}' (only {available} values)")]
    OutOfRange {
        index: usize,
        available: usize,
        template: String,
    },
    #[error("malformed placeholder at byte {position} in '{template}'")]
    Malformed { position: usize, template: String },
}

/// Replace every `{N}` in `template` with `values[N]`.
///
/// ```text
/// substitute("Entry_{1}_{0}", ["07", "foo"]) → "Entry_foo_07"
/// ```
pub fn substitute<S: AsRef<str>>(template: &str, values: &[S]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == '}' {
                        closed = true;
                        break;
                    }
                    digits.push(d);
                }
                let index = match digits.parse::<usize>() {
                    Ok(n) if closed && digits.bytes().all(|b| b.is_ascii_digit()) => n,
                    _ => return Err(malformed(pos, template)),
                };
                let value = values.get(index).ok_or_else(|| FormatError::OutOfRange {
                    index,
                    available: values.len(),
                    template: template.to_string(),
                })?;
                out.push_str(value.as_ref());
            }
            '}' => return Err(malformed(pos, template)),
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn malformed(position: usize, template: &str) -> FormatError {
    FormatError::Malformed {
        position,
        template: template.to_string(),
    }
}
