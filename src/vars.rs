//! Parses configuration text into variable bindings.
//!
//! Configuration is line oriented. Each line is either blank, a comment
//! starting with `#`, or a binding of the form `key = value`. Values are
//! opaque text running to the end of the line, with surrounding blanks
//! removed. There is no quoting and no escaping.
//!
//! ```text
//! # site wide settings
//! title    = My Website
//! TEMPLATE = templates/base.html   # every page is wrapped
//! ```

use crate::scope::Binding;
use crate::types::span::Span;
use crate::{Error, Result};

/// Parse configuration text into bindings, in source order.
///
/// When merged into a scope later bindings shadow earlier ones with the same
/// key. On error nothing is returned, so no partially parsed bindings ever
/// reach a scope.
pub fn parse_config(text: &str) -> Result<Vec<Binding>> {
    let mut bindings = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let m = offset;
        offset += line.len();
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(binding) = parse_line(text, line, m)? {
            bindings.push(binding);
        }
    }
    Ok(bindings)
}

/// Parses a single physical line, `m` is the offset of the line in `text`.
fn parse_line(text: &str, line: &str, m: usize) -> Result<Option<Binding>> {
    let line = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };

    let rest = line.trim_start_matches(is_blank);
    if rest.is_empty() {
        return Ok(None);
    }
    let i = m + (line.len() - rest.len());

    let key_len = rest.find(|c: char| is_blank(c) || c == '=').unwrap_or(rest.len());
    if key_len == 0 {
        return Err(Error::config("expected key, found `=`", text, i..i + 1));
    }
    let key = &rest[..key_len];

    let after = rest[key_len..].trim_start_matches(is_blank);
    let value = match after.strip_prefix('=') {
        Some(value) => value.trim_matches(is_blank),
        None => {
            let span = Span::from(i..i + key_len);
            return Err(Error::config(
                format!("expected `=` after key `{key}`"),
                text,
                span,
            ));
        }
    };

    Ok(Some(Binding::new(key, value)))
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t')
}
