//! Helpers for writing JavaScript source text safely.

use oxc_syntax::identifier::{is_identifier_part, is_identifier_start};

/// Quotes `value` as a double-quoted JavaScript string literal.
pub(crate) fn string_literal(value: &str) -> String {
    // JSON strings are JS strings once the two line separators are escaped too
    serde_json::Value::String(value.to_owned())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub(crate) fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
        None => false,
    }
}

/// `object.property`, or `object["property"]` when the name is not an identifier.
pub(crate) fn member_access(object: &str, property: &str) -> String {
    if is_identifier_name(property) {
        format!("{object}.{property}")
    } else {
        format!("{object}[{}]", string_literal(property))
    }
}
