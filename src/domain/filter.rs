//! Safe construction of OData filter expressions.
//!
//! Graph queries are textually composed, so every caller-supplied value
//! passes through here before it reaches a URL. This is the sole injection
//! boundary for the directory query language.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::SyncError;

static PROPERTY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Operators accepted by [`build_filter`].
const VALID_OPERATORS: [&str; 9] = [
    "eq",
    "ne",
    "gt",
    "ge",
    "lt",
    "le",
    "startswith",
    "endswith",
    "contains",
];

/// Operators rendered as `op(property,'value')` rather than infix.
const FUNCTION_OPERATORS: [&str; 3] = ["startswith", "endswith", "contains"];

/// Characters that must never appear in a filter value, checked after
/// quote escaping: OData separators, function-call parentheses, path
/// separators and query metacharacters.
const DENIED_CHARS: [char; 9] = [';', ',', '(', ')', '/', '\\', '$', '@', '#'];

/// Escapes a string for use inside an OData string literal.
///
/// Single quotes are doubled (the OData string-literal rule), then the
/// escaped value is rejected if it still contains any structurally
/// significant character.
pub fn sanitize_value(value: &str) -> Result<String, SyncError> {
    let escaped = value.replace('\'', "''");

    if let Some(c) = escaped.chars().find(|c| DENIED_CHARS.contains(c)) {
        return Err(SyncError::validation(format!(
            "value contains disallowed character '{c}': {value}"
        )));
    }

    Ok(escaped)
}

/// Builds a safe OData filter expression from a property, operator and value.
///
/// The property must be a simple identifier and the operator must be in the
/// fixed allow-set; the value is sanitized with [`sanitize_value`].
pub fn build_filter(property: &str, operator: &str, value: &str) -> Result<String, SyncError> {
    if !PROPERTY_NAME_RE.is_match(property) {
        return Err(SyncError::validation(format!(
            "invalid property name: {property}"
        )));
    }

    if !VALID_OPERATORS.contains(&operator) {
        return Err(SyncError::validation(format!(
            "invalid OData operator: {operator}"
        )));
    }

    let sanitized = sanitize_value(value)?;

    if FUNCTION_OPERATORS.contains(&operator) {
        Ok(format!("{operator}({property},'{sanitized}')"))
    } else {
        Ok(format!("{property} {operator} '{sanitized}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_value() {
        assert_eq!(sanitize_value("Team A").unwrap(), "Team A");
    }

    #[test]
    fn test_sanitize_doubles_single_quotes() {
        assert_eq!(sanitize_value("O'Brien").unwrap(), "O''Brien");
    }

    #[test]
    fn test_sanitize_rejects_denied_characters() {
        for value in [
            "a;b", "a,b", "a(b", "a)b", "a/b", "a\\b", "a$b", "a@b", "a#b",
        ] {
            assert!(sanitize_value(value).is_err(), "expected rejection: {value}");
        }
    }

    #[test]
    fn test_sanitize_empty_value() {
        assert_eq!(sanitize_value("").unwrap(), "");
    }

    #[test]
    fn test_build_filter_infix() {
        assert_eq!(
            build_filter("displayName", "eq", "Team A").unwrap(),
            "displayName eq 'Team A'"
        );
    }

    #[test]
    fn test_build_filter_function_form() {
        assert_eq!(
            build_filter("displayName", "startswith", "Team").unwrap(),
            "startswith(displayName,'Team')"
        );
    }

    #[test]
    fn test_build_filter_escapes_value() {
        assert_eq!(
            build_filter("displayName", "eq", "O'Brien's Team").unwrap(),
            "displayName eq 'O''Brien''s Team'"
        );
    }

    #[test]
    fn test_build_filter_rejects_bad_property() {
        for property in ["1name", "display-name", "display name", "", "a.b"] {
            assert!(
                build_filter(property, "eq", "x").is_err(),
                "expected rejection: {property}"
            );
        }
    }

    #[test]
    fn test_build_filter_rejects_unknown_operator() {
        for operator in ["like", "in", "EQ", "and", ""] {
            assert!(
                build_filter("displayName", operator, "x").is_err(),
                "expected rejection: {operator}"
            );
        }
    }

    #[test]
    fn test_build_filter_rejects_injection_value() {
        assert!(build_filter("displayName", "eq", "x) or (1 eq 1").is_err());
    }
}
