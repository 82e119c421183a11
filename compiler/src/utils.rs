use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    // https://docs.julialang.org/en/v1/base/base/#Keywords
    static ref JULIA_KEYWORDS: HashSet<&'static str> = [
        "baremodule", "begin", "break", "catch", "const", "continue", "do", "else",
        "elseif", "end", "export", "false", "finally", "for", "function", "global",
        "if", "import", "let", "local", "macro", "module", "quote", "return",
        "struct", "true", "try", "using", "while",
    ]
    .into_iter()
    .collect();
}

pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Converts `snake_case` to camel case, keeping the first character as written
/// unless `upper_first` is set: `max_hp` → `maxHp` / `MaxHp`.
pub fn make_camel(s: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = upper_first;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' && chars.peek().is_some() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Identifier for a field in generated code. Julia keywords get a trailing
/// underscore before camel-casing, so `end` becomes `end_`.
pub fn julia_identity(name: &str) -> String {
    if JULIA_KEYWORDS.contains(name) {
        make_camel(&format!("{}_", name), false)
    } else {
        make_camel(name, false)
    }
}

/// Julia string literal. `$` must be escaped on top of the usual JSON escapes,
/// otherwise Julia interpolates.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text)
        .unwrap_or_else(|_| format!("{:?}", text))
        .replace('$', "\\$")
}

#[test]
fn camel_case() {
    assert_eq!(make_camel("max_hp", false), "maxHp");
    assert_eq!(make_camel("max_hp", true), "MaxHp");
    assert_eq!(make_camel("name", true), "Name");
    assert_eq!(make_camel("trailing_", false), "trailing_");
    assert_eq!(make_camel("größe_", false), "größe_");
    assert_eq!(make_camel("über_maß", true), "ÜberMaß");
}

#[test]
fn keywords_are_escaped() {
    assert_eq!(julia_identity("end"), "end_");
    assert_eq!(julia_identity("function"), "function_");
    assert_eq!(julia_identity("test_type"), "testType");
}

#[test]
fn julia_string_literals() {
    assert_eq!(quote("hi"), "\"hi\"");
    assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    assert_eq!(quote("$x"), "\"\\$x\"");
}

#[test]
fn identifiers() {
    assert!(is_identifier("MyGame"));
    assert!(!is_identifier("My-Game"));
    assert!(!is_identifier("1st"));
}
