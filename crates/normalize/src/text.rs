use std::collections::BTreeSet;

use crate::vocab::COMPLIANCE_PREFIX;

/// Units that make a leading-digit token a quantity ("1g", "500mg", "2pk").
/// Quantity tokens carry no matching signal and are dropped wholesale.
const QUANTITY_UNITS: &[&str] = &[
    "g", "mg", "kg", "oz", "ml", "l", "pk", "pack", "ct", "gram", "grams", "gr", "pc", "piece",
];

/// Normalize free-form product text into a canonical matching form.
///
/// Lowercases, drops digit+unit quantity tokens, strips non-alphanumeric
/// characters, and collapses whitespace to single spaces. Idempotent: the
/// output passes through unchanged on a second application.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for raw in text.split_whitespace() {
        let mut cleaned = String::with_capacity(raw.len());
        for ch in raw.chars().flat_map(char::to_lowercase) {
            if ch.is_alphanumeric() {
                cleaned.push(ch);
            }
        }
        if cleaned.is_empty() || is_quantity_token(&cleaned) {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&cleaned);
    }
    out
}

/// Normalized token set of a string, for overlap comparisons.
pub fn tokens(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Remove the fixed compliance-notice prefix when present, along with the
/// separator that usually follows it. Returns the input unchanged otherwise.
pub fn strip_compliance_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    // `get` keeps the slice on a char boundary for multibyte input.
    let Some(head) = trimmed.get(..COMPLIANCE_PREFIX.len()) else {
        return text;
    };
    if !head.eq_ignore_ascii_case(COMPLIANCE_PREFIX) {
        return text;
    }
    trimmed[COMPLIANCE_PREFIX.len()..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == ':')
}

/// A token is a quantity when it starts with a digit and its alphabetic
/// tail is a recognized unit. Pure numbers are kept; the key-term length
/// filter handles those.
fn is_quantity_token(token: &str) -> bool {
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    // Mixed forms like "2x4" or "10mg5" are kept; only a clean unit tail counts.
    let suffix = &token[digits..];
    !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_alphabetic())
        && QUANTITY_UNITS.contains(&suffix)
}
