use std::collections::BTreeSet;

use crate::vocab::{is_vocabulary_token, STOP_TERMS};

/// Separators product names are split on before term filtering.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | ',' | '(' | ')' | '/' | '&' | '|' | ':')
}

/// Extract the key-term set of a product name.
///
/// Tokens are split on separators and lowercased with punctuation stripped.
/// Stop/packaging terms and tokens shorter than 3 characters are dropped,
/// except tokens that are recognized product-type or strain vocabulary.
/// Adjacent surviving tokens with combined length >= 6 are added as
/// two-word phrase terms.
pub fn extract_key_terms(text: &str) -> BTreeSet<String> {
    let mut kept: Vec<String> = Vec::new();
    for raw in text.split(is_separator) {
        let token: String = raw
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphanumeric())
            .collect();
        if token.is_empty() {
            continue;
        }
        let vocabulary = is_vocabulary_token(&token);
        if !vocabulary && (token.len() < 3 || STOP_TERMS.contains(token.as_str())) {
            continue;
        }
        kept.push(token);
    }

    let mut terms: BTreeSet<String> = kept.iter().cloned().collect();
    for pair in kept.windows(2) {
        if pair[0].len() + pair[1].len() >= 6 {
            terms.insert(format!("{} {}", pair[0], pair[1]));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_terms_and_short_tokens() {
        let terms = extract_key_terms("Bulk Pack of OG Gummies for the case");
        assert!(!terms.contains("bulk"));
        assert!(!terms.contains("pack"));
        assert!(!terms.contains("the"));
        assert!(!terms.contains("of"));
        assert!(terms.contains("gummies"));
    }

    #[test]
    fn short_vocabulary_tokens_survive() {
        let terms = extract_key_terms("GG4 1g jar");
        assert!(terms.contains("gg4"));
        assert!(terms.contains("jar"));
    }

    #[test]
    fn two_word_phrases_are_added() {
        let terms = extract_key_terms("Grape Gas Reserve Rosin");
        assert!(terms.contains("grape"));
        assert!(terms.contains("grape gas"));
        assert!(terms.contains("gas reserve"));
        assert!(terms.contains("reserve rosin"));
    }

    #[test]
    fn short_phrase_pairs_are_skipped() {
        // "gg4" + "og" is 5 combined characters: below the phrase cutoff.
        let terms = extract_key_terms("gg4 og");
        assert!(!terms.contains("gg4 og"));
    }

    #[test]
    fn separators_split_terms() {
        let terms = extract_key_terms("Medically Compliant - Dank Czar Live Hash Rosin");
        assert!(terms.contains("dank"));
        assert!(terms.contains("czar"));
        assert!(terms.contains("dank czar"));
        assert!(!terms.contains("medically"));
        assert!(!terms.contains("compliant"));
    }
}
