/*!
 * Text normalization applied before comparing script lines with subtitle cues.
 *
 * Lower-cases, collapses whitespace and trims punctuation from the edges of
 * every word. Punctuation inside a word (`don't`, `well-known`) is kept so
 * contractions and compounds survive.
 */

/// Canonicalize a raw text unit for comparison
pub fn normalize(raw_text: &str) -> String {
    raw_text
        .to_lowercase()
        .split_whitespace()
        .map(trim_word)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(is_edge_punctuation)
}

/// Characters dropped from word edges; spoken symbols such as `$`, `%` or `#` stay
fn is_edge_punctuation(c: char) -> bool {
    matches!(
        c,
        // sentence punctuation
        '.' | ',' | '!' | '?' | ';' | ':' | '\u{2026}' | '\u{00BF}' | '\u{00A1}'
        // quotes
        | '"' | '\'' | '`' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}'
        // dashes
        | '-' | '\u{2010}' | '\u{2013}' | '\u{2014}'
        // brackets
        | '(' | ')' | '[' | ']' | '{' | '}'
        // music notes and emphasis marks
        | '\u{266A}' | '\u{266B}' | '*' | '_'
    )
}
