use std::fmt;

use serde::Serialize;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

const MAX_NORMALIZATION_ROUNDS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(keyword: &str) -> NormalizedKey {
    let stripped = fold_until_stable(keyword, true);
    if !stripped.is_empty() {
        return NormalizedKey(stripped);
    }

    // Punctuation-only keywords keep their punctuation but still fold width
    // and spacing.
    let folded = fold_until_stable(keyword, false);
    if !folded.is_empty() {
        debug!(keyword, key = %folded, "keyword stripped to nothing, keeping punctuation");
    }
    NormalizedKey(folded)
}

// Stripping can leave a combining mark next to a new base character, so
// rounds repeat until the output is stable.
fn fold_until_stable(keyword: &str, strip_punctuation: bool) -> String {
    let mut current = normalization_round(keyword, strip_punctuation);
    for _ in 1..MAX_NORMALIZATION_ROUNDS {
        let next = normalization_round(&current, strip_punctuation);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalization_round(input: &str, strip_punctuation: bool) -> String {
    let lowered = input.nfkc().flat_map(char::to_lowercase).collect::<String>();

    lowered
        .nfkc()
        .filter(|&ch| !ch.is_whitespace() && !is_zero_width(ch))
        .filter(|&ch| !(strip_punctuation && is_stripped_punctuation(ch)))
        .collect()
}

fn is_zero_width(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

// `+`, `#` and `&` stay: "c++" and "c#" are different keywords from "c".
fn is_stripped_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '.' | ','
            | '!'
            | '?'
            | ';'
            | ':'
            | '\''
            | '"'
            | '`'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '<'
            | '>'
            | '/'
            | '\\'
            | '|'
            | '-'
            | '_'
            | '~'
            | '*'
            | '^'
            | '='
            | '@'
            | '$'
            | '%'
            | '。'
            | '、'
            | '・'
            | '「'
            | '」'
            | '『'
            | '』'
            | '【'
            | '】'
            | '《'
            | '》'
            | '〈'
            | '〉'
            | '〔'
            | '〕'
            | '〜'
            | '‧'
            | '·'
            | '—'
            | '–'
            | '‘'
            | '’'
            | '“'
            | '”'
    )
}
