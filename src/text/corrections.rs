//! Lexical cleanup tables: filler removal and contraction repair.
//!
//! The filler list is deliberately conservative. Only unambiguous fillers
//! go, and only with their surrounding punctuation, so intentional words
//! ("I feel like this") survive.

use regex::Regex;
use std::sync::OnceLock;

/// Filler patterns, applied before corrections. Replacement is a space so
/// neighbouring words never merge. Compiled with (?im); duplicate-word
/// entries keep one copy via `$1`.
const FILLER_PATTERNS: &[(&str, &str)] = &[
    // Filler sounds together with the punctuation that set them off
    (r",?\s*\b(um+)\b\s*,?\s*", " "),
    (r",?\s*\b(uh+)\b\s*,?\s*", " "),
    (r",?\s*\b(er+)\b\s*,?\s*", " "),
    (r",?\s*\b(hmm+)\b\s*,?\s*", " "),
    (r",?\s*\b(hm+)\b\s*,?\s*", " "),
    // Stuttered discourse words, collapsed to a single copy
    (r"\b(like)(?:\s+like\b)+", "$1"),
    (r"\b(so)(?:\s+so\b)+", "$1"),
    (r"\b(really)(?:\s+really\b)+", "$1"),
    (r"\b(very)(?:\s+very\b)+", "$1"),
    (r"\b(just)(?:\s+just\b)+", "$1"),
    // Meaningless filler phrases
    (r",?\s*\byou know\b\s*,?\s*", " "),
    (r",?\s*\bi mean\b\s*,?\s*", " "),
    // Filler sentence starters, comma form only
    (r"^so\s*,\s+", " "),
    (r"^well\s*,\s+", " "),
    (r"^okay\s*,\s+", " "),
];

/// Contraction and phonetic corrections, applied after filler removal.
/// Patterns match case-insensitively; replacements are literal.
const CORRECTION_PATTERNS: &[(&str, &str)] = &[
    // Standalone "i" and its contractions
    (r"\bi\b", "I"),
    (r"\bi'm\b", "I'm"),
    (r"\bi'll\b", "I'll"),
    (r"\bi've\b", "I've"),
    (r"\bi'd\b", "I'd"),
    (r"\bim\b", "I'm"),
    (r"\bill\b", "I'll"),
    (r"\bive\b", "I've"),
    // "id" stays: it is a real word (user id)
    // Missing apostrophes
    (r"\bdont\b", "don't"),
    (r"\bwont\b", "won't"),
    (r"\bcant\b", "can't"),
    (r"\bwouldnt\b", "wouldn't"),
    (r"\bcouldnt\b", "couldn't"),
    (r"\bshouldnt\b", "shouldn't"),
    (r"\bdidnt\b", "didn't"),
    (r"\bdoesnt\b", "doesn't"),
    (r"\bisnt\b", "isn't"),
    (r"\barent\b", "aren't"),
    (r"\bwasnt\b", "wasn't"),
    (r"\bwerent\b", "weren't"),
    (r"\bhasnt\b", "hasn't"),
    (r"\bhavent\b", "haven't"),
    (r"\bhadnt\b", "hadn't"),
    (r"\bwontnt\b", "won't"),
    (r"\bmustnt\b", "mustn't"),
    (r"\bneednt\b", "needn't"),
    (r"\bshant\b", "shan't"),
    (r"\bmightnt\b", "mightn't"),
    (r"\bthats\b", "that's"),
    (r"\bwhats\b", "what's"),
    (r"\bheres\b", "here's"),
    (r"\btheres\b", "there's"),
    (r"\bwheres\b", "where's"),
    (r"\bwhos\b", "who's"),
    (r"\bhows\b", "how's"),
    (r"\bwhens\b", "when's"),
    (r"\bwhys\b", "why's"),
    (r"\bits\b", "it's"),
    (r"\blets\b", "let's"),
    (r"\byoure\b", "you're"),
    (r"\btheyre\b", "they're"),
    (r"\bshes\b", "she's"),
    (r"\bhes\b", "he's"),
    (r"\bweve\b", "we've"),
    (r"\btheyve\b", "they've"),
    (r"\byouve\b", "you've"),
    (r"\bwhatll\b", "what'll"),
    (r"\bwholl\b", "who'll"),
    (r"\bthatll\b", "that'll"),
    (r"\bitll\b", "it'll"),
    (r"\btheyll\b", "they'll"),
    // "well", "shell", "hell" stay: too context-dependent to contract
    (r"\byoull\b", "you'll"),
    // Phonetic speech forms
    (r"\bgonna\b", "going to"),
    (r"\bwanna\b", "want to"),
    (r"\bgotta\b", "got to"),
    (r"\blemme\b", "let me"),
    (r"\bgimme\b", "give me"),
    (r"\bkinda\b", "kind of"),
    (r"\bsorta\b", "sort of"),
    (r"\blotta\b", "lot of"),
    (r"\boutta\b", "out of"),
    (r"\bcuz\b", "because"),
    (r"\bcause\b", "because"),
    (r"\btho\b", "though"),
    (r"\bthru\b", "through"),
    (r"\bok\b", "okay"),
    // Doubled words
    (r"\bthe the\b", "the"),
    (r"\ba a\b", "a"),
    (r"\ban an\b", "an"),
    (r"\band and\b", "and"),
    (r"\bto to\b", "to"),
    (r"\bof of\b", "of"),
    (r"\bis is\b", "is"),
    (r"\bit it\b", "it"),
    (r"\bthat that\b", "that"),
];

fn compiled(table: &'static [(&str, &str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(&format!("(?im){pattern}")).expect("correction pattern");
            (re, *replacement)
        })
        .collect()
}

fn filler_regexes() -> &'static Vec<(Regex, &'static str)> {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| compiled(FILLER_PATTERNS))
}

fn correction_regexes() -> &'static Vec<(Regex, &'static str)> {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| compiled(CORRECTION_PATTERNS))
}

/// Strip filler sounds and phrases. Two passes so a filler exposed by the
/// first pass ("um, uh,") still goes.
pub(super) fn remove_fillers(text: &str) -> String {
    let mut result = text.to_string();
    for _ in 0..2 {
        for (pattern, replacement) in filler_regexes() {
            if pattern.is_match(&result) {
                result = pattern.replace_all(&result, *replacement).into_owned();
            }
        }
    }
    result
}

/// Apply the contraction and phonetic correction table.
pub(super) fn apply_corrections(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in correction_regexes() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }
    result
}
