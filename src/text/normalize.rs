//! The normalization pipeline.
//!
//! Fixed pass order: command substitution, filler removal, corrections,
//! punctuation cleanup, terminal punctuation, capitalization. Later passes
//! assume the earlier ones ran, so the order is load-bearing.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::commands::{self, ControlCommand};
use super::corrections;

/// Which normalization passes run. Command substitution, capitalization and
/// terminal punctuation toggle independently; filler removal and corrections
/// always run unless every flag is off.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeFlags {
    pub commands: bool,
    pub capitalize: bool,
    pub punctuation: bool,
}

impl Default for NormalizeFlags {
    fn default() -> Self {
        Self {
            commands: true,
            capitalize: true,
            punctuation: true,
        }
    }
}

impl NormalizeFlags {
    fn all_off(&self) -> bool {
        !self.commands && !self.capitalize && !self.punctuation
    }
}

/// Outcome of normalizing an accepted transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The utterance was a control phrase; there is no text to emit.
    Command(ControlCommand),
    Text(String),
}

/// Sentence openers that make the utterance a question for terminal
/// punctuation purposes.
const QUESTION_STARTERS: &[&str] = &[
    "what", "where", "when", "why", "who", "how", "which", "whose", "is it", "are you", "do you",
    "does", "did", "can", "could", "would", "should", "will", "have you", "has", "was", "were",
];

fn cleanup_regexes() -> &'static Vec<(Regex, &'static str)> {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        [
            (r"\s+", " "),                     // collapse runs of whitespace
            (r"\s+([.,!?;:])", "$1"),          // no space before punctuation
            (r",\s*,+", ","),                  // duplicate commas
            (r"([.!?;:])\s*[.!?;:]", "$1"),    // duplicate sentence enders
            (r"^[.,;:]\s*", ""),               // stray leading punctuation
            (r",\s*([.!?])", "$1"),            // comma before sentence end
        ]
        .iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("cleanup pattern"), *replacement)
        })
        .collect()
    })
}

fn trailing_filler_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+(um|uh|er|ah|hmm|hm|mm|eh)\s*[.,]?\s*$").expect("trailing filler regex")
    })
}

fn capitalize_after_sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([.!?])\s+([a-z])").expect("capitalize regex"))
}

fn i_contraction_regexes() -> &'static Vec<(Regex, &'static str)> {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        // Case-sensitive on purpose; only lowercase "i" needs the fix.
        [
            (r"\bi'm\b", "I'm"),
            (r"\bi'll\b", "I'll"),
            (r"\bi've\b", "I've"),
            (r"\bi'd\b", "I'd"),
            (r"\bi\b", "I"),
        ]
        .iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("contraction pattern"), *replacement)
        })
        .collect()
    })
}

/// Classify and normalize: control phrases win, everything else goes through
/// [`apply`].
pub fn normalize(text: &str, flags: NormalizeFlags) -> Normalized {
    if let Some(cmd) = commands::detect_control(text) {
        return Normalized::Command(cmd);
    }
    Normalized::Text(apply(text, flags))
}

/// Run the text pipeline. With every flag off the input passes through
/// untouched.
pub fn apply(text: &str, flags: NormalizeFlags) -> String {
    if flags.all_off() {
        return text.to_string();
    }

    let mut result = if flags.commands {
        commands::substitute(text)
    } else {
        text.to_string()
    };
    result = result.trim().to_string();

    result = corrections::remove_fillers(&result);
    result = corrections::apply_corrections(&result);

    // Trim first so the anchored leading-punctuation pattern sees the text
    // start.
    result = result.trim().to_string();
    for (pattern, replacement) in cleanup_regexes() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result = result.trim().to_string();
    result = trailing_filler_re().replace(&result, "").into_owned();

    if flags.punctuation && !result.is_empty() {
        let lower = result.to_lowercase();
        let is_question = QUESTION_STARTERS.iter().any(|q| lower.starts_with(q));
        let last = result.chars().next_back();
        if !matches!(last, Some('.') | Some('?') | Some('!')) {
            result.push(if is_question { '?' } else { '.' });
        }
    }

    if flags.capitalize && !result.is_empty() {
        let mut chars = result.chars();
        if let Some(first) = chars.next() {
            result = first.to_uppercase().collect::<String>() + chars.as_str();
        }
        result = capitalize_after_sentence_re()
            .replace_all(&result, |caps: &Captures<'_>| {
                format!("{} {}", &caps[1], caps[2].to_uppercase())
            })
            .into_owned();
        for (pattern, replacement) in i_contraction_regexes() {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }

    result
}
