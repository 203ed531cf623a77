//! Heuristic hallucination filter.
//!
//! Each rule is independently sufficient to reject; they run in a fixed
//! order with short-circuit OR and the first match names the reject reason,
//! so tests and logs can tell the rules apart without exceptions.

use regex::Regex;
use std::sync::OnceLock;

/// Result of classifying a raw transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Which rule fired. Labels are stable identifiers for metric lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    NumericNoise,
    TimestampNoise,
    SymbolNoise,
    StrayCjk,
    KnownJunk,
    JunkPrefix,
    RepeatedJunk,
    LowAlphaRatio,
    LowUniqueness,
    Stutter,
    BareWord,
    ShoutingNoise,
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::TooShort => "too_short",
            RejectReason::NumericNoise => "numeric_noise",
            RejectReason::TimestampNoise => "timestamp_noise",
            RejectReason::SymbolNoise => "symbol_noise",
            RejectReason::StrayCjk => "stray_cjk",
            RejectReason::KnownJunk => "known_junk",
            RejectReason::JunkPrefix => "junk_prefix",
            RejectReason::RepeatedJunk => "repeated_junk",
            RejectReason::LowAlphaRatio => "low_alpha_ratio",
            RejectReason::LowUniqueness => "low_uniqueness",
            RejectReason::Stutter => "stutter",
            RejectReason::BareWord => "bare_word",
            RejectReason::ShoutingNoise => "shouting_noise",
        }
    }
}

/// Stock phrases the backend produces from silence or noise. Exact matches
/// (case-insensitive) are junk; short entries and long entries also feed the
/// repetition rule.
const JUNK_PHRASES: &[&str] = &[
    // Numbers and decimals
    "1.1", "1.5", "2.0", "0.5", "1.0", "2.5", "3.0",
    // Symbols
    "...", "♪", "***", "---", "___", "…", "・・・",
    // Video outro phrases
    "Thank you",
    "Thanks for watching",
    "Thanks for listening",
    "Subscribe",
    "Bye",
    "See you",
    "Goodbye",
    "See you next time",
    "Please subscribe",
    "Like and subscribe",
    "Hit the bell",
    "Thank you for watching",
    "You're welcome",
    "Don't forget to",
    // Backend stock artifacts
    "I'm sorry",
    "Hmm",
    "Uh",
    "Um",
    "Huh",
    "silence",
    "music",
    "applause",
    "laughter",
    "background noise",
    "[Music]",
    "[Applause]",
    "[Laughter]",
    "(music)",
    "(applause)",
    // Bare short function words
    "you", "the", "a", "to", "is", "it", "and", "of", "in", "on",
    // Onomatopoeia
    "Shhh",
    "Shh",
    "Ssh",
    "Psst",
    "Sss",
    "Mm-hmm",
    "Uh-huh",
    "Mhm",
    "Mmm",
    "Uh huh",
    "Oh",
    "Ah",
    "Eh",
    "Ooh",
    "Aah",
    "Yeah",
    "Yep",
    "Nope",
    "Yup",
    "Nah",
    "Ha",
    "Haha",
    "Hehe",
    "Lol",
    // Attribution boilerplate
    "Transcribed by",
    "Subtitles by",
    "Translated by",
    "Copyright",
    "All rights reserved",
    "www.",
    "http",
    // Repeated sounds
    "la la la",
    "da da da",
    "na na na",
    "doo doo",
    // Breathing and ambient markers
    "breathing",
    "sighs",
    "coughs",
    "sniffs",
];

/// Sentence starters that mark the whole transcript as junk when it merely
/// begins with them.
const JUNK_PREFIXES: &[&str] = &[
    "thank you for",
    "thanks for",
    "please subscribe",
    "don't forget",
    "see you",
    "bye bye",
    "goodbye",
    "transcribed by",
    "subtitles by",
    "translated by",
];

/// Word count above which the repetition rule is skipped; common short words
/// legitimately repeat in long real speech.
const REPEAT_CHECK_MAX_WORDS: usize = 8;

fn numeric_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d.,%\s\-]+$").expect("numeric noise regex"))
}

// Same family as numeric noise but with stray punctuation mixed in. Checked
// after the timestamp rule so "12:34" keeps its own reason.
fn punctuated_numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d.,%\s\-!?:;]+$").expect("punctuated numeric regex"))
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d:\s]+$").expect("timestamp regex"))
}

fn symbol_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[♪♫♬*\-_.\s]+$").expect("symbol noise regex"))
}

fn cjk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[\u{4e00}-\u{9fff}\u{3040}-\u{309f}\u{30a0}-\u{30ff}\u{ac00}-\u{d7af}]+$")
            .expect("cjk regex")
    })
}

/// Classify a raw transcript as real speech or a backend artifact.
pub fn classify(text: &str) -> Verdict {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    let char_count = trimmed.chars().count();

    if char_count < 3 {
        return Verdict::Reject(RejectReason::TooShort);
    }
    if numeric_noise_re().is_match(trimmed) {
        return Verdict::Reject(RejectReason::NumericNoise);
    }
    if timestamp_re().is_match(trimmed) {
        return Verdict::Reject(RejectReason::TimestampNoise);
    }
    if punctuated_numeric_re().is_match(trimmed) {
        return Verdict::Reject(RejectReason::NumericNoise);
    }
    if symbol_noise_re().is_match(trimmed) {
        return Verdict::Reject(RejectReason::SymbolNoise);
    }
    if char_count <= 3 && cjk_re().is_match(trimmed) {
        return Verdict::Reject(RejectReason::StrayCjk);
    }

    if JUNK_PHRASES.iter().any(|p| p.to_lowercase() == lower) {
        return Verdict::Reject(RejectReason::KnownJunk);
    }
    if JUNK_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Verdict::Reject(RejectReason::JunkPrefix);
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();

    if words.len() <= REPEAT_CHECK_MAX_WORDS {
        for phrase in JUNK_PHRASES {
            let phrase_lower = phrase.to_lowercase();
            if phrase.chars().count() <= 3 {
                if whole_word_count(&lower, &phrase_lower) > 2 {
                    return Verdict::Reject(RejectReason::RepeatedJunk);
                }
            } else if lower.matches(phrase_lower.as_str()).count() > 2 {
                return Verdict::Reject(RejectReason::RepeatedJunk);
            }
        }
    }

    let alpha_count = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    if char_count > 5 && (alpha_count as f64) < (char_count as f64) * 0.3 {
        return Verdict::Reject(RejectReason::LowAlphaRatio);
    }

    if words.len() > 3 {
        let mut unique: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        unique.sort();
        unique.dedup();
        if (unique.len() as f64) < (words.len() as f64) * 0.3 {
            return Verdict::Reject(RejectReason::LowUniqueness);
        }
    }

    if words.len() >= 2 {
        let stutters = words
            .windows(2)
            .filter(|pair| pair[0].eq_ignore_ascii_case(pair[1]))
            .count();
        if stutters >= words.len() / 2 {
            return Verdict::Reject(RejectReason::Stutter);
        }
    }

    if words.len() == 1 {
        let digits: String = trimmed.chars().filter(|c| *c != '.' && *c != '%').collect();
        let purely_numeric = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
        if purely_numeric || char_count < 4 {
            return Verdict::Reject(RejectReason::BareWord);
        }
    }

    if char_count < 10
        && trimmed.chars().all(|c| c.is_alphabetic())
        && trimmed.chars().all(|c| c.is_uppercase())
    {
        return Verdict::Reject(RejectReason::ShoutingNoise);
    }

    Verdict::Accept
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Count whole-word occurrences of `needle` in `haystack` (both lowercase).
fn whole_word_count(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut search_from = 0;
    while let Some(rel) = haystack[search_from..].find(needle) {
        let start = search_from + rel;
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            count += 1;
        }
        search_from = end;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(text: &str) -> Option<RejectReason> {
        match classify(text) {
            Verdict::Accept => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }

    #[test]
    fn accepts_real_speech() {
        assert_eq!(reason("I went to the store today"), None);
        assert_eq!(reason("Send the report to Maria before the standup"), None);
        assert_eq!(
            reason("What time does the meeting start tomorrow"),
            None
        );
    }

    #[test]
    fn rejects_numeric_artifacts() {
        assert_eq!(reason("1.5%"), Some(RejectReason::NumericNoise));
        assert_eq!(reason("2.0, 3.0"), Some(RejectReason::NumericNoise));
    }

    #[test]
    fn rejects_timestamps_and_symbol_noise() {
        assert_eq!(reason("12:34:56"), Some(RejectReason::TimestampNoise));
        assert_eq!(reason("♪♪♪♪"), Some(RejectReason::SymbolNoise));
        assert_eq!(reason("*** ---"), Some(RejectReason::SymbolNoise));
    }

    #[test]
    fn rejects_very_short_text() {
        assert_eq!(reason(""), Some(RejectReason::TooShort));
        assert_eq!(reason("  a "), Some(RejectReason::TooShort));
    }

    #[test]
    fn rejects_stray_cjk_glyphs() {
        assert_eq!(reason("你好"), Some(RejectReason::TooShort));
        assert_eq!(reason("ありが"), Some(RejectReason::StrayCjk));
    }

    #[test]
    fn rejects_known_junk_catalogue_entries() {
        assert_eq!(reason("Thanks for watching"), Some(RejectReason::KnownJunk));
        assert_eq!(reason("thank you"), Some(RejectReason::KnownJunk));
        assert_eq!(reason("Uh-huh"), Some(RejectReason::KnownJunk));
    }

    #[test]
    fn rejects_junk_prefixes() {
        assert_eq!(
            reason("Thank you for tuning in to the channel"),
            Some(RejectReason::JunkPrefix)
        );
        assert_eq!(
            reason("Subtitles by the community"),
            Some(RejectReason::JunkPrefix)
        );
    }

    #[test]
    fn repetition_rule_only_gates_short_transcripts() {
        assert_eq!(
            reason("the the the quick fox"),
            Some(RejectReason::RepeatedJunk)
        );
        // Same words diluted into a long transcript pass the repetition gate.
        assert_eq!(
            reason("I told you and you told me that you would bring the notes to the office"),
            None
        );
    }

    #[test]
    fn rejects_symbol_and_number_soup() {
        assert_eq!(reason("a1 2# 3$ 4%"), Some(RejectReason::LowAlphaRatio));
    }

    #[test]
    fn rejects_low_uniqueness() {
        assert_eq!(
            reason("okay okay okay okay okay okay okay"),
            Some(RejectReason::LowUniqueness)
        );
    }

    #[test]
    fn rejects_stuttered_output() {
        assert_eq!(
            reason("open open the the door door"),
            Some(RejectReason::Stutter)
        );
    }

    #[test]
    fn rejects_bare_words_and_numbers() {
        // Pure digit strings already fall to the numeric rule; the bare-word
        // rule catches short lone words.
        assert_eq!(reason("4711"), Some(RejectReason::NumericNoise));
        assert_eq!(reason("hey"), Some(RejectReason::BareWord));
        assert_eq!(reason("hrm"), Some(RejectReason::BareWord));
    }

    #[test]
    fn rejects_short_all_caps_noise() {
        assert_eq!(reason("WHOA"), Some(RejectReason::ShoutingNoise));
        assert_eq!(reason("ATTENTION PASSENGERS"), None);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(RejectReason::KnownJunk.label(), "known_junk");
        assert_eq!(RejectReason::Stutter.label(), "stutter");
    }
}
