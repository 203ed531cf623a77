//! Spoken command vocabulary.
//!
//! Two tables: substitution commands that become literal text ("comma" ->
//! ","), and control phrases that never produce text and are surfaced to the
//! caller instead. Substitutions match whole words case-insensitively and run
//! longest phrase first so "exclamation mark" wins over any shorter overlap.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

/// Spoken phrase -> replacement text.
const COMMAND_TABLE: &[(&str, &str)] = &[
    // Punctuation
    ("period", "."),
    ("full stop", "."),
    ("comma", ","),
    ("question mark", "?"),
    ("exclamation mark", "!"),
    ("exclamation point", "!"),
    ("colon", ":"),
    ("semicolon", ";"),
    ("hyphen", "-"),
    ("dash", " - "),
    ("open quote", "\""),
    ("close quote", "\""),
    ("open paren", "("),
    ("close paren", ")"),
    ("open bracket", "["),
    ("close bracket", "]"),
    ("ellipsis", "..."),
    // Whitespace
    ("new line", "\n"),
    ("newline", "\n"),
    ("new paragraph", "\n\n"),
    ("tab", "\t"),
    ("space", " "),
    // Symbols
    ("ampersand", "&"),
    ("at sign", "@"),
    ("hashtag", "#"),
    ("hash", "#"),
    ("dollar sign", "$"),
    ("percent sign", "%"),
    ("percent", "%"),
    ("asterisk", "*"),
    ("star", "*"),
    ("plus sign", "+"),
    ("plus", "+"),
    ("minus sign", "-"),
    ("minus", "-"),
    ("equals sign", "="),
    ("equals", "="),
    ("slash", "/"),
    ("forward slash", "/"),
    ("backslash", "\\"),
    ("back slash", "\\"),
    ("underscore", "_"),
    ("pipe", "|"),
    ("tilde", "~"),
    ("caret", "^"),
    ("greater than", ">"),
    ("less than", "<"),
    // Programming
    ("arrow", "->"),
    ("fat arrow", "=>"),
    ("double colon", "::"),
    ("triple dot", "..."),
    // Emoticons
    ("smiley face", ":)"),
    ("smiley", ":)"),
    ("frown face", ":("),
    ("frowny face", ":("),
    ("wink", ";)"),
    ("heart", "<3"),
    // Markdown wrappers
    ("bold start", "**"),
    ("bold end", "**"),
    ("italic start", "*"),
    ("italic end", "*"),
    ("code start", "`"),
    ("code end", "`"),
    ("strike start", "~~"),
    ("strike end", "~~"),
    ("link start", "["),
    ("link end", "]"),
    ("bullet point", "- "),
    ("numbered", "1. "),
    // Quick phrases
    ("sounds good", "Sounds good!"),
    ("thank you", "Thank you!"),
    ("no problem", "No problem!"),
    ("on my way", "On my way!"),
    ("be right back", "Be right back."),
    ("one moment", "One moment please."),
    ("let me check", "Let me check on that."),
    ("good morning", "Good morning!"),
    ("good afternoon", "Good afternoon!"),
    ("good evening", "Good evening!"),
    ("have a good day", "Have a good day!"),
    ("talk to you later", "Talk to you later!"),
];

/// Punctuation that swallows the space before it after substitution.
pub(super) const NO_SPACE_BEFORE: &[char] = &['.', ',', '?', '!', ':', ';', ')', ']', '"'];

/// Session control phrases. These produce no text; the caller acts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Discard the previous utterance.
    Scratch,
    /// Abort the current session without output.
    Cancel,
    /// Re-emit the previous utterance.
    Repeat,
}

impl ControlCommand {
    pub fn label(&self) -> &'static str {
        match self {
            ControlCommand::Scratch => "scratch",
            ControlCommand::Cancel => "cancel",
            ControlCommand::Repeat => "repeat",
        }
    }
}

const CONTROL_TABLE: &[(&str, ControlCommand)] = &[
    ("scratch that", ControlCommand::Scratch),
    ("delete that", ControlCommand::Scratch),
    ("undo that", ControlCommand::Scratch),
    ("never mind", ControlCommand::Scratch),
    ("cancel that", ControlCommand::Cancel),
    ("repeat that", ControlCommand::Repeat),
    ("say that again", ControlCommand::Repeat),
];

/// Match a control phrase: the transcript must equal it or start with it
/// (STT often tacks on trailing punctuation).
pub fn detect_control(text: &str) -> Option<ControlCommand> {
    let lower = text.trim().to_lowercase();
    CONTROL_TABLE
        .iter()
        .find(|(phrase, _)| lower == *phrase || lower.starts_with(phrase))
        .map(|(_, cmd)| *cmd)
}

fn compiled_commands() -> &'static Vec<(Regex, &'static str)> {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        let mut table: Vec<&(&str, &str)> = COMMAND_TABLE.iter().collect();
        // Longest phrase first so "double colon" is consumed before "colon".
        table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        table
            .into_iter()
            .map(|(phrase, replacement)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
                (
                    Regex::new(&pattern).expect("command pattern"),
                    *replacement,
                )
            })
            .collect()
    })
}

/// Replace every spoken command in `text` with its literal form and tidy the
/// spacing the substitutions leave behind.
pub(super) fn substitute(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in compiled_commands() {
        if pattern.is_match(&result) {
            // Replacements are literal text; "$" in "dollar sign" output and
            // "\" in "backslash" must not be treated as expansions.
            result = pattern.replace_all(&result, NoExpand(replacement)).into_owned();
        }
    }
    for punct in NO_SPACE_BEFORE {
        let spaced = format!(" {punct}");
        result = result.replace(&spaced, &punct.to_string());
    }
    while result.contains("  ") {
        result = result.replace("  ", " ");
    }
    result
}
