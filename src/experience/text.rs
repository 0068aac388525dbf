//! Cleanup of model output before it reaches clients or the TTS vendor.

use std::sync::OnceLock;

use regex::Regex;

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*").expect("valid regex"))
}

fn voice_direction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\([^)]*(?:voice|tone|enthusiastic|warm|excited|cheerful|friendly|softly|gently)[^)]*\)",
        )
        .expect("valid regex")
    })
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Split on blank lines, drop empty paragraphs and rejoin with `\n\n`.
pub fn normalize_paragraphs(text: &str) -> String {
    paragraph_break()
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Remove markdown code fences around a JSON payload.
pub fn strip_code_fences(text: &str) -> String {
    code_fence().replace_all(text, "").trim().to_string()
}

/// Remove parenthesised stage directions such as "(Warm, enthusiastic voice)".
///
/// Whitespace runs are collapsed to single spaces and the result trimmed.
pub fn clean_voice_directions(text: &str) -> String {
    let without = voice_direction().replace_all(text, "");
    whitespace_run()
        .replace_all(&without, " ")
        .trim()
        .to_string()
}
