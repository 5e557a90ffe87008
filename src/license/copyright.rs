use std::sync::OnceLock;

use regex::Regex;

/// Copyright statement pattern:
///
/// ```text
/// Copyright          literal, case-sensitive
/// [ \t]*             horizontal whitespace only, never a line break
/// (?:©|\([Cc]\))?    optional copyright marker
/// [ \t]*
/// [0-9]{4}           year
/// [^\r\n]*           rest of the same line
/// ```
pub const COPYRIGHT_PATTERN: &str = r"Copyright[ \t]*(?:©|\([Cc]\))?[ \t]*[0-9]{4}[^\r\n]*";

fn copyright_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COPYRIGHT_PATTERN).expect("copyright pattern is valid"))
}

/// Extract the first copyright line from raw license text.
///
/// Returns `None` when the text has no recognizable statement; callers leave
/// the record's copyright unset in that case.
pub fn extract_copyright(text: &str) -> Option<String> {
    copyright_regex()
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
