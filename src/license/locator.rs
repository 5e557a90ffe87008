use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

/// Recognized license file names, matched case-insensitively against the
/// whole name:
///
/// ```text
/// license            the literal token, anchored at the start
/// (-[^./\\]+)?       optional qualifier such as `-MIT`
/// (\.(txt|md))?      optional extension
/// ```
pub const LICENSE_FILE_PATTERN: &str = r"(?i)^license(-[^./\\]+)?(\.(txt|md))?$";

fn license_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LICENSE_FILE_PATTERN).expect("license file pattern is valid"))
}

/// Returns `true` if `file_name` looks like a license file.
pub fn is_license_file(file_name: &str) -> bool {
    license_file_regex().is_match(file_name)
}

/// Pick the license file out of a package root listing.
///
/// Preference when several names match: bare `LICENSE`, then `LICENSE.txt` /
/// `LICENSE.md`, then qualified variants (`LICENSE-MIT.txt`), then byte order.
pub fn select_license_file<S: AsRef<str>>(listing: &[S]) -> Option<&str> {
    listing
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| is_license_file(name))
        .min_by(|a, b| compare_candidates(a, b))
}

fn candidate_rank(name: &str) -> u8 {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "license" => 0,
        "license.txt" | "license.md" => 1,
        _ => 2,
    }
}

fn compare_candidates(a: &str, b: &str) -> Ordering {
    candidate_rank(a)
        .cmp(&candidate_rank(b))
        .then_with(|| a.cmp(b))
}
