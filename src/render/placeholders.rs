use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Characters that mark a candidate as template-control noise rather
/// than a plain content slot.
const CONTROL_CHARS: &str = " %(){}'\"[]";

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        // {{ key }} or {{ key | filter }}; the capture stops before any
        // pipe so filter syntax never leaks into the key.
        Regex::new(r"\{\{\s*([^}|]+?)\s*(?:\|.*?)?\}\}").expect("placeholder token regex")
    })
}

/// Extracts the user-facing placeholder keys from raw template HTML
/// for content-form generation. This scans double-brace tokens only;
/// it does not parse the template language, so control-flow constructs
/// and nested expressions are filtered out heuristically: a key is
/// kept if it is dotted (namespaced, e.g. `hero.title`) or contains no
/// control punctuation at all.
///
/// Never fails; malformed or empty input yields an empty list. Output
/// is deduplicated and sorted, so extraction is idempotent.
pub fn extract_placeholders(html: &str) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let mut keys = BTreeSet::new();
    for cap in token_re().captures_iter(html) {
        let candidate = cap[1].trim();
        if candidate.is_empty() {
            continue;
        }
        let control_free = !candidate.chars().any(|c| CONTROL_CHARS.contains(c));
        if candidate.contains('.') || control_free {
            keys.insert(candidate.to_string());
        }
    }

    keys.into_iter().collect()
}
