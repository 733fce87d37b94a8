//! URL normalization and domain matching
//!
//! Matching is a plain prefix test on normalized, ASCII-lower-cased paths.
//! There are no patterns and no longest-match rule; registration order
//! decides between overlapping domains.

/// Normalize a request URL for matching
///
/// Trims whitespace, drops query and fragment, turns `\` into `/`,
/// collapses repeated separators and guarantees a leading `/`. A trailing
/// separator is kept. Case is preserved.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let path = trimmed
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');
    for c in path.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

/// Normalize a module domain: same as [`normalize_url`], lower-cased
pub fn normalize_domain(domain: &str) -> String {
    normalize_url(domain).to_ascii_lowercase()
}

/// Whether `domain` is a case-insensitive prefix of `url`
///
/// Both arguments are expected to be normalized already.
pub fn matches_domain(url: &str, domain: &str) -> bool {
    url.len() >= domain.len()
        && url.as_bytes()[..domain.len()].eq_ignore_ascii_case(domain.as_bytes())
}

/// The part of `url` after `domain`, if the domain matches
pub fn strip_domain<'a>(url: &'a str, domain: &str) -> Option<&'a str> {
    if matches_domain(url, domain) {
        url.get(domain.len()..)
    } else {
        None
    }
}
