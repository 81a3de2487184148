//! Helpers for manipulating Wikipedia article titles: namespace prefixes,
//! disambiguation suffixes, and truncated title variants.

/// Suffix sometimes (not always) used to denote a disambiguation page.
pub const DISAMBIGUATION_SUFFIX: &str = " (disambiguation)";

/// Character that delimits namespace prefixes in article titles.
pub const NAMESPACE_DELIMITER: char = ':';

/// Strips `suffix` from the end of `s` if present, comparing ASCII
/// case-insensitively. Returns `s` unaltered otherwise.
pub fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() || s.len() < suffix.len() {
        return s;
    }
    let split = s.len() - suffix.len();
    if !s.is_char_boundary(split) {
        return s;
    }
    if s[split..].eq_ignore_ascii_case(suffix) {
        &s[..split]
    } else {
        s
    }
}

/// Strips every leading `namespace:` segment from a title; e.g.
/// `wikt:Solidarity` starts with the Wiktionary namespace. Titles without a
/// delimiter are returned unaltered.
pub fn strip_namespaces(s: &str) -> &str {
    match s.rfind(NAMESPACE_DELIMITER) {
        Some(i) => &s[i + NAMESPACE_DELIMITER.len_utf8()..],
        None => s,
    }
}

/// Whether the title carries a disambiguating suffix: a parenthesised group
/// or a comma clause.
pub fn has_title_suffix(title: &str) -> bool {
    title.contains(',') || (title.contains('(') && title.contains(')'))
}

/// Strips the last disambiguating suffix from a title: everything from the
/// last `(`, or failing that from the last `,`. Unsuffixed titles are
/// returned unaltered.
pub fn strip_title_suffix(title: &str) -> &str {
    if let Some(i) = title.rfind('(') {
        return title[..i].trim_end();
    }
    if let Some(i) = title.rfind(',') {
        return title[..i].trim_end();
    }
    title
}

/// All truncated variants of a title, computed by iteratively removing the
/// last disambiguating suffix until none remains. The title itself is not
/// included; a title with no suffix yields an empty list.
pub fn title_variants(title: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let mut current = title;
    while has_title_suffix(current) {
        current = strip_title_suffix(current).trim();
        let candidate = current.to_string();
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Lower-cases only the first character, preserving the rest: `IPod` becomes
/// `iPod`. The `{{lowercase title}}` convention affects only the initial
/// letter, which MediaWiki forcibly capitalizes in stored titles.
pub fn first_char_to_lowercase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
