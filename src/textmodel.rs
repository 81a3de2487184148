//! Cheap regex-based classification of one page's raw wikitext, independent
//! of the structural parser. Redirect and stub detection run at construction;
//! the heavier passes are computed once on demand and memoized.

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

pub static REDIRECT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#REDIRECT\s*\[\[(.*?)\]\]").unwrap());

static STUB_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-stub\}\}").unwrap());

static CATEGORY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[Category:([^|\]]+?)(?:\|[^\]]*)?\]\]").unwrap());

static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^|\]]+?)(?:\|[^\]]+)?\]\]").unwrap());

static REF_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<ref[^>]*>.*?</ref>").unwrap());
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]*>").unwrap());
static TEMPLATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());
static NS_LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[[^\]]*?:[^\]]*?\]\]").unwrap());
static SURFACE_LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]*?)\]\]").unwrap());
static PIPE_REMNANT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(.*?)\|(\w+\s)").unwrap());
static BRACKET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*?\]").unwrap());
static QUOTE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"'+").unwrap());

/// Per-page view over raw wikitext. Single-threaded; built once per page and
/// discarded with it.
pub struct PageTextModel {
    text: String,
    redirect_target: Option<String>,
    stub: bool,
    categories: OnceCell<Vec<String>>,
    links: OnceCell<Vec<String>>,
    plain: OnceCell<String>,
}

impl PageTextModel {
    pub fn new(text: impl Into<String>) -> PageTextModel {
        let text = text.into();
        let redirect_target = REDIRECT_REGEX
            .captures(&text)
            .map(|c| c[1].split('|').next().unwrap_or("").trim().to_string());
        let stub = STUB_REGEX.is_match(&text);
        PageTextModel {
            text,
            redirect_target,
            stub,
            categories: OnceCell::new(),
            links: OnceCell::new(),
            plain: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect_target.is_some()
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }

    pub fn is_stub(&self) -> bool {
        self.stub
    }

    /// All `[[Category:NAME|sortkey]]` names, keeping only the portion
    /// before the sort-key pipe.
    pub fn categories(&self) -> &[String] {
        self.categories.get_or_init(|| {
            CATEGORY_REGEX
                .captures_iter(&self.text)
                .map(|c| c[1].trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// Bare internal link targets, excluding namespaced targets.
    pub fn links(&self) -> &[String] {
        self.links.get_or_init(|| {
            LINK_REGEX
                .captures_iter(&self.text)
                .map(|c| c[1].trim().to_string())
                .filter(|s| !s.is_empty() && !s.contains(':'))
                .collect()
        })
    }

    /// Wikitext stripped down to approximate plain text. An ordered
    /// substitution pipeline: later steps assume earlier ones have already
    /// removed nested constructs.
    pub fn plain_text(&self) -> &str {
        self.plain.get_or_init(|| {
            let text = self.text.replace("&gt;", ">").replace("&lt;", "<");
            let text = REF_REGEX.replace_all(&text, " ");
            let text = TAG_REGEX.replace_all(&text, " ");
            let text = TEMPLATE_REGEX.replace_all(&text, " ");
            let text = NS_LINK_REGEX.replace_all(&text, " ");
            let text = SURFACE_LINK_REGEX.replace_all(&text, "$1");
            let text = PIPE_REMNANT_REGEX.replace_all(&text, " $2");
            let text = BRACKET_REGEX.replace_all(&text, " ");
            QUOTE_REGEX.replace_all(&text, "").into_owned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_detected_with_target() {
        let model = PageTextModel::new("#REDIRECT [[Target Page]]");
        assert!(model.is_redirect());
        assert_eq!(model.redirect_target(), Some("Target Page"));
    }

    #[test]
    fn redirect_keyword_is_case_sensitive() {
        let model = PageTextModel::new("#redirect [[Target Page]]");
        assert!(!model.is_redirect());
    }

    #[test]
    fn redirect_flexible_whitespace() {
        let model = PageTextModel::new("#REDIRECT[[Target]]");
        assert_eq!(model.redirect_target(), Some("Target"));
        let model = PageTextModel::new("#REDIRECT   [[Target]]");
        assert_eq!(model.redirect_target(), Some("Target"));
    }

    #[test]
    fn redirect_target_drops_label() {
        let model = PageTextModel::new("#REDIRECT [[Target|label]]");
        assert_eq!(model.redirect_target(), Some("Target"));
    }

    #[test]
    fn stub_marker() {
        assert!(PageTextModel::new("Some text.\n{{France-geo-stub}}").is_stub());
        assert!(!PageTextModel::new("Some text.").is_stub());
    }

    #[test]
    fn categories_keep_name_before_sort_key() {
        let model = PageTextModel::new("[[Category:People|Smith, John]]\n[[Category:Physics]]");
        assert_eq!(model.categories(), ["People", "Physics"]);
    }

    #[test]
    fn links_skip_namespaced_targets() {
        let model =
            PageTextModel::new("[[Rust]] and [[File:Logo.png]] and [[Python|the snake one]]");
        assert_eq!(model.links(), ["Rust", "Python"]);
    }

    #[test]
    fn plain_text_strips_refs_templates_and_links() {
        let model = PageTextModel::new(
            "'''Rust'''<ref>cite</ref> is a {{lang|en|systems}} language. See [[Python (programming language)|Python]].",
        );
        let plain = model.plain_text();
        assert!(!plain.contains("cite"));
        assert!(!plain.contains("{{"));
        assert!(!plain.contains("[["));
        assert!(!plain.contains("'''"));
        assert!(plain.contains("Rust"));
        assert!(plain.contains("Python"));
    }

    #[test]
    fn plain_text_strips_file_links_but_keeps_surface_links() {
        let model = PageTextModel::new("[[File:X.jpg|thumb]] and [[Rust]]");
        let plain = model.plain_text();
        assert!(!plain.contains("X.jpg"));
        assert!(plain.contains("Rust"));
    }

    #[test]
    fn plain_text_memoized() {
        let model = PageTextModel::new("text '''bold'''");
        let first = model.plain_text() as *const str;
        let second = model.plain_text() as *const str;
        assert_eq!(first, second);
    }
}
