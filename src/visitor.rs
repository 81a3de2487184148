//! Walks one page's [`WikiNode`] tree and produces its [`Alias`] records.
//!
//! A visitor is single-use: construct one per page, run it over the parsed
//! tree, and collect the aliases. Page-scoped state (paragraph and section
//! counters, open surface accumulators, collected link surfaces) lives on
//! the visitor and is discarded with it.

use crate::ast::{TemplateArg, WikiNode};
use crate::hatnote::{self, HatNoteRule, RulePattern, ALL_ARGS};
use crate::models::{Alias, AliasType, AliasTypeSet};
use crate::title::{
    first_char_to_lowercase, strip_namespaces, strip_suffix_ignore_case, title_variants,
    DISAMBIGUATION_SUFFIX,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

static WIKI_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+?)\]\]").unwrap());

pub struct AliasVisitor {
    title: String,
    produce: AliasTypeSet,
    paragraphs: u32,
    sections: u32,
    lowercase_title: bool,
    /// Stack of open surface accumulators; leaves append to every entry.
    accumulators: Vec<String>,
    /// Link surfaces seen so far, in first-seen order.
    link_surfaces: Vec<String>,
    unknown_templates: HashSet<String>,
    out: Vec<Alias>,
}

impl AliasVisitor {
    pub fn new(title: &str, produce: AliasTypeSet) -> AliasVisitor {
        AliasVisitor {
            title: title.trim().to_string(),
            produce,
            paragraphs: 0,
            sections: 0,
            lowercase_title: false,
            accumulators: Vec::new(),
            link_surfaces: Vec::new(),
            unknown_templates: HashSet::new(),
            out: Vec::new(),
        }
    }

    /// Consumes the visitor, traversing `root` and finalizing.
    pub fn run(mut self, root: &WikiNode) -> Vec<Alias> {
        self.visit(root);
        self.finish();
        self.out
    }

    fn visit(&mut self, node: &WikiNode) {
        match node {
            WikiNode::Document(children) => {
                for child in children {
                    self.visit(child);
                }
            }
            WikiNode::Section { body, .. } => {
                self.sections += 1;
                for child in body {
                    self.visit(child);
                }
            }
            WikiNode::Paragraph(content) => {
                let text = self.capture(content);
                if !text.trim().is_empty() {
                    self.paragraphs += 1;
                }
            }
            WikiNode::Bold(content) => {
                let text = self.capture(content);
                let text = text.trim();
                if !text.is_empty() {
                    if self.paragraphs == 0 {
                        self.page_title_alias(AliasType::P1Bold, Alias::NO_SUBTYPE, text, None);
                    } else if self.paragraphs == 1 {
                        self.page_title_alias(AliasType::P2Bold, Alias::NO_SUBTYPE, text, None);
                    }
                    if self.sections == 0 {
                        self.page_title_alias(AliasType::S1Bold, Alias::NO_SUBTYPE, text, None);
                    }
                }
            }
            WikiNode::Italic(content) => {
                for child in content {
                    self.visit(child);
                }
            }
            WikiNode::Link { target, label } => {
                let surface = self.capture(label);
                let surface = surface.trim().to_string();
                if surface.is_empty() {
                    // No display title; the raw target is the surface, and
                    // the enclosing accumulators still see it.
                    self.append_leaf(target);
                    self.record_link_surface(target);
                    self.page_title_alias(
                        AliasType::Link,
                        Alias::NO_SUBTYPE,
                        target,
                        Some(target.as_str()),
                    );
                } else {
                    self.record_link_surface(&surface);
                    self.page_title_alias(
                        AliasType::Link,
                        Alias::NO_SUBTYPE,
                        &surface,
                        Some(target.as_str()),
                    );
                }
            }
            WikiNode::Url { protocol, path } => {
                let rendered = format!("{}:{}", protocol, path);
                self.append_leaf(&rendered);
            }
            WikiNode::Template { name, args } => self.visit_template(name, args),
            WikiNode::Redirect { target } => {
                let title = self.title.clone();
                self.page_title_alias(
                    AliasType::Redirect,
                    Alias::NO_SUBTYPE,
                    &title,
                    Some(target.as_str()),
                );
            }
            WikiNode::CharRef(c) => {
                let mut buf = [0u8; 4];
                let s: &str = c.encode_utf8(&mut buf);
                self.append_leaf(s);
            }
            WikiNode::EntityRef(name) => {
                let rendered = resolve_entity(name);
                self.append_leaf(&rendered);
            }
            WikiNode::Text(s) => self.append_leaf(s),
            WikiNode::Whitespace => self.append_leaf(" "),
        }
    }

    /// Traverses `content` under a fresh accumulator and returns its
    /// rendered surface text.
    fn capture(&mut self, content: &[WikiNode]) -> String {
        self.accumulators.push(String::new());
        for child in content {
            self.visit(child);
        }
        self.accumulators.pop().unwrap_or_default()
    }

    fn append_leaf(&mut self, s: &str) {
        for acc in &mut self.accumulators {
            acc.push_str(s);
        }
    }

    fn record_link_surface(&mut self, surface: &str) {
        if !self.link_surfaces.iter().any(|s| s == surface) {
            self.link_surfaces.push(surface.to_string());
        }
    }

    fn visit_template(&mut self, name: &str, args: &[TemplateArg]) {
        if hatnote::is_lowercase_marker(name) {
            self.lowercase_title = true;
            return;
        }
        if hatnote::is_disambiguation_marker(name) {
            let title = self.title.clone();
            for surface in self.link_surfaces.clone() {
                self.page_title_alias(
                    AliasType::DabTitle,
                    Alias::NO_SUBTYPE,
                    &surface,
                    Some(title.as_str()),
                );
            }
            return;
        }
        match hatnote::lookup(name) {
            Some(rule) => self.apply_rule(name, rule, args),
            None => {
                let key = name.trim().to_ascii_lowercase();
                if !key.is_empty() && self.unknown_templates.insert(key) {
                    tracing::debug!(template = %name.trim(), "unrecognized template");
                }
            }
        }
    }

    fn apply_rule(&mut self, name: &str, rule: &HatNoteRule, args: &[TemplateArg]) {
        let count = args.len();
        if count < rule.min_args || count > rule.max_args {
            tracing::warn!(
                template = %name.trim(),
                args = count,
                expected_min = rule.min_args,
                expected_max = rule.max_args,
                "template argument count outside expected range"
            );
        }
        if let Some(required) = rule.when_args {
            if count != required {
                return;
            }
        }
        let subtype = name.trim().to_ascii_lowercase();
        for pattern in rule.patterns {
            self.apply_pattern(*pattern, &subtype, args);
        }
    }

    fn apply_pattern(&mut self, pattern: RulePattern, subtype: &str, args: &[TemplateArg]) {
        let title = self.title.clone();
        match pattern {
            RulePattern::TitleToArgs { from, step } => {
                let mut i = from;
                while i < args.len() {
                    let page = args[i].surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &title, Some(page.as_str()));
                    if step == ALL_ARGS {
                        break;
                    }
                    i += step;
                }
            }
            RulePattern::ArgsToTitle { from, count } => {
                for arg in args.iter().skip(from).take(count) {
                    let source = arg.surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &source, Some(title.as_str()));
                }
            }
            RulePattern::Bidirectional { from, count } => {
                for arg in args.iter().skip(from).take(count) {
                    let other = arg.surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &other, Some(title.as_str()));
                    self.page_title_alias(AliasType::HatNote, subtype, &title, Some(other.as_str()));
                }
            }
            RulePattern::RedirectThenPages { redirects } => {
                for arg in args.iter().take(redirects) {
                    let source = arg.surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &source, Some(title.as_str()));
                }
                let mut i = redirects;
                while i + 1 < args.len() {
                    let page = args[i + 1].surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &title, Some(page.as_str()));
                    i += 2;
                }
            }
            RulePattern::RedirectDistinguish => {
                let Some(first) = args.first() else { return };
                let source = first.surface();
                self.page_title_alias(AliasType::HatNote, subtype, &source, Some(title.as_str()));
                for arg in args.iter().skip(1) {
                    let other = arg.surface();
                    self.page_title_alias(AliasType::HatNote, subtype, &source, Some(other.as_str()));
                }
            }
            RulePattern::QuotedSources => {
                let Some(first) = args.first() else { return };
                let text = first.text();
                for (i, segment) in text.split('"').enumerate() {
                    if i % 2 == 1 {
                        self.page_title_alias(AliasType::HatNote, subtype, segment, Some(title.as_str()));
                    }
                }
            }
            RulePattern::LinksInText { arg } => {
                let scan = |value: &str, out: &mut Vec<String>| {
                    for caps in WIKI_LINK_REGEX.captures_iter(value) {
                        let inner = &caps[1];
                        let surface = match inner.rfind('|') {
                            Some(p) => &inner[p + 1..],
                            None => inner,
                        };
                        out.push(surface.trim().to_string());
                    }
                };
                let mut surfaces = Vec::new();
                if arg == ALL_ARGS {
                    for a in args {
                        scan(&a.text(), &mut surfaces);
                    }
                } else if let Some(a) = args.get(arg) {
                    scan(&a.text(), &mut surfaces);
                }
                for surface in surfaces {
                    self.page_title_alias(AliasType::HatNote, subtype, &title, Some(surface.as_str()));
                }
            }
            RulePattern::PersonData => self.apply_persondata(args),
            RulePattern::Recognized => {}
        }
    }

    fn apply_persondata(&mut self, args: &[TemplateArg]) {
        let field = |wanted: &str| {
            args.iter()
                .find(|a| {
                    a.name
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case(wanted))
                })
                .map(|a| a.value.clone())
        };

        // Both fields must be filled in; a lone NAME carries no alternative
        // names worth aliasing.
        let (Some(name), Some(alternatives)) = (field("NAME"), field("ALTERNATIVE NAMES")) else {
            return;
        };
        if name.trim().is_empty() || alternatives.trim().is_empty() {
            return;
        }

        let mut names: BTreeSet<String> = BTreeSet::new();
        names.extend(person_name_forms(&name));
        for alt in alternatives.split(';') {
            names.extend(person_name_forms(alt));
        }

        let title = self.title.clone();
        for name in names {
            self.add_alias(AliasType::PersonAltName, Alias::NO_SUBTYPE, &name, &title);
        }
    }

    /// The single emission path for page-relative aliases. Applies the
    /// shared cleanup rules, then the type filter, then derives truncated
    /// title variants of the cleaned source.
    fn page_title_alias(
        &mut self,
        kind: AliasType,
        subtype: &str,
        source: &str,
        target: Option<&str>,
    ) {
        let title = self.title.clone();
        let target = target.unwrap_or(&title);
        // Sub-section references are too ambiguous to alias.
        if target.contains('#') {
            return;
        }
        let source = strip_suffix_ignore_case(source.trim(), DISAMBIGUATION_SUFFIX);
        let target = strip_suffix_ignore_case(target.trim(), DISAMBIGUATION_SUFFIX);
        let source = strip_namespaces(source).trim();
        let target = strip_namespaces(target).trim();
        if source.is_empty() || target.is_empty() {
            return;
        }
        self.add_alias(kind, subtype, source, target);
        if self.produce.contains(AliasType::Truncated) {
            let provenance = if subtype.is_empty() {
                kind.name().to_string()
            } else {
                format!("{}/{}", kind.name(), subtype)
            };
            for variant in title_variants(source) {
                self.out.push(Alias::new(
                    AliasType::Truncated,
                    provenance.clone(),
                    variant,
                    target,
                ));
            }
        }
    }

    fn add_alias(&mut self, kind: AliasType, subtype: &str, source: &str, target: &str) {
        if self.produce.contains(kind) {
            self.out.push(Alias::new(kind, subtype, source, target));
        }
    }

    /// Runs once per page after traversal.
    fn finish(&mut self) {
        let title = self.title.clone();
        self.page_title_alias(AliasType::Title, Alias::NO_SUBTYPE, &title, None);
        if self.lowercase_title {
            let lower = first_char_to_lowercase(&title);
            self.page_title_alias(AliasType::LowercaseTitle, Alias::NO_SUBTYPE, &title, Some(lower.as_str()));
            self.page_title_alias(AliasType::LowercaseTitle, Alias::NO_SUBTYPE, &lower, Some(lower.as_str()));
        }
    }
}

/// Expands one biographical name into its alias forms: the name itself,
/// the `Last, First` reordering, and for a second comma the leading
/// `Last, First` pair, the epithet tail, and the recombined
/// `First Last, Epithet` form.
fn person_name_forms(name: &str) -> Vec<String> {
    let base = match name.find('(') {
        Some(p) => name[..p].trim(),
        None => name.trim(),
    };
    if base.is_empty() {
        return Vec::new();
    }
    let mut forms = vec![base.to_string()];
    let parts: Vec<&str> = base.split(',').map(str::trim).collect();
    if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        let reordered = format!("{} {}", parts[1], parts[0]);
        if parts.len() >= 3 {
            forms.push(parts[..2].join(", "));
            let epithet = parts[2..].join(", ");
            if !epithet.is_empty() {
                forms.push(epithet.clone());
                forms.push(format!("{}, {}", reordered, epithet));
            }
        }
        forms.push(reordered);
    }
    forms
}

fn resolve_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => " ".to_string(),
        "ndash" => "\u{2013}".to_string(),
        "mdash" => "\u{2014}".to_string(),
        other => format!("&{};", other),
    }
}
