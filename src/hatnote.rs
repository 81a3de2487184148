//! Declarative rule table for hat-note templates.
//!
//! Each recognized template name maps to a [`HatNoteRule`] describing how its
//! positional arguments relate to the page title. The extraction engine
//! (`visitor`) interprets the patterns; this module is pure data plus lookup,
//! so the rule set can be audited and extended without touching the engine.
//! The rules are reconstructed best-effort from observed template usage and
//! may not cover every real invocation.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Sentinel for "every remaining argument" in a pattern.
pub const ALL_ARGS: usize = usize::MAX;

/// How a template's positional arguments produce aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePattern {
    /// Page title aliased to each argument from `from`, stepping by `step`.
    /// `{{About|USE1|USE2|PAGE2|USE3|PAGE3}}` names pages at 2, 4, ...
    TitleToArgs { from: usize, step: usize },
    /// Up to `count` arguments starting at `from` are each aliased to the
    /// page title.
    ArgsToTitle { from: usize, count: usize },
    /// Like [`RulePattern::ArgsToTitle`] but each pair is emitted in both
    /// directions, for "distinguished-from" style templates.
    Bidirectional { from: usize, count: usize },
    /// The first `redirects` arguments are redirect sources aliased to the
    /// title; remaining `(use, page)` pairs alias the title to each `page`.
    RedirectThenPages { redirects: usize },
    /// Argument 0 is aliased to the title and to every later argument.
    RedirectDistinguish,
    /// Argument 0 embeds redirect names in double quotes; each quoted
    /// segment is aliased to the title.
    QuotedSources,
    /// Wiki links inside the argument text alias the title to their surface
    /// form. `arg` selects one argument, or [`ALL_ARGS`] for all of them.
    LinksInText { arg: usize },
    /// Biographical alternate-names extraction from named fields.
    PersonData,
    /// Arity-checked but produces no aliases.
    Recognized,
}

#[derive(Debug, Clone, Copy)]
pub struct HatNoteRule {
    pub min_args: usize,
    pub max_args: usize,
    /// Patterns apply only at exactly this argument count, when set.
    pub when_args: Option<usize>,
    pub patterns: &'static [RulePattern],
}

impl HatNoteRule {
    const fn new(min_args: usize, max_args: usize, patterns: &'static [RulePattern]) -> Self {
        HatNoteRule {
            min_args,
            max_args,
            when_args: None,
            patterns,
        }
    }

    const fn when(mut self, args: usize) -> Self {
        self.when_args = Some(args);
        self
    }
}

use RulePattern::*;

#[rustfmt::skip]
static RULES: &[(&str, HatNoteRule)] = &[
    ("hatnote",                 HatNoteRule::new(1, 1, &[LinksInText { arg: ALL_ARGS }])),
    ("rellink",                 HatNoteRule::new(1, 1, &[LinksInText { arg: ALL_ARGS }])),
    ("about",                   HatNoteRule::new(0, 9, &[TitleToArgs { from: 2, step: 2 }])),
    ("two other uses",          HatNoteRule::new(0, 9, &[TitleToArgs { from: 2, step: 2 }])),
    ("three other uses",        HatNoteRule::new(0, 9, &[TitleToArgs { from: 2, step: 2 }])),
    ("for",                     HatNoteRule::new(1, 4, &[TitleToArgs { from: 1, step: 1 }])),
    ("for2",                    HatNoteRule::new(2, 2, &[LinksInText { arg: 1 }])),
    ("common name for",         HatNoteRule::new(1, 2, &[TitleToArgs { from: 0, step: ALL_ARGS }])),
    ("other uses",              HatNoteRule::new(0, 2, &[ArgsToTitle { from: 0, count: ALL_ARGS }])),
    ("other uses2",             HatNoteRule::new(1, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("other uses of",           HatNoteRule::new(0, 2, &[ArgsToTitle { from: 1, count: 1 }])),
    ("redirect",                HatNoteRule::new(1, 7, &[RedirectThenPages { redirects: 1 }])),
    ("redirect6",               HatNoteRule::new(1, 7, &[RedirectThenPages { redirects: 1 }])),
    ("redirect2",               HatNoteRule::new(2, 10, &[RedirectThenPages { redirects: 2 }])),
    ("redirect3",               HatNoteRule::new(2, 2, &[ArgsToTitle { from: 0, count: 1 }])),
    ("redirect4",               HatNoteRule::new(2, 2, &[ArgsToTitle { from: 0, count: ALL_ARGS }])),
    ("redirect10",              HatNoteRule::new(3, 3, &[ArgsToTitle { from: 0, count: ALL_ARGS }])),
    ("redirect text",           HatNoteRule::new(1, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("redirect7",               HatNoteRule::new(5, 5, &[QuotedSources])),
    ("redirect-synonym",        HatNoteRule::new(2, 2, &[RedirectDistinguish])),
    ("redirect-distinguish",    HatNoteRule::new(2, 5, &[RedirectDistinguish])),
    ("redirect-distinguish2",   HatNoteRule::new(2, 2, &[RedirectDistinguish])),
    ("consider disambiguation", HatNoteRule::new(3, 4, &[
        Bidirectional { from: 2, count: 1 },
        ArgsToTitle { from: 3, count: 1 },
    ])),
    ("other people",            HatNoteRule::new(0, 3, &[ArgsToTitle { from: 0, count: 2 }])),
    ("other people2",           HatNoteRule::new(1, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("other people3",           HatNoteRule::new(0, 3, &[Bidirectional { from: 0, count: 1 }]).when(3)),
    ("other people5",           HatNoteRule::new(1, 4, &[Bidirectional { from: 0, count: ALL_ARGS }])),
    ("other places",            HatNoteRule::new(0, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("other places3",           HatNoteRule::new(1, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("other hurricanes",        HatNoteRule::new(1, 2, &[ArgsToTitle { from: 0, count: 1 }])),
    ("other ships",             HatNoteRule::new(1, 1, &[ArgsToTitle { from: 0, count: 1 }])),
    ("persondata",              HatNoteRule::new(0, 12, &[PersonData])),
    ("distinguish",             HatNoteRule::new(1, 4, &[Recognized])),
    ("distinguish2",            HatNoteRule::new(1, 1, &[Recognized])),
    ("details",                 HatNoteRule::new(1, 2, &[Recognized])),
    ("details3",                HatNoteRule::new(1, 3, &[Recognized])),
    ("further",                 HatNoteRule::new(1, 9, &[Recognized])),
    ("further2",                HatNoteRule::new(1, 9, &[Recognized])),
    ("see also",                HatNoteRule::new(1, 9, &[Recognized])),
    ("see also2",               HatNoteRule::new(1, 9, &[Recognized])),
    ("see for",                 HatNoteRule::new(2, 3, &[Recognized])),
    ("solename",                HatNoteRule::new(0, 1, &[Recognized])),
];

static RULE_INDEX: Lazy<HashMap<&'static str, &'static HatNoteRule>> =
    Lazy::new(|| RULES.iter().map(|(name, rule)| (*name, rule)).collect());

/// Case-insensitive rule lookup by template name.
pub fn lookup(name: &str) -> Option<&'static HatNoteRule> {
    let key = name.trim().to_ascii_lowercase();
    RULE_INDEX.get(key.as_str()).copied()
}

/// Templates that mark a page as a disambiguation page.
pub fn is_disambiguation_marker(name: &str) -> bool {
    let key = name.trim().to_ascii_lowercase();
    matches!(
        key.as_str(),
        "disambiguation" | "disambig" | "disamb" | "dab" | "geodis" | "hndis"
    ) || key.ends_with(" disambiguation")
}

/// Templates that request a lowercased display title (e.g. iPod).
pub fn is_lowercase_marker(name: &str) -> bool {
    matches!(
        name.trim().to_ascii_lowercase().as_str(),
        "lowercase title" | "lowercase"
    )
}
