use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One `<page>` element from the dump. Immutable once constructed; a page is
/// discarded after a single extraction pass.
#[derive(Debug, Clone)]
pub struct WikiPage {
    pub id: Option<String>,
    pub title: String,
    /// Raw wikitext of the latest revision. A page with no body is valid and
    /// simply yields no aliases beyond the title identity.
    pub text: Option<String>,
}

/// Classification of an extracted alias relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AliasType {
    /// Identity relation from the page title to itself.
    Title,
    /// Pages carrying the `{{lowercase title}}` template (iPod, gzip) alias
    /// the stored upper-case title to its lower-cased variant.
    LowercaseTitle,
    /// Internal link surface text aliased to the link target.
    Link,
    /// `#REDIRECT [[target]]` directive; the redirecting title aliases the
    /// target page.
    Redirect,
    /// Bold text in the first non-empty paragraph, aliased to the page title.
    P1Bold,
    /// Bold text in the second non-empty paragraph. Improves recall at the
    /// expense of precision.
    P2Bold,
    /// Bold text anywhere before the first section heading.
    S1Bold,
    /// On disambiguation pages, every link surface collected from the page
    /// is aliased to the page title.
    DabTitle,
    /// Reserved for redirects onto disambiguation pages. Never produced;
    /// kept so the wire vocabulary matches the published type set.
    DabRedirect,
    /// Relations extracted from hat-note templates ({{About}}, {{Redirect}},
    /// {{Other uses}}, ...).
    HatNote,
    /// Derived by iteratively stripping trailing disambiguating clauses
    /// (parenthesised or comma-introduced) from another alias's source.
    Truncated,
    /// Alternative names from the biographical {{Persondata}} template,
    /// including comma reorderings ("Last, First" -> "First Last").
    PersonAltName,
}

impl AliasType {
    pub const ALL: [AliasType; 12] = [
        AliasType::Title,
        AliasType::LowercaseTitle,
        AliasType::Link,
        AliasType::Redirect,
        AliasType::P1Bold,
        AliasType::P2Bold,
        AliasType::S1Bold,
        AliasType::DabTitle,
        AliasType::DabRedirect,
        AliasType::HatNote,
        AliasType::Truncated,
        AliasType::PersonAltName,
    ];

    /// Wire name, as used in serialized output and the `--types` flag.
    pub const fn name(self) -> &'static str {
        match self {
            AliasType::Title => "TITLE",
            AliasType::LowercaseTitle => "LOWERCASE_TITLE",
            AliasType::Link => "LINK",
            AliasType::Redirect => "REDIRECT",
            AliasType::P1Bold => "P1BOLD",
            AliasType::P2Bold => "P2BOLD",
            AliasType::S1Bold => "S1BOLD",
            AliasType::DabTitle => "DAB_TITLE",
            AliasType::DabRedirect => "DAB_REDIRECT",
            AliasType::HatNote => "HAT_NOTE",
            AliasType::Truncated => "TRUNCATED",
            AliasType::PersonAltName => "PERSON_ALT_NAME",
        }
    }

    pub fn from_name(name: &str) -> Option<AliasType> {
        AliasType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AliasType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AliasType::from_name(s).ok_or_else(|| format!("unknown alias type: {}", s))
    }
}

impl Serialize for AliasType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A fixed set of [`AliasType`] values, packed into a bitmask so presets can
/// be plain `const` items rather than lazily-initialized collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AliasTypeSet(u16);

impl AliasTypeSet {
    pub const EMPTY: AliasTypeSet = AliasTypeSet(0);

    /// Every type in the enumeration, including the reserved ones.
    pub const ALL: AliasTypeSet = AliasTypeSet::of(&AliasType::ALL);

    /// The type set proposed in Hachey et al. (2012), "Evaluating Entity
    /// Linking with Wikipedia".
    pub const HACKEY: AliasTypeSet = AliasTypeSet::of(&[
        AliasType::Title,
        AliasType::LowercaseTitle,
        AliasType::Link,
        AliasType::Redirect,
        AliasType::P1Bold,
        AliasType::DabTitle,
        AliasType::HatNote,
        AliasType::Truncated,
    ]);

    /// Practical default: the Hackey set plus first-section bold text and
    /// biographical alternative names.
    pub const STANDARD: AliasTypeSet = AliasTypeSet::HACKEY
        .with(AliasType::S1Bold)
        .with(AliasType::PersonAltName);

    pub const fn of(types: &[AliasType]) -> AliasTypeSet {
        let mut bits = 0u16;
        let mut i = 0;
        while i < types.len() {
            bits |= 1 << (types[i] as u16);
            i += 1;
        }
        AliasTypeSet(bits)
    }

    pub const fn with(self, t: AliasType) -> AliasTypeSet {
        AliasTypeSet(self.0 | (1 << (t as u16)))
    }

    pub const fn contains(self, t: AliasType) -> bool {
        self.0 & (1 << (t as u16)) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = AliasType> {
        AliasType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<AliasType> for AliasTypeSet {
    fn from_iter<I: IntoIterator<Item = AliasType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(AliasTypeSet::EMPTY, |set, t| set.with(t))
    }
}

/// A classified alias relation: `source` denotes the same (or a related)
/// entity as `target`. Structurally immutable; equality and hashing cover
/// all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Alias {
    #[serde(rename = "type")]
    pub kind: AliasType,
    pub subtype: String,
    pub source: String,
    pub target: String,
}

impl Alias {
    /// Empty-string sentinel used when an alias carries no subtype.
    pub const NO_SUBTYPE: &'static str = "";

    pub fn new(
        kind: AliasType,
        subtype: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Alias {
        Alias {
            kind,
            subtype: subtype.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subtype.is_empty() {
            write!(f, "{}[{} => {}]", self.kind, self.source, self.target)
        } else {
            write!(
                f,
                "{}/{}[{} => {}]",
                self.kind, self.subtype, self.source, self.target
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_is_hackey_plus_two() {
        for t in AliasTypeSet::HACKEY.iter() {
            assert!(AliasTypeSet::STANDARD.contains(t));
        }
        assert!(AliasTypeSet::STANDARD.contains(AliasType::S1Bold));
        assert!(AliasTypeSet::STANDARD.contains(AliasType::PersonAltName));
        assert!(!AliasTypeSet::HACKEY.contains(AliasType::S1Bold));
        assert!(!AliasTypeSet::HACKEY.contains(AliasType::PersonAltName));
    }

    #[test]
    fn presets_never_produce_reserved_type() {
        assert!(!AliasTypeSet::STANDARD.contains(AliasType::DabRedirect));
        assert!(!AliasTypeSet::HACKEY.contains(AliasType::DabRedirect));
    }

    #[test]
    fn empty_set_is_empty() {
        assert!(AliasTypeSet::EMPTY.is_empty());
        assert!(!AliasTypeSet::STANDARD.is_empty());
    }

    #[test]
    fn name_round_trip() {
        for t in AliasType::ALL {
            assert_eq!(AliasType::from_name(t.name()), Some(t));
        }
        assert_eq!(AliasType::from_name("hat_note"), Some(AliasType::HatNote));
        assert_eq!(AliasType::from_name("bogus"), None);
    }

    #[test]
    fn alias_display_includes_subtype() {
        let a = Alias::new(AliasType::HatNote, "about", "Foo", "Bar");
        assert_eq!(a.to_string(), "HAT_NOTE/about[Foo => Bar]");
        let b = Alias::new(AliasType::Link, Alias::NO_SUBTYPE, "Foo", "Bar");
        assert_eq!(b.to_string(), "LINK[Foo => Bar]");
    }

    #[test]
    fn alias_equality_is_structural() {
        let a = Alias::new(AliasType::Link, "", "A", "B");
        let b = Alias::new(AliasType::Link, "", "A", "B");
        let c = Alias::new(AliasType::Redirect, "", "A", "B");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
