//! The parsed-markup node tree. The wikitext grammar's node vocabulary is
//! fixed and finite, so the hierarchy is a closed tagged union dispatched by
//! a single visitor rather than an open class hierarchy.

/// One node of a page's parsed markup.
#[derive(Debug, Clone, PartialEq)]
pub enum WikiNode {
    /// Document root; children are the lead content followed by sections.
    Document(Vec<WikiNode>),
    /// `== heading ==` and the content up to the next heading.
    Section {
        level: u8,
        title: String,
        body: Vec<WikiNode>,
    },
    /// A run of content delimited by blank lines.
    Paragraph(Vec<WikiNode>),
    /// `'''bold'''` span.
    Bold(Vec<WikiNode>),
    /// `''italic''` span.
    Italic(Vec<WikiNode>),
    /// `[[target|label]]` internal link. The label is parsed content; an
    /// unlabeled link has an empty label.
    Link { target: String, label: Vec<WikiNode> },
    /// External URL; renders as `protocol:path`.
    Url { protocol: String, path: String },
    /// `{{name|args}}` template invocation. Arguments are half-parsed: raw
    /// strings split at top-level pipes, with `name=value` pairs recorded.
    Template {
        name: String,
        args: Vec<TemplateArg>,
    },
    /// `#REDIRECT [[target]]` directive.
    Redirect { target: String },
    /// Decoded numeric character reference (`&#233;`).
    CharRef(char),
    /// Named entity reference (`&amp;`), resolved at render time.
    EntityRef(String),
    /// Literal text.
    Text(String),
    /// A run of whitespace; renders as a single space.
    Whitespace,
}

/// One template argument, kept as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateArg {
    /// Set for `name=value` arguments.
    pub name: Option<String>,
    pub value: String,
}

impl TemplateArg {
    pub fn positional(value: impl Into<String>) -> TemplateArg {
        TemplateArg {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> TemplateArg {
        TemplateArg {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    /// Argument text with escaped pipes (`{{!}}`) restored.
    pub fn text(&self) -> String {
        self.value.replace("{{!}}", "|")
    }

    /// The link surface of this argument: bracket markup is removed and,
    /// when the argument carries a `link|label` pair, the label wins over
    /// the link target.
    pub fn surface(&self) -> String {
        let text = self.text().replace("[[", "").replace("]]", "");
        let surface = match text.rfind('|') {
            Some(i) => &text[i + 1..],
            None => &text[..],
        };
        surface.trim().to_string()
    }
}
