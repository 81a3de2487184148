//! Structural wikitext parser: converts one page's raw markup into a
//! [`WikiNode`] tree. The extraction engine depends only on the tree, never
//! on this module's internals.
//!
//! The grammar coverage is deliberately partial: sections, paragraphs,
//! bold/italic spans, internal links, templates, URLs and character
//! references are modelled; table markup and HTML tags are dropped. That is
//! the vocabulary the alias extraction rules consume.

use crate::ast::{TemplateArg, WikiNode};
use crate::error::ParseError;
use crate::textmodel::REDIRECT_REGEX;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pages nested deeper than this fail with [`ParseError::TooDeep`] rather
/// than recursing unboundedly on adversarial markup.
pub const MAX_NESTING_DEPTH: usize = 64;

static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(={2,})\s*(.+?)\s*={2,}$").unwrap());

/// Parses a full page body. A leading `#REDIRECT [[target]]` directive
/// becomes a [`WikiNode::Redirect`]; `== heading ==` lines open sections;
/// blank lines split paragraphs.
pub fn parse_document(text: &str) -> Result<WikiNode, ParseError> {
    let mut children: Vec<WikiNode> = Vec::new();
    let mut rest: &str = text;

    if text.trim_start().starts_with("#REDIRECT") {
        if let Some(caps) = REDIRECT_REGEX.captures(text) {
            let target = caps[1].split('|').next().unwrap_or("").trim().to_string();
            children.push(WikiNode::Redirect { target });
            if let Some(m) = caps.get(0) {
                rest = &text[m.end()..];
            }
        }
    }

    let mut section: Option<(u8, String)> = None;
    let mut section_body: Vec<WikiNode> = Vec::new();
    let mut para_lines: Vec<String> = Vec::new();

    for line in rest.lines() {
        if let Some((level, title)) = parse_heading(line) {
            if section.is_some() {
                flush_paragraph(&mut para_lines, &mut section_body)?;
            } else {
                flush_paragraph(&mut para_lines, &mut children)?;
            }
            if let Some((prev_level, prev_title)) = section.take() {
                children.push(WikiNode::Section {
                    level: prev_level,
                    title: prev_title,
                    body: std::mem::take(&mut section_body),
                });
            }
            section = Some((level, title));
        } else if line.trim().is_empty() {
            if section.is_some() {
                flush_paragraph(&mut para_lines, &mut section_body)?;
            } else {
                flush_paragraph(&mut para_lines, &mut children)?;
            }
        } else {
            para_lines.push(strip_list_markers(line).to_string());
        }
    }

    if section.is_some() {
        flush_paragraph(&mut para_lines, &mut section_body)?;
    } else {
        flush_paragraph(&mut para_lines, &mut children)?;
    }
    if let Some((level, title)) = section.take() {
        children.push(WikiNode::Section {
            level,
            title,
            body: section_body,
        });
    }

    Ok(WikiNode::Document(children))
}

fn parse_heading(line: &str) -> Option<(u8, String)> {
    let caps = HEADING_REGEX.captures(line.trim())?;
    let level = caps[1].len().min(6) as u8;
    Some((level, caps[2].to_string()))
}

/// List markup (`*`, `#`, `:`, `;`) is presentation only; the item content
/// stays part of the surrounding paragraph.
fn strip_list_markers(line: &str) -> &str {
    line.trim_start()
        .trim_start_matches(|c| matches!(c, '*' | '#' | ':' | ';'))
}

fn flush_paragraph(lines: &mut Vec<String>, out: &mut Vec<WikiNode>) -> Result<(), ParseError> {
    if lines.is_empty() {
        return Ok(());
    }
    let text = lines.join("\n");
    lines.clear();
    out.push(WikiNode::Paragraph(parse_inline(&text, 0)?));
    Ok(())
}

fn parse_inline(text: &str, depth: usize) -> Result<Vec<WikiNode>, ParseError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ParseError::TooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }

    let bytes = text.as_bytes();
    let mut nodes: Vec<WikiNode> = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];

        if rest.starts_with("'''") {
            match rest[3..].find("'''") {
                Some(end) => {
                    flush_literal(&mut literal, &mut nodes);
                    let inner = parse_inline(&rest[3..3 + end], depth + 1)?;
                    nodes.push(WikiNode::Bold(inner));
                    i += 3 + end + 3;
                }
                None => {
                    literal.push_str("'''");
                    i += 3;
                }
            }
        } else if rest.starts_with("''") {
            match rest[2..].find("''") {
                Some(end) => {
                    flush_literal(&mut literal, &mut nodes);
                    let inner = parse_inline(&rest[2..2 + end], depth + 1)?;
                    nodes.push(WikiNode::Italic(inner));
                    i += 2 + end + 2;
                }
                None => {
                    literal.push_str("''");
                    i += 2;
                }
            }
        } else if rest.starts_with("[[") {
            match find_matching(rest.as_bytes(), b"[[", b"]]") {
                Some(close) => {
                    flush_literal(&mut literal, &mut nodes);
                    let inner = &rest[2..close];
                    let (target, label) = match inner.find('|') {
                        Some(p) => (&inner[..p], Some(&inner[p + 1..])),
                        None => (inner, None),
                    };
                    let label = match label {
                        Some(l) => parse_inline(l, depth + 1)?,
                        None => Vec::new(),
                    };
                    nodes.push(WikiNode::Link {
                        target: target.trim().to_string(),
                        label,
                    });
                    i += close + 2;
                }
                None => {
                    literal.push_str("[[");
                    i += 2;
                }
            }
        } else if rest.starts_with("{{") {
            match find_matching(rest.as_bytes(), b"{{", b"}}") {
                Some(close) => {
                    flush_literal(&mut literal, &mut nodes);
                    nodes.push(parse_template(&rest[2..close]));
                    i += close + 2;
                }
                None => {
                    literal.push_str("{{");
                    i += 2;
                }
            }
        } else if bytes[i] == b'[' {
            // Bracketed external link; renders as a footnote marker, so it
            // contributes nothing to surface text.
            if match_url(&rest[1..]).is_some() {
                match rest.find(']') {
                    Some(close) => i += close + 1,
                    None => i = bytes.len(),
                }
            } else {
                literal.push('[');
                i += 1;
            }
        } else if bytes[i] == b'<' {
            flush_literal(&mut literal, &mut nodes);
            push_whitespace(&mut nodes);
            i += skip_tag(rest);
        } else if bytes[i] == b'&' {
            match parse_entity(rest) {
                Some((node, len)) => {
                    flush_literal(&mut literal, &mut nodes);
                    nodes.push(node);
                    i += len;
                }
                None => {
                    literal.push('&');
                    i += 1;
                }
            }
        } else if let Some((node, len)) = match_url(rest) {
            flush_literal(&mut literal, &mut nodes);
            nodes.push(node);
            i += len;
        } else if bytes[i].is_ascii_whitespace() {
            flush_literal(&mut literal, &mut nodes);
            push_whitespace(&mut nodes);
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        } else {
            let ch = rest.chars().next().unwrap_or('\u{fffd}');
            literal.push(ch);
            i += ch.len_utf8();
        }
    }

    flush_literal(&mut literal, &mut nodes);
    Ok(nodes)
}

fn flush_literal(literal: &mut String, nodes: &mut Vec<WikiNode>) {
    if !literal.is_empty() {
        nodes.push(WikiNode::Text(std::mem::take(literal)));
    }
}

fn push_whitespace(nodes: &mut Vec<WikiNode>) {
    if !matches!(nodes.last(), Some(WikiNode::Whitespace)) {
        nodes.push(WikiNode::Whitespace);
    }
}

/// Byte offset of the closing delimiter matching the opening one at the
/// start of `bytes`, respecting nesting.
fn find_matching(bytes: &[u8], open: &[u8], close: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(open) {
            depth += 1;
            i += open.len();
        } else if bytes[i..].starts_with(close) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += close.len();
        } else {
            i += 1;
        }
    }
    None
}

fn parse_template(inner: &str) -> WikiNode {
    let segments = split_top_level(inner);
    let name = segments
        .first()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let mut args = Vec::with_capacity(segments.len().saturating_sub(1));
    for seg in segments.iter().skip(1) {
        match split_named(seg) {
            Some((key, value)) => args.push(TemplateArg::named(key, value)),
            None => args.push(TemplateArg::positional(seg.trim())),
        }
    }
    WikiNode::Template { name, args }
}

/// Splits on `|` at nesting depth 0, respecting `{{ }}` and `[[ ]]`.
fn split_top_level(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut last_split = 0;
    let mut i = 0;

    while i < bytes.len() {
        if i + 1 < bytes.len()
            && ((bytes[i] == b'{' && bytes[i + 1] == b'{')
                || (bytes[i] == b'[' && bytes[i + 1] == b'['))
        {
            depth += 1;
            i += 2;
        } else if i + 1 < bytes.len()
            && ((bytes[i] == b'}' && bytes[i + 1] == b'}')
                || (bytes[i] == b']' && bytes[i + 1] == b']'))
        {
            depth -= 1;
            i += 2;
        } else if bytes[i] == b'|' && depth == 0 {
            segments.push(&content[last_split..i]);
            last_split = i + 1;
            i += 1;
        } else {
            i += 1;
        }
    }
    segments.push(&content[last_split..]);
    segments
}

/// Recognizes `name=value` arguments: the key must sit before any markup
/// and look like a plain identifier.
fn split_named(seg: &str) -> Option<(String, String)> {
    let eq = seg.find('=')?;
    let key = seg[..eq].trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-')
    {
        return None;
    }
    Some((key.to_string(), seg[eq + 1..].trim().to_string()))
}

/// Skips an HTML-ish tag at the start of `rest`; a whole `<ref>...</ref>`
/// block is consumed in one go since reference content is never surface text.
fn skip_tag(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let gt = match bytes.iter().position(|&b| b == b'>') {
        Some(p) => p,
        None => return 1,
    };
    let tag = &rest[..gt + 1];
    let is_ref_open = tag.len() >= 4
        && tag.as_bytes()[1..4].eq_ignore_ascii_case(b"ref")
        && !tag.ends_with("/>");
    if is_ref_open {
        if let Some(end) = find_ci(&rest[gt + 1..], "</ref>") {
            return gt + 1 + end + "</ref>".len();
        }
    }
    gt + 1
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn parse_entity(rest: &str) -> Option<(WikiNode, usize)> {
    let semi = rest
        .as_bytes()
        .iter()
        .take(12)
        .position(|&b| b == b';')?;
    if semi < 2 {
        return None;
    }
    let body = &rest[1..semi];
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        let ch = char::from_u32(code)?;
        return Some((WikiNode::CharRef(ch), semi + 1));
    }
    if body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some((WikiNode::EntityRef(body.to_string()), semi + 1));
    }
    None
}

fn match_url(rest: &str) -> Option<(WikiNode, usize)> {
    for proto in ["https", "http", "ftp"] {
        let n = proto.len();
        if rest.len() > n + 3
            && rest.as_bytes()[..n].eq_ignore_ascii_case(proto.as_bytes())
            && rest[n..].starts_with("://")
        {
            // Path includes the leading "//" so the rendered form is
            // protocol ":" path.
            let start = n + 1;
            let end = rest[start..]
                .bytes()
                .position(|b| b.is_ascii_whitespace() || b == b']' || b == b'[')
                .map(|p| start + p)
                .unwrap_or(rest.len());
            return Some((
                WikiNode::Url {
                    protocol: rest[..n].to_string(),
                    path: rest[start..end].to_string(),
                },
                end,
            ));
        }
    }
    None
}
