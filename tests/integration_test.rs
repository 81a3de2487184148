//! Integration tests for the full alias extraction pipeline.
//!
//! The data flow under test runs from (optionally compressed) XML input
//! through page streaming, wikitext parsing and alias extraction:
//!
//! - **Reader Tests** -- XML parsing, compression auto-detection, push and
//!   pull iteration modes
//! - **Pipeline Tests** -- end-to-end alias generation, page limits,
//!   identity filtering, failure recovery
//!
//! All tests build their dump fixtures from a shared `sample_xml()` string,
//! compressed per test as needed. Each test uses its own temp file so tests
//! stay isolated.

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::io::Write;
use std::ops::ControlFlow;
use tempfile::NamedTempFile;
use wikialias::generator::AliasGenerator;
use wikialias::models::{Alias, AliasType, AliasTypeSet, WikiPage};
use wikialias::reader::DumpReader;

/// Sample dump with a regular article, a redirect and a text-less page.
fn sample_xml() -> &'static str {
    r#"<mediawiki>
  <siteinfo>
    <sitename>Wikipedia</sitename>
  </siteinfo>
  <page>
    <title>Rust (programming language)</title>
    <id>1</id>
    <revision>
      <id>100</id>
      <text>'''Rust''' is a systems language backed by [[Mozilla Research|Mozilla]].</text>
    </revision>
  </page>
  <page>
    <title>Old Name</title>
    <id>2</id>
    <revision>
      <id>200</id>
      <text>#REDIRECT [[Target Page]]</text>
    </revision>
  </page>
  <page>
    <title>Empty Page</title>
    <id>3</id>
  </page>
</mediawiki>
"#
}

fn create_plain_xml(xml: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
    tmp.write_all(xml.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn create_gz_xml(xml: &str) -> NamedTempFile {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(xml.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&compressed).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn create_bz2_xml(xml: &str) -> NamedTempFile {
    let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::fast());
    encoder.write_all(xml.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&compressed).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn collect_pages(file: &NamedTempFile) -> Vec<WikiPage> {
    let mut pages = Vec::new();
    DumpReader::open(file.path())
        .unwrap()
        .for_each_page(|page| {
            pages.push(page);
            ControlFlow::Continue(())
        })
        .unwrap();
    pages
}

fn assert_sample_pages(pages: &[WikiPage]) {
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].title, "Rust (programming language)");
    assert_eq!(pages[0].id.as_deref(), Some("1"));
    assert!(pages[0].text.as_deref().unwrap().contains("'''Rust'''"));
    assert_eq!(pages[1].title, "Old Name");
    assert_eq!(
        pages[1].text.as_deref(),
        Some("#REDIRECT [[Target Page]]")
    );
    assert_eq!(pages[2].title, "Empty Page");
    assert_eq!(pages[2].text, None);
}

// ---------------------------------------------------------------------------
// Reader Tests
// ---------------------------------------------------------------------------

#[test]
fn reads_uncompressed_dump() {
    let file = create_plain_xml(sample_xml());
    assert_sample_pages(&collect_pages(&file));
}

#[test]
fn reads_gzip_dump() {
    let file = create_gz_xml(sample_xml());
    assert_sample_pages(&collect_pages(&file));
}

#[test]
fn reads_bzip2_dump() {
    let file = create_bz2_xml(sample_xml());
    assert_sample_pages(&collect_pages(&file));
}

#[test]
fn revision_id_does_not_overwrite_page_id() {
    let file = create_plain_xml(sample_xml());
    let pages = collect_pages(&file);
    assert_eq!(pages[1].id.as_deref(), Some("2"));
}

#[test]
fn page_children_may_appear_in_any_order() {
    let xml = r#"<mediawiki>
  <page>
    <revision><text>Body first.</text></revision>
    <title>Shuffled</title>
    <id>9</id>
  </page>
</mediawiki>"#;
    let file = create_plain_xml(xml);
    let pages = collect_pages(&file);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "Shuffled");
    assert_eq!(pages[0].id.as_deref(), Some("9"));
    assert_eq!(pages[0].text.as_deref(), Some("Body first."));
}

#[test]
fn xml_entities_are_unescaped() {
    let xml = r#"<mediawiki>
  <page>
    <title>AT&amp;T</title>
    <revision><text>About &lt;AT&amp;T&gt;.</text></revision>
  </page>
</mediawiki>"#;
    let file = create_plain_xml(xml);
    let pages = collect_pages(&file);
    assert_eq!(pages[0].title, "AT&T");
    assert_eq!(pages[0].text.as_deref(), Some("About <AT&T>."));
}

#[test]
fn page_without_title_is_a_format_error() {
    let xml = "<mediawiki><page><id>1</id></page></mediawiki>";
    let file = create_plain_xml(xml);
    let result = DumpReader::open(file.path())
        .unwrap()
        .for_each_page(|_| ControlFlow::Continue(()));
    assert!(result.is_err());
}

#[test]
fn malformed_xml_is_fatal() {
    let xml = "<mediawiki><page><title>Broken</title></wrong></mediawiki>";
    let file = create_plain_xml(xml);
    let result = DumpReader::open(file.path())
        .unwrap()
        .for_each_page(|_| ControlFlow::Continue(()));
    assert!(result.is_err());
}

#[test]
fn push_mode_stops_on_break() {
    let file = create_plain_xml(sample_xml());
    let mut seen = 0;
    DumpReader::open(file.path())
        .unwrap()
        .for_each_page(|_| {
            seen += 1;
            ControlFlow::Break(())
        })
        .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn pull_mode_preserves_order_and_ends_permanently() {
    let file = create_plain_xml(sample_xml());
    let mut pages = DumpReader::open(file.path()).unwrap().into_pages();

    let titles: Vec<String> = pages
        .by_ref()
        .map(|r| r.unwrap().title)
        .collect();
    assert_eq!(
        titles,
        vec!["Rust (programming language)", "Old Name", "Empty Page"]
    );
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
}

#[test]
fn dropping_the_pull_iterator_stops_the_producer() {
    let file = create_plain_xml(sample_xml());
    let mut pages = DumpReader::open(file.path()).unwrap().into_pages();
    let first = pages.next().unwrap().unwrap();
    assert_eq!(first.title, "Rust (programming language)");
    // Dropping here must unblock and join the producer thread.
    drop(pages);
}

#[test]
fn pull_mode_surfaces_format_errors() {
    let xml = "<mediawiki><page><title>Broken</title></wrong></mediawiki>";
    let file = create_plain_xml(xml);
    let results: Vec<_> = DumpReader::open(file.path()).unwrap().into_pages().collect();
    assert!(results.iter().any(|r| r.is_err()));
}

// ---------------------------------------------------------------------------
// Pipeline Tests
// ---------------------------------------------------------------------------

fn run_pipeline(file: &NamedTempFile, types: AliasTypeSet, limit: Option<u64>) -> Vec<Alias> {
    let generator = AliasGenerator::new(types).unwrap();
    let mut aliases = Vec::new();
    generator
        .process_path(file.path(), limit, |alias| aliases.push(alias.clone()))
        .unwrap();
    aliases
}

#[test]
fn end_to_end_alias_extraction() {
    let file = create_bz2_xml(sample_xml());
    let aliases = run_pipeline(&file, AliasTypeSet::STANDARD, None);

    assert!(aliases.iter().any(|a| a.kind == AliasType::Redirect
        && a.source == "Old Name"
        && a.target == "Target Page"));
    assert!(aliases.iter().any(|a| a.kind == AliasType::P1Bold
        && a.source == "Rust"
        && a.target == "Rust (programming language)"));
    assert!(aliases.iter().any(|a| a.kind == AliasType::Link
        && a.source == "Mozilla"
        && a.target == "Mozilla Research"));
    assert!(aliases.iter().any(|a| a.kind == AliasType::Truncated
        && a.source == "Rust"
        && a.target == "Rust (programming language)"));
}

#[test]
fn page_limit_stops_the_run() {
    let file = create_plain_xml(sample_xml());
    let generator = AliasGenerator::new(AliasTypeSet::STANDARD).unwrap();
    let mut count = 0u64;
    let stats = generator
        .process_path(file.path(), Some(1), |_| count += 1)
        .unwrap();
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.aliases, count);
}

#[test]
fn identity_aliases_are_opt_in() {
    let file = create_plain_xml(sample_xml());
    let without: Vec<Alias> = run_pipeline(&file, AliasTypeSet::STANDARD, None);
    assert!(without.iter().all(|a| a.source != a.target));

    let generator = AliasGenerator::new(AliasTypeSet::STANDARD)
        .unwrap()
        .identity_aliases(true);
    let mut with_identity = Vec::new();
    generator
        .process_path(file.path(), None, |alias| with_identity.push(alias.clone()))
        .unwrap();
    assert!(with_identity.iter().any(|a| a.kind == AliasType::Title
        && a.source == "Empty Page"
        && a.target == "Empty Page"));
}

#[test]
fn unparseable_page_does_not_abort_the_run() {
    let deep = format!("{}x{}", "[[a|".repeat(80), "]]".repeat(80));
    let xml = format!(
        "<mediawiki>\
           <page><title>Bad Page</title><revision><text>{}</text></revision></page>\
           <page><title>Good Redirect</title><revision><text>#REDIRECT [[Elsewhere]]</text></revision></page>\
         </mediawiki>",
        deep
    );
    let file = create_plain_xml(&xml);
    let generator = AliasGenerator::new(AliasTypeSet::STANDARD).unwrap();
    let mut aliases = Vec::new();
    let stats = generator
        .process_path(file.path(), None, |alias| aliases.push(alias.clone()))
        .unwrap();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.failed_pages, 1);
    assert!(aliases.iter().any(|a| a.kind == AliasType::Redirect
        && a.source == "Good Redirect"
        && a.target == "Elsewhere"));
}

#[test]
fn malformed_dump_aborts_the_pipeline() {
    let xml = "<mediawiki><page><title>Broken</title></wrong></mediawiki>";
    let file = create_plain_xml(xml);
    let generator = AliasGenerator::new(AliasTypeSet::STANDARD).unwrap();
    let result = generator.process_path(file.path(), None, |_| {});
    assert!(result.is_err());
}
