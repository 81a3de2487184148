//! Wikialias: typed alias extraction from Wikipedia XML dumps
//!
//! This crate streams a MediaWiki dump and, for each page, emits "alias"
//! records: `(type, subtype, source, target)` tuples asserting that one
//! surface form (a redirect, a bolded synonym, a hat-note cross-reference,
//! a truncated title variant) denotes the same or a related entity as the
//! page's canonical title. The records feed downstream linking and
//! indexing tools.
//!
//! # Architecture
//!
//! Processing is strictly sequential and page-at-a-time: a producer thread
//! decompresses and parses the dump, handing each page across a single-slot
//! rendezvous to the consumer. Peak memory is one page's raw text plus its
//! parsed tree, which is what keeps multi-gigabyte dumps tractable.
//!
//! # Key Modules
//!
//! - [`reader`] -- Streaming XML parser with gzip/bzip2 auto-detection and
//!   push/pull page iteration
//! - [`parse`] -- Structural wikitext parser producing the node tree
//! - [`ast`] -- The closed node vocabulary ([`ast::WikiNode`])
//! - [`visitor`] -- The per-page extraction engine
//! - [`hatnote`] -- Declarative rule table for hat-note templates
//! - [`textmodel`] -- Cheap regex classification of raw page markup
//! - [`generator`] -- End-to-end pipeline with type filtering and stats
//! - [`models`] -- Core data types (WikiPage, Alias, AliasType)
//! - [`title`] -- Title suffix, namespace and variant helpers

pub mod ast;
pub mod error;
pub mod generator;
pub mod hatnote;
pub mod models;
pub mod parse;
pub mod reader;
pub mod textmodel;
pub mod title;
pub mod visitor;
