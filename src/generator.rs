//! End-to-end pipeline: dump file in, alias records out.

use crate::ast::WikiNode;
use crate::error::{ConfigError, DumpError, ParseError};
use crate::models::{Alias, AliasTypeSet, WikiPage};
use crate::parse::parse_document;
use crate::reader::DumpReader;
use crate::visitor::AliasVisitor;
use indicatif::ProgressBar;
use std::path::Path;
use tracing::{info, warn};

const PROGRESS_INTERVAL: u64 = 1_000;

/// Per-run counters returned by [`AliasGenerator::process_path`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub pages: u64,
    pub failed_pages: u64,
    pub aliases: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct AliasGenerator {
    produce: AliasTypeSet,
    identity_aliases: bool,
}

impl AliasGenerator {
    /// A generator for the given alias types. An empty set is a
    /// configuration error, rejected before any page is touched.
    pub fn new(produce: AliasTypeSet) -> Result<AliasGenerator, ConfigError> {
        if produce.is_empty() {
            return Err(ConfigError::EmptyTypeSet);
        }
        Ok(AliasGenerator {
            produce,
            identity_aliases: false,
        })
    }

    /// Whether aliases with `source == target` are forwarded. They are
    /// always computed; this only controls the boundary filter.
    pub fn identity_aliases(mut self, enabled: bool) -> AliasGenerator {
        self.identity_aliases = enabled;
        self
    }

    /// Extracts one page's aliases. A page without text still yields its
    /// title aliases.
    pub fn extract_page(&self, page: &WikiPage) -> Result<Vec<Alias>, ParseError> {
        let root = match page.text.as_deref() {
            Some(text) => parse_document(text)?,
            None => WikiNode::Document(Vec::new()),
        };
        let mut aliases = AliasVisitor::new(&page.title, self.produce).run(&root);
        if !self.identity_aliases {
            aliases.retain(|a| a.source != a.target);
        }
        Ok(aliases)
    }

    /// Runs the full pipeline over a dump file, forwarding every alias to
    /// `handler`. A page that fails to parse is logged and skipped; a
    /// malformed dump aborts the run. `limit` stops after that many pages.
    pub fn process_path<F>(
        &self,
        path: impl AsRef<Path>,
        limit: Option<u64>,
        mut handler: F,
    ) -> Result<RunStats, DumpError>
    where
        F: FnMut(&Alias),
    {
        let path = path.as_ref();
        let pages = DumpReader::open(path)?.into_pages();
        let pb = ProgressBar::new_spinner();
        let mut stats = RunStats::default();

        info!("Extracting aliases from: {}", path.display());

        for result in pages {
            let page = result?;
            stats.pages += 1;
            match self.extract_page(&page) {
                Ok(aliases) => {
                    for alias in &aliases {
                        handler(alias);
                    }
                    stats.aliases += aliases.len() as u64;
                }
                Err(e) => {
                    warn!(page = %page.title, error = %e, "failed to parse page, skipping");
                    stats.failed_pages += 1;
                }
            }
            if stats.pages % PROGRESS_INTERVAL == 0 {
                pb.tick();
            }
            if limit.is_some_and(|l| stats.pages >= l) {
                break;
            }
        }

        pb.finish_and_clear();

        info!(
            pages = stats.pages,
            failed_pages = stats.failed_pages,
            aliases = stats.aliases,
            "Extraction finished"
        );

        Ok(stats)
    }
}
