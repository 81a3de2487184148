//! Streaming reader for MediaWiki XML dumps.
//!
//! Two consumption modes over the same event loop: [`DumpReader::for_each_page`]
//! pushes pages into a callback, and [`DumpReader::into_pages`] turns the
//! stream into a pull-mode iterator backed by a producer thread and a
//! single-slot rendezvous channel. Either way at most one parsed page is in
//! memory at a time, which is what keeps multi-gigabyte dumps tractable.

use crate::error::DumpError;
use crate::models::WikiPage;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver};
use std::thread::{self, JoinHandle};

const BUFFER_CAPACITY: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Magic bytes win; the file extension is a fallback for short or
    /// exotic streams.
    fn detect(head: &[u8], path: &Path) -> Compression {
        if head.starts_with(&[0x1f, 0x8b]) {
            return Compression::Gzip;
        }
        if head.starts_with(b"BZh") {
            return Compression::Bzip2;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Title,
    Id,
    Text,
}

pub struct DumpReader {
    path: PathBuf,
    reader: Reader<Box<dyn BufRead + Send>>,
}

impl DumpReader {
    /// Opens a dump file, auto-detecting gzip or bzip2 compression.
    pub fn open(path: impl AsRef<Path>) -> Result<DumpReader, DumpError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| DumpError::Io {
            path: path.clone(),
            source: e,
        })?;
        let mut raw = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let head = raw.fill_buf().map_err(|e| DumpError::Io {
            path: path.clone(),
            source: e,
        })?;
        let decoded: Box<dyn BufRead + Send> = match Compression::detect(head, &path) {
            Compression::Gzip => {
                Box::new(BufReader::with_capacity(BUFFER_CAPACITY, GzDecoder::new(raw)))
            }
            Compression::Bzip2 => {
                Box::new(BufReader::with_capacity(BUFFER_CAPACITY, BzDecoder::new(raw)))
            }
            Compression::None => Box::new(raw),
        };
        Ok(DumpReader {
            path,
            reader: Reader::from_reader(decoded),
        })
    }

    /// Push-mode iteration: calls `handler` once per `<page>` element, in
    /// dump order. The handler returns [`ControlFlow::Break`] to stop early.
    ///
    /// Page children (`title`, `id`, `revision/text`) may appear in any
    /// order; matching is by local name. Only the page-level `id` is
    /// captured, never the revision's.
    pub fn for_each_page<F>(mut self, mut handler: F) -> Result<(), DumpError>
    where
        F: FnMut(WikiPage) -> ControlFlow<()>,
    {
        let mut buf = Vec::new();
        let mut in_page = false;
        let mut in_revision = false;
        let mut capture = Capture::None;
        let mut title: Option<String> = None;
        let mut id: Option<String> = None;
        let mut text: Option<String> = None;

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"page" => {
                        in_page = true;
                        in_revision = false;
                        title = None;
                        id = None;
                        text = None;
                    }
                    b"revision" if in_page => in_revision = true,
                    b"title" if in_page && !in_revision => capture = Capture::Title,
                    b"id" if in_page && !in_revision && id.is_none() => capture = Capture::Id,
                    b"text" if in_revision => capture = Capture::Text,
                    _ => {}
                },
                Ok(Event::Text(t)) => {
                    if capture != Capture::None {
                        let decoded = t.unescape().map_err(|e| DumpError::Format {
                            path: self.path.clone(),
                            message: e.to_string(),
                        })?;
                        let slot = match capture {
                            Capture::Title => &mut title,
                            Capture::Id => &mut id,
                            Capture::Text => &mut text,
                            Capture::None => unreachable!(),
                        };
                        match slot {
                            Some(existing) => existing.push_str(&decoded),
                            None => *slot = Some(decoded.into_owned()),
                        }
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"page" => {
                        in_page = false;
                        let page_title = title.take().ok_or_else(|| DumpError::Format {
                            path: self.path.clone(),
                            message: "page element is missing a title".to_string(),
                        })?;
                        let page = WikiPage {
                            id: id.take(),
                            title: page_title,
                            text: text.take(),
                        };
                        if let ControlFlow::Break(()) = handler(page) {
                            return Ok(());
                        }
                    }
                    b"revision" => in_revision = false,
                    b"title" | b"id" | b"text" => capture = Capture::None,
                    _ => {}
                },
                Ok(Event::Eof) => return Ok(()),
                Ok(_) => {}
                Err(e) => {
                    return Err(DumpError::Format {
                        path: self.path.clone(),
                        message: e.to_string(),
                    })
                }
            }
            buf.clear();
        }
    }

    /// Pull-mode iteration. A producer thread runs the push-mode loop and
    /// hands each page over a bounded channel of capacity one, so the
    /// producer blocks until the consumer has taken the previous page.
    /// Dropping the iterator closes the channel; the producer observes the
    /// failed send before parsing another page and stops.
    pub fn into_pages(self) -> Pages {
        let (tx, rx) = sync_channel::<Result<WikiPage, DumpError>>(1);
        let handle = thread::spawn(move || {
            let errors = tx.clone();
            let result = self.for_each_page(|page| {
                if tx.send(Ok(page)).is_err() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });
            if let Err(e) = result {
                let _ = errors.send(Err(e));
            }
        });
        Pages {
            rx: Some(rx),
            handle: Some(handle),
        }
    }
}

/// Iterator over the pages of a dump, in dump order. End of stream is
/// permanent: once `next` returns `None` it always will.
pub struct Pages {
    rx: Option<Receiver<Result<WikiPage, DumpError>>>,
    handle: Option<JoinHandle<()>>,
}

impl Iterator for Pages {
    type Item = Result<WikiPage, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for Pages {
    fn drop(&mut self) {
        // Closing the channel first unblocks a producer waiting to send.
        drop(self.rx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
