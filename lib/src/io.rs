//! Defines the traits quads flow through on their way in and out of a fragmentation run, along
//! with the sources this crate ships: in-memory quads, RDF files and the sequential composite.

use crate::util::rdf_format_for_path;
use anyhow::{Error, Result};
use log::debug;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Quad;
use std::fs::File;
use std::io::BufReader;
use std::iter::Enumerate;
use std::path::{Path, PathBuf};
use std::slice::Iter;

/// A pull-based, single-pass sequence of quads. Nothing is produced until the consumer asks
/// for the next item; an `Err` item is terminal.
pub type QuadStream<'a> = Box<dyn Iterator<Item = Result<Quad>> + 'a>;

pub trait QuadSource {
    /// Returns a fresh stream over the quads of this source. Every call starts from the
    /// beginning and shares no iteration state with earlier streams.
    fn quads(&self) -> Result<QuadStream<'_>>;

    /// Short human-readable description used in log messages
    fn describe(&self) -> String;
}

/// Destination for quads once a fragmentation strategy has chosen where they belong.
pub trait QuadSink {
    /// Writes `quad` into the document identified by `iri`
    fn push(&mut self, iri: &str, quad: &Quad) -> Result<()>;

    /// Flushes and releases everything held by the sink. Called once per run.
    fn close(&mut self) -> Result<()>;
}

/// Replays a fixed list of quads.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    quads: Vec<Quad>,
}

impl MemorySource {
    pub fn new(quads: Vec<Quad>) -> Self {
        Self { quads }
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

impl From<Vec<Quad>> for MemorySource {
    fn from(quads: Vec<Quad>) -> Self {
        Self::new(quads)
    }
}

impl QuadSource for MemorySource {
    fn quads(&self) -> Result<QuadStream<'_>> {
        Ok(Box::new(self.quads.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("memory ({} quads)", self.quads.len())
    }
}

/// Parses an RDF file every time its quads are requested.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: RdfFormat,
}

impl FileSource {
    /// Creates a source for `path`, guessing the syntax from the file extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = rdf_format_for_path(&path);
        Self { path, format }
    }

    pub fn with_format(path: impl Into<PathBuf>, format: RdfFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }
}

impl QuadSource for FileSource {
    fn quads(&self) -> Result<QuadStream<'_>> {
        debug!("Opening {} as {:?}", self.path.display(), self.format);
        let file = File::open(&self.path)?;
        let parser = RdfParser::from_format(self.format).for_reader(BufReader::new(file));
        Ok(Box::new(parser.map(|res| res.map_err(Error::from))))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Concatenates several sources. Source `i` is drained completely before source `i + 1` is
/// opened, so the relative order of every source is kept and sources never interleave.
#[derive(Default)]
pub struct CompositeSource {
    sources: Vec<Box<dyn QuadSource>>,
}

impl CompositeSource {
    pub fn new(sources: Vec<Box<dyn QuadSource>>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: Box<dyn QuadSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl QuadSource for CompositeSource {
    fn quads(&self) -> Result<QuadStream<'_>> {
        Ok(Box::new(CompositeStream {
            pending: self.sources.iter().enumerate(),
            current: None,
            done: false,
        }))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.sources.iter().map(|s| s.describe()).collect();
        format!("composite [{}]", parts.join(", "))
    }
}

struct CompositeStream<'a> {
    pending: Enumerate<Iter<'a, Box<dyn QuadSource>>>,
    current: Option<QuadStream<'a>>,
    done: bool,
}

impl CompositeStream<'_> {
    fn fail(&mut self, err: Error) -> Option<Result<Quad>> {
        // nothing is delivered after the first error, from this source or later ones
        self.done = true;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for CompositeStream<'_> {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(stream) = self.current.as_mut() {
                match stream.next() {
                    Some(Ok(quad)) => return Some(Ok(quad)),
                    Some(Err(e)) => return self.fail(e),
                    None => self.current = None,
                }
            }
            let Some((index, source)) = self.pending.next() else {
                self.done = true;
                return None;
            };
            debug!("Reading from source #{}: {}", index, source.describe());
            match source.quads() {
                Ok(stream) => self.current = Some(stream),
                Err(e) => return self.fail(e),
            }
        }
    }
}
