#![allow(dead_code)]

use anyhow::{Error, Result};
use oxigraph::model::{GraphName, Literal, NamedNode, NamedOrBlankNode, Quad};
use rdf_fragmenter::{FragmentationStrategy, QuadSink, QuadSource, QuadStream};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

pub fn quad(s: &str, p: &str, o: &str) -> Quad {
    Quad::new(iri(s), iri(p), iri(o), GraphName::DefaultGraph)
}

pub fn literal_quad(s: &str, value: &str) -> Quad {
    Quad::new(
        iri(s),
        iri("http://ex.org/vocab#value"),
        Literal::new_simple_literal(value),
        GraphName::DefaultGraph,
    )
}

pub fn collect(stream: QuadStream<'_>) -> Result<Vec<Quad>> {
    stream.collect()
}

/// Error raised by [`FailingSource`], carrying the name of the source that raised it
#[derive(Debug, PartialEq)]
pub struct SourceError(pub &'static str);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "source {} failed", self.0)
    }
}

impl std::error::Error for SourceError {}

/// Emits its quads and then fails
pub struct FailingSource {
    pub name: &'static str,
    pub quads: Vec<Quad>,
}

impl QuadSource for FailingSource {
    fn quads(&self) -> Result<QuadStream<'_>> {
        let fail = std::iter::once(Err(Error::new(SourceError(self.name))));
        Ok(Box::new(self.quads.iter().cloned().map(Ok).chain(fail)))
    }

    fn describe(&self) -> String {
        format!("failing {}", self.name)
    }
}

/// Fails as soon as its quads are requested
pub struct UnopenableSource;

impl QuadSource for UnopenableSource {
    fn quads(&self) -> Result<QuadStream<'_>> {
        Err(Error::new(SourceError("unopenable")))
    }

    fn describe(&self) -> String {
        "unopenable".to_string()
    }
}

/// Records everything pushed into it, plus the number of times it was closed
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub pushed: Rc<RefCell<Vec<(String, Quad)>>>,
    pub closes: Rc<Cell<usize>>,
    pub fail_close: bool,
}

impl RecordingSink {
    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    pub fn documents(&self) -> Vec<String> {
        self.pushed.borrow().iter().map(|(iri, _)| iri.clone()).collect()
    }

    pub fn quads(&self) -> Vec<Quad> {
        self.pushed.borrow().iter().map(|(_, q)| q.clone()).collect()
    }
}

impl QuadSink for RecordingSink {
    fn push(&mut self, iri: &str, quad: &Quad) -> Result<()> {
        self.pushed.borrow_mut().push((iri.to_string(), quad.clone()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.set(self.closes.get() + 1);
        if self.fail_close {
            return Err(anyhow::anyhow!("sink could not be closed"));
        }
        Ok(())
    }
}

/// Places every quad into the document named after its subject
#[derive(Default)]
pub struct SubjectStrategy;

impl FragmentationStrategy for SubjectStrategy {
    fn fragment(&mut self, quads: QuadStream<'_>, sink: &mut dyn QuadSink) -> Result<()> {
        for quad in quads {
            let quad = quad?;
            let document = match &quad.subject {
                NamedOrBlankNode::NamedNode(n) => n.as_str().to_string(),
                NamedOrBlankNode::BlankNode(_) => "urn:blank".to_string(),
            };
            sink.push(&document, &quad)?;
        }
        Ok(())
    }
}

/// Gives up after a fixed number of quads
pub struct FailingStrategy {
    pub after: usize,
}

impl FragmentationStrategy for FailingStrategy {
    fn fragment(&mut self, quads: QuadStream<'_>, sink: &mut dyn QuadSink) -> Result<()> {
        for (i, quad) in quads.enumerate() {
            if i == self.after {
                return Err(anyhow::anyhow!("strategy gave up after {} quads", i));
            }
            sink.push("urn:doc", &quad?)?;
        }
        Ok(())
    }
}
