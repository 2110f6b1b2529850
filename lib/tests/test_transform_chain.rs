mod common;

use anyhow::Result;
use common::{collect, iri, literal_quad, quad, FailingSource, SourceError};
use oxigraph::model::{NamedOrBlankNode, Quad, Term};
use rdf_fragmenter::errors::InvalidCaptureError;
use rdf_fragmenter::transform::{
    CloneTransformer, DistributeIriTransformer, IdentityTransformer, ReplaceIriTransformer,
    SetIriExtensionTransformer,
};
use rdf_fragmenter::{apply_chain, MemorySource, QuadSource, QuadTransformer, TransformStream};
use std::cell::RefCell;
use std::rc::Rc;

type Chain = Vec<Box<dyn QuadTransformer>>;

/// Drops everything and counts how often it was asked to
struct DropAll;

impl QuadTransformer for DropAll {
    fn transform(&mut self, _quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "drop-all"
    }
}

/// Records every call into a shared log
struct Recorder {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    fail_on: Option<usize>,
    calls: usize,
}

impl Recorder {
    fn new(label: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            label,
            log: log.clone(),
            fail_on: None,
            calls: 0,
        }
    }
}

impl QuadTransformer for Recorder {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        self.calls += 1;
        if self.fail_on == Some(self.calls) {
            anyhow::bail!("{} failed on call {}", self.label, self.calls);
        }
        self.log.borrow_mut().push(format!("{}:transform", self.label));
        Ok(vec![quad])
    }

    fn finalize(&mut self) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:finalize", self.label));
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

fn input() -> Quad {
    quad("http://ex.org/s", "http://ex.org/p", "http://ex.org/o")
}

#[test]
fn test_dropped_quads_have_no_descendants() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut chain: Chain = vec![
        Box::new(CloneTransformer),
        Box::new(DropAll),
        Box::new(CloneTransformer),
        Box::new(Recorder::new("after", &log)),
    ];
    assert!(apply_chain(&mut chain, input()).unwrap().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_clone_twice_yields_four() {
    let mut chain: Chain = vec![Box::new(CloneTransformer), Box::new(CloneTransformer)];
    let out = apply_chain(&mut chain, input()).unwrap();
    assert_eq!(out, vec![input(), input(), input(), input()]);
}

#[test]
fn test_replace_iri_composes() {
    let a = "http://a.org/x";
    let q = quad(a, "http://ex.org/p", "http://ex.org/o");
    let mut two_step: Chain = vec![
        Box::new(ReplaceIriTransformer::from_pattern("^http://a\\.org/x$", "http://b.org/x").unwrap()),
        Box::new(ReplaceIriTransformer::from_pattern("^http://b\\.org/x$", "http://c.org/x").unwrap()),
    ];
    let mut one_step: Chain = vec![Box::new(
        ReplaceIriTransformer::from_pattern("^http://a\\.org/x$", "http://c.org/x").unwrap(),
    )];
    let two = apply_chain(&mut two_step, q.clone()).unwrap();
    let one = apply_chain(&mut one_step, q).unwrap();
    assert_eq!(two, one);
    assert_eq!(one[0].subject, NamedOrBlankNode::from(iri("http://c.org/x")));
}

#[test]
fn test_set_iri_extension_overrides() {
    let mut t = SetIriExtensionTransformer::new("nq").unwrap();
    let out = t.transform(quad("ex:s", "ex:p", "ex:s.ttl")).unwrap();
    assert_eq!(out[0].subject, NamedOrBlankNode::from(iri("ex:s.nq")));
    assert_eq!(out[0].object, Term::from(iri("ex:s.nq")));
}

#[test]
fn test_distribute_iri() {
    let mut t = DistributeIriTransformer::from_pattern(
        "^http://ex.org/post(\\d+)$",
        vec![
            "http://pod0.org/post$1".to_string(),
            "http://pod1.org/post$1".to_string(),
        ],
    )
    .unwrap();
    assert_eq!(t.bucket("494"), Some(0));
    assert_eq!(t.bucket("495"), Some(1));

    let out = t
        .transform(quad(
            "http://ex.org/post494",
            "http://ex.org/p",
            "http://ex.org/post495",
        ))
        .unwrap();
    assert_eq!(
        out[0].subject,
        NamedOrBlankNode::from(iri("http://pod0.org/post494"))
    );
    assert_eq!(out[0].object, Term::from(iri("http://pod1.org/post495")));
    // the predicate does not match the regex and is untouched
    assert_eq!(out[0].predicate, iri("http://ex.org/p"));
}

#[test]
fn test_distribute_iri_invalid_capture() {
    let mut t = DistributeIriTransformer::from_pattern(
        "^http://ex.org/post(\\w+)$",
        vec!["a".to_string(), "b".to_string()],
    )
    .unwrap();
    let err = t
        .transform(quad("http://ex.org/postabc", "http://ex.org/p", "http://ex.org/o"))
        .unwrap_err();
    let capture = err.downcast_ref::<InvalidCaptureError>().unwrap();
    assert_eq!(capture.captured, "abc");
}

#[test]
fn test_stream_emits_each_input_fully_before_the_next() {
    let log = Rc::new(RefCell::new(vec![]));
    let source = MemorySource::new(vec![
        literal_quad("http://ex.org/a", "1"),
        literal_quad("http://ex.org/b", "2"),
    ]);
    let mut chain: Chain = vec![
        Box::new(CloneTransformer),
        Box::new(Recorder::new("first", &log)),
        Box::new(IdentityTransformer),
        Box::new(Recorder::new("second", &log)),
    ];
    let mut stream = TransformStream::new(&mut chain, source.quads().unwrap());
    stream.next().unwrap().unwrap();
    // only the first input quad has been processed so far
    assert_eq!(
        *log.borrow(),
        vec![
            "first:transform",
            "first:transform",
            "second:transform",
            "second:transform"
        ]
    );
    let rest = collect(Box::new(stream)).unwrap();
    assert_eq!(rest.len(), 3);
    let log = log.borrow();
    assert_eq!(log.len(), 10);
    assert_eq!(log[8..], ["first:finalize", "second:finalize"]);
}

#[test]
fn test_transformer_error_is_fail_fast() {
    let log = Rc::new(RefCell::new(vec![]));
    let source = MemorySource::new(vec![
        literal_quad("http://ex.org/a", "1"),
        literal_quad("http://ex.org/b", "2"),
        literal_quad("http://ex.org/c", "3"),
    ]);
    let mut failing = Recorder::new("failing", &log);
    failing.fail_on = Some(2);
    let mut chain: Chain = vec![Box::new(failing), Box::new(Recorder::new("after", &log))];
    let items: Vec<_> = TransformStream::new(&mut chain, source.quads().unwrap()).collect();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1].as_ref().unwrap_err().to_string(),
        "failing failed on call 2"
    );
    // no finalize hooks and no further transform calls after the error
    assert_eq!(*log.borrow(), vec!["failing:transform", "after:transform"]);
}

#[test]
fn test_upstream_error_skips_finalize() {
    let log = Rc::new(RefCell::new(vec![]));
    let source = FailingSource {
        name: "upstream",
        quads: vec![literal_quad("http://ex.org/a", "1")],
    };
    let mut chain: Chain = vec![Box::new(Recorder::new("only", &log))];
    let err = collect(Box::new(TransformStream::new(
        &mut chain,
        source.quads().unwrap(),
    )))
    .unwrap_err();
    assert!(err.downcast_ref::<SourceError>().is_some());
    assert_eq!(*log.borrow(), vec!["only:transform"]);
}
