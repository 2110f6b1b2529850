use crate::errors::TermPositionError;
use crate::options::TermPosition;
use anyhow::{Error, Result};
use oxigraph::io::RdfFormat;
use oxigraph::model::{GraphName, NamedNode, NamedOrBlankNode, Quad, Term};
use std::path::Path;

/// Returns the string value of a term: the IRI, the blank node label or the literal lexical form
pub fn term_value(term: &Term) -> &str {
    match term {
        Term::NamedNode(n) => n.as_str(),
        Term::BlankNode(b) => b.as_str(),
        Term::Literal(l) => l.value(),
    }
}

/// Returns the string value found at the given position of a quad. The default graph has an
/// empty value.
pub fn position_value(quad: &Quad, position: TermPosition) -> &str {
    match position {
        TermPosition::Subject => match &quad.subject {
            NamedOrBlankNode::NamedNode(n) => n.as_str(),
            NamedOrBlankNode::BlankNode(b) => b.as_str(),
        },
        TermPosition::Predicate => quad.predicate.as_str(),
        TermPosition::Object => term_value(&quad.object),
        TermPosition::Graph => match &quad.graph_name {
            GraphName::NamedNode(n) => n.as_str(),
            GraphName::BlankNode(b) => b.as_str(),
            GraphName::DefaultGraph => "",
        },
    }
}

/// Rewrites every numbered group reference `$N` in a replacement template to `${N}`, so the
/// group number ends at its last digit: `$1abc` is group 1 followed by `abc`. Named references
/// and `$$` are kept as they are.
pub fn normalize_replacement(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some(d) if d.is_ascii_digit() => {
                out.push_str("${");
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    out.push(d);
                }
                out.push('}');
            }
            _ => out.push('$'),
        }
    }
    out
}

fn subject_to_term(subject: NamedOrBlankNode) -> Term {
    match subject {
        NamedOrBlankNode::NamedNode(n) => Term::NamedNode(n),
        NamedOrBlankNode::BlankNode(b) => Term::BlankNode(b),
    }
}

fn misplaced(position: TermPosition, term: &Term) -> Error {
    Error::new(TermPositionError {
        position: position.as_str(),
        term: term.to_string(),
    })
}

/// Builds a new quad by passing every term of `quad` through `f`. The default graph is left
/// untouched. Fails if `f` returns a term kind which is not allowed at that position.
pub fn map_terms<F>(quad: Quad, mut f: F) -> Result<Quad>
where
    F: FnMut(Term) -> Result<Term>,
{
    let subject: NamedOrBlankNode = match f(subject_to_term(quad.subject))? {
        Term::NamedNode(n) => n.into(),
        Term::BlankNode(b) => b.into(),
        other => return Err(misplaced(TermPosition::Subject, &other)),
    };
    let predicate: NamedNode = match f(Term::NamedNode(quad.predicate))? {
        Term::NamedNode(n) => n,
        other => return Err(misplaced(TermPosition::Predicate, &other)),
    };
    let object = f(quad.object)?;
    let graph_name = match quad.graph_name {
        GraphName::DefaultGraph => GraphName::DefaultGraph,
        GraphName::NamedNode(n) => graph_from_term(f(Term::NamedNode(n))?)?,
        GraphName::BlankNode(b) => graph_from_term(f(Term::BlankNode(b))?)?,
    };
    Ok(Quad::new(subject, predicate, object, graph_name))
}

fn graph_from_term(term: Term) -> Result<GraphName> {
    match term {
        Term::NamedNode(n) => Ok(n.into()),
        Term::BlankNode(b) => Ok(b.into()),
        other => Err(misplaced(TermPosition::Graph, &other)),
    }
}

/// Guesses the RDF syntax of a file from its extension, defaulting to Turtle
pub fn rdf_format_for_path(path: &Path) -> RdfFormat {
    let ext = path.extension().and_then(|ext| ext.to_str());
    match ext {
        Some("nq") => RdfFormat::NQuads,
        Some("nt") => RdfFormat::NTriples,
        Some("trig") => RdfFormat::TriG,
        Some("n3") => RdfFormat::N3,
        Some("xml") | Some("rdf") => RdfFormat::RdfXml,
        _ => RdfFormat::Turtle,
    }
}
