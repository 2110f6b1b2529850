//! Quad matchers decide whether a quad meets some criterion. Filtering transformers and
//! fragmentation strategies use them to include, exclude or branch on quads.

use crate::consts::{DEFAULT_PROBABILITY, TYPE};
use crate::errors::ConfigurationError;
use crate::options::{ResourceScope, TermPosition};
use crate::util::position_value;
use anyhow::{Error, Result};
use log::debug;
use oxigraph::model::{NamedOrBlankNode, Quad, Term};
use regex::Regex;
use std::collections::HashSet;

pub trait QuadMatcher {
    /// Returns true if the quad matches. Stateful matchers may record the quad, so calls
    /// must happen in stream order.
    fn matches(&mut self, quad: &Quad) -> bool;
}

impl<M: QuadMatcher + ?Sized> QuadMatcher for Box<M> {
    fn matches(&mut self, quad: &Quad) -> bool {
        (**self).matches(quad)
    }
}

pub(crate) fn compile_regex(component: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::new(ConfigurationError::new(component, e.to_string())))
}

/// Matches `rdf:type` quads whose (IRI) type satisfies a regex. With
/// [`ResourceScope::FullResource`] every later quad about a matched subject matches too.
///
/// Subjects are only recorded when their type-defining quad is seen, so quads about a resource
/// which appear before its type quad never match.
#[derive(Debug, Clone)]
pub struct ResourceTypeMatcher {
    type_regex: Regex,
    scope: ResourceScope,
    matched: HashSet<String>,
}

impl ResourceTypeMatcher {
    pub fn new(type_regex: Regex, scope: impl Into<ResourceScope>) -> Self {
        let scope = scope.into();
        debug!(
            "Created resource type matcher for {} ({:?})",
            type_regex.as_str(),
            scope
        );
        Self {
            type_regex,
            scope,
            matched: HashSet::new(),
        }
    }

    pub fn from_pattern(pattern: &str, scope: impl Into<ResourceScope>) -> Result<Self> {
        Ok(Self::new(compile_regex("resource type matcher", pattern)?, scope))
    }

    pub fn scope(&self) -> ResourceScope {
        self.scope
    }

    /// Returns true if the subject was recorded by an earlier type-defining quad
    pub fn is_recorded(&self, subject: &str) -> bool {
        self.matched.contains(subject)
    }

    pub fn num_recorded(&self) -> usize {
        self.matched.len()
    }
}

impl QuadMatcher for ResourceTypeMatcher {
    fn matches(&mut self, quad: &Quad) -> bool {
        let NamedOrBlankNode::NamedNode(subject) = &quad.subject else {
            return false;
        };
        if quad.predicate.as_ref() == TYPE {
            if let Term::NamedNode(class) = &quad.object {
                if self.type_regex.is_match(class.as_str()) {
                    if self.scope.is_full_resource() {
                        self.matched.insert(subject.as_str().to_owned());
                    }
                    return true;
                }
            }
        }
        self.scope.is_full_resource() && self.matched.contains(subject.as_str())
    }
}

/// Returns the position of `text` in [0, 1): the BLAKE3 digest of the text read as a
/// big-endian integer and divided by 2^256. Only the top 53 bits of the digest take part, which
/// makes the quotient exact in an f64 and strictly below 1.
pub fn sample_position(text: &str) -> f64 {
    let digest = blake3::hash(text.as_bytes());
    let mut top = [0u8; 8];
    top.copy_from_slice(&digest.as_bytes()[..8]);
    let bits = u64::from_be_bytes(top) >> 11;
    bits as f64 / (1u64 << 53) as f64
}

/// Deterministic acceptance test: the same text and probability always give the same answer
pub fn accepts(text: &str, probability: f64) -> bool {
    probability >= 1.0 || sample_position(text) <= probability
}

/// Matches quads whose term at a given position matches a regex, keeping only a stable,
/// hash-selected fraction of those values.
///
/// The hashed text is the first capture group when the regex has one and it participated in
/// the match, and the whole match otherwise. Capturing an entity id (e.g. a person number in
/// an IRI) therefore samples whole entities consistently across all their quads.
#[derive(Debug, Clone)]
pub struct TermValueMatcher {
    position: TermPosition,
    regex: Regex,
    probability: f64,
}

impl TermValueMatcher {
    pub fn new(position: TermPosition, regex: Regex, probability: Option<f64>) -> Result<Self> {
        let probability = probability.unwrap_or(DEFAULT_PROBABILITY);
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::new(ConfigurationError::new(
                "term value matcher",
                format!("probability {} is outside [0, 1]", probability),
            )));
        }
        debug!(
            "Created term value matcher on {} for {} (p = {})",
            position,
            regex.as_str(),
            probability
        );
        Ok(Self {
            position,
            regex,
            probability,
        })
    }

    pub fn from_pattern(
        position: TermPosition,
        pattern: &str,
        probability: Option<f64>,
    ) -> Result<Self> {
        Self::new(
            position,
            compile_regex("term value matcher", pattern)?,
            probability,
        )
    }

    pub fn position(&self) -> TermPosition {
        self.position
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl QuadMatcher for TermValueMatcher {
    fn matches(&mut self, quad: &Quad) -> bool {
        let value = position_value(quad, self.position);
        let Some(caps) = self.regex.captures(value) else {
            return false;
        };
        let sampled = caps.get(1).map_or(&caps[0], |m| m.as_str());
        accepts(sampled, self.probability)
    }
}
