//! Provides the quad transformers which can be chained in front of a fragmentation strategy.
//! Term rewriters map every term of a quad and emit exactly one quad; the others may emit zero,
//! one or many quads per input.

use crate::engine::{apply_chain, finalize_chain};
use crate::errors::{ConfigurationError, InvalidCaptureError};
use crate::matcher::{compile_regex, QuadMatcher};
use crate::util::{map_terms, normalize_replacement};
use anyhow::{Error, Result};
use log::{debug, info};
use oxigraph::model::{NamedNode, Quad, Term};
use regex::Regex;
use std::collections::HashSet;

pub trait QuadTransformer {
    /// Transforms one quad into zero or more quads, in the order they should be emitted
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>>;

    /// Called once after the last quad of a successful run. Cannot emit quads.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name used in log messages
    fn name(&self) -> &'static str;
}

impl<T: QuadTransformer + ?Sized> QuadTransformer for Box<T> {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        (**self).transform(quad)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Passes every quad through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl QuadTransformer for IdentityTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![quad])
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Emits every quad twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneTransformer;

impl QuadTransformer for CloneTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![quad.clone(), quad])
    }

    fn name(&self) -> &'static str {
        "clone"
    }
}

/// Runs a regex search/replace over every IRI. Only the first match in each IRI is replaced;
/// the replacement may refer to capture groups as `$1` or `${name}`; `$1abc` is group 1 followed by `abc`.
#[derive(Debug, Clone)]
pub struct ReplaceIriTransformer {
    search: Regex,
    replacement: String,
}

impl ReplaceIriTransformer {
    pub fn new(search: Regex, replacement: impl Into<String>) -> Self {
        let replacement = normalize_replacement(&replacement.into());
        debug!("Replacing IRIs matching {} with {}", search.as_str(), replacement);
        Self {
            search,
            replacement,
        }
    }

    pub fn from_pattern(search: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self::new(compile_regex("replace-iri", search)?, replacement))
    }

    fn rewrite(&self, term: Term) -> Term {
        match term {
            Term::NamedNode(n) => {
                let value = self.search.replace(n.as_str(), self.replacement.as_str());
                NamedNode::new_unchecked(value.into_owned()).into()
            }
            other => other,
        }
    }
}

impl QuadTransformer for ReplaceIriTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![map_terms(quad, |t| Ok(self.rewrite(t)))?])
    }

    fn name(&self) -> &'static str {
        "replace-iri"
    }
}

/// Runs a regex search/replace over blank node labels. A label which changes turns into an IRI
/// carrying the new value; untouched blank nodes are kept.
#[derive(Debug, Clone)]
pub struct BlankToNamedTransformer {
    search: Regex,
    replacement: String,
}

impl BlankToNamedTransformer {
    pub fn new(search: Regex, replacement: impl Into<String>) -> Self {
        let replacement = normalize_replacement(&replacement.into());
        debug!(
            "Promoting blank nodes matching {} to {}",
            search.as_str(),
            replacement
        );
        Self {
            search,
            replacement,
        }
    }

    pub fn from_pattern(search: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self::new(compile_regex("blank-to-named", search)?, replacement))
    }

    fn rewrite(&self, term: Term) -> Term {
        match term {
            Term::BlankNode(b) => {
                let value = self.search.replace(b.as_str(), self.replacement.as_str());
                if value == b.as_str() {
                    Term::BlankNode(b)
                } else {
                    NamedNode::new_unchecked(value.into_owned()).into()
                }
            }
            other => other,
        }
    }
}

impl QuadTransformer for BlankToNamedTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![map_terms(quad, |t| Ok(self.rewrite(t)))?])
    }

    fn name(&self) -> &'static str {
        "blank-to-named"
    }
}

/// Forces every IRI to end in `.` + extension, replacing an existing alphabetic extension.
/// The extension itself must be alphabetic so that applying the transformer twice is a no-op.
#[derive(Debug, Clone)]
pub struct SetIriExtensionTransformer {
    extension: String,
    existing: Regex,
}

impl SetIriExtensionTransformer {
    /// `extension` is given without its leading dot, e.g. `nq`
    pub fn new(extension: impl Into<String>) -> Result<Self> {
        let extension = extension.into();
        if extension.starts_with('.') {
            return Err(Error::new(ConfigurationError::new(
                "set-iri-extension",
                format!("extension '{}' must not start with a dot", extension),
            )));
        }
        if !extension.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::new(ConfigurationError::new(
                "set-iri-extension",
                format!("extension '{}' may only contain ASCII letters", extension),
            )));
        }
        debug!("Setting IRI extensions to .{}", extension);
        Ok(Self {
            extension,
            existing: Regex::new(r"\.[A-Za-z]*$")?,
        })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn rewrite(&self, term: Term) -> Term {
        match term {
            Term::NamedNode(n) => {
                let stem = self.existing.replace(n.as_str(), "");
                NamedNode::new_unchecked(format!("{}.{}", stem, self.extension)).into()
            }
            other => other,
        }
    }
}

impl QuadTransformer for SetIriExtensionTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![map_terms(quad, |t| Ok(self.rewrite(t)))?])
    }

    fn name(&self) -> &'static str {
        "set-iri-extension"
    }
}

/// Spreads IRIs over several replacement templates. The first capture group of `search` must
/// hold a non-negative integer; that integer modulo the number of templates picks the template
/// which is then substituted like a regular regex replacement. The same integer therefore
/// always lands on the same template.
#[derive(Debug, Clone)]
pub struct DistributeIriTransformer {
    search: Regex,
    replacements: Vec<String>,
}

impl DistributeIriTransformer {
    pub fn new(search: Regex, replacements: Vec<String>) -> Result<Self> {
        let replacements: Vec<String> = replacements
            .iter()
            .map(|r| normalize_replacement(r))
            .collect();
        // captures_len counts the implicit whole-match group
        if search.captures_len() < 2 {
            return Err(Error::new(ConfigurationError::new(
                "distribute-iri",
                format!("regex {} has no capture group", search.as_str()),
            )));
        }
        if replacements.is_empty() {
            return Err(Error::new(ConfigurationError::new(
                "distribute-iri",
                "at least one replacement template is required",
            )));
        }
        debug!(
            "Distributing IRIs matching {} over {} templates",
            search.as_str(),
            replacements.len()
        );
        Ok(Self {
            search,
            replacements,
        })
    }

    pub fn from_pattern(search: &str, replacements: Vec<String>) -> Result<Self> {
        Self::new(compile_regex("distribute-iri", search)?, replacements)
    }

    /// Index of the template chosen for a captured value
    pub fn bucket(&self, captured: &str) -> Option<usize> {
        bucket_of(captured, self.replacements.len())
    }

    fn rewrite(&self, term: Term) -> Result<Term> {
        let Term::NamedNode(n) = term else {
            return Ok(term);
        };
        let Some(caps) = self.search.captures(n.as_str()) else {
            return Ok(Term::NamedNode(n));
        };
        let captured = caps.get(1).map_or("", |m| m.as_str());
        let index = self.bucket(captured).ok_or_else(|| {
            Error::new(InvalidCaptureError {
                iri: n.as_str().to_string(),
                captured: captured.to_string(),
            })
        })?;
        let value = self
            .search
            .replace(n.as_str(), self.replacements[index].as_str());
        Ok(NamedNode::new_unchecked(value.into_owned()).into())
    }
}

/// Computes `value mod buckets` digit by digit, so captured numbers of any length work.
fn bucket_of(value: &str, buckets: usize) -> Option<usize> {
    if value.is_empty() || buckets == 0 {
        return None;
    }
    let buckets = buckets as u128;
    value.bytes().try_fold(0u128, |acc, b| {
        b.is_ascii_digit()
            .then(|| (acc * 10 + u128::from(b - b'0')) % buckets)
    })
    .map(|rem| rem as usize)
}

impl QuadTransformer for DistributeIriTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        Ok(vec![map_terms(quad, |t| self.rewrite(t))?])
    }

    fn name(&self) -> &'static str {
        "distribute-iri"
    }
}

/// Keeps only the quads its matcher accepts.
pub struct FilterTransformer {
    matcher: Box<dyn QuadMatcher>,
}

impl FilterTransformer {
    pub fn new(matcher: Box<dyn QuadMatcher>) -> Self {
        Self { matcher }
    }
}

impl QuadTransformer for FilterTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        if self.matcher.matches(&quad) {
            Ok(vec![quad])
        } else {
            Ok(vec![])
        }
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}

/// Drops quads this instance has already emitted. Memory grows with the number of distinct
/// quads seen.
#[derive(Debug, Default)]
pub struct DeduplicateTransformer {
    seen: HashSet<Quad>,
    dropped: usize,
}

impl DeduplicateTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl QuadTransformer for DeduplicateTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        if self.seen.contains(&quad) {
            self.dropped += 1;
            return Ok(vec![]);
        }
        self.seen.insert(quad.clone());
        Ok(vec![quad])
    }

    fn finalize(&mut self) -> Result<()> {
        info!(
            "Dropped {} duplicate quads ({} distinct)",
            self.dropped,
            self.seen.len()
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "deduplicate"
    }
}

/// Runs a nested chain as a single transformer.
#[derive(Default)]
pub struct SequentialTransformer {
    transformers: Vec<Box<dyn QuadTransformer>>,
}

impl SequentialTransformer {
    pub fn new(transformers: Vec<Box<dyn QuadTransformer>>) -> Self {
        Self { transformers }
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl QuadTransformer for SequentialTransformer {
    fn transform(&mut self, quad: Quad) -> Result<Vec<Quad>> {
        apply_chain(&mut self.transformers, quad)
    }

    fn finalize(&mut self) -> Result<()> {
        finalize_chain(&mut self.transformers)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}
