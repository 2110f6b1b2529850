//! Defines constant NamedNodeRefs for the RDF terms the matchers and transformers look for.

use oxigraph::model::NamedNodeRef;

pub const TYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");

/// Environment variable that overrides `RUST_LOG` for this library
pub const LOG_ENV_VAR: &str = "FRAGMENTER_LOG";

/// Probability used by term-value matchers when none is configured
pub const DEFAULT_PROBABILITY: f64 = 1.0;
