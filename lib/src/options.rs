//! Shared option types that replace boolean flag parameters in the Rust API.

use serde::{Deserialize, Serialize};

/// Controls which quads a resource-type matcher accepts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceScope {
    /// Only the `rdf:type` quads that define the resource type.
    #[default]
    TypeOnly,
    /// The defining quad plus every later quad about the same subject.
    FullResource,
}

impl ResourceScope {
    pub fn is_full_resource(self) -> bool {
        matches!(self, ResourceScope::FullResource)
    }
}

impl From<bool> for ResourceScope {
    fn from(value: bool) -> Self {
        if value {
            ResourceScope::FullResource
        } else {
            ResourceScope::TypeOnly
        }
    }
}

impl From<ResourceScope> for bool {
    fn from(value: ResourceScope) -> Self {
        value.is_full_resource()
    }
}

/// Which part of a quad a term-value matcher inspects.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
    Graph,
}

impl TermPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            TermPosition::Subject => "subject",
            TermPosition::Predicate => "predicate",
            TermPosition::Object => "object",
            TermPosition::Graph => "graph",
        }
    }
}

impl std::fmt::Display for TermPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
