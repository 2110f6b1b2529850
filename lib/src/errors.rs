// Error types that callers may want to downcast out of an anyhow::Error

use std::fmt;

/// A transformer or matcher was set up with values it cannot work with.
#[derive(Debug)]
pub struct ConfigurationError {
    pub component: &'static str,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(component: &'static str, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid {} configuration: {}", self.component, self.message)
    }
}

impl std::error::Error for ConfigurationError {}

/// A distribution regex captured text which is not a non-negative base-10 integer.
#[derive(Debug)]
pub struct InvalidCaptureError {
    pub iri: String,
    pub captured: String,
}

impl fmt::Display for InvalidCaptureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Captured value '{}' in IRI {} is not a valid integer",
            self.captured, self.iri
        )
    }
}

impl std::error::Error for InvalidCaptureError {}

/// A rewrite produced a term which cannot occupy the quad position it was taken from.
#[derive(Debug)]
pub struct TermPositionError {
    pub position: &'static str,
    pub term: String,
}

impl fmt::Display for TermPositionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Term {} is not allowed as {}", self.term, self.position)
    }
}

impl std::error::Error for TermPositionError {}
