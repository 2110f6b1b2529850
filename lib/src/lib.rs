//! Streaming transformation and matching engine for fragmenting RDF datasets.
//!
//! Quads are pulled from a [`io::QuadSource`], threaded through an ordered chain of
//! [`transform::QuadTransformer`]s by the [`engine`], and handed to a
//! [`fragmenter::FragmentationStrategy`] which places them into a [`io::QuadSink`]. The
//! [`fragmenter::Fragmenter`] wires these together for one run.

extern crate derive_builder;

pub mod config;
pub mod consts;
pub mod engine;
pub mod errors;
pub mod fragmenter;
pub mod io;
pub mod matcher;
pub mod options;
pub mod transform;
pub mod util;

pub use engine::{apply_chain, TransformStream};
pub use fragmenter::{FragmentationStrategy, Fragmenter};
pub use io::{CompositeSource, FileSource, MemorySource, QuadSink, QuadSource, QuadStream};
pub use matcher::{QuadMatcher, ResourceTypeMatcher, TermValueMatcher};
pub use transform::QuadTransformer;

use crate::consts::LOG_ENV_VAR;

/// Initializes logging for the library.
///
/// If `FRAGMENTER_LOG` is set, `RUST_LOG` is set to its value before `env_logger` is
/// installed. Calling this more than once is harmless.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var(LOG_ENV_VAR) {
        std::env::set_var("RUST_LOG", log_level);
    }
    let _ = env_logger::try_init();
}
