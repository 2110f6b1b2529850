//! Defines the `Fragmenter`, which runs a source through the transform engine into a
//! fragmentation strategy and closes the sink afterwards.

use crate::config::PipelineConfig;
use crate::engine::TransformStream;
use crate::io::{QuadSink, QuadSource, QuadStream};
use crate::transform::QuadTransformer;
use anyhow::Result;
use log::{error, info};

/// Decides where every quad of a stream belongs and pushes it into the sink. Implementations
/// should consume the stream to the end and return the first error they encounter.
pub trait FragmentationStrategy {
    fn fragment(&mut self, quads: QuadStream<'_>, sink: &mut dyn QuadSink) -> Result<()>;
}

pub struct Fragmenter {
    source: Box<dyn QuadSource>,
    transformers: Vec<Box<dyn QuadTransformer>>,
    strategy: Box<dyn FragmentationStrategy>,
    sink: Box<dyn QuadSink>,
}

impl Fragmenter {
    pub fn new(
        source: Box<dyn QuadSource>,
        strategy: Box<dyn FragmentationStrategy>,
        sink: Box<dyn QuadSink>,
    ) -> Self {
        Self {
            source,
            transformers: vec![],
            strategy,
            sink,
        }
    }

    pub fn with_transformers(mut self, transformers: Vec<Box<dyn QuadTransformer>>) -> Self {
        self.transformers = transformers;
        self
    }

    /// Builds the source and transformer chain described by `config`
    pub fn from_config(
        config: &PipelineConfig,
        strategy: Box<dyn FragmentationStrategy>,
        sink: Box<dyn QuadSink>,
    ) -> Result<Self> {
        let source = config.build_source()?;
        let transformers = config.build_transformers()?;
        Ok(Self::new(source, strategy, sink).with_transformers(transformers))
    }

    pub fn num_transformers(&self) -> usize {
        self.transformers.len()
    }

    /// Performs one run. The sink is closed exactly once, whether or not the strategy
    /// succeeded. When both the run and the close fail, the run's error is returned and the
    /// close error is only logged.
    pub fn fragment(&mut self) -> Result<()> {
        info!(
            "Fragmenting {} through {} transformers",
            self.source.describe(),
            self.transformers.len()
        );
        let outcome = self.run_strategy();
        let closed = self.sink.close();
        match (outcome, closed) {
            (Ok(()), Ok(())) => {
                info!("Fragmentation finished");
                Ok(())
            }
            (Ok(()), Err(close_err)) => Err(close_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                error!("Failed to close sink after failed run: {}", close_err);
                Err(e)
            }
        }
    }

    fn run_strategy(&mut self) -> Result<()> {
        let upstream = self.source.quads()?;
        let quads: QuadStream<'_> = if self.transformers.is_empty() {
            upstream
        } else {
            Box::new(TransformStream::new(&mut self.transformers, upstream))
        };
        self.strategy.fragment(quads, self.sink.as_mut())
    }
}
