//! The transform engine: threads every quad through an ordered chain of transformers.
//!
//! [`apply_chain`] is the pure fold over one input quad. [`TransformStream`] applies that fold
//! to a whole upstream stream lazily, one input quad at a time, and runs the finalize hooks once
//! the upstream is exhausted.

use crate::io::QuadStream;
use crate::transform::QuadTransformer;
use anyhow::Result;
use log::{debug, info};
use oxigraph::model::Quad;
use std::collections::VecDeque;

/// Applies `chain` to a single quad. Each transformer is applied to every quad produced by the
/// previous one, concatenating the outputs in order. Once the set of quads becomes empty the
/// remaining transformers are not called.
pub fn apply_chain(chain: &mut [Box<dyn QuadTransformer>], quad: Quad) -> Result<Vec<Quad>> {
    chain
        .iter_mut()
        .try_fold(vec![quad], |quads, transformer| -> Result<Vec<Quad>> {
            let mut next = Vec::with_capacity(quads.len());
            for quad in quads {
                next.extend(transformer.transform(quad)?);
            }
            Ok(next)
        })
}

/// Calls every finalize hook in chain order, stopping at the first error
pub fn finalize_chain(chain: &mut [Box<dyn QuadTransformer>]) -> Result<()> {
    for transformer in chain.iter_mut() {
        debug!("Finalizing transformer {}", transformer.name());
        transformer.finalize()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Running,
    Finished,
    Failed,
}

/// Lazily transforms an upstream quad stream. The full output of input quad `k` is emitted
/// before input quad `k + 1` is pulled, and nothing is buffered across input quads.
///
/// The first error, from upstream or from a transformer, is yielded once and ends the stream;
/// finalize hooks only run after the upstream ends without error.
pub struct TransformStream<'a> {
    chain: &'a mut [Box<dyn QuadTransformer>],
    upstream: QuadStream<'a>,
    pending: VecDeque<Quad>,
    state: StreamState,
    consumed: usize,
    emitted: usize,
}

impl<'a> TransformStream<'a> {
    pub fn new(chain: &'a mut [Box<dyn QuadTransformer>], upstream: QuadStream<'a>) -> Self {
        Self {
            chain,
            upstream,
            pending: VecDeque::new(),
            state: StreamState::Running,
            consumed: 0,
            emitted: 0,
        }
    }

    /// Number of upstream quads pulled so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of quads yielded so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn fail(&mut self, err: anyhow::Error) -> Option<Result<Quad>> {
        self.state = StreamState::Failed;
        self.pending.clear();
        Some(Err(err))
    }
}

impl Iterator for TransformStream<'_> {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(quad) = self.pending.pop_front() {
                self.emitted += 1;
                return Some(Ok(quad));
            }
            if self.state != StreamState::Running {
                return None;
            }
            match self.upstream.next() {
                Some(Ok(quad)) => {
                    self.consumed += 1;
                    match apply_chain(self.chain, quad) {
                        Ok(quads) => self.pending.extend(quads),
                        Err(e) => return self.fail(e),
                    }
                }
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.state = StreamState::Finished;
                    info!(
                        "Transformed {} quads into {} quads",
                        self.consumed, self.emitted
                    );
                    if let Err(e) = finalize_chain(self.chain) {
                        return self.fail(e);
                    }
                    return None;
                }
            }
        }
    }
}
