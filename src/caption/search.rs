use std::time::Instant;

use ndarray::ArrayView1;
use rayon::prelude::*;

use crate::error::CaptionError;

use super::candidate::Candidate;
use super::config::BeamConfig;
use super::model::{SequenceModel, StepOutput, Vocabulary};
use super::top_set::BoundedTopSet;
use super::TokenId;

/// Probabilities below this never produce a child, which keeps `ln` finite.
pub const MIN_PROBABILITY: f32 = 1e-12;

/// Batch × vocabulary cells above which `parallel_expansion` fans out.
const PARALLEL_EXPANSION_THRESHOLD: usize = 1 << 14;

pub type CaptionCandidate<M> =
    Candidate<<M as SequenceModel>::State, <M as SequenceModel>::Metadata>;

enum Child<S, M> {
    Complete(Candidate<S, M>),
    Partial(Candidate<S, M>),
}

#[derive(Clone, Copy)]
struct Expansion {
    beam_size: usize,
    end_id: TokenId,
    length_normalization_factor: f32,
}

impl Expansion {
    fn expand<S: Clone, M: Clone>(
        &self,
        candidate: &Candidate<S, M>,
        probabilities: ArrayView1<f32>,
        state: &S,
        metadata: Option<&M>,
    ) -> Vec<Child<S, M>> {
        let mut words: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
        words.sort_by(|a, b| b.1.total_cmp(&a.1));
        words.truncate(self.beam_size);

        words
            .into_iter()
            .filter(|(_, p)| *p >= MIN_PROBABILITY)
            .map(|(word, p)| {
                let token = word as TokenId;
                let child = candidate.extend(token, p, state.clone(), metadata.cloned());
                if token == self.end_id {
                    Child::Complete(child.completed(self.length_normalization_factor))
                } else {
                    Child::Partial(child)
                }
            })
            .collect()
    }
}

/// Beam search over a [`SequenceModel`], producing ranked caption candidates.
pub struct BeamSearchDecoder<M: SequenceModel> {
    model: M,
    config: BeamConfig,
    start_id: TokenId,
    end_id: TokenId,
}

impl<M: SequenceModel> BeamSearchDecoder<M> {
    pub fn new<V>(model: M, vocab: &V, config: BeamConfig) -> Result<Self, CaptionError>
    where
        V: Vocabulary + ?Sized,
    {
        config.validate()?;
        Ok(Self {
            model,
            config,
            start_id: vocab.start_id(),
            end_id: vocab.end_id(),
        })
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Decodes one encoded input into at most `beam_size` candidates, best first.
    ///
    /// Completed captions (ending in the end token) are returned when any
    /// exist; otherwise the unfinished beam is returned instead. The two are
    /// never mixed. Model failures abort decoding.
    pub fn beam_search(
        &mut self,
        encoded_input: &[u8],
    ) -> Result<Vec<CaptionCandidate<M>>, CaptionError> {
        let search_start = Instant::now();
        let beam_size = self.config.beam_size;
        let uses_metadata = self.model.uses_metadata();

        let initial_state = self.model.feed(encoded_input).map_err(CaptionError::model)?;
        let initial = Candidate::initial(
            self.start_id,
            initial_state,
            uses_metadata.then(<M::Metadata as Default>::default),
        );

        let mut partial = BoundedTopSet::new(beam_size)?;
        partial.push(initial)?;
        let mut complete = BoundedTopSet::new(beam_size)?;

        let expansion = Expansion {
            beam_size,
            end_id: self.end_id,
            length_normalization_factor: self.config.length_normalization_factor,
        };

        for step in 1..self.config.max_caption_length {
            let beam = partial.extract(false)?;
            partial.reset();

            let tokens: Vec<TokenId> = beam.iter().map(Candidate::last_token).collect();
            let states: Vec<M::State> = beam.iter().map(|c| c.state().clone()).collect();

            let step_start = Instant::now();
            let output = self
                .model
                .step(&tokens, &states)
                .map_err(CaptionError::model)?;
            log::debug!(
                "Model step {} (batch={}) completed in {:?}",
                step,
                beam.len(),
                step_start.elapsed()
            );
            check_step_shape(&output, beam.len(), uses_metadata)?;

            let children = self.expand_beam(expansion, &beam, &output);
            for child in children.into_iter().flatten() {
                match child {
                    Child::Complete(c) => complete.push(c)?,
                    Child::Partial(c) => partial.push(c)?,
                }
            }

            let open = partial.size()?;
            log::debug!(
                "Beam step {}: {} open, {} completed",
                step,
                open,
                complete.size()?
            );
            if open == 0 {
                break;
            }
        }

        let mut result = if complete.size()? == 0 {
            log::warn!("No caption reached the end token; returning the unfinished beam");
            partial
        } else {
            complete
        };
        let captions = result.extract(true)?;
        log::info!(
            "Beam search produced {} captions in {:?}",
            captions.len(),
            search_start.elapsed()
        );
        Ok(captions)
    }

    fn expand_beam(
        &self,
        expansion: Expansion,
        beam: &[CaptionCandidate<M>],
        output: &StepOutput<M::State, M::Metadata>,
    ) -> Vec<Vec<Child<M::State, M::Metadata>>> {
        let metadata = if self.model.uses_metadata() {
            output.metadata.as_deref()
        } else {
            None
        };
        let expand = |i: usize| {
            expansion.expand(
                &beam[i],
                output.probabilities.row(i),
                &output.states[i],
                metadata.map(|m| &m[i]),
            )
        };

        let work = beam.len() * output.probabilities.ncols();
        if self.config.parallel_expansion && beam.len() > 1 && work >= PARALLEL_EXPANSION_THRESHOLD
        {
            // Children are collected in candidate order and pushed by the
            // caller, so the result matches the sequential path.
            (0..beam.len()).into_par_iter().map(&expand).collect()
        } else {
            (0..beam.len()).map(&expand).collect()
        }
    }
}

fn check_step_shape<S, M>(
    output: &StepOutput<S, M>,
    batch: usize,
    uses_metadata: bool,
) -> Result<(), CaptionError> {
    if output.probabilities.nrows() != batch {
        return Err(CaptionError::StepShape(format!(
            "expected {batch} probability rows, got {}",
            output.probabilities.nrows()
        )));
    }
    if output.states.len() != batch {
        return Err(CaptionError::StepShape(format!(
            "expected {batch} states, got {}",
            output.states.len()
        )));
    }
    match (&output.metadata, uses_metadata) {
        (Some(m), true) if m.len() != batch => Err(CaptionError::StepShape(format!(
            "expected {batch} metadata values, got {}",
            m.len()
        ))),
        (None, true) => Err(CaptionError::StepShape(
            "model uses metadata but the step returned none".into(),
        )),
        _ => Ok(()),
    }
}
