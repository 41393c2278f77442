use ndarray::Array2;

use super::TokenId;

/// Output of one batched decoding step.
///
/// Row `i` of `probabilities`, `states[i]` and `metadata[i]` all belong to
/// the `i`-th (token, state) pair passed to [`SequenceModel::step`].
#[derive(Debug, Clone)]
pub struct StepOutput<S, M> {
    pub probabilities: Array2<f32>,
    pub states: Vec<S>,
    pub metadata: Option<Vec<M>>,
}

/// A step-wise caption model: one call to encode the input, then one batched
/// call per decoding step.
pub trait SequenceModel {
    type State: Clone + Send + Sync;
    type Metadata: Clone + Default + Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produces the initial decoder state for an encoded input (e.g. image bytes).
    fn feed(&mut self, encoded_input: &[u8]) -> Result<Self::State, Self::Error>;

    /// Advances every (previous token, state) pair by one token.
    fn step(
        &mut self,
        previous_tokens: &[TokenId],
        states: &[Self::State],
    ) -> Result<StepOutput<Self::State, Self::Metadata>, Self::Error>;

    /// Whether `step` reports per-token metadata such as attention maps.
    fn uses_metadata(&self) -> bool {
        false
    }
}

pub trait Vocabulary {
    fn start_id(&self) -> TokenId;
    fn end_id(&self) -> TokenId;
    fn token_for_id(&self, id: TokenId) -> &str;
}
