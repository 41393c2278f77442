use std::cmp::Ordering;

use super::TokenId;

/// One partial or complete caption hypothesis.
///
/// Candidates never change after construction; expanding one produces a new
/// Candidate with its own copy of the model state.
#[derive(Debug, Clone)]
pub struct Candidate<S, M> {
    sequence: Vec<TokenId>,
    state: S,
    log_probability: f32,
    score: f32,
    metadata: Option<Vec<M>>,
}

impl<S, M> Candidate<S, M> {
    pub fn initial(start_id: TokenId, state: S, metadata: Option<M>) -> Self {
        Self {
            sequence: vec![start_id],
            state,
            log_probability: 0.0,
            score: 0.0,
            metadata: metadata.map(|m| vec![m]),
        }
    }

    pub fn sequence(&self) -> &[TokenId] {
        &self.sequence
    }

    pub fn last_token(&self) -> TokenId {
        // Sequences always hold at least the start token.
        self.sequence[self.sequence.len() - 1]
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn log_probability(&self) -> f32 {
        self.log_probability
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn metadata(&self) -> Option<&[M]> {
        self.metadata.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl<S, M: Clone> Candidate<S, M> {
    /// Appends `token` with probability `probability`.
    ///
    /// `metadata` is only recorded when this candidate already carries
    /// metadata, so its length keeps matching the sequence length.
    pub fn extend(&self, token: TokenId, probability: f32, state: S, metadata: Option<M>) -> Self {
        let mut sequence = Vec::with_capacity(self.sequence.len() + 1);
        sequence.extend_from_slice(&self.sequence);
        sequence.push(token);

        let metadata = self.metadata.as_ref().map(|held| {
            let mut next = Vec::with_capacity(held.len() + 1);
            next.extend_from_slice(held);
            next.push(metadata.unwrap_or_else(|| held[held.len() - 1].clone()));
            next
        });

        let log_probability = self.log_probability + probability.ln();
        Self {
            sequence,
            state,
            log_probability,
            score: log_probability,
            metadata,
        }
    }

    /// Applies length normalization to the ranking score. A factor of zero
    /// leaves the score equal to the log probability.
    pub fn completed(mut self, length_normalization_factor: f32) -> Self {
        if length_normalization_factor > 0.0 {
            let length = self.sequence.len() as f32;
            self.score = self.log_probability / length.powf(length_normalization_factor);
        }
        self
    }
}

impl<S, M> PartialEq for Candidate<S, M> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S, M> Eq for Candidate<S, M> {}

impl<S, M> PartialOrd for Candidate<S, M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, M> Ord for Candidate<S, M> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Candidate<u8, &'static str> {
        Candidate::initial(0, 7, Some(""))
    }

    #[test]
    fn initial_candidate_is_start_token_only() {
        let c = root();
        assert_eq!(c.sequence(), &[0]);
        assert_eq!(c.last_token(), 0);
        assert_eq!(c.log_probability(), 0.0);
        assert_eq!(c.score(), 0.0);
        assert_eq!(c.metadata(), Some(&[""][..]));
    }

    #[test]
    fn extend_leaves_parent_untouched() {
        let parent = root();
        let child = parent.extend(4, 0.5, 8, Some("a"));
        assert_eq!(parent.sequence(), &[0]);
        assert_eq!(*parent.state(), 7);
        assert_eq!(child.sequence(), &[0, 4]);
        assert_eq!(*child.state(), 8);
        assert!((child.log_probability() - 0.5f32.ln()).abs() < 1e-6);
        assert_eq!(child.metadata(), Some(&["", "a"][..]));
    }

    #[test]
    fn metadata_absent_stays_absent() {
        let parent: Candidate<(), u8> = Candidate::initial(1, (), None);
        let child = parent.extend(2, 0.9, (), Some(3));
        assert!(child.metadata().is_none());
    }

    #[test]
    fn zero_factor_keeps_score_equal_to_log_probability() {
        let c = root().extend(1, 0.3, 0, None).completed(0.0);
        assert_eq!(c.score(), c.log_probability());
    }

    #[test]
    fn normalization_divides_by_length_power() {
        let mut c = root();
        for t in 1..5 {
            c = c.extend(t, 0.5, 0, Some("x"));
        }
        assert_eq!(c.len(), 5);
        let c = c.completed(2.0);
        assert!((c.score() - c.log_probability() / 25.0).abs() < 1e-6);
    }

    #[test]
    fn ordering_uses_score_only() {
        let a = root().extend(1, 0.5, 0, None);
        let b = root().extend(2, 0.5, 1, None);
        let worse = root().extend(3, 0.1, 2, None);
        assert_eq!(a, b);
        assert!(worse < a);
    }
}
