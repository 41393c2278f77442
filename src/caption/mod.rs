pub mod candidate;
pub mod config;
pub mod model;
pub mod render;
pub mod search;
pub mod top_set;
pub mod vocab;

/// Vocabulary index of a token.
pub type TokenId = u32;

pub use candidate::Candidate;
pub use config::BeamConfig;
pub use model::{SequenceModel, StepOutput, Vocabulary};
pub use render::{caption_report, render_captions, Caption, CaptionReport};
pub use search::{BeamSearchDecoder, CaptionCandidate, MIN_PROBABILITY};
pub use top_set::BoundedTopSet;
pub use vocab::TokenTable;
