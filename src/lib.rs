pub mod caption;
pub mod error;

pub use caption::{BeamConfig, BeamSearchDecoder, Candidate, SequenceModel, TokenId, Vocabulary};
pub use error::CaptionError;
