use serde::Serialize;

use crate::error::CaptionError;

use super::candidate::Candidate;
use super::model::Vocabulary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    pub text: String,
    pub probability: f32,
    pub log_probability: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionReport {
    pub captions: Vec<Caption>,
}

impl CaptionReport {
    pub fn to_json(&self) -> Result<String, CaptionError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Turns candidates into readable captions, keeping their order.
///
/// The leading start token is dropped, and so is a trailing end token when
/// the candidate completed; unfinished candidates keep their last word.
pub fn render_captions<S, M, V>(candidates: &[Candidate<S, M>], vocab: &V) -> Vec<Caption>
where
    V: Vocabulary + ?Sized,
{
    candidates
        .iter()
        .map(|candidate| {
            let mut words = candidate.sequence();
            if words.first() == Some(&vocab.start_id()) {
                words = &words[1..];
            }
            if words.last() == Some(&vocab.end_id()) {
                words = &words[..words.len() - 1];
            }
            let text = words
                .iter()
                .map(|&id| vocab.token_for_id(id))
                .collect::<Vec<_>>()
                .join(" ");
            Caption {
                text,
                probability: candidate.log_probability().exp(),
                log_probability: candidate.log_probability(),
            }
        })
        .collect()
}

pub fn caption_report<S, M, V>(candidates: &[Candidate<S, M>], vocab: &V) -> CaptionReport
where
    V: Vocabulary + ?Sized,
{
    let captions = render_captions(candidates, vocab);
    for caption in &captions {
        log::info!("Caption {:?} (p={:.4})", caption.text, caption.probability);
    }
    CaptionReport { captions }
}
