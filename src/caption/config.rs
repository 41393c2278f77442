use serde::Deserialize;

use crate::error::CaptionError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    pub beam_size: usize,
    /// Includes the start token.
    pub max_caption_length: usize,
    pub length_normalization_factor: f32,
    pub parallel_expansion: bool,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_size: 3,
            max_caption_length: 20,
            length_normalization_factor: 0.0,
            parallel_expansion: false,
        }
    }
}

impl BeamConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides("CAPTION_");
        config
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        let parse_env = |suffix: &str| std::env::var(format!("{prefix}{suffix}")).ok();

        if let Some(v) = parse_env("BEAM_SIZE").and_then(|s| s.parse().ok()) {
            self.beam_size = v;
        }
        if let Some(v) = parse_env("MAX_CAPTION_LENGTH").and_then(|s| s.parse().ok()) {
            self.max_caption_length = v;
        }
        if let Some(v) = parse_env("LENGTH_NORMALIZATION_FACTOR").and_then(|s| s.parse().ok()) {
            self.length_normalization_factor = v;
        }
        if let Some(v) = parse_env("PARALLEL_EXPANSION") {
            match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.parallel_expansion = true,
                "0" | "false" | "no" | "off" => self.parallel_expansion = false,
                _ => log::warn!("Ignoring {prefix}PARALLEL_EXPANSION={v:?}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), CaptionError> {
        if self.beam_size == 0 {
            return Err(CaptionError::InvalidArgument(
                "beam_size must be positive".into(),
            ));
        }
        if self.max_caption_length == 0 {
            return Err(CaptionError::InvalidArgument(
                "max_caption_length must be positive".into(),
            ));
        }
        if !self.length_normalization_factor.is_finite() || self.length_normalization_factor < 0.0
        {
            return Err(CaptionError::InvalidArgument(format!(
                "length_normalization_factor must be a finite value >= 0, got {}",
                self.length_normalization_factor
            )));
        }
        Ok(())
    }
}
