use thiserror::Error;

/// Boxed failure raised by a model collaborator.
pub type ModelFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified caption decoding errors.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Model: {0}")]
    Model(#[source] ModelFailure),

    #[error("Model step output shape mismatch: {0}")]
    StepShape(String),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CaptionError {
    pub(crate) fn model<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Model(Box::new(err))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => {
                "The caption settings are invalid. Check beam size and caption length."
            }
            Self::InvalidState(_) => "The caption decoder was used out of order.",
            Self::Model(_) | Self::StepShape(_) => {
                "The caption model failed to run. Try again or reload the model."
            }
            Self::Json(_) => "The captions could not be formatted.",
        }
    }
}

impl serde::Serialize for CaptionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
