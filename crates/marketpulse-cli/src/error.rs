use marketpulse_core::{ErrorKind, PipelineError, RenderError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{} ({})", .0, .0.code())]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Pipeline(error) => match error.kind() {
                ErrorKind::ValidationFailure => 2,
                ErrorKind::RenderFailure => 4,
                ErrorKind::ConfigurationMissing
                | ErrorKind::UpstreamFailure
                | ErrorKind::UpstreamTimeout => 3,
            },
            Self::Render(_) => 4,
            Self::Serialization(_) => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Io(_) => 10,
        }
    }
}
