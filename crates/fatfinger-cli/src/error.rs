use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
///
/// Fatal pipeline errors are not listed here: they are reported in the output
/// envelope's `errors` and end the process with exit code 3.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] fatfinger_core::ValidationError),

    #[error(transparent)]
    Config(#[from] fatfinger_core::ConfigError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
