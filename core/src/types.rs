use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::mime::MimeError;

/// Unified error surfaced by the signer.
/// - Every variant is final: nothing here is retried internally.
/// - `From` impls classify module errors so `?` works across the pipeline.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Invalid construction-time configuration (empty encryption key, bad engine option).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A key could not be found or cannot serve the requested operation.
    #[error("key error: {0}")]
    Key(#[source] EngineError),

    /// The signing passphrase is missing or wrong.
    #[error("passphrase error: {0}")]
    Passphrase(#[source] EngineError),

    /// Engine process or communication failure, or unusable engine output.
    #[error("engine error: {0}")]
    Engine(#[source] EngineError),

    /// The message cannot be rendered into its canonical form.
    #[error("message structure error: {0}")]
    MessageStructure(#[from] MimeError),
}

impl SignerError {
    pub fn is_key_error(&self) -> bool {
        matches!(self, SignerError::Key(_))
    }

    pub fn is_passphrase_error(&self) -> bool {
        matches!(self, SignerError::Passphrase(_))
    }
}

impl From<EngineError> for SignerError {
    fn from(e: EngineError) -> Self {
        use EngineError::*;
        match e {
            KeyNotFound { .. } | KeyUnusable { .. } | NoEncryptKey | NoSignKey => SignerError::Key(e),
            BadPassphrase { .. } | MissingPassphrase { .. } => SignerError::Passphrase(e),
            UnsupportedOption { .. } | InvalidOption { .. } => SignerError::Configuration(e.to_string()),
            EmptyInput | MalformedOutput(_) | Process { .. } | Io(_) => SignerError::Engine(e),
        }
    }
}

impl From<ConfigError> for SignerError {
    fn from(e: ConfigError) -> Self {
        SignerError::Configuration(e.to_string())
    }
}
