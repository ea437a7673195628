//! config.rs
//! Construction-time signer configuration.
//!
//! Design notes:
//! - Empty strings mean "absent": an empty signing key disables signing and an empty
//!   passphrase means "no passphrase", never "the empty passphrase".
//! - `Debug` never prints the passphrase.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Recipient key id, fingerprint or user id. Required.
    pub encrypt_key: String,

    /// Signing key id; empty or absent disables signing.
    #[serde(default)]
    pub sign_key: Option<String>,

    /// Passphrase unlocking `sign_key`.
    #[serde(default)]
    pub passphrase: Option<String>,

    /// Options forwarded to the OpenPGP engine.
    #[serde(default)]
    pub engine: EngineOptions,
}

impl SignerConfig {
    pub fn new(encrypt_key: impl Into<String>) -> Self {
        Self { encrypt_key: encrypt_key.into(), ..Default::default() }
    }

    pub fn with_sign_key(mut self, sign_key: impl Into<String>) -> Self {
        self.sign_key = Some(sign_key.into());
        self
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn with_engine_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.engine.set(name, value);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encrypt_key.trim().is_empty() {
            return Err(ConfigError::EmptyEncryptKey);
        }
        Ok(())
    }

    /// Signing key when signing is enabled.
    pub fn effective_sign_key(&self) -> Option<&str> {
        self.sign_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Passphrase, with the empty string mapped to `None`.
    pub fn effective_passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().filter(|p| !p.is_empty())
    }

    pub fn signing_enabled(&self) -> bool {
        self.effective_sign_key().is_some()
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("encrypt_key", &self.encrypt_key)
            .field("sign_key", &self.sign_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("engine", &self.engine)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Encryption key identifier is empty or whitespace.
    EmptyEncryptKey,

    /// Configuration document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyEncryptKey => write!(f, "encryption key identifier must not be empty"),
            ConfigError::Parse(msg) => write!(f, "invalid signer configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
