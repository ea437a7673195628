//! engine/types.rs
//! OpenPGP engine contract, its options and its error type.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// Narrow contract with an OpenPGP backend.
///
/// Key registration mutates the engine and happens once, at signer construction.
/// Encryption borrows it immutably; an engine that keeps per-call state must
/// provide its own interior synchronisation.
pub trait OpenPgpEngine {
    /// Register a recipient. Fails if the key cannot be found or cannot encrypt.
    fn add_encrypt_key(&mut self, key_id: &str) -> Result<(), EngineError>;

    /// Register the signing key and the passphrase that unlocks it (`None` = no passphrase).
    fn add_sign_key(&mut self, key_id: &str, passphrase: Option<&str>) -> Result<(), EngineError>;

    /// Encrypt to every registered recipient, ASCII armored.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError>;

    /// Encrypt to every registered recipient and sign with the registered signing key.
    fn encrypt_and_sign(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError>;
}

impl<E: OpenPgpEngine + ?Sized> OpenPgpEngine for Box<E> {
    fn add_encrypt_key(&mut self, key_id: &str) -> Result<(), EngineError> {
        (**self).add_encrypt_key(key_id)
    }

    fn add_sign_key(&mut self, key_id: &str, passphrase: Option<&str>) -> Result<(), EngineError> {
        (**self).add_sign_key(key_id, passphrase)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        (**self).encrypt(plaintext)
    }

    fn encrypt_and_sign(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        (**self).encrypt_and_sign(plaintext)
    }
}

/// Engine-specific options, forwarded untouched from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineOptions(BTreeMap<String, String>);

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EngineOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// Nothing to encrypt.
    EmptyInput,

    /// No recipient was registered before `encrypt`.
    NoEncryptKey,

    /// No signing key was registered before `encrypt_and_sign`.
    NoSignKey,

    /// The key id does not resolve to any key in the keyring.
    KeyNotFound { key_id: String },

    /// The key exists but cannot be used for the requested operation.
    KeyUnusable { key_id: String, reason: String },

    /// The passphrase supplied for the signing key was rejected.
    BadPassphrase { key_id: Option<String> },

    /// The signing key needs a passphrase and none was supplied.
    MissingPassphrase { key_id: Option<String> },

    /// Option name the engine does not understand.
    UnsupportedOption { name: String },

    /// Option value the engine cannot use.
    InvalidOption { name: String, value: String },

    /// Engine produced output that is not ASCII armor.
    MalformedOutput(String),

    /// Engine process exited unsuccessfully for a reason not classified above.
    Process { code: Option<i32>, detail: String },

    /// Spawning or talking to the engine process failed.
    Io(io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use EngineError::*;
        match self {
            EmptyInput =>
                write!(f, "refusing to encrypt empty input"),
            NoEncryptKey =>
                write!(f, "no encryption key registered"),
            NoSignKey =>
                write!(f, "no signing key registered"),
            KeyNotFound { key_id } =>
                write!(f, "key not found: {}", key_id),
            KeyUnusable { key_id, reason } =>
                write!(f, "key {} is unusable: {}", key_id, reason),
            BadPassphrase { key_id } =>
                write!(f, "bad passphrase for key {}", key_id.as_deref().unwrap_or("<unknown>")),
            MissingPassphrase { key_id } =>
                write!(f, "missing passphrase for key {}", key_id.as_deref().unwrap_or("<unknown>")),
            UnsupportedOption { name } =>
                write!(f, "unsupported engine option: {}", name),
            InvalidOption { name, value } =>
                write!(f, "invalid value for engine option {}: {}", name, value),
            MalformedOutput(msg) =>
                write!(f, "malformed engine output: {}", msg),
            Process { code, detail } => match code {
                Some(c) => write!(f, "engine exited with status {}: {}", c, detail),
                None => write!(f, "engine terminated by signal: {}", detail),
            },
            Io(e) =>
                write!(f, "engine I/O error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}
