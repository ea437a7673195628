//! pgpmime-core
//!
//! RFC 3156 PGP/MIME encryption for in-memory messages.
//! Canonicalizes a message, encrypts (and optionally signs) it through an OpenPGP
//! engine and rewrites it into a `multipart/encrypted` envelope.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Message model and engine
pub mod mime;
pub mod engine;

// Pipeline
pub mod signer;
pub mod telemetry;

pub use config::SignerConfig;
pub use signer::PgpMimeSigner;
pub use types::SignerError;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{ConfigError, SignerConfig};
    pub use crate::engine::{EngineError, EngineOptions, GpgEngine, OpenPgpEngine};
    pub use crate::mime::{ContentEncoder, Message, MimeEntity, MimeError, PartKind};
    pub use crate::signer::PgpMimeSigner;
    pub use crate::telemetry::{Stage, TelemetrySnapshot};
    pub use crate::types::SignerError;
}
