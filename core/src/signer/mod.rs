//! signer/mod.rs
//! PGP/MIME encryption pipeline.
//!
//! Canonicalize → invoke engine → build envelope. Each stage lives in its own file.

pub mod canonical;
pub mod invoke;
pub mod envelope;
pub mod core;

pub use canonical::*;
pub use invoke::*;
pub use envelope::*;
pub use self::core::*;
