//! mime/mod.rs
//! Minimal MIME object model the PGP/MIME pipeline reads and rewrites.
//!
//! Notes:
//! - Headers are ordered, case-insensitive and repeatable.
//! - Child parts are shared (`Arc`) so snapshots never duplicate attachment bytes.
//! - Transfer encoding is a property of the entity; the header only declares it.

pub mod types;
pub mod header;
pub mod encoding;
pub mod entity;
pub mod message;
pub mod render;

pub use types::*;
pub use header::*;
pub use encoding::*;
pub use entity::*;
pub use message::*;
pub use render::validate_content_type;
