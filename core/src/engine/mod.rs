//! engine/mod.rs
//! OpenPGP backends behind the `OpenPgpEngine` contract.

pub mod types;
pub mod status;
pub mod gpg;

pub use types::*;
pub use gpg::{check_armor, GpgEngine};
