//! signer/invoke.rs
//! Single call into the OpenPGP engine.

use tracing::debug;

use crate::engine::{check_armor, EngineError, OpenPgpEngine};

/// Encrypt (and sign when `sign` is set) `plaintext`. No retry: key and passphrase
/// failures do not heal on their own.
pub fn invoke<E: OpenPgpEngine + ?Sized>(engine: &E, plaintext: &[u8], sign: bool) -> Result<Vec<u8>, EngineError> {
    debug!(len = plaintext.len(), sign, "invoking openpgp engine");
    let ciphertext = if sign {
        engine.encrypt_and_sign(plaintext)?
    } else {
        engine.encrypt(plaintext)?
    };
    // The envelope carries the ciphertext 7-bit; anything but armor would not survive.
    check_armor(ciphertext)
}
