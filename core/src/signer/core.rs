//! signer/core.rs
//! `PgpMimeSigner`: canonicalize, encrypt, wrap.
//!
//! Design notes:
//! - The signer is immutable after construction; every entry point takes `&self`.
//! - `encrypt_message` never touches its input. `sign_message` swaps the result in only
//!   after the whole pipeline succeeded.
//! - The engine is owned; dropping the signer (or a failed construction) drops it.

use std::fmt;

use tracing::{debug, info_span};

use crate::config::SignerConfig;
use crate::engine::{GpgEngine, OpenPgpEngine};
use crate::mime::Message;
use crate::signer::canonical::canonicalize;
use crate::signer::envelope::build_envelope;
use crate::signer::invoke::invoke;
use crate::telemetry::{Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::SignerError;

struct Encrypted {
    message: Message,
    plaintext_len: usize,
    ciphertext_len: usize,
}

fn staged<T>(timer: &mut Option<&mut TelemetryTimer>, stage: Stage, f: impl FnOnce() -> T) -> T {
    match timer {
        Some(t) => t.time(stage, f),
        None => f(),
    }
}

pub struct PgpMimeSigner<E: OpenPgpEngine = GpgEngine> {
    engine: E,
    sign: bool,
}

impl PgpMimeSigner<GpgEngine> {
    /// Build a signer backed by the local `gpg` binary.
    pub fn new(config: &SignerConfig) -> Result<Self, SignerError> {
        config.validate()?;
        let engine = GpgEngine::new(&config.engine)?;
        Self::with_engine(engine, config)
    }
}

impl<E: OpenPgpEngine> PgpMimeSigner<E> {
    /// Register the configured keys on `engine` and wrap it.
    pub fn with_engine(mut engine: E, config: &SignerConfig) -> Result<Self, SignerError> {
        config.validate()?;

        engine.add_encrypt_key(config.encrypt_key.trim())?;

        let sign = match config.effective_sign_key() {
            Some(key_id) => {
                engine.add_sign_key(key_id.trim(), config.effective_passphrase())?;
                true
            }
            None => false,
        };

        debug!(encrypt_key = %config.encrypt_key, sign, "pgp/mime signer ready");
        Ok(Self { engine, sign })
    }

    /// Encrypted counterpart of `message`. The input is left exactly as it was.
    pub fn encrypt_message(&self, message: &Message) -> Result<Message, SignerError> {
        self.pipeline(message, None).map(|out| out.message)
    }

    /// Encrypt `message` in place. On error the message is unchanged.
    pub fn sign_message(&self, message: &mut Message) -> Result<&Self, SignerError> {
        let encrypted = self.encrypt_message(message)?;
        *message = encrypted;
        Ok(self)
    }

    /// `sign_message` with per-stage timings and byte counts.
    pub fn sign_message_with_telemetry(&self, message: &mut Message) -> Result<TelemetrySnapshot, SignerError> {
        let mut timer = TelemetryTimer::new();
        let out = self.pipeline(message, Some(&mut timer))?;
        *message = out.message;
        timer.finish();

        let snapshot = TelemetrySnapshot::from(&timer, out.plaintext_len, out.ciphertext_len, self.sign);
        debug!(
            plaintext = snapshot.bytes_plaintext,
            ciphertext = snapshot.bytes_ciphertext,
            elapsed_us = snapshot.elapsed.as_micros() as u64,
            "message encrypted"
        );
        Ok(snapshot)
    }

    /// Canonicalize, encrypt, wrap. Stages are charged to `timer` when one is given.
    fn pipeline(&self, message: &Message, mut timer: Option<&mut TelemetryTimer>) -> Result<Encrypted, SignerError> {
        let _span = info_span!("encrypt_message", sign = self.sign).entered();

        let plaintext = staged(&mut timer, Stage::Canonicalize, || canonicalize(message))?;
        let ciphertext = staged(&mut timer, Stage::Encrypt, || invoke(&self.engine, &plaintext, self.sign))?;
        let ciphertext_len = ciphertext.len();
        let message = staged(&mut timer, Stage::Envelope, || build_envelope(message.clone(), ciphertext));

        Ok(Encrypted { message, plaintext_len: plaintext.len(), ciphertext_len })
    }

    /// No per-message state is kept, so there is nothing to clear.
    pub fn reset(&self) -> &Self {
        self
    }

    /// Headers this signer changes on the outer message. Always empty: the envelope
    /// replaces the body structure, not individual headers.
    pub fn altered_headers(&self) -> Vec<String> {
        Vec::new()
    }

    /// True when a signing key is configured.
    pub fn signs(&self) -> bool {
        self.sign
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: OpenPgpEngine> fmt::Debug for PgpMimeSigner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgpMimeSigner")
            .field("sign", &self.sign)
            .finish_non_exhaustive()
    }
}
