//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use pgpmime_core::engine::{EngineError, OpenPgpEngine};
use pgpmime_core::mime::{Message, MimeEntity};

pub const ARMOR: &str = "-----BEGIN PGP MESSAGE-----\r\n\r\nhQEMA1234567890ABCDEF\r\n=abcd\r\n-----END PGP MESSAGE-----\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddEncryptKey(String),
    AddSignKey(String, Option<String>),
    Encrypt(Vec<u8>),
    EncryptAndSign(Vec<u8>),
}

/// Engine double: records every call and answers with fixed armor, or with the error
/// produced by `fail_with` once one is configured.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Call>>,
    fail_with: Option<fn() -> EngineError>,
    fail_on_sign_key: Option<fn() -> EngineError>,
    output: Option<Vec<u8>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every encrypt call.
    pub fn failing(make: fn() -> EngineError) -> Self {
        Self { fail_with: Some(make), ..Self::default() }
    }

    /// Fail signing-key registration.
    pub fn rejecting_sign_key(make: fn() -> EngineError) -> Self {
        Self { fail_on_sign_key: Some(make), ..Self::default() }
    }

    /// Answer encrypt calls with `output` instead of the default armor.
    pub fn with_output(output: Vec<u8>) -> Self {
        Self { output: Some(output), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn encrypt_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Encrypt(_))).count()
    }

    pub fn encrypt_and_sign_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::EncryptAndSign(_))).count()
    }

    /// Plaintext handed to the last encrypt call.
    pub fn last_plaintext(&self) -> Option<Vec<u8>> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Encrypt(p) | Call::EncryptAndSign(p) => Some(p),
            _ => None,
        })
    }

    fn answer(&self, call: Call) -> Result<Vec<u8>, EngineError> {
        self.calls.lock().unwrap().push(call);
        if let Some(make) = self.fail_with {
            return Err(make());
        }
        Ok(self.output.clone().unwrap_or_else(|| ARMOR.as_bytes().to_vec()))
    }
}

impl OpenPgpEngine for RecordingEngine {
    fn add_encrypt_key(&mut self, key_id: &str) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(Call::AddEncryptKey(key_id.to_string()));
        Ok(())
    }

    fn add_sign_key(&mut self, key_id: &str, passphrase: Option<&str>) -> Result<(), EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::AddSignKey(key_id.to_string(), passphrase.map(str::to_string)));
        match self.fail_on_sign_key {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        self.answer(Call::Encrypt(plaintext.to_vec()))
    }

    fn encrypt_and_sign(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        self.answer(Call::EncryptAndSign(plaintext.to_vec()))
    }
}

/// Message with every routing header set and one text child.
pub fn sample_message() -> Message {
    let mut message = Message::text("Hi", "secret");
    message.set_from("bob@example.com");
    message.add_to("alice@example.com");
    message.add_cc("carol@example.com");
    message.add_bcc("dave@example.com");
    message.attach(MimeEntity::part("alternative text", "text/plain", Some("utf-8")));
    message
}

pub fn header_snapshot(message: &Message) -> Vec<(String, String)> {
    message
        .headers()
        .iter()
        .map(|h| (h.name().to_string(), h.value().to_string()))
        .collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
