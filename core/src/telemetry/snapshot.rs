//! telemetry/snapshot.rs
//! Immutable record of one sign operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Length of the canonical form handed to the engine.
    pub bytes_plaintext: u64,
    /// Length of the armored ciphertext.
    pub bytes_ciphertext: u64,
    /// Whether encrypt-and-sign was used.
    pub signed: bool,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(timer: &TelemetryTimer, bytes_plaintext: usize, bytes_ciphertext: usize, signed: bool) -> Self {
        Self {
            bytes_plaintext: bytes_plaintext as u64,
            bytes_ciphertext: bytes_ciphertext as u64,
            signed,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn has_all_stages(&self) -> bool {
        self.stage_times.has_all(&Stage::ALL)
    }

    /// Armor expansion, ciphertext over plaintext.
    pub fn expansion_ratio(&self) -> f64 {
        if self.bytes_plaintext == 0 {
            0.0
        } else {
            self.bytes_ciphertext as f64 / self.bytes_plaintext as f64
        }
    }

    pub fn sanity_check(&self) -> bool {
        self.stage_times.total() <= self.elapsed
    }
}
