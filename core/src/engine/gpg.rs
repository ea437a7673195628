//! engine/gpg.rs
//! `OpenPgpEngine` backed by the GnuPG command line.
//!
//! Design notes:
//! - One blocking `gpg` process per operation; nothing stays open between calls.
//! - Keys are resolved to fingerprints at registration so later runs cannot pick a different key.
//! - Failures are read from `--status-fd 2` and classified, never inferred from prose.
//! - The passphrase travels on stdin (`--passphrase-fd 0`, first line), never on the command line.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::engine::status::{classify_failure, listing_is_empty, select_key, KeyUsage};
use crate::engine::types::{EngineError, EngineOptions, OpenPgpEngine};
use crate::mime::is_seven_bit_clean;

/// Option names understood by `GpgEngine`.
pub mod option_names {
    pub const BINARY: &str = "binary";
    pub const HOMEDIR: &str = "homedir";
    pub const DEBUG: &str = "debug";
    pub const CIPHER_ALGO: &str = "cipher-algo";
    pub const DIGEST_ALGO: &str = "digest-algo";
    pub const COMPRESS_ALGO: &str = "compress-algo";
}

const DEFAULT_BINARY: &str = "gpg";

struct SignKey {
    fingerprint: String,
    passphrase: Option<String>,
}

impl Drop for SignKey {
    fn drop(&mut self) {
        if let Some(p) = self.passphrase.take() {
            let mut bytes = p.into_bytes();
            bytes.iter_mut().for_each(|b| *b = 0);
            std::hint::black_box(&bytes);
        }
    }
}

pub struct GpgEngine {
    binary: PathBuf,
    homedir: Option<PathBuf>,
    debug: bool,
    algo_args: Vec<String>,
    recipients: Vec<String>,
    signer: Option<SignKey>,
}

struct GpgOutput {
    success: bool,
    code: Option<i32>,
    stdout: Vec<u8>,
    stderr: String,
}

impl GpgEngine {
    /// Build an engine from options. Unknown option names are rejected.
    pub fn new(options: &EngineOptions) -> Result<Self, EngineError> {
        let mut engine = Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            homedir: None,
            debug: false,
            algo_args: Vec::new(),
            recipients: Vec::new(),
            signer: None,
        };

        for (name, value) in options.iter() {
            match name {
                option_names::BINARY => engine.binary = PathBuf::from(value),
                option_names::HOMEDIR => engine.homedir = Some(PathBuf::from(value)),
                option_names::DEBUG => engine.debug = parse_flag(name, value)?,
                option_names::CIPHER_ALGO | option_names::DIGEST_ALGO | option_names::COMPRESS_ALGO => {
                    if value.is_empty() {
                        return Err(EngineError::InvalidOption { name: name.to_string(), value: value.to_string() });
                    }
                    engine.algo_args.push(format!("--{}", name));
                    engine.algo_args.push(value.to_string());
                }
                other => return Err(EngineError::UnsupportedOption { name: other.to_string() }),
            }
        }
        Ok(engine)
    }

    /// Fingerprints of the registered recipients, in registration order.
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn signs(&self) -> bool {
        self.signer.is_some()
    }

    fn sign_fingerprint(&self) -> Option<String> {
        self.signer.as_ref().map(|s| s.fingerprint.clone())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--batch", "--no-tty", "--status-fd", "2", "--trust-model", "always"]);
        if let Some(home) = &self.homedir {
            cmd.arg("--homedir").arg(home);
        }
        if self.debug {
            cmd.arg("--verbose");
        } else {
            cmd.arg("--quiet");
        }
        cmd
    }

    fn run(&self, args: &[String], stdin: &[u8]) -> Result<GpgOutput, EngineError> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(binary = %self.binary.display(), ?args, input_len = stdin.len(), "spawning gpg");
        let mut child = cmd.spawn()?;
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "gpg stdin not captured"))?;

        // Feed stdin from a second thread: gpg may fill its stdout pipe before reading all input.
        let (written, output) = std::thread::scope(|s| {
            let writer = s.spawn(move || child_stdin.write_all(stdin));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(status = ?output.status, stderr = %stderr, "gpg finished");

        if output.status.success() {
            match written {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(EngineError::Io(e)),
                Err(_) => return Err(EngineError::Io(io::Error::new(io::ErrorKind::Other, "gpg stdin writer panicked"))),
            }
        }

        Ok(GpgOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr,
        })
    }

    fn lookup(&self, key_id: &str, usage: KeyUsage) -> Result<String, EngineError> {
        let list = match usage {
            KeyUsage::Encrypt => "--list-keys",
            KeyUsage::Sign => "--list-secret-keys",
        };
        let args = [
            "--with-colons".to_string(),
            "--fixed-list-mode".to_string(),
            list.to_string(),
            "--".to_string(),
            key_id.to_string(),
        ];
        let out = self.run(&args, &[])?;
        let listing = String::from_utf8_lossy(&out.stdout);
        if !out.success {
            // No match: non-zero exit, and stdout holds at most the `tru:` record.
            if listing_is_empty(&listing) {
                return Err(EngineError::KeyNotFound { key_id: key_id.to_string() });
            }
            return Err(classify_failure(&out.stderr, out.code, false));
        }
        select_key(key_id, &listing, usage)
    }

    fn encrypt_inner(&self, plaintext: &[u8], sign: bool) -> Result<Vec<u8>, EngineError> {
        if plaintext.is_empty() {
            return Err(EngineError::EmptyInput);
        }
        if self.recipients.is_empty() {
            return Err(EngineError::NoEncryptKey);
        }

        let mut args: Vec<String> = self.algo_args.clone();
        args.push("--armor".into());
        args.push("--encrypt".into());

        let mut input: Vec<u8> = Vec::new();
        let mut passphrase_supplied = false;
        if sign {
            let signer = self.signer.as_ref().ok_or(EngineError::NoSignKey)?;
            args.extend(["--sign".into(), "--local-user".into(), signer.fingerprint.clone()]);
            args.extend(["--pinentry-mode".into(), "loopback".into()]);
            if let Some(pass) = &signer.passphrase {
                args.extend(["--passphrase-fd".into(), "0".into()]);
                passphrase_supplied = true;
                input.reserve(pass.len() + 1 + plaintext.len());
                input.extend_from_slice(pass.as_bytes());
                input.push(b'\n');
            }
        }
        for r in &self.recipients {
            args.push("--recipient".into());
            args.push(r.clone());
        }

        let stdin: &[u8] = if input.is_empty() {
            plaintext
        } else {
            input.extend_from_slice(plaintext);
            &input
        };

        let out = self.run(&args, stdin);
        input.iter_mut().for_each(|b| *b = 0);
        let out = out?;

        if !out.success {
            return Err(match classify_failure(&out.stderr, out.code, passphrase_supplied) {
                EngineError::BadPassphrase { key_id: None } => EngineError::BadPassphrase { key_id: self.sign_fingerprint() },
                EngineError::MissingPassphrase { key_id: None } => EngineError::MissingPassphrase { key_id: self.sign_fingerprint() },
                other => other,
            });
        }
        check_armor(out.stdout)
    }
}

impl OpenPgpEngine for GpgEngine {
    fn add_encrypt_key(&mut self, key_id: &str) -> Result<(), EngineError> {
        let fingerprint = self.lookup(key_id, KeyUsage::Encrypt)?;
        debug!(key_id, %fingerprint, "registered encryption key");
        if !self.recipients.contains(&fingerprint) {
            self.recipients.push(fingerprint);
        }
        Ok(())
    }

    fn add_sign_key(&mut self, key_id: &str, passphrase: Option<&str>) -> Result<(), EngineError> {
        let fingerprint = self.lookup(key_id, KeyUsage::Sign)?;
        debug!(key_id, %fingerprint, with_passphrase = passphrase.is_some(), "registered signing key");
        self.signer = Some(SignKey { fingerprint, passphrase: passphrase.map(str::to_string) });
        Ok(())
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        self.encrypt_inner(plaintext, false)
    }

    fn encrypt_and_sign(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        self.encrypt_inner(plaintext, true)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, EngineError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(EngineError::InvalidOption { name: name.to_string(), value: value.to_string() }),
    }
}

/// ASCII armor check on engine output: anything the 7-bit envelope encoder would refuse is
/// rejected here, before the message is touched.
pub fn check_armor(output: Vec<u8>) -> Result<Vec<u8>, EngineError> {
    if output.is_empty() {
        return Err(EngineError::MalformedOutput("empty output".into()));
    }
    if let Some(pos) = output.iter().position(|&b| !is_seven_bit_clean(b)) {
        return Err(EngineError::MalformedOutput(format!(
            "byte 0x{:02x} at offset {} is not 7-bit clean",
            output[pos], pos
        )));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_engine_settings() {
        let opts = EngineOptions::new()
            .with("binary", "/usr/local/bin/gpg2")
            .with("homedir", "/tmp/gnupg")
            .with("debug", "true")
            .with("cipher-algo", "AES256");
        let engine = GpgEngine::new(&opts).unwrap();
        assert_eq!(engine.binary, PathBuf::from("/usr/local/bin/gpg2"));
        assert_eq!(engine.homedir, Some(PathBuf::from("/tmp/gnupg")));
        assert!(engine.debug);
        assert_eq!(engine.algo_args, vec!["--cipher-algo".to_string(), "AES256".to_string()]);
        assert!(!engine.signs());
    }

    #[test]
    fn unknown_and_invalid_options_are_rejected() {
        let opts = EngineOptions::new().with("agent", "/run/agent");
        assert!(matches!(GpgEngine::new(&opts), Err(EngineError::UnsupportedOption { .. })));

        let opts = EngineOptions::new().with("debug", "maybe");
        assert!(matches!(GpgEngine::new(&opts), Err(EngineError::InvalidOption { .. })));
    }

    #[test]
    fn encrypt_preconditions_fail_before_spawning() {
        let engine = GpgEngine::new(&EngineOptions::new().with("binary", "/nonexistent/gpg")).unwrap();
        assert!(matches!(engine.encrypt(b""), Err(EngineError::EmptyInput)));
        assert!(matches!(engine.encrypt(b"x"), Err(EngineError::NoEncryptKey)));
    }

    #[test]
    fn missing_binary_is_io_error() {
        let mut engine = GpgEngine::new(&EngineOptions::new().with("binary", "/nonexistent/gpg")).unwrap();
        assert!(matches!(engine.add_encrypt_key("alice@example.com"), Err(EngineError::Io(_))));
    }

    #[test]
    fn armor_check() {
        assert!(check_armor(b"-----BEGIN PGP MESSAGE-----\n".to_vec()).is_ok());
        assert!(matches!(check_armor(Vec::new()), Err(EngineError::MalformedOutput(_))));
        assert!(matches!(check_armor(vec![0x85, 0x01]), Err(EngineError::MalformedOutput(_))));
        assert!(matches!(check_armor(b"-----BEGIN\n\0\n".to_vec()), Err(EngineError::MalformedOutput(_))));
    }
}
