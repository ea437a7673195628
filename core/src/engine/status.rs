//! engine/status.rs
//! Parsers for GnuPG machine-readable output.
//!
//! - `--status-fd` lines (`[GNUPG:] KEYWORD args...`) classify a failed run.
//! - `--with-colons` listings resolve a key id to a fingerprint and its usability.

use crate::engine::types::EngineError;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Capability a key must carry for an operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyUsage {
    Encrypt,
    Sign,
}

impl KeyUsage {
    /// Key-wide capability letter in colon listings (field 12, upper case).
    fn flag(self) -> char {
        match self {
            KeyUsage::Encrypt => 'E',
            KeyUsage::Sign    => 'S',
        }
    }
}

/// One primary key from a colon listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedKey {
    pub validity: Option<char>,
    pub capabilities: String,
    pub fingerprint: Option<String>,
}

/// Primary keys (`pub`/`sec` records) with the fingerprint that follows each.
pub fn parse_colon_listing(listing: &str) -> Vec<ListedKey> {
    let mut keys: Vec<ListedKey> = Vec::new();
    let mut awaiting_fpr = false;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.first().copied() {
            Some("pub") | Some("sec") => {
                keys.push(ListedKey {
                    validity: fields.get(1).and_then(|v| v.chars().next()),
                    capabilities: fields.get(11).copied().unwrap_or("").to_string(),
                    fingerprint: None,
                });
                awaiting_fpr = true;
            }
            Some("fpr") if awaiting_fpr => {
                if let (Some(key), Some(fpr)) = (keys.last_mut(), fields.get(9)) {
                    if !fpr.is_empty() {
                        key.fingerprint = Some(fpr.to_string());
                    }
                }
                awaiting_fpr = false;
            }
            Some("sub") | Some("ssb") => awaiting_fpr = false,
            _ => {}
        }
    }
    keys
}

/// Pick the first listed key and check it can serve `usage`. Returns its fingerprint.
pub fn select_key(key_id: &str, listing: &str, usage: KeyUsage) -> Result<String, EngineError> {
    let key = parse_colon_listing(listing)
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::KeyNotFound { key_id: key_id.to_string() })?;

    let unusable = |reason: &str| EngineError::KeyUnusable {
        key_id: key_id.to_string(),
        reason: reason.to_string(),
    };

    match key.validity {
        Some('r') => return Err(unusable("revoked")),
        Some('e') => return Err(unusable("expired")),
        Some('d') => return Err(unusable("disabled")),
        Some('i') => return Err(unusable("invalid")),
        _ => {}
    }
    if !key.capabilities.contains(usage.flag()) {
        let reason = match usage {
            KeyUsage::Encrypt => "no encryption capability",
            KeyUsage::Sign => "no signing capability",
        };
        return Err(unusable(reason));
    }

    key.fingerprint
        .ok_or_else(|| EngineError::KeyNotFound { key_id: key_id.to_string() })
}

/// Text for `INV_RECP`/`INV_SGNR` reason codes.
fn invalid_key_reason(code: &str) -> &'static str {
    match code {
        "1"  => "not found",
        "2"  => "ambiguous specification",
        "3"  => "wrong key usage",
        "4"  => "key revoked",
        "5"  => "key expired",
        "6"  => "no CRL known",
        "7"  => "CRL too old",
        "8"  => "policy mismatch",
        "9"  => "not a secret key",
        "10" => "key not trusted",
        "11" => "missing certificate",
        "12" => "missing issuer certificate",
        "13" => "key disabled",
        "14" => "syntax error in specification",
        _    => "no specific reason given",
    }
}

/// libgpg-error codes seen in `FAILURE`/`ERROR` status lines (low 16 bits of the value).
mod gpg_err {
    pub const NO_PUBKEY: u32 = 9;
    pub const BAD_PASSPHRASE: u32 = 11;
    pub const NO_SECKEY: u32 = 17;
    pub const NO_PASSPHRASE: u32 = 177;
}

/// Error code argument of `FAILURE <location> <code>` / `ERROR <location> <code>`.
fn status_error_code(args: &[&str]) -> Option<u32> {
    args.get(1)?.parse::<u32>().ok().map(|v| v & 0xffff)
}

/// Map the status output of a failed run to the most specific error.
///
/// Passphrase problems outrank key problems, which outrank the bare exit status.
/// GnuPG 2.x in loopback mode reports a rejected passphrase only through the error code of
/// its `FAILURE` line, and a missing one as `NEED_PASSPHRASE` followed by a batch-mode abort.
pub fn classify_failure(stderr: &str, code: Option<i32>, passphrase_supplied: bool) -> EngineError {
    let mut key_error: Option<EngineError> = None;
    let mut passphrase_error: Option<EngineError> = None;
    let mut need_passphrase: Option<String> = None;
    let mut detail: Vec<&str> = Vec::new();

    for line in stderr.lines() {
        let Some(status) = line.strip_prefix(STATUS_PREFIX) else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                detail.push(trimmed);
            }
            continue;
        };
        let mut parts = status.split_whitespace();
        let keyword = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match keyword {
            "BAD_PASSPHRASE" => {
                return EngineError::BadPassphrase { key_id: args.first().map(|s| s.to_string()) };
            }
            "MISSING_PASSPHRASE" => {
                return EngineError::MissingPassphrase { key_id: None };
            }
            "NEED_PASSPHRASE" => {
                need_passphrase = args.first().map(|s| s.to_string());
            }
            "FAILURE" | "ERROR" => match status_error_code(&args) {
                Some(gpg_err::BAD_PASSPHRASE) if passphrase_error.is_none() => {
                    passphrase_error = Some(EngineError::BadPassphrase { key_id: need_passphrase.clone() });
                }
                Some(gpg_err::NO_PASSPHRASE) if passphrase_error.is_none() => {
                    passphrase_error = Some(EngineError::MissingPassphrase { key_id: need_passphrase.clone() });
                }
                Some(gpg_err::NO_PUBKEY | gpg_err::NO_SECKEY) if key_error.is_none() => {
                    key_error = Some(EngineError::KeyNotFound { key_id: String::new() });
                }
                _ => {}
            },
            "INV_RECP" | "INV_SGNR" if key_error.is_none() => {
                let reason = args.first().copied().unwrap_or("0");
                let key_id = args.get(1).map(|s| s.to_string()).unwrap_or_default();
                key_error = Some(if reason == "1" {
                    EngineError::KeyNotFound { key_id }
                } else {
                    EngineError::KeyUnusable { key_id, reason: invalid_key_reason(reason).to_string() }
                });
            }
            "NO_PUBKEY" | "NO_SECKEY" if key_error.is_none() => {
                key_error = Some(EngineError::KeyNotFound {
                    key_id: args.first().map(|s| s.to_string()).unwrap_or_default(),
                });
            }
            "KEYEXPIRED" | "KEYREVOKED" if key_error.is_none() => {
                let reason = if keyword == "KEYEXPIRED" { "key expired" } else { "key revoked" };
                key_error = Some(EngineError::KeyUnusable { key_id: String::new(), reason: reason.to_string() });
            }
            _ => {}
        }
    }

    if let Some(err) = passphrase_error {
        return err;
    }
    if let (Some(key_id), false) = (need_passphrase, passphrase_supplied) {
        return EngineError::MissingPassphrase { key_id: Some(key_id) };
    }
    key_error.unwrap_or_else(|| EngineError::Process { code, detail: detail.join("; ") })
}

/// True when a colon listing holds no primary key record.
pub fn listing_is_empty(listing: &str) -> bool {
    parse_colon_listing(listing).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
tru::1:1700000000:0:3:1:5
pub:u:255:22:AAAABBBBCCCCDDDD:1700000000:::u:::scESC:::::ed25519:::0:
fpr:::::::::0123456789ABCDEF0123456789ABCDEFAAAABBBB:
uid:u::::1700000000::HASH::Alice <alice@example.com>::::::::::0:
sub:u:255:18:1111222233334444:1700000000::::::e:::::cv25519::
fpr:::::::::FEDCBA9876543210FEDCBA9876543210FEDCBA98:
";

    #[test]
    fn listing_picks_primary_fingerprint() {
        let keys = parse_colon_listing(LISTING);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].validity, Some('u'));
        assert_eq!(keys[0].capabilities, "scESC");
        assert_eq!(keys[0].fingerprint.as_deref(), Some("0123456789ABCDEF0123456789ABCDEFAAAABBBB"));
    }

    #[test]
    fn select_key_checks_usage_and_validity() {
        let fpr = select_key("alice@example.com", LISTING, KeyUsage::Encrypt).unwrap();
        assert!(fpr.ends_with("AAAABBBB"));

        let sign_only = LISTING.replace("scESC", "scSC");
        assert!(matches!(
            select_key("alice@example.com", &sign_only, KeyUsage::Encrypt),
            Err(EngineError::KeyUnusable { .. })
        ));

        let revoked = LISTING.replace("pub:u:", "pub:r:");
        match select_key("alice@example.com", &revoked, KeyUsage::Sign) {
            Err(EngineError::KeyUnusable { reason, .. }) => assert_eq!(reason, "revoked"),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(matches!(
            select_key("nobody", "", KeyUsage::Encrypt),
            Err(EngineError::KeyNotFound { .. })
        ));
    }

    // GnuPG 2.2 `--pinentry-mode loopback --passphrase-fd 0` with a wrong passphrase.
    const WRONG_PASSPHRASE: &str = "\
[GNUPG:] KEY_CONSIDERED 0123456789ABCDEF0123456789ABCDEFAAAABBBB 0
[GNUPG:] KEY_CONSIDERED 0123456789ABCDEF0123456789ABCDEFAAAABBBB 2
[GNUPG:] NEED_PASSPHRASE AAAABBBBCCCCDDDD AAAABBBBCCCCDDDD 22 0
gpg: signing failed: Bad passphrase
[GNUPG:] FAILURE sign-encrypt 67108875
gpg: [stdin]: sign+encrypt failed: Bad passphrase
";

    // Same key in batch mode with no passphrase on stdin.
    const NO_PASSPHRASE: &str = "\
[GNUPG:] KEY_CONSIDERED 0123456789ABCDEF0123456789ABCDEFAAAABBBB 0
[GNUPG:] KEY_CONSIDERED 0123456789ABCDEF0123456789ABCDEFAAAABBBB 2
[GNUPG:] NEED_PASSPHRASE AAAABBBBCCCCDDDD AAAABBBBCCCCDDDD 22 0
[GNUPG:] INQUIRE_MAXLEN 100
gpg: Sorry, we are in batchmode - can't get input
";

    // `gpg --with-colons --list-keys nobody@example.com`, exit status 2.
    const MISSING_KEY_STDOUT: &str = "tru::1:1700000000:0:3:1:5\n";
    const MISSING_KEY_STDERR: &str = "gpg: error reading key: No public key\n";

    #[test]
    fn loopback_wrong_passphrase_is_bad_passphrase() {
        match classify_failure(WRONG_PASSPHRASE, Some(2), true) {
            EngineError::BadPassphrase { key_id } => assert_eq!(key_id.as_deref(), Some("AAAABBBBCCCCDDDD")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn batch_mode_without_passphrase_is_missing_passphrase() {
        match classify_failure(NO_PASSPHRASE, Some(2), false) {
            EngineError::MissingPassphrase { key_id } => assert_eq!(key_id.as_deref(), Some("AAAABBBBCCCCDDDD")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn trust_record_alone_is_an_empty_listing() {
        assert!(listing_is_empty(MISSING_KEY_STDOUT));
        assert!(!listing_is_empty(LISTING));
        assert!(matches!(
            select_key("nobody@example.com", MISSING_KEY_STDOUT, KeyUsage::Encrypt),
            Err(EngineError::KeyNotFound { .. })
        ));
        // stderr alone carries no status keyword
        assert!(matches!(
            classify_failure(MISSING_KEY_STDERR, Some(2), false),
            EngineError::Process { .. }
        ));
    }

    #[test]
    fn failure_codes_map_to_key_errors() {
        assert!(matches!(
            classify_failure("[GNUPG:] FAILURE encrypt 9\n", Some(2), false),
            EngineError::KeyNotFound { .. }
        ));
        assert!(matches!(
            classify_failure("[GNUPG:] ERROR sign 33554449\n", Some(2), true),
            EngineError::KeyNotFound { .. }
        ));
    }

    #[test]
    fn passphrase_status_wins() {
        let stderr = "\
[GNUPG:] KEY_CONSIDERED ABC 2
[GNUPG:] INV_SGNR 0 ABC
[GNUPG:] BAD_PASSPHRASE 1122334455667788
gpg: signing failed: Bad passphrase
";
        match classify_failure(stderr, Some(2), true) {
            EngineError::BadPassphrase { key_id } => assert_eq!(key_id.as_deref(), Some("1122334455667788")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            classify_failure("[GNUPG:] MISSING_PASSPHRASE\n", Some(2), true),
            EngineError::MissingPassphrase { .. }
        ));
    }

    #[test]
    fn invalid_recipient_maps_to_key_errors() {
        match classify_failure("[GNUPG:] INV_RECP 1 bob@example.com\n", Some(2), false) {
            EngineError::KeyNotFound { key_id } => assert_eq!(key_id, "bob@example.com"),
            other => panic!("unexpected: {:?}", other),
        }
        match classify_failure("[GNUPG:] INV_RECP 5 bob@example.com\n", Some(2), false) {
            EngineError::KeyUnusable { reason, .. } => assert_eq!(reason, "key expired"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unclassified_failure_keeps_detail() {
        match classify_failure("gpg: keyblock resource: No such file\n[GNUPG:] FAILURE encrypt 33554433\n", Some(2), false) {
            EngineError::Process { code, detail } => {
                assert_eq!(code, Some(2));
                assert_eq!(detail, "gpg: keyblock resource: No such file");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
