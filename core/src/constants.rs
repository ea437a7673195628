//! Protocol constants for RFC 3156 PGP/MIME and the MIME layer underneath it.

/// Headers removed from the canonical copy before it is encrypted.
/// Compared case-insensitively; every occurrence of each name is removed.
pub const STRIPPED_HEADERS: &[&str] = &[
    "message-id",
    "date",
    "subject",
    "from",
    "to",
    "cc",
    "bcc",
];

/// Body of the PGP/MIME control part.
pub const PGP_VERSION_BODY: &str = "Version: 1";

/// Suggested filename of the ciphertext part.
pub const CIPHERTEXT_FILENAME: &str = "message.asc";

/// Content types used by the envelope (RFC 3156 §4).
pub mod content_types {
    pub const MULTIPART_ENCRYPTED: &str = "multipart/encrypted";
    pub const PGP_ENCRYPTED: &str = "application/pgp-encrypted";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const TEXT_PLAIN: &str = "text/plain";
}

/// Canonical header names as they are written on the wire.
pub mod header_names {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
    pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
    pub const CONTENT_ID: &str = "Content-ID";
    pub const MESSAGE_ID: &str = "Message-ID";
    pub const MIME_VERSION: &str = "MIME-Version";
    pub const DATE: &str = "Date";
    pub const SUBJECT: &str = "Subject";
    pub const FROM: &str = "From";
    pub const TO: &str = "To";
    pub const CC: &str = "Cc";
    pub const BCC: &str = "Bcc";
}

/// Content-Type parameter names.
pub mod params {
    pub const PROTOCOL: &str = "protocol";
    pub const BOUNDARY: &str = "boundary";
    pub const CHARSET: &str = "charset";
    pub const NAME: &str = "name";
    pub const FILENAME: &str = "filename";
}

pub const MIME_VERSION_VALUE: &str = "1.0";

/// Defaults for a freshly constructed message.
pub const DEFAULT_CONTENT_TYPE: &str = content_types::TEXT_PLAIN;
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Maximum encoded line length for quoted-printable and base64 (RFC 2045 §6.7, §6.8).
pub const MAX_LINE_LEN: usize = 76;

pub const CRLF: &str = "\r\n";

/// Random bytes behind a generated multipart boundary (hex encoded, 32 chars).
pub const BOUNDARY_RANDOM_LEN: usize = 16;

/// Domain used on the right-hand side of generated Message-IDs.
pub const MESSAGE_ID_DOMAIN: &str = "pgpmime.local";
