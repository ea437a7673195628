//! mime/encoding.rs
//! Content-Transfer-Encoding implementations (RFC 2045 §6).
//!
//! Every encoder first canonicalises line endings to CRLF. The encoder is chosen per entity
//! and is independent of whether a `Content-Transfer-Encoding` header is present: the header
//! is only the declaration, the encoder is what shapes the bytes.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::constants::MAX_LINE_LEN;
use crate::mime::types::MimeError;
use crate::utils::{normalize_crlf, split_crlf_lines};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContentEncoder {
    SevenBit,
    EightBit,
    QuotedPrintable,
    Base64,
}

impl ContentEncoder {
    /// Token written in the `Content-Transfer-Encoding` header.
    pub fn name(self) -> &'static str {
        match self {
            ContentEncoder::SevenBit        => "7bit",
            ContentEncoder::EightBit        => "8bit",
            ContentEncoder::QuotedPrintable => "quoted-printable",
            ContentEncoder::Base64          => "base64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "7bit"             => Some(ContentEncoder::SevenBit),
            "8bit"             => Some(ContentEncoder::EightBit),
            "quoted-printable" => Some(ContentEncoder::QuotedPrintable),
            "base64"           => Some(ContentEncoder::Base64),
            _ => None,
        }
    }

    /// Encode a body for the wire. Output lines are CRLF separated with no trailing CRLF added.
    pub fn encode(self, body: &[u8]) -> Result<Vec<u8>, MimeError> {
        match self {
            ContentEncoder::SevenBit        => encode_7bit(body),
            ContentEncoder::EightBit        => Ok(normalize_crlf(body)),
            ContentEncoder::QuotedPrintable => Ok(encode_quoted_printable(body)),
            ContentEncoder::Base64          => Ok(encode_base64(body)),
        }
    }
}

impl fmt::Display for ContentEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte allowed in a 7bit body (RFC 2045 §2.7): below 0x80 and not NUL.
pub fn is_seven_bit_clean(b: u8) -> bool {
    b != 0 && b < 0x80
}

fn encode_7bit(body: &[u8]) -> Result<Vec<u8>, MimeError> {
    if let Some(offset) = body.iter().position(|&b| !is_seven_bit_clean(b)) {
        return Err(MimeError::NotSevenBitClean { offset, byte: body[offset] });
    }
    Ok(normalize_crlf(body))
}

/// Base64 of the raw bytes, wrapped at 76 columns. Binary content is not
/// line-ending normalised: base64 exists to carry it untouched.
fn encode_base64(body: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(body);
    let mut out = Vec::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LEN * 2);
    for (i, chunk) in encoded.as_bytes().chunks(MAX_LINE_LEN).enumerate() {
        if i > 0 {
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(chunk);
    }
    out
}

fn encode_quoted_printable(body: &[u8]) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let normalized = normalize_crlf(body);
    let lines = split_crlf_lines(&normalized);
    let mut out = Vec::with_capacity(normalized.len() + normalized.len() / 8);

    for (li, line) in lines.iter().enumerate() {
        if li > 0 {
            out.extend_from_slice(b"\r\n");
        }
        let mut col = 0usize;
        for (i, &b) in line.iter().enumerate() {
            let is_last = i + 1 == line.len();
            // Trailing whitespace must be encoded so transports cannot strip it.
            let literal = match b {
                b'=' => false,
                b' ' | b'\t' => !is_last,
                33..=126 => true,
                _ => false,
            };
            let width = if literal { 1 } else { 3 };
            // Leave room for the soft break "=" within the 76 column limit.
            let reserve = if is_last { 0 } else { 1 };
            if col + width + reserve > MAX_LINE_LEN {
                out.extend_from_slice(b"=\r\n");
                col = 0;
            }
            if literal {
                out.push(b);
            } else {
                out.push(b'=');
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0x0f) as usize]);
            }
            col += width;
        }
    }
    out
}
