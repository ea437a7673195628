use rand::RngCore;

use crate::constants::{BOUNDARY_RANDOM_LEN, MESSAGE_ID_DOMAIN};

/// Random lowercase hex string built from `n` random bytes.
pub fn random_hex(n: usize) -> String {
    let mut buf = vec![0u8; n];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Fresh multipart boundary. Only `=`, `_` and hex digits, so it always
/// needs quoting (RFC 2046 §5.1.1) but never escaping.
pub fn generate_boundary() -> String {
    format!("=_{}", random_hex(BOUNDARY_RANDOM_LEN))
}

/// Fresh `Message-ID` value including angle brackets.
pub fn generate_message_id() -> String {
    format!("<{}@{}>", random_hex(BOUNDARY_RANDOM_LEN), MESSAGE_ID_DOMAIN)
}

/// Rewrite every line ending (`\r\n`, lone `\n`, lone `\r`) as `\r\n`.
pub fn normalize_crlf(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 32);
    let mut i = 0usize;
    while i < input.len() {
        match input[i] {
            b'\r' => {
                out.extend_from_slice(b"\r\n");
                if input.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// Split on CRLF, keeping the final segment even when empty.
pub fn split_crlf_lines(input: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i + 1 < input.len() {
        if input[i] == b'\r' && input[i + 1] == b'\n' {
            lines.push(&input[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    lines.push(&input[start..]);
    lines
}

/// Printable preview of a byte string for error messages.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}
