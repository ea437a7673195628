//! mime/header.rs
//! Ordered, case-insensitive, repeatable header collection.
//!
//! Design notes:
//! - Insertion order is the wire order.
//! - Names compare ASCII case-insensitively; a name may occur many times (`Cc`, `Received`).
//! - Values are validated when rendered, not when set, so every mutation stays infallible
//!   and a bad value surfaces once, as a `MimeError`, at serialization time.

use std::fmt::Write as _;

use crate::constants::CRLF;
use crate::mime::types::MimeError;

/// Soft limit for a rendered header line before parameters are folded.
const FOLD_AT: usize = 78;

/// RFC 2045 tspecials plus space; any of these forces a quoted parameter value.
const TSPECIALS: &[u8] = b"()<>@,;:\\\"/[]?= \t";

/// Parameters always written quoted, whatever their value.
const ALWAYS_QUOTED: &[&str] = &["name", "filename"];

/// RFC 2047 §2: one encoded word, and any line holding one.
const MAX_ENCODED_WORD: usize = 75;
const MAX_ENCODED_LINE: usize = 76;

/// `=?utf-8?B?` and `?=` around the payload.
const ENCODED_WORD_OVERHEAD: usize = 12;

/// Longest single parameter segment before RFC 2231 continuations are used.
const MAX_PARAM_LEN: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
    params: Vec<(String, String)>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), params: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Parameter value by case-insensitive name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or overwrite a parameter, keeping its original position when overwriting.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn remove_parameter(&mut self, name: &str) -> Option<String> {
        let idx = self.params.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.params.remove(idx).1)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append this header to `out` as one (possibly folded) CRLF-terminated field.
    pub fn render(&self, out: &mut Vec<u8>) -> Result<(), MimeError> {
        validate_name(&self.name)?;
        if has_line_break(&self.value) || self.params.iter().any(|(k, v)| has_line_break(k) || has_line_break(v)) {
            return Err(MimeError::InvalidHeaderValue { name: self.name.clone() });
        }

        let mut line = String::with_capacity(self.name.len() + self.value.len() + 2);
        line.push_str(&self.name);
        line.push_str(": ");
        line.push_str(&encode_unstructured(&self.value, self.name.len() + 2));

        for param in self.params.iter().flat_map(|(k, v)| encode_parameter(k, v)) {
            // "; " + param; fold onto a continuation line when the current one is full.
            let current_len = line.rsplit(CRLF).next().map_or(0, str::len);
            if current_len + 2 + param.len() > FOLD_AT {
                line.push(';');
                line.push_str(CRLF);
                line.push(' ');
            } else {
                line.push_str("; ");
            }
            line.push_str(&param);
        }

        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(CRLF.as_bytes());
        Ok(())
    }
}

fn has_line_break(s: &str) -> bool {
    s.bytes().any(|b| b == b'\r' || b == b'\n')
}

fn validate_name(name: &str) -> Result<(), MimeError> {
    let ok = !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':');
    if ok {
        Ok(())
    } else {
        Err(MimeError::InvalidHeaderName { name: name.to_string() })
    }
}

/// RFC 2047 encoded words for values that are not pure ASCII, folded so that no word
/// exceeds 75 characters and no line 76. `prefix_len` is what precedes the value on its
/// first line (`Name: `).
fn encode_unstructured(value: &str, prefix_len: usize) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() * 2);
    let first_line = MAX_ENCODED_LINE.saturating_sub(prefix_len).min(MAX_ENCODED_WORD);
    for (i, chunk) in utf8_chunks(value, first_line).into_iter().enumerate() {
        if i > 0 {
            out.push_str(CRLF);
            out.push(' ');
        }
        out.push_str(&encoded_words::encode(chunk, None, encoded_words::EncodingFlag::Shortest, None));
    }
    out
}

/// Split `value` on char boundaries into pieces whose base64 form fits the encoded-word budget.
/// `first_line` is the room left on the first line; continuation lines (` ` + word) get a full word.
fn utf8_chunks(value: &str, first_line: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut len = 0usize;
    let mut cap = payload_bytes(first_line);

    for (idx, ch) in value.char_indices() {
        let w = ch.len_utf8();
        if len > 0 && len + w > cap {
            chunks.push(&value[start..idx]);
            start = idx;
            len = 0;
            cap = payload_bytes(MAX_ENCODED_WORD.min(MAX_ENCODED_LINE - 1));
        }
        len += w;
    }
    chunks.push(&value[start..]);
    chunks
}

/// Raw bytes whose base64 encoding fits an encoded word of `budget` characters.
fn payload_bytes(budget: usize) -> usize {
    // At least one full 4-byte char, even when the header name leaves little room.
    (budget.saturating_sub(ENCODED_WORD_OVERHEAD) / 4 * 3).max(4)
}

/// `name=value`, `name="value"` or RFC 2231 `name*=utf-8''value`, the latter split into
/// `name*0*=`, `name*1*=`... continuations when long.
fn encode_parameter(name: &str, value: &str) -> Vec<String> {
    if !value.is_ascii() {
        let mut encoded = String::with_capacity(value.len() * 3);
        for b in value.bytes() {
            if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
                encoded.push(b as char);
            } else {
                let _ = write!(encoded, "%{:02X}", b);
            }
        }
        let single = format!("{}*=utf-8''{}", name, encoded);
        if single.len() <= MAX_PARAM_LEN {
            return vec![single];
        }
        return continuations(name, &encoded);
    }

    let needs_quotes = value.is_empty()
        || ALWAYS_QUOTED.iter().any(|q| q.eq_ignore_ascii_case(name))
        || value.bytes().any(|b| TSPECIALS.contains(&b) || b.is_ascii_control());
    if needs_quotes {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        vec![format!("{}=\"{}\"", name, escaped)]
    } else {
        vec![format!("{}={}", name, value)]
    }
}

/// RFC 2231 §3 segments of an already percent-encoded value. A `%XX` triplet is never split.
fn continuations(name: &str, encoded: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut rest = encoded;
    let mut index = 0usize;

    while !rest.is_empty() {
        let head = if index == 0 {
            format!("{}*0*=utf-8''", name)
        } else {
            format!("{}*{}*=", name, index)
        };
        let room = MAX_PARAM_LEN.saturating_sub(head.len()).max(3);
        let mut cut = room.min(rest.len());
        if cut < rest.len() {
            if let Some(p) = rest[..cut].rfind('%') {
                if p + 3 > cut {
                    cut = p;
                }
            }
        }
        segments.push(format!("{}{}", head, &rest[..cut]));
        rest = &rest[cut..];
        index += 1;
    }
    segments
}

/// Ordered header collection with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<Header>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new occurrence, even if the name already exists.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Header {
        self.headers.push(Header::new(name, value));
        let last = self.headers.len() - 1;
        &mut self.headers[last]
    }

    pub fn add_header(&mut self, header: Header) {
        self.headers.push(header);
    }

    /// Replace the value of the first occurrence (parameters dropped), or append.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Header {
        match self.headers.iter().position(|h| h.is_named(name)) {
            Some(idx) => {
                let h = &mut self.headers[idx];
                h.value = value.into();
                h.params.clear();
                h
            }
            None => self.add(name, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.is_named(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Header> {
        self.headers.iter_mut().find(|h| h.is_named(name))
    }

    /// First occurrence of `name`, appending the header built by `make` when absent.
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> Header) -> &mut Header {
        let idx = match self.headers.iter().position(|h| h.is_named(name)) {
            Some(idx) => idx,
            None => {
                self.headers.push(make());
                self.headers.len() - 1
            }
        };
        &mut self.headers[idx]
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Header> + 'a {
        self.headers.iter().filter(move |h| h.is_named(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove the first occurrence only.
    pub fn remove(&mut self, name: &str) -> Option<Header> {
        let idx = self.headers.iter().position(|h| h.is_named(name))?;
        Some(self.headers.remove(idx))
    }

    /// Remove every occurrence, returning how many were dropped.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.headers.len();
        self.headers.retain(|h| !h.is_named(name));
        before - self.headers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn render(&self, out: &mut Vec<u8>) -> Result<(), MimeError> {
        for h in &self.headers {
            h.render(out)?;
        }
        Ok(())
    }
}
