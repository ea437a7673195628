//! mime/types.rs
//! Shared MIME types: part kinds and the module error.

use std::fmt;

use crate::utils::fmt_bytes;

/// Role of an entity inside a multipart parent.
///
/// The highest kind among a parent's children picks the multipart subtype:
/// any attachment makes it `mixed`, otherwise any embedded file makes it
/// `related`, otherwise the children are `alternative` renderings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartKind {
    Part,
    Embedded,
    Attachment,
}

impl PartKind {
    pub fn multipart_subtype(self) -> &'static str {
        match self {
            PartKind::Part       => "alternative",
            PartKind::Embedded   => "related",
            PartKind::Attachment => "mixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeError {
    /// Header name empty or containing bytes outside printable ASCII / `:`.
    InvalidHeaderName { name: String },

    /// Header or parameter value containing a bare CR or LF.
    InvalidHeaderValue { name: String },

    /// Content type is not of the form `type/subtype`.
    InvalidContentType { value: String },

    /// A header required for rendering is absent.
    MissingHeader { name: &'static str },

    /// Body cannot be carried with 7-bit transfer encoding.
    NotSevenBitClean { offset: usize, byte: u8 },

    /// Generic validation error with context.
    Validation(String),
}

impl fmt::Display for MimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MimeError::*;
        match self {
            InvalidHeaderName { name } =>
                write!(f, "invalid header name: {}", fmt_bytes(name.as_bytes())),
            InvalidHeaderValue { name } =>
                write!(f, "header {} contains a raw line break", name),
            InvalidContentType { value } =>
                write!(f, "invalid content type: {}", fmt_bytes(value.as_bytes())),
            MissingHeader { name } =>
                write!(f, "missing required header: {}", name),
            NotSevenBitClean { offset, byte } =>
                write!(f, "body is not 7-bit clean: byte 0x{:02x} at offset {}", byte, offset),
            Validation(msg) =>
                write!(f, "mime validation error: {}", msg),
        }
    }
}

impl std::error::Error for MimeError {}
