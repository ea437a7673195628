//! signer/envelope.rs
//! RFC 3156 `multipart/encrypted` envelope.
//!
//! Result layout:
//! - outer `Content-Type: multipart/encrypted; boundary=...; protocol="application/pgp-encrypted"`
//! - part 1: `application/pgp-encrypted`, body `Version: 1`
//! - part 2: `application/octet-stream; name="message.asc"`, body = armored ciphertext
//!
//! Both parts are rendered 7-bit but carry no `Content-Transfer-Encoding` header: some
//! PGP/MIME readers reject the control part when it has one.

use std::sync::Arc;

use crate::constants::{content_types, header_names, params, CIPHERTEXT_FILENAME, PGP_VERSION_BODY};
use crate::mime::{ContentEncoder, Message, MimeEntity};

/// The transfer encoding PGP/MIME mandates; not negotiated from content.
pub const ENVELOPE_ENCODER: ContentEncoder = ContentEncoder::SevenBit;

/// `application/pgp-encrypted` version part.
pub fn control_part() -> MimeEntity {
    let mut part = MimeEntity::attachment(PGP_VERSION_BODY.as_bytes().to_vec(), None, None);
    part.set_content_type(content_types::PGP_ENCRYPTED);
    part.set_encoder(ENVELOPE_ENCODER);
    part.headers_mut().remove(header_names::CONTENT_TRANSFER_ENCODING);
    part
}

/// `message.asc` attachment carrying the armored ciphertext.
pub fn ciphertext_part(ciphertext: Vec<u8>) -> MimeEntity {
    let mut part = MimeEntity::attachment(ciphertext, Some(CIPHERTEXT_FILENAME), None);
    part.set_encoder(ENVELOPE_ENCODER);
    part.headers_mut().remove(header_names::CONTENT_TRANSFER_ENCODING);
    part
}

/// Rewrite `message` into the two-part envelope. Any previous children and the original body
/// are discarded; all other outer headers are kept as they were.
pub fn build_envelope(mut message: Message, ciphertext: Vec<u8>) -> Message {
    let control = control_part();
    let encrypted = ciphertext_part(ciphertext);

    message.set_encoder(ENVELOPE_ENCODER);
    message.set_body(Vec::new());
    message.set_children(vec![Arc::new(control), Arc::new(encrypted)]);

    let content_type = message.entity_mut().content_type_header_mut();
    content_type.set_value(content_types::MULTIPART_ENCRYPTED);
    content_type.set_parameter(params::PROTOCOL, content_types::PGP_ENCRYPTED);

    message
}
