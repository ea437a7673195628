//! signer/canonical.rs
//! Canonical byte form of a message, as handed to the OpenPGP engine.
//!
//! Design notes:
//! - The snapshot is built from four fields only (subject, body, content type, charset),
//!   and the routing/identity headers are then stripped explicitly as well. The constructor
//!   generates `Message-ID`, `Date` and `Subject`, so the strip is what actually removes them.
//! - Children are re-attached by reference; attachment bytes are not copied.
//! - The original message is only ever borrowed immutably.

use tracing::trace;

use crate::constants::STRIPPED_HEADERS;
use crate::mime::{Message, MimeError};

/// Independent copy of `message` carrying no routing or identity headers.
pub fn snapshot(message: &Message) -> Message {
    let mut copy = Message::new(
        message.subject(),
        message.body().to_vec(),
        message.content_type(),
        message.charset(),
    );

    let headers = copy.headers_mut();
    for name in STRIPPED_HEADERS {
        headers.remove_all(name);
    }

    copy.set_children(message.children().to_vec());
    copy
}

/// Exact bytes to encrypt: the full wire form of the snapshot.
pub fn canonicalize(message: &Message) -> Result<Vec<u8>, MimeError> {
    let copy = snapshot(message);
    let bytes = copy.to_bytes()?;
    trace!(
        children = copy.children().len(),
        headers = ?copy.headers().names(),
        len = bytes.len(),
        "canonical form rendered"
    );
    Ok(bytes)
}
