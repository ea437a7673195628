//! mime/render.rs
//! Wire serialization of MIME entities.
//!
//! Layout (RFC 2045/2046):
//! - header fields, an empty line, then the body encoded with the entity's own encoder;
//! - for a multipart entity, `--boundary CRLF part CRLF` per child, then `--boundary--` CRLF;
//! - an entity holding both a body and children renders its body as a leading inline part,
//!   carrying the declared content type, charset and encoder.

use crate::constants::{header_names, CRLF};
use crate::mime::entity::MimeEntity;
use crate::mime::types::MimeError;

/// `type/subtype` with both halves non-empty and free of whitespace.
pub fn validate_content_type(value: &str) -> Result<(), MimeError> {
    let ok = match value.split_once('/') {
        Some((t, s)) => {
            !t.is_empty()
                && !s.is_empty()
                && !s.contains('/')
                && value.bytes().all(|b| b.is_ascii_graphic())
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(MimeError::InvalidContentType { value: value.to_string() })
    }
}

impl MimeEntity {
    /// Full wire form of this entity.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MimeError> {
        let mut out = Vec::with_capacity(self.estimated_len());
        self.render_into(&mut out)?;
        Ok(out)
    }

    pub(crate) fn render_into(&self, out: &mut Vec<u8>) -> Result<(), MimeError> {
        let content_type = self
            .content_type_header()
            .ok_or(MimeError::MissingHeader { name: header_names::CONTENT_TYPE })?;
        validate_content_type(content_type.value())?;
        validate_content_type(&self.content_type)?;

        self.headers.render(out)?;
        out.extend_from_slice(CRLF.as_bytes());
        self.render_body(out)
    }

    fn render_body(&self, out: &mut Vec<u8>) -> Result<(), MimeError> {
        if self.children.is_empty() {
            out.extend_from_slice(&self.encoder.encode(&self.body)?);
            return Ok(());
        }

        let delimiter = format!("--{}", self.boundary);

        if !self.body.is_empty() {
            let mut leading = MimeEntity::part(self.body.clone(), &self.content_type, self.charset.as_deref());
            leading.set_encoder(self.encoder);
            push_delimited(out, &delimiter, &leading)?;
        }
        for child in &self.children {
            push_delimited(out, &delimiter, child)?;
        }

        out.extend_from_slice(delimiter.as_bytes());
        out.extend_from_slice(b"--");
        out.extend_from_slice(CRLF.as_bytes());
        Ok(())
    }

    fn estimated_len(&self) -> usize {
        // Base64 growth plus a little per-part header overhead.
        let own = self.body.len() * 4 / 3 + 512;
        own + self.children.iter().map(|c| c.estimated_len()).sum::<usize>()
    }
}

fn push_delimited(out: &mut Vec<u8>, delimiter: &str, part: &MimeEntity) -> Result<(), MimeError> {
    out.extend_from_slice(delimiter.as_bytes());
    out.extend_from_slice(CRLF.as_bytes());
    part.render_into(out)?;
    out.extend_from_slice(CRLF.as_bytes());
    Ok(())
}
