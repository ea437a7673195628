//! mime/entity.rs
//! A single MIME entity: headers, body, encoder and (shared) child parts.
//!
//! Design notes:
//! - Children are `Arc`-shared. Copying an entity's child list never copies attachment bytes,
//!   so a snapshot can reference the same parts as the message it was taken from.
//! - The declared content type (what the body *is*) is kept apart from the `Content-Type`
//!   header (what the entity is on the wire). They diverge once children are attached and the
//!   header switches to `multipart/*`.

use std::sync::Arc;

use crate::constants::{content_types, header_names, params};
use crate::mime::encoding::ContentEncoder;
use crate::mime::header::{Header, HeaderSet};
use crate::mime::types::PartKind;
use crate::utils::generate_boundary;

#[derive(Debug, Clone)]
pub struct MimeEntity {
    pub(crate) headers: HeaderSet,
    pub(crate) body: Vec<u8>,
    pub(crate) children: Vec<Arc<MimeEntity>>,
    pub(crate) encoder: ContentEncoder,
    pub(crate) kind: PartKind,
    pub(crate) content_type: String,
    pub(crate) charset: Option<String>,
    pub(crate) boundary: String,
}

impl MimeEntity {
    fn bare(kind: PartKind, body: Vec<u8>, content_type: &str, encoder: ContentEncoder) -> Self {
        Self {
            headers: HeaderSet::new(),
            body,
            children: Vec::new(),
            encoder,
            kind,
            content_type: content_type.to_string(),
            charset: None,
            boundary: generate_boundary(),
        }
    }

    /// Inline body part (an alternative rendering), quoted-printable by default.
    pub fn part(body: impl Into<Vec<u8>>, content_type: &str, charset: Option<&str>) -> Self {
        let mut e = Self::bare(PartKind::Part, body.into(), content_type, ContentEncoder::QuotedPrintable);
        e.charset = charset.map(str::to_string);
        e.headers.add_header(e.single_content_type_header());
        e.headers.add(header_names::CONTENT_TRANSFER_ENCODING, e.encoder.name());
        e
    }

    /// Attachment, base64 by default. A filename sets both `name` and `filename` parameters.
    pub fn attachment(body: impl Into<Vec<u8>>, filename: Option<&str>, content_type: Option<&str>) -> Self {
        let ct = content_type.unwrap_or(content_types::OCTET_STREAM);
        let mut e = Self::bare(PartKind::Attachment, body.into(), ct, ContentEncoder::Base64);
        let mut type_header = e.single_content_type_header();
        let mut disposition = Header::new(header_names::CONTENT_DISPOSITION, "attachment");
        if let Some(name) = filename {
            type_header.set_parameter(params::NAME, name);
            disposition.set_parameter(params::FILENAME, name);
        }
        e.headers.add_header(type_header);
        e.headers.add(header_names::CONTENT_TRANSFER_ENCODING, e.encoder.name());
        e.headers.add_header(disposition);
        e
    }

    /// Inline file referenced from a sibling part by `cid:` URL.
    pub fn embedded(body: impl Into<Vec<u8>>, filename: &str, content_type: &str, content_id: &str) -> Self {
        let mut e = Self::bare(PartKind::Embedded, body.into(), content_type, ContentEncoder::Base64);
        let mut type_header = e.single_content_type_header();
        type_header.set_parameter(params::NAME, filename);
        let mut disposition = Header::new(header_names::CONTENT_DISPOSITION, "inline");
        disposition.set_parameter(params::FILENAME, filename);
        e.headers.add_header(type_header);
        e.headers.add(header_names::CONTENT_TRANSFER_ENCODING, e.encoder.name());
        e.headers.add_header(disposition);
        e.headers.add(header_names::CONTENT_ID, format!("<{}>", content_id));
        e
    }

    fn single_content_type_header(&self) -> Header {
        let mut h = Header::new(header_names::CONTENT_TYPE, self.content_type.clone());
        if let Some(cs) = &self.charset {
            h.set_parameter(params::CHARSET, cs.clone());
        }
        h
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        &mut self.headers
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn encoder(&self) -> ContentEncoder {
        self.encoder
    }

    /// Assign the transfer encoder and (re)declare it in `Content-Transfer-Encoding`.
    pub fn set_encoder(&mut self, encoder: ContentEncoder) {
        self.encoder = encoder;
        let declared = self.declared_transfer_encoding();
        self.headers.set(header_names::CONTENT_TRANSFER_ENCODING, declared);
    }

    /// Declared body type; for a multipart entity this is the type of its own leading body.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = content_type.to_string();
        if self.children.is_empty() {
            self.content_type_header_mut().set_value(content_type);
        }
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_charset(&mut self, charset: Option<&str>) {
        self.charset = charset.map(str::to_string);
        if self.children.is_empty() {
            let h = self.content_type_header_mut();
            match charset {
                Some(cs) => h.set_parameter(params::CHARSET, cs),
                None => {
                    h.remove_parameter(params::CHARSET);
                }
            }
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn set_boundary(&mut self, boundary: impl Into<String>) {
        self.boundary = boundary.into();
        if !self.children.is_empty() {
            let b = self.boundary.clone();
            self.content_type_header_mut().set_parameter(params::BOUNDARY, b);
        }
    }

    pub fn content_type_header(&self) -> Option<&Header> {
        self.headers.get(header_names::CONTENT_TYPE)
    }

    /// `Content-Type` header, created from the declared type if it was removed.
    pub fn content_type_header_mut(&mut self) -> &mut Header {
        let fallback = self.single_content_type_header();
        self.headers.get_or_insert_with(header_names::CONTENT_TYPE, || fallback)
    }

    pub fn children(&self) -> &[Arc<MimeEntity>] {
        &self.children
    }

    pub fn is_multipart(&self) -> bool {
        !self.children.is_empty()
    }

    /// Replace the whole child list.
    ///
    /// Non-empty: `Content-Type` becomes `multipart/<subtype>` (highest child kind wins) with a
    /// `boundary` parameter, and the `charset` parameter is dropped. Empty: the declared type and
    /// charset are restored. Other parameters present on the header are left alone.
    pub fn set_children(&mut self, children: Vec<Arc<MimeEntity>>) {
        self.children = children;

        let subtype = self.children.iter().map(|c| c.kind).max().map(PartKind::multipart_subtype);
        let boundary = self.boundary.clone();
        let declared = self.content_type.clone();
        let charset = self.charset.clone();

        let h = self.content_type_header_mut();
        match subtype {
            Some(sub) => {
                h.set_value(format!("multipart/{}", sub));
                h.remove_parameter(params::CHARSET);
                h.set_parameter(params::BOUNDARY, boundary);
            }
            None => {
                h.set_value(declared);
                h.remove_parameter(params::BOUNDARY);
                if let Some(cs) = charset {
                    h.set_parameter(params::CHARSET, cs);
                }
            }
        }

        if self.headers.has(header_names::CONTENT_TRANSFER_ENCODING) {
            let declared = self.declared_transfer_encoding();
            self.headers.set(header_names::CONTENT_TRANSFER_ENCODING, declared);
        }
    }

    /// Append one child, keeping the existing ones.
    pub fn attach(&mut self, child: MimeEntity) {
        let mut children = std::mem::take(&mut self.children);
        children.push(Arc::new(child));
        self.set_children(children);
    }

    /// A multipart entity may only declare an identity encoding (RFC 2045 §6.4).
    fn declared_transfer_encoding(&self) -> &'static str {
        match (self.children.is_empty(), self.encoder) {
            (false, ContentEncoder::QuotedPrintable | ContentEncoder::Base64) => ContentEncoder::SevenBit.name(),
            _ => self.encoder.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_headers() {
        let a = MimeEntity::attachment(b"data".to_vec(), Some("message.asc"), None);
        let ct = a.content_type_header().unwrap();
        assert_eq!(ct.value(), "application/octet-stream");
        assert_eq!(ct.parameter("name"), Some("message.asc"));
        let cd = a.headers().get("content-disposition").unwrap();
        assert_eq!(cd.value(), "attachment");
        assert_eq!(cd.parameter("filename"), Some("message.asc"));
        assert_eq!(a.headers().get("content-transfer-encoding").unwrap().value(), "base64");
    }

    #[test]
    fn children_switch_content_type_and_back() {
        let mut e = MimeEntity::part(b"hello".to_vec(), "text/plain", Some("utf-8"));
        e.set_boundary("b1");

        e.set_children(vec![Arc::new(MimeEntity::part(b"<p>hi</p>".to_vec(), "text/html", Some("utf-8")))]);
        let ct = e.content_type_header().unwrap();
        assert_eq!(ct.value(), "multipart/alternative");
        assert_eq!(ct.parameter("boundary"), Some("b1"));
        assert_eq!(ct.parameter("charset"), None);
        assert_eq!(e.headers().get("content-transfer-encoding").unwrap().value(), "7bit");
        assert_eq!(e.content_type(), "text/plain");

        e.attach(MimeEntity::attachment(b"x".to_vec(), None, None));
        assert_eq!(e.content_type_header().unwrap().value(), "multipart/mixed");

        e.set_children(Vec::new());
        let ct = e.content_type_header().unwrap();
        assert_eq!(ct.value(), "text/plain");
        assert_eq!(ct.parameter("charset"), Some("utf-8"));
        assert_eq!(ct.parameter("boundary"), None);
        assert_eq!(e.headers().get("content-transfer-encoding").unwrap().value(), "quoted-printable");
    }

    #[test]
    fn set_content_type_on_leaf_keeps_params() {
        let mut a = MimeEntity::attachment(b"Version: 1".to_vec(), None, None);
        a.set_content_type("application/pgp-encrypted");
        assert_eq!(a.content_type_header().unwrap().value(), "application/pgp-encrypted");
        assert_eq!(a.content_type(), "application/pgp-encrypted");
    }

    #[test]
    fn set_encoder_declares_header() {
        let mut a = MimeEntity::attachment(b"x".to_vec(), None, None);
        a.set_encoder(ContentEncoder::SevenBit);
        assert_eq!(a.encoder(), ContentEncoder::SevenBit);
        assert_eq!(a.headers().get_all("Content-Transfer-Encoding").count(), 1);
        assert_eq!(a.headers().get("Content-Transfer-Encoding").unwrap().value(), "7bit");
    }
}
