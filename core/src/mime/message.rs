//! mime/message.rs
//! Top-level RFC 5322 message on top of `MimeEntity`.

use std::sync::Arc;

use chrono::Utc;

use crate::constants::{header_names, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE, MIME_VERSION_VALUE};
use crate::mime::encoding::ContentEncoder;
use crate::mime::entity::MimeEntity;
use crate::mime::header::{Header, HeaderSet};
use crate::mime::types::{MimeError, PartKind};
use crate::utils::generate_message_id;

#[derive(Debug, Clone)]
pub struct Message {
    entity: MimeEntity,
}

impl Message {
    /// New message with generated `Message-ID` and `Date`, quoted-printable body encoding.
    pub fn new(subject: &str, body: impl Into<Vec<u8>>, content_type: &str, charset: Option<&str>) -> Self {
        let mut entity = MimeEntity::part(body, content_type, charset);
        let mut headers = HeaderSet::new();
        headers.add(header_names::MESSAGE_ID, generate_message_id());
        headers.add(header_names::DATE, Utc::now().to_rfc2822());
        headers.add(header_names::SUBJECT, subject);
        headers.add(header_names::MIME_VERSION, MIME_VERSION_VALUE);
        // Content-Type and Content-Transfer-Encoding from the part, after the envelope fields.
        for h in entity.headers().iter() {
            headers.add_header(h.clone());
        }
        *entity.headers_mut() = headers;
        Self { entity }
    }

    /// Plain text message with the default content type and charset.
    pub fn text(subject: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(subject, body, DEFAULT_CONTENT_TYPE, Some(DEFAULT_CHARSET))
    }

    pub fn entity(&self) -> &MimeEntity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut MimeEntity {
        &mut self.entity
    }

    pub fn headers(&self) -> &HeaderSet {
        self.entity.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        self.entity.headers_mut()
    }

    /// `Subject` value, empty when the header is absent.
    pub fn subject(&self) -> &str {
        self.header_value(header_names::SUBJECT).unwrap_or("")
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.headers_mut().set(header_names::SUBJECT, subject);
    }

    pub fn message_id(&self) -> Option<&str> {
        self.header_value(header_names::MESSAGE_ID)
    }

    pub fn date(&self) -> Option<&str> {
        self.header_value(header_names::DATE)
    }

    pub fn set_from(&mut self, address: &str) {
        self.headers_mut().set(header_names::FROM, address);
    }

    pub fn add_to(&mut self, address: &str) {
        self.headers_mut().add(header_names::TO, address);
    }

    pub fn add_cc(&mut self, address: &str) {
        self.headers_mut().add(header_names::CC, address);
    }

    pub fn add_bcc(&mut self, address: &str) {
        self.headers_mut().add(header_names::BCC, address);
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers().get(name).map(Header::value)
    }

    pub fn body(&self) -> &[u8] {
        self.entity.body()
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.entity.set_body(body);
    }

    pub fn content_type(&self) -> &str {
        self.entity.content_type()
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.entity.set_content_type(content_type);
    }

    pub fn charset(&self) -> Option<&str> {
        self.entity.charset()
    }

    pub fn set_charset(&mut self, charset: Option<&str>) {
        self.entity.set_charset(charset);
    }

    pub fn encoder(&self) -> ContentEncoder {
        self.entity.encoder()
    }

    pub fn set_encoder(&mut self, encoder: ContentEncoder) {
        self.entity.set_encoder(encoder);
    }

    pub fn children(&self) -> &[Arc<MimeEntity>] {
        self.entity.children()
    }

    pub fn set_children(&mut self, children: Vec<Arc<MimeEntity>>) {
        self.entity.set_children(children);
    }

    pub fn attach(&mut self, child: MimeEntity) {
        self.entity.attach(child);
    }

    /// Kinds of the current children, in order.
    pub fn child_kinds(&self) -> Vec<PartKind> {
        self.children().iter().map(|c| c.kind()).collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MimeError> {
        self.entity.to_bytes()
    }
}
