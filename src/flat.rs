//! The flat email-message representation accepted by the conversion.
//!
//! These types mirror the loosely-typed shape emails usually arrive in
//! before any MIME structure exists: recipient lists as name/address string
//! pairs, one body string, alternate views with inline resources, and
//! attachments wrapping raw content streams. Everything is public data;
//! validation only happens when the message is converted with
//! [`MailMessage::into_mime`].

use std::{
    borrow::Cow,
    fmt::{self, Debug, Display, Formatter},
    io::{Cursor, Read},
};

use crate::{
    address::AddressError,
    message::{
        header::{ContentTransferEncoding, Headers},
        Mailbox,
    },
};

/// A character set name, e.g. `utf-8`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset(Cow<'static, str>);

impl Charset {
    /// The `utf-8` character set
    pub const UTF_8: Charset = Charset(Cow::Borrowed("utf-8"));

    pub fn new(name: impl Into<String>) -> Self {
        Charset(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names the utf-8 character set, under any of its
    /// registered spellings
    pub(crate) fn is_utf8(&self) -> bool {
        self.0.eq_ignore_ascii_case("utf-8") || self.0.eq_ignore_ascii_case("utf8")
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivery priority of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailPriority {
    /// No priority markers on the wire
    #[default]
    Normal,
    /// `Priority: urgent`
    High,
    /// `Priority: non-urgent`
    Low,
}

/// Transfer-encoding hint carried by a content item.
///
/// Only a subset maps onto a wire encoding; the rest leave the choice to
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// No preference, serialization picks the encoding
    #[default]
    Unknown,
    /// `quoted-printable`
    QuotedPrintable,
    /// `base64`
    Base64,
    /// `7bit`
    SevenBit,
    /// Deliberately not mapped onto the wire, treated like [`Unknown`][Self::Unknown]
    EightBit,
}

impl TransferEncoding {
    pub(crate) fn to_content_encoding(self) -> Option<ContentTransferEncoding> {
        match self {
            TransferEncoding::QuotedPrintable => Some(ContentTransferEncoding::QuotedPrintable),
            TransferEncoding::Base64 => Some(ContentTransferEncoding::Base64),
            TransferEncoding::SevenBit => Some(ContentTransferEncoding::SevenBit),
            TransferEncoding::EightBit | TransferEncoding::Unknown => None,
        }
    }
}

/// A display name paired with an unvalidated address string.
///
/// Validation happens during conversion, when the pair is turned into a
/// [`Mailbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    /// The name associated with the address
    pub name: Option<String>,
    /// The address itself, e.g. `user@domain.tld`
    pub address: String,
}

impl MailAddress {
    /// An address without a display name
    pub fn new(address: impl Into<String>) -> Self {
        MailAddress {
            name: None,
            address: address.into(),
        }
    }

    /// An address with a display name
    pub fn named(name: impl Into<String>, address: impl Into<String>) -> Self {
        MailAddress {
            name: Some(name.into()),
            address: address.into(),
        }
    }

    pub(crate) fn to_mailbox(&self) -> Result<Mailbox, AddressError> {
        let email = self.address.parse()?;
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned);
        Ok(Mailbox::new(name, email))
    }
}

/// The flat message itself.
///
/// All fields are plain data. Empty lists and `None` strings both mean
/// "not set"; pre-existing entries in `headers` for a field whose input
/// list is empty survive the conversion untouched.
#[derive(Debug, Default)]
pub struct MailMessage {
    /// Headers attached directly by the caller, copied onto the output first
    pub headers: Headers,

    /// `Sender` field
    pub sender: Option<MailAddress>,
    /// `From` list
    pub from: Vec<MailAddress>,
    /// `Reply-To` list
    pub reply_to: Vec<MailAddress>,
    /// `To` list
    pub to: Vec<MailAddress>,
    /// `Cc` list
    pub cc: Vec<MailAddress>,
    /// `Bcc` list
    pub bcc: Vec<MailAddress>,

    /// Subject text, defaults to the empty string on the wire
    pub subject: Option<String>,
    /// Explicit subject character set, switches the subject to
    /// erase-then-append replacement
    pub subject_encoding: Option<Charset>,

    /// Delivery priority
    pub priority: MailPriority,

    /// The main body text
    pub body: Option<String>,
    /// Whether `body` is HTML rather than plain text
    pub body_is_html: bool,
    /// Character set of `body`, defaults to utf-8. The body is never
    /// transcoded, so conversion rejects anything other than utf-8 here.
    pub body_encoding: Option<Charset>,

    /// Alternate renditions of the body, in preference order
    pub alternate_views: Vec<AlternateView>,
    /// Attachments appended after the body
    pub attachments: Vec<Attachment>,
}

impl MailMessage {
    /// Creates an empty message
    pub fn new() -> Self {
        Self::default()
    }
}

/// An alternate rendition of the message body, e.g. an HTML version,
/// optionally carrying inline resources it references.
pub struct AlternateView {
    /// The content stream, consumed once during conversion. Must be
    /// finite, as it is buffered in memory in full.
    pub content: Box<dyn Read>,
    /// Declared content type string, parsed during conversion
    pub content_type: String,
    /// Optional `Content-ID` value
    pub content_id: Option<String>,
    /// Transfer-encoding hint
    pub transfer_encoding: TransferEncoding,
    /// Base location the rendition's relative references resolve against
    pub base_location: Option<String>,
    /// Inline resources referenced by this rendition
    pub linked_resources: Vec<LinkedResource>,
}

impl AlternateView {
    pub fn new(content: impl Read + 'static, content_type: impl Into<String>) -> Self {
        AlternateView {
            content: Box::new(content),
            content_type: content_type.into(),
            content_id: None,
            transfer_encoding: TransferEncoding::default(),
            base_location: None,
            linked_resources: Vec::new(),
        }
    }

    /// A view over an in-memory buffer
    pub fn from_bytes(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::new(Cursor::new(bytes), content_type)
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.transfer_encoding = encoding;
        self
    }

    pub fn base_location(mut self, location: impl Into<String>) -> Self {
        self.base_location = Some(location.into());
        self
    }

    pub fn linked_resource(mut self, resource: LinkedResource) -> Self {
        self.linked_resources.push(resource);
        self
    }
}

impl Debug for AlternateView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlternateView")
            .field("content", &"Box<dyn Read>")
            .field("content_type", &self.content_type)
            .field("content_id", &self.content_id)
            .field("transfer_encoding", &self.transfer_encoding)
            .field("base_location", &self.base_location)
            .field("linked_resources", &self.linked_resources)
            .finish()
    }
}

/// An inline resource referenced by an alternate view, e.g. an image
/// addressed through a `cid:` link.
pub struct LinkedResource {
    /// The content stream, consumed once during conversion. Must be
    /// finite, as it is buffered in memory in full.
    pub content: Box<dyn Read>,
    /// Declared content type string, parsed during conversion
    pub content_type: String,
    /// Optional `Content-ID` value the rendition references
    pub content_id: Option<String>,
    /// Transfer-encoding hint
    pub transfer_encoding: TransferEncoding,
    /// Optional `Content-Location` of this resource
    pub content_location: Option<String>,
}

impl LinkedResource {
    pub fn new(content: impl Read + 'static, content_type: impl Into<String>) -> Self {
        LinkedResource {
            content: Box::new(content),
            content_type: content_type.into(),
            content_id: None,
            transfer_encoding: TransferEncoding::default(),
            content_location: None,
        }
    }

    /// A resource over an in-memory buffer
    pub fn from_bytes(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::new(Cursor::new(bytes), content_type)
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.transfer_encoding = encoding;
        self
    }

    pub fn content_location(mut self, location: impl Into<String>) -> Self {
        self.content_location = Some(location.into());
        self
    }
}

impl Debug for LinkedResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedResource")
            .field("content", &"Box<dyn Read>")
            .field("content_type", &self.content_type)
            .field("content_id", &self.content_id)
            .field("transfer_encoding", &self.transfer_encoding)
            .field("content_location", &self.content_location)
            .finish()
    }
}

/// A file-like payload appended after the body inside a `multipart/mixed`
/// composite.
pub struct Attachment {
    /// The content stream, consumed once during conversion. Must be
    /// finite, as it is buffered in memory in full.
    pub content: Box<dyn Read>,
    /// Declared content type string, parsed during conversion
    pub content_type: String,
    /// Content-disposition descriptor, parsed during conversion
    pub disposition: String,
    /// Optional `Content-ID` value
    pub content_id: Option<String>,
    /// Transfer-encoding hint
    pub transfer_encoding: TransferEncoding,
}

impl Attachment {
    pub fn new(content: impl Read + 'static, content_type: impl Into<String>) -> Self {
        Attachment {
            content: Box::new(content),
            content_type: content_type.into(),
            disposition: "attachment".to_owned(),
            content_id: None,
            transfer_encoding: TransferEncoding::default(),
        }
    }

    /// An attachment over an in-memory buffer
    pub fn from_bytes(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::new(Cursor::new(bytes), content_type)
    }

    /// Sets the raw content-disposition descriptor, e.g.
    /// `attachment; filename="report.pdf"`
    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = disposition.into();
        self
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.transfer_encoding = encoding;
        self
    }
}

impl Debug for Attachment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("content", &"Box<dyn Read>")
            .field("content_type", &self.content_type)
            .field("disposition", &self.disposition)
            .field("content_id", &self.content_id)
            .field("transfer_encoding", &self.transfer_encoding)
            .finish()
    }
}
