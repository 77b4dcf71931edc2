//! flatmail maps a flat email-message description onto a structured MIME
//! document tree.
//!
//! The input side is deliberately loose: recipient lists as name/address
//! string pairs, a single body string, alternate views with linked inline
//! resources, and attachments carrying raw content streams. The output side
//! is a [`MimeMessage`]: an ordered header collection plus a nested tree of
//! single parts and `multipart/{alternative,related,mixed}` composites,
//! ready to be serialized to wire format.
//!
//! flatmail builds MIME, it never parses it, and it does not speak any
//! transport protocol.
//!
//! # Example
//!
//! ```rust
//! use flatmail::{MailAddress, MailMessage};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut mail = MailMessage::new();
//! mail.from.push(MailAddress::named("NoBody", "nobody@domain.tld"));
//! mail.to.push(MailAddress::new("hei@domain.tld"));
//! mail.subject = Some("Happy new year".to_owned());
//! mail.body = Some("Be happy!".to_owned());
//!
//! let mime = mail.into_mime()?;
//! assert_eq!(mime.headers().get_raw("To"), Some("hei@domain.tld"));
//!
//! let out = String::from_utf8(mime.formatted()).unwrap();
//! assert!(out.ends_with("Be happy!\r\n"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, rust_2018_idioms)]

pub use crate::address::{Address, AddressError};
pub use crate::error::Error;
pub use crate::flat::{
    AlternateView, Attachment, Charset, LinkedResource, MailAddress, MailMessage, MailPriority,
    TransferEncoding,
};
pub use crate::message::MimeMessage;

mod address;
mod convert;
mod error;
mod flat;
pub mod message;

/// Type-erased error used by fallible header parsing.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
