//! The MIME document model: headers, mailboxes, single parts and
//! multipart composites.
//!
//! A finished [`MimeMessage`] is an ordered header collection plus a body
//! tree of [`Part`] nodes. Trees are built bottom-up through the value
//! builders ([`SinglePart::builder`], [`MultiPart::builder`]); once a part
//! has been handed to a composite or to the message it is never mutated
//! again.
//!
//! ```rust
//! use flatmail::message::{header, MultiPart, SinglePart};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let alternative = MultiPart::alternative()
//!     .singlepart(
//!         SinglePart::builder()
//!             .header(header::ContentType::parse("text/plain; charset=utf-8")?)
//!             .body(String::from("Hello, world!")),
//!     )
//!     .singlepart(
//!         SinglePart::builder()
//!             .header(header::ContentType::parse("text/html; charset=utf-8")?)
//!             .body(String::from("<p>Hello, <b>world</b>!</p>")),
//!     );
//! assert_eq!(alternative.parts().len(), 2);
//! # Ok(())
//! # }
//! ```

pub use self::mailbox::{Mailbox, Mailboxes};
pub use self::message::MimeMessage;
pub use self::mimebody::{
    MultiPart, MultiPartBuilder, MultiPartKind, Part, SinglePart, SinglePartBuilder,
};

pub mod header;
mod mailbox;
mod message;
mod mimebody;

pub(crate) trait EmailFormat {
    // Use a Vec<u8> instead of an io::Write because the formatted output
    // is always assembled in memory.
    fn format(&self, out: &mut Vec<u8>);
}
