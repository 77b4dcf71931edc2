use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    io,
};

use crate::address::AddressError;
use crate::flat::Charset;
use crate::message::header::{ContentDispositionErr, ContentTypeErr};

/// Error type for the flat-to-MIME transform.
///
/// There is no partial-success mode: any of these aborts the whole
/// conversion and the caller must discard the output.
#[derive(Debug)]
pub enum Error {
    /// Malformed content-type string on a content item
    ContentType(ContentTypeErr),
    /// Malformed content-disposition string on an attachment
    ContentDisposition(ContentDispositionErr),
    /// Malformed address in a recipient list
    Address(AddressError),
    /// Body charset naming anything other than utf-8; the body text is
    /// never transcoded
    Charset(Charset),
    /// IO error while copying a content stream
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::ContentType(e) => write!(f, "invalid content type: {e}"),
            Error::ContentDisposition(e) => write!(f, "invalid content disposition: {e}"),
            Error::Address(e) => write!(f, "invalid address: {e}"),
            Error::Charset(charset) => write!(f, "unsupported body charset: {charset}"),
            Error::Io(e) => write!(f, "could not read content stream: {e}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::ContentType(e) => Some(e),
            Error::ContentDisposition(e) => Some(e),
            Error::Address(e) => Some(e),
            Error::Charset(_) => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<ContentTypeErr> for Error {
    fn from(err: ContentTypeErr) -> Error {
        Error::ContentType(err)
    }
}

impl From<ContentDispositionErr> for Error {
    fn from(err: ContentDispositionErr) -> Error {
        Error::ContentDisposition(err)
    }
}

impl From<AddressError> for Error {
    fn from(err: AddressError) -> Error {
        Error::Address(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
