use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use mime::Mime;

use super::{Header, HeaderName};
use crate::BoxError;

/// `Content-Type` of the body
///
/// Wraps a [`mime::Mime`] so invalid media types are rejected at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentType(Mime);

impl ContentType {
    /// A `ContentType` of type `text/plain; charset=utf-8`
    pub const TEXT_PLAIN: ContentType = Self::from_mime(mime::TEXT_PLAIN_UTF_8);

    /// A `ContentType` of type `text/html; charset=utf-8`
    pub const TEXT_HTML: ContentType = Self::from_mime(mime::TEXT_HTML_UTF_8);

    /// Parse `s` into `ContentType`
    pub fn parse(s: &str) -> Result<ContentType, ContentTypeErr> {
        Ok(Self::from_mime(s.parse().map_err(ContentTypeErr)?))
    }

    pub(crate) const fn from_mime(mime: Mime) -> Self {
        Self(mime)
    }

    pub(crate) fn as_ref(&self) -> &Mime {
        &self.0
    }

    /// The media type without parameters, e.g. `text/plain`
    pub(crate) fn essence(&self) -> &str {
        self.0.essence_str()
    }
}

impl Header for ContentType {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Type")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        Ok(Self(s.parse()?))
    }

    fn display(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An invalid `Content-Type` string
#[derive(Debug)]
pub struct ContentTypeErr(mime::FromStrError);

impl StdError for ContentTypeErr {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl Display for ContentTypeErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// `Content-Transfer-Encoding` of the body
///
/// When absent, serialization picks the most efficient encoding for the
/// payload, so in most cases this header shouldn't be set manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTransferEncoding {
    SevenBit,
    QuotedPrintable,
    Base64,
    EightBit,
    #[default]
    Binary,
}

impl Header for ContentTransferEncoding {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Transfer-Encoding")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        s.parse().map_err(BoxError::from)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::SevenBit => "7bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
            Self::EightBit => "8bit",
            Self::Binary => "binary",
        })
    }
}

impl FromStr for ContentTransferEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7bit" => Ok(Self::SevenBit),
            "quoted-printable" => Ok(Self::QuotedPrintable),
            "base64" => Ok(Self::Base64),
            "8bit" => Ok(Self::EightBit),
            "binary" => Ok(Self::Binary),
            _ => Err(s.into()),
        }
    }
}

/// `Content-Disposition` of an attachment
///
/// Defined in [RFC2183](https://tools.ietf.org/html/rfc2183)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition(String);

impl ContentDisposition {
    /// An `inline` disposition
    pub fn inline() -> Self {
        Self("inline".into())
    }

    /// An `attachment` disposition with the given filename
    pub fn attachment(filename: &str) -> Self {
        Self(format!("attachment; filename=\"{filename}\""))
    }

    /// Parse and validate a raw disposition string.
    ///
    /// The disposition type must be a non-empty token, optionally followed
    /// by `;`-separated `attribute=value` parameters.
    pub fn parse(s: &str) -> Result<ContentDisposition, ContentDispositionErr> {
        let mut segments = s.split(';');

        let disposition_type = segments
            .next()
            .unwrap_or_default()
            .trim();
        if disposition_type.is_empty() || !disposition_type.chars().all(is_token_char) {
            return Err(ContentDispositionErr(s.into()));
        }

        for param in segments {
            let (attribute, value) = param
                .split_once('=')
                .ok_or_else(|| ContentDispositionErr(s.into()))?;

            let attribute = attribute.trim();
            if attribute.is_empty() || !attribute.chars().all(is_token_char) {
                return Err(ContentDispositionErr(s.into()));
            }
            if value.trim().is_empty() {
                return Err(ContentDispositionErr(s.into()));
            }
        }

        Ok(Self(s.into()))
    }
}

fn is_token_char(c: char) -> bool {
    // RFC2045 token: printable ASCII minus tspecials
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

impl Header for ContentDisposition {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Disposition")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        ContentDisposition::parse(s).map_err(BoxError::from)
    }

    fn display(&self) -> String {
        self.0.clone()
    }
}

/// An invalid `Content-Disposition` string
#[derive(Debug)]
pub struct ContentDispositionErr(String);

impl StdError for ContentDispositionErr {}

impl Display for ContentDispositionErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "malformed disposition {:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ContentDisposition, ContentTransferEncoding, ContentType};
    use crate::message::header::{Header, HeaderName, HeaderValue, Headers};

    #[test]
    fn format_content_type() {
        let mut headers = Headers::new();
        headers.set(ContentType::TEXT_PLAIN);

        assert_eq!(
            headers.to_string(),
            "Content-Type: text/plain; charset=utf-8\r\n"
        );

        headers.set(ContentType::TEXT_HTML);

        assert_eq!(
            headers.to_string(),
            "Content-Type: text/html; charset=utf-8\r\n"
        );
    }

    #[test]
    fn parse_content_type() {
        let mut headers = Headers::new();
        headers.append_raw(HeaderValue::new(
            HeaderName::new_from_ascii_str("Content-Type"),
            "text/plain; charset=utf-8".into(),
        ));

        assert_eq!(headers.get::<ContentType>(), Some(ContentType::TEXT_PLAIN));
    }

    #[test]
    fn invalid_content_type() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("text / plain").is_err());
    }

    #[test]
    fn format_content_transfer_encoding() {
        let mut headers = Headers::new();
        headers.set(ContentTransferEncoding::SevenBit);

        assert_eq!(
            headers.to_string(),
            "Content-Transfer-Encoding: 7bit\r\n"
        );

        headers.set(ContentTransferEncoding::Base64);

        assert_eq!(
            headers.to_string(),
            "Content-Transfer-Encoding: base64\r\n"
        );
    }

    #[test]
    fn parse_content_transfer_encoding() {
        let mut headers = Headers::new();
        headers.append_raw(HeaderValue::new(
            HeaderName::new_from_ascii_str("Content-Transfer-Encoding"),
            "base64".into(),
        ));

        assert_eq!(
            headers.get::<ContentTransferEncoding>(),
            Some(ContentTransferEncoding::Base64)
        );
    }

    #[test]
    fn parse_content_disposition() {
        assert!(ContentDisposition::parse("inline").is_ok());
        assert!(ContentDisposition::parse("attachment; filename=\"a.txt\"").is_ok());
        assert!(ContentDisposition::parse("attachment; filename=a.txt; size=42").is_ok());
    }

    #[test]
    fn invalid_content_disposition() {
        assert!(ContentDisposition::parse("").is_err());
        assert!(ContentDisposition::parse(" ").is_err());
        assert!(ContentDisposition::parse("in line").is_err());
        assert!(ContentDisposition::parse("attachment; filename").is_err());
        assert!(ContentDisposition::parse("attachment; =a.txt").is_err());
    }

    #[test]
    fn display_dispositions() {
        assert_eq!(ContentDisposition::inline().display(), "inline");
        assert_eq!(
            ContentDisposition::attachment("report.pdf").display(),
            "attachment; filename=\"report.pdf\""
        );
    }
}
