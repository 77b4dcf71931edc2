use std::io::Write;

use crate::message::{header::Headers, EmailFormat, MultiPart, Part, SinglePart};

/// A structured MIME email
///
/// Produced by the flat-message conversion, see
/// [`MailMessage::into_mime`][crate::MailMessage::into_mime].
#[derive(Debug, Clone)]
pub struct MimeMessage {
    headers: Headers,
    body: Part,
}

impl MimeMessage {
    pub(crate) fn new(headers: Headers, body: Part) -> Self {
        Self { headers, body }
    }

    /// Get the headers from the message
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get a mutable reference to the headers
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the body tree of the message
    pub fn body(&self) -> &Part {
        &self.body
    }

    /// The root of the body tree as a multipart, if it is one
    pub fn body_multipart(&self) -> Option<&MultiPart> {
        match &self.body {
            Part::Multi(multi) => Some(multi),
            Part::Single(_) => None,
        }
    }

    /// The root of the body tree as a single part, if it is one
    pub fn body_singlepart(&self) -> Option<&SinglePart> {
        match &self.body {
            Part::Single(single) => Some(single),
            Part::Multi(_) => None,
        }
    }

    /// Get message content formatted for sending
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for MimeMessage {
    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");

        // The body part prints its own Content-Type plus the blank
        // separator line, so none is emitted here.
        self.body.format(out);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::MimeMessage;
    use crate::message::{
        header::{self, Header, HeaderValue, Headers},
        Part, SinglePart,
    };

    #[test]
    fn format_singlepart_message() {
        let mut headers = Headers::new();
        headers.set(header::Subject::new("invitation"));
        headers.set(header::MIME_VERSION_1_0);

        let body = Part::Single(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .header(header::ContentTransferEncoding::SevenBit)
                .body(String::from("See you tonight!")),
        );

        let message = MimeMessage::new(headers, body);

        assert_eq!(
            String::from_utf8(message.formatted()).unwrap(),
            concat!(
                "Subject: invitation\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Content-Transfer-Encoding: 7bit\r\n",
                "\r\n",
                "See you tonight!\r\n"
            )
        );
    }

    #[test]
    fn headers_mut_roundtrip() {
        let mut headers = Headers::new();
        headers.append_raw(HeaderValue::new(header::Subject::name(), "a".into()));

        let body = Part::Single(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(Vec::new()),
        );

        let mut message = MimeMessage::new(headers, body);
        message.headers_mut().set(header::Subject::new("b"));

        assert_eq!(message.headers().get_raw("Subject"), Some("b"));
    }
}
