//! Headers widely used in email messages
// https://tools.ietf.org/html/rfc5322#section-2.2

use std::{
    borrow::Cow,
    fmt::{self, Display, Write},
};

use base64::{display::Base64Display, engine::general_purpose::STANDARD};

use crate::BoxError;

pub use self::content::*;
pub use self::mailbox::*;
pub use self::special::*;
pub use self::textual::*;

mod content;
mod mailbox;
mod special;
mod textual;

/// A typed header, convertible to and from its raw string value.
pub trait Header: Clone {
    /// The header's field name
    fn name() -> HeaderName;

    /// Parse the raw value into the typed representation
    fn parse(s: &str) -> Result<Self, BoxError>;

    /// Render the typed representation back into a raw value
    fn display(&self) -> String;
}

/// A valid header field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderName(Cow<'static, str>);

impl HeaderName {
    /// Creates a header name from a static string
    ///
    /// Panics at compile time if `ascii` isn't a valid header name.
    pub const fn new_from_ascii_str(ascii: &'static str) -> Self {
        let bytes = ascii.as_bytes();
        assert!(!bytes.is_empty() && bytes.len() <= 76);

        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i].is_ascii());
            assert!(bytes[i] != b' ' && bytes[i] != b':');
            i += 1;
        }

        Self(Cow::Borrowed(ascii))
    }

    /// Creates a header name from a runtime string
    ///
    /// Panics if `ascii` isn't a valid header name.
    pub fn new_from_ascii(ascii: String) -> Self {
        assert!(ascii.is_ascii());
        assert!(!ascii.is_empty() && ascii.len() <= 76);
        assert!(ascii.trim().len() == ascii.len());
        assert!(!ascii.contains(':'));
        Self(Cow::Owned(ascii))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HeaderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One header entry: a field name plus its raw, unfolded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderValue {
    name: HeaderName,
    raw: String,
}

impl HeaderValue {
    /// Create a header entry from a name and a raw value
    pub fn new(name: HeaderName, raw: String) -> Self {
        Self { name, raw }
    }

    /// The field name
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    /// The raw value
    pub fn value(&self) -> &str {
        &self.raw
    }
}

/// An ordered header collection.
///
/// Entries keep their insertion order, duplicate field names are permitted,
/// and name matching is ASCII case-insensitive. Replacement of a field is
/// the explicit two-step erase-then-insert; plain [`Headers::append`] never
/// touches existing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<HeaderValue>,
}

impl Headers {
    /// Create an empty header collection
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Create an empty header collection with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            headers: Vec::with_capacity(capacity),
        }
    }

    /// Get the first value for the typed header, if present and parsable
    pub fn get<H: Header>(&self) -> Option<H> {
        self.get_raw(H::name().as_str())
            .and_then(|raw| H::parse(raw).ok())
    }

    /// Set the typed header, replacing any existing entries for the field
    pub fn set<H: Header>(&mut self, header: H) {
        self.set_raw(HeaderValue::new(H::name(), header.display()));
    }

    /// Append the typed header, leaving existing entries untouched
    pub fn append<H: Header>(&mut self, header: H) {
        self.append_raw(HeaderValue::new(H::name(), header.display()));
    }

    /// Remove every entry for the typed header's field
    pub fn remove_all<H: Header>(&mut self) {
        self.remove_all_raw(H::name().as_str());
    }

    /// Get the first raw value for the field name
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.find_header(name).map(HeaderValue::value)
    }

    /// Iterate over every raw value for the field name, in order
    pub fn get_all_raw<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |entry| entry.name.0.eq_ignore_ascii_case(name))
            .map(HeaderValue::value)
    }

    /// Append a raw entry, duplicates permitted
    pub fn append_raw(&mut self, value: HeaderValue) {
        self.headers.push(value);
    }

    /// Replace the field: erase every existing entry, then insert
    pub fn set_raw(&mut self, value: HeaderValue) {
        self.remove_all_raw(value.name.as_str());
        self.headers.push(value);
    }

    /// Remove every entry for the field name
    pub fn remove_all_raw(&mut self, name: &str) {
        self.headers
            .retain(|entry| !entry.name.0.eq_ignore_ascii_case(name));
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.headers.clear();
    }

    /// Iterate over the entries in order
    pub fn iter(&self) -> std::slice::Iter<'_, HeaderValue> {
        self.headers.iter()
    }

    fn find_header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|entry| entry.name.0.eq_ignore_ascii_case(name))
    }
}

impl Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.headers {
            let encoder = HeaderEncoder::new(f, &entry.name, &entry.raw)?;
            encoder.format(f)?;
            f.write_str("\r\n")?;
        }

        Ok(())
    }
}

fn allowed_str(s: &str) -> bool {
    s.chars().all(allowed_char)
}

fn allowed_char(c: char) -> bool {
    c >= 1 as char && c <= 9 as char
        || c == 11 as char
        || c == 12 as char
        || c >= 14 as char && c <= 127 as char
}

const MAX_LINE_LEN: usize = 76;

/// Folds a header onto 76-column lines, RFC 2047-encoding runs of words
/// that contain non-ASCII characters.
struct HeaderEncoder<'a> {
    words_iter: WordsPlusFillIterator<'a>,

    line_len: usize,
    encode_buf: String,
}

impl<'a> HeaderEncoder<'a> {
    fn new(f: &mut fmt::Formatter<'_>, name: &HeaderName, value: &'a str) -> Result<Self, fmt::Error> {
        f.write_str(name.as_str())?;
        f.write_str(": ")?;

        Ok(Self {
            words_iter: WordsPlusFillIterator { s: value },

            line_len: name.as_str().len() + 2,
            encode_buf: String::new(),
        })
    }

    fn format(mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn would_fit_new_line(len: usize) -> bool {
            len < (MAX_LINE_LEN - 1)
        }

        fn base64_len(len: usize) -> usize {
            "=?utf-8?b?".len() + (len * 4 / 3 + 4) + "?=".len()
        }

        fn available_len_to_max_encode_len(len: usize) -> usize {
            len.saturating_sub("=?utf-8?b?".len() + (len * 3 / 4 + 4) + "?=".len())
        }

        while let Some(next_word) = self.words_iter.next() {
            let allowed = allowed_str(next_word);

            if allowed {
                // the next word is allowed, but we may have accumulated some words to encode
                self.flush_encode_buf(f, true)?;

                if next_word.len() > self.remaining_line_len() {
                    // not enough space left on this line for the word

                    if self.something_written_to_this_line() && would_fit_new_line(next_word.len())
                    {
                        // word doesn't fit this line, but something had already been
                        // written to it, and word would fit the next line
                        self.new_line(f)?;
                    } else {
                        // word neither fits this line nor the next one, cut it
                        // in the middle and make it fit

                        let mut next_word = next_word;

                        while !next_word.is_empty() {
                            if self.remaining_line_len() == 0 {
                                self.new_line(f)?;
                            }

                            let len = self.remaining_line_len().min(next_word.len());
                            let first_part = &next_word[..len];
                            next_word = &next_word[len..];

                            f.write_str(first_part)?;
                            self.line_len += first_part.len();
                        }

                        continue;
                    }
                }

                // word fits, write it!
                f.write_str(next_word)?;
                self.line_len += next_word.len();
            } else {
                if self.remaining_line_len() >= base64_len(self.encode_buf.len() + next_word.len())
                {
                    // next_word fits
                    self.encode_buf.push_str(next_word);
                    continue;
                }

                // next_word doesn't fit this line

                if would_fit_new_line(base64_len(next_word.len())) {
                    // ...but it would fit the next one

                    self.flush_encode_buf(f, false)?;
                    self.new_line(f)?;

                    self.encode_buf.push_str(next_word);
                    continue;
                }

                // ...and also wouldn't fit the next one.
                // chop it up into pieces

                let mut next_word = next_word;

                while !next_word.is_empty() {
                    if self.remaining_line_len() <= base64_len(1) {
                        self.flush_encode_buf(f, false)?;
                        self.new_line(f)?;
                    }

                    let len = available_len_to_max_encode_len(self.remaining_line_len())
                        .min(next_word.len());
                    let mut len = len.max(1);
                    while !next_word.is_char_boundary(len) {
                        len += 1;
                    }
                    let first_part = &next_word[..len];
                    next_word = &next_word[len..];

                    self.encode_buf.push_str(first_part);
                }
            }
        }

        self.flush_encode_buf(f, false)?;

        Ok(())
    }

    fn remaining_line_len(&self) -> usize {
        MAX_LINE_LEN.saturating_sub(self.line_len)
    }

    fn something_written_to_this_line(&self) -> bool {
        self.line_len > 1
    }

    fn flush_encode_buf(
        &mut self,
        f: &mut fmt::Formatter<'_>,
        switching_to_allowed: bool,
    ) -> fmt::Result {
        if !self.encode_buf.is_empty() {
            let mut write_after = None;

            if switching_to_allowed {
                let last_char = self.encode_buf.pop().expect("encode_buf is non-empty");
                if is_space_like(last_char) {
                    write_after = Some(last_char);
                } else {
                    self.encode_buf.push(last_char);
                }
            }

            f.write_str("=?utf-8?b?")?;
            let encoded = Base64Display::new(self.encode_buf.as_bytes(), &STANDARD);
            Display::fmt(&encoded, f)?;
            f.write_str("?=")?;

            self.line_len += "=?utf-8?b?".len();
            self.line_len += self.encode_buf.len() * 4 / 3 + 4;
            self.line_len += "?=".len();

            if let Some(write_after) = write_after {
                f.write_char(write_after)?;
                self.line_len += 1;
            }

            self.encode_buf.clear();
        }

        Ok(())
    }

    fn new_line(&mut self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\r\n ")?;
        self.line_len = 1;

        Ok(())
    }
}

/// Iterator over words of a header value, each word keeping the
/// whitespace/comma fill that follows it.
struct WordsPlusFillIterator<'a> {
    s: &'a str,
}

impl<'a> Iterator for WordsPlusFillIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.s.is_empty() {
            return None;
        }

        let next_word = self
            .s
            .char_indices()
            .skip(1)
            .skip_while(|&(_i, c)| !is_space_like(c))
            .find(|&(_i, c)| !is_space_like(c))
            .map(|(i, _)| i);

        let word = &self.s[..next_word.unwrap_or(self.s.len())];
        self.s = &self.s[word.len()..];
        Some(word)
    }
}

fn is_space_like(c: char) -> bool {
    c == ',' || c == ' '
}
