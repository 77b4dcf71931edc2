use std::{
    fmt::{self, Display, Formatter, Write},
    slice::Iter,
    str::FromStr,
};

use crate::address::{Address, AddressError};

/// Represents an email address with an optional name for the sender/recipient.
///
/// # Examples
///
/// ```
/// use flatmail::message::Mailbox;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mailbox: Mailbox = "John Smith <example@email.com>".parse()?;
/// assert_eq!(mailbox.name.as_deref(), Some("John Smith"));
/// assert_eq!(mailbox.email.to_string(), "example@email.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// The name associated with the address.
    pub name: Option<String>,

    /// The email address itself.
    pub email: Address,
}

impl Mailbox {
    /// Creates a new `Mailbox` using an email address and the name of the recipient if there is one.
    pub fn new(name: Option<String>, email: Address) -> Self {
        Mailbox { name, email }
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            let name = name.trim();
            if !name.is_empty() {
                write_word(f, name)?;
                f.write_str(" <")?;
                self.email.fmt(f)?;
                return f.write_char('>');
            }
        }
        self.email.fmt(f)
    }
}

impl FromStr for Mailbox {
    type Err = AddressError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.trim();

        match src.rfind('<') {
            Some(addr_open) => {
                let addr_close = src.rfind('>').ok_or(AddressError::InvalidInput)?;
                if addr_close + 1 != src.len() || addr_close < addr_open {
                    return Err(AddressError::InvalidInput);
                }

                let email = src[addr_open + 1..addr_close].trim().parse()?;
                let name = parse_display_name(src[..addr_open].trim())?;
                Ok(Mailbox::new(name, email))
            }
            None => Ok(Mailbox::new(None, src.parse()?)),
        }
    }
}

impl From<Address> for Mailbox {
    fn from(email: Address) -> Self {
        Mailbox::new(None, email)
    }
}

/// Represents a sequence of [`Mailbox`] instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mailboxes(Vec<Mailbox>);

impl Mailboxes {
    /// Creates a new, empty list of [`Mailbox`] instances.
    pub fn new() -> Self {
        Mailboxes(Vec::new())
    }

    /// Adds a new [`Mailbox`], consuming the existing list.
    pub fn with(mut self, mbox: Mailbox) -> Self {
        self.0.push(mbox);
        self
    }

    /// Adds a new [`Mailbox`] to the list.
    pub fn push(&mut self, mbox: Mailbox) {
        self.0.push(mbox);
    }

    /// Whether the list contains no mailboxes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extracts the first [`Mailbox`], if there is one.
    pub fn into_single(self) -> Option<Mailbox> {
        self.into_iter().next()
    }

    /// Creates an iterator over the [`Mailbox`] instances.
    pub fn iter(&self) -> Iter<'_, Mailbox> {
        self.0.iter()
    }
}

impl From<Mailbox> for Mailboxes {
    fn from(single: Mailbox) -> Self {
        Mailboxes(vec![single])
    }
}

impl From<Vec<Mailbox>> for Mailboxes {
    fn from(list: Vec<Mailbox>) -> Self {
        Mailboxes(list)
    }
}

impl From<Mailboxes> for Vec<Mailbox> {
    fn from(mailboxes: Mailboxes) -> Self {
        mailboxes.0
    }
}

impl FromIterator<Mailbox> for Mailboxes {
    fn from_iter<T: IntoIterator<Item = Mailbox>>(iter: T) -> Self {
        Mailboxes(iter.into_iter().collect())
    }
}

impl Extend<Mailbox> for Mailboxes {
    fn extend<T: IntoIterator<Item = Mailbox>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Mailboxes {
    type Item = Mailbox;
    type IntoIter = std::vec::IntoIter<Mailbox>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mailboxes {
    type Item = &'a Mailbox;
    type IntoIter = Iter<'a, Mailbox>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Mailboxes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();

        if let Some(mbox) = iter.next() {
            mbox.fmt(f)?;

            for mbox in iter {
                f.write_str(", ")?;
                mbox.fmt(f)?;
            }
        }

        Ok(())
    }
}

impl FromStr for Mailboxes {
    type Err = AddressError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if src.trim().is_empty() {
            return Ok(Mailboxes::new());
        }

        split_outside_quotes(src)
            .map(|segment| segment.parse())
            .collect()
    }
}

/// Splits a mailbox list on commas that sit outside double-quoted strings.
fn split_outside_quotes(src: &str) -> impl Iterator<Item = &str> {
    let mut in_quotes = false;
    let mut escaped = false;

    SplitOn::new(src, move |c| {
        if escaped {
            escaped = false;
            return false;
        }
        match c {
            '\\' if in_quotes => {
                escaped = true;
                false
            }
            '"' => {
                in_quotes = !in_quotes;
                false
            }
            ',' => !in_quotes,
            _ => false,
        }
    })
}

struct SplitOn<'a, F> {
    rest: Option<&'a str>,
    is_separator: F,
}

impl<'a, F: FnMut(char) -> bool> SplitOn<'a, F> {
    fn new(src: &'a str, is_separator: F) -> Self {
        Self {
            rest: Some(src),
            is_separator,
        }
    }
}

impl<'a, F: FnMut(char) -> bool> Iterator for SplitOn<'a, F> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;

        for (i, c) in rest.char_indices() {
            if (self.is_separator)(c) {
                self.rest = Some(&rest[i + c.len_utf8()..]);
                return Some(&rest[..i]);
            }
        }

        self.rest = None;
        Some(rest)
    }
}

fn parse_display_name(name: &str) -> Result<Option<String>, AddressError> {
    if name.is_empty() {
        return Ok(None);
    }

    let unquoted = match name.strip_prefix('"') {
        Some(quoted) => {
            let quoted = quoted.strip_suffix('"').ok_or(AddressError::InvalidInput)?;

            let mut out = String::with_capacity(quoted.len());
            let mut escaped = false;
            for c in quoted.chars() {
                if escaped {
                    out.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    return Err(AddressError::InvalidInput);
                } else {
                    out.push(c);
                }
            }
            if escaped {
                return Err(AddressError::InvalidInput);
            }
            out
        }
        None => name.to_owned(),
    };

    Ok(Some(unquoted))
}

fn write_word(f: &mut Formatter<'_>, word: &str) -> fmt::Result {
    if word.chars().all(is_valid_atom_char) && !word.is_empty() {
        f.write_str(word)
    } else {
        f.write_char('"')?;
        for c in word.chars() {
            write_quoted_string_char(f, c)?;
        }
        f.write_char('"')
    }
}

fn is_valid_atom_char(c: char) -> bool {
    // RFC5322 atext, plus everything outside ASCII since non-ASCII words
    // get RFC2047-encoded downstream
    c.is_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

fn write_quoted_string_char(f: &mut Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '"' | '\\' => {
            f.write_char('\\')?;
            f.write_char(c)
        }
        _ => f.write_char(c),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Mailbox, Mailboxes};

    #[test]
    fn mailbox_format_address_only() {
        assert_eq!(
            Mailbox::new(None, "kayo@example.com".parse().unwrap()).to_string(),
            "kayo@example.com"
        );
    }

    #[test]
    fn mailbox_format_address_with_name() {
        assert_eq!(
            Mailbox::new(Some("K".into()), "kayo@example.com".parse().unwrap()).to_string(),
            "K <kayo@example.com>"
        );
    }

    #[test]
    fn mailbox_format_address_with_comma() {
        assert_eq!(
            Mailbox::new(
                Some("Last, First".into()),
                "kayo@example.com".parse().unwrap()
            )
            .to_string(),
            r#""Last, First" <kayo@example.com>"#
        );
    }

    #[test]
    fn mailbox_format_address_with_quotes() {
        assert_eq!(
            Mailbox::new(
                Some(r#"First "Nickname" Last"#.into()),
                "kayo@example.com".parse().unwrap()
            )
            .to_string(),
            r#""First \"Nickname\" Last" <kayo@example.com>"#
        );
    }

    #[test]
    fn parse_address_only() {
        let mbox: Mailbox = "kayo@example.com".parse().unwrap();
        assert_eq!(mbox, Mailbox::new(None, "kayo@example.com".parse().unwrap()));
    }

    #[test]
    fn parse_bracketed_address() {
        let mbox: Mailbox = "<kayo@example.com>".parse().unwrap();
        assert_eq!(mbox, Mailbox::new(None, "kayo@example.com".parse().unwrap()));
    }

    #[test]
    fn parse_address_with_name() {
        let mbox: Mailbox = "K <kayo@example.com>".parse().unwrap();
        assert_eq!(
            mbox,
            Mailbox::new(Some("K".into()), "kayo@example.com".parse().unwrap())
        );
    }

    #[test]
    fn parse_address_with_quoted_name() {
        let mbox: Mailbox = r#""Last, First" <kayo@example.com>"#.parse().unwrap();
        assert_eq!(
            mbox,
            Mailbox::new(
                Some("Last, First".into()),
                "kayo@example.com".parse().unwrap()
            )
        );
    }

    #[test]
    fn parse_unbalanced_angle_brackets() {
        assert!("Name <kayo@example.com".parse::<Mailbox>().is_err());
        assert!("Name kayo@example.com>".parse::<Mailbox>().is_err());
    }

    #[test]
    fn parse_list() {
        let mboxes: Mailboxes = "kayo@example.com, K <kayo2@example.com>".parse().unwrap();
        assert_eq!(
            mboxes,
            Mailboxes::new()
                .with(Mailbox::new(None, "kayo@example.com".parse().unwrap()))
                .with(Mailbox::new(
                    Some("K".into()),
                    "kayo2@example.com".parse().unwrap()
                ))
        );
    }

    #[test]
    fn parse_list_with_quoted_comma() {
        let mboxes: Mailboxes = r#""Last, First" <kayo@example.com>, pony@domain.tld"#
            .parse()
            .unwrap();
        assert_eq!(
            mboxes,
            Mailboxes::new()
                .with(Mailbox::new(
                    Some("Last, First".into()),
                    "kayo@example.com".parse().unwrap()
                ))
                .with(Mailbox::new(None, "pony@domain.tld".parse().unwrap()))
        );
    }

    #[test]
    fn into_single_takes_the_first() {
        let mboxes = Mailboxes::new()
            .with(Mailbox::new(None, "kayo@example.com".parse().unwrap()))
            .with(Mailbox::new(None, "pony@domain.tld".parse().unwrap()));

        assert_eq!(
            mboxes.into_single(),
            Some(Mailbox::new(None, "kayo@example.com".parse().unwrap()))
        );
        assert_eq!(Mailboxes::new().into_single(), None);
    }

    #[test]
    fn roundtrip_list() {
        let mboxes = Mailboxes::new()
            .with(Mailbox::new(
                Some("Last, First".into()),
                "kayo@example.com".parse().unwrap(),
            ))
            .with(Mailbox::new(None, "pony@domain.tld".parse().unwrap()));

        let parsed: Mailboxes = mboxes.to_string().parse().unwrap();
        assert_eq!(parsed, mboxes);
    }
}
