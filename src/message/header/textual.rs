//! Headers with free-form textual values

use super::{Header, HeaderName};
use crate::BoxError;

macro_rules! text_header {
    ($(#[$attr:meta])* Header($type_name: ident, $header_name: expr)) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $type_name(String);

        impl $type_name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header_name)
            }

            fn parse(s: &str) -> Result<Self, BoxError> {
                Ok(Self(s.into()))
            }

            fn display(&self) -> String {
                self.0.clone()
            }
        }

        impl From<String> for $type_name {
            fn from(text: String) -> Self {
                Self(text)
            }
        }

        impl AsRef<str> for $type_name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

text_header! {
    /// `Subject` header
    ///
    /// Non-ASCII values are RFC 2047-encoded during serialization.
    Header(Subject, "Subject")
}

text_header! {
    /// `Content-ID` header
    ///
    /// Values are expected in the `<id>` form.
    Header(ContentId, "Content-ID")
}

text_header! {
    /// `Content-Location` header
    Header(ContentLocation, "Content-Location")
}

text_header! {
    /// `Priority` header, `urgent` or `non-urgent`
    Header(Priority, "Priority")
}

text_header! {
    /// `Importance` header, `high` or `low`
    Header(Importance, "Importance")
}

text_header! {
    /// `X-Priority` header, numeric with a label, e.g. `2 (High)`
    Header(XPriority, "X-Priority")
}

text_header! {
    /// `X-MSMail-Priority` header, legacy counterpart of `X-Priority`
    Header(XMSMailPriority, "X-MSMail-Priority")
}
