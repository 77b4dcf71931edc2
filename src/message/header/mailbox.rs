use super::{Header, HeaderName};
use crate::{
    message::{Mailbox, Mailboxes},
    BoxError,
};

/// Header for a single mailbox, e.g. `Sender`
macro_rules! mailbox_header {
    ($(#[$attr:meta])* Header($type_name: ident, $header_name: expr)) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $type_name(pub Mailbox);

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header_name)
            }

            fn parse(s: &str) -> Result<Self, BoxError> {
                Ok(Self(s.parse()?))
            }

            fn display(&self) -> String {
                self.0.to_string()
            }
        }

        impl std::convert::From<Mailbox> for $type_name {
            fn from(mailbox: Mailbox) -> Self {
                Self(mailbox)
            }
        }

        impl std::convert::From<$type_name> for Mailbox {
            fn from(this: $type_name) -> Mailbox {
                this.0
            }
        }
    };
}

/// Header for a list of mailboxes, e.g. `To`
macro_rules! mailboxes_header {
    ($(#[$attr:meta])* Header($type_name: ident, $header_name: expr)) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $type_name(pub Mailboxes);

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header_name)
            }

            fn parse(s: &str) -> Result<Self, BoxError> {
                Ok(Self(s.parse()?))
            }

            fn display(&self) -> String {
                self.0.to_string()
            }
        }

        impl std::convert::From<Mailboxes> for $type_name {
            fn from(mailboxes: Mailboxes) -> Self {
                Self(mailboxes)
            }
        }

        impl std::convert::From<$type_name> for Mailboxes {
            fn from(this: $type_name) -> Mailboxes {
                this.0
            }
        }
    };
}

mailbox_header! {
    /// `Sender` header
    ///
    /// This header contains [`Mailbox`] associated with sender.
    ///
    /// ```text
    /// header obligatory if the message has several authors
    /// ```
    Header(Sender, "Sender")
}

mailboxes_header! {
    /// `From` header
    ///
    /// This header contains [`Mailboxes`].
    Header(From, "From")
}

mailboxes_header! {
    /// `Reply-To` header
    ///
    /// This header contains [`Mailboxes`].
    Header(ReplyTo, "Reply-To")
}

mailboxes_header! {
    /// `To` header
    ///
    /// This header contains [`Mailboxes`].
    Header(To, "To")
}

mailboxes_header! {
    /// `Cc` header
    ///
    /// This header contains [`Mailboxes`].
    Header(Cc, "Cc")
}

mailboxes_header! {
    /// `Bcc` header
    ///
    /// This header contains [`Mailboxes`].
    Header(Bcc, "Bcc")
}
