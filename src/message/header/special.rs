use super::{Header, HeaderName};
use crate::BoxError;

/// `MIME-Version` of the message, always `1.0` in practice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeVersion {
    major: u8,
    minor: u8,
}

/// `MIME-Version: 1.0`
pub const MIME_VERSION_1_0: MimeVersion = MimeVersion::new(1, 0);

impl MimeVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        MimeVersion { major, minor }
    }

    pub const fn major(self) -> u8 {
        self.major
    }

    pub const fn minor(self) -> u8 {
        self.minor
    }
}

impl Header for MimeVersion {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("MIME-Version")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        let (major, minor) = s.split_once('.').ok_or("invalid MIME-Version")?;
        let major = major.parse()?;
        let minor = minor.parse()?;
        Ok(MimeVersion::new(major, minor))
    }

    fn display(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}
