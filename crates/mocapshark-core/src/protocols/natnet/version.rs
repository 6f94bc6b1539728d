use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Negotiated streaming-protocol version, as announced by the server.
///
/// Ordering is lexicographic over (major, minor, build, revision), which is
/// exactly the tuple ordering the wire format gates optional fields on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub revision: u8,
}

impl ProtocolVersion {
    /// Latest SDK version; used as the default hint before any sender
    /// announcement has been observed.
    pub const DEFAULT: Self = Self::new(2, 7, 0, 0);

    pub const fn new(major: u8, minor: u8, build: u8, revision: u8) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Whether a field group gated at `threshold` (major, minor) is present.
    pub fn at_least(&self, threshold: (u8, u8)) -> bool {
        (self.major, self.minor) >= threshold
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

#[derive(Debug, Error)]
#[error("invalid protocol version '{input}': expected MAJOR.MINOR[.BUILD[.REVISION]]")]
pub struct ParseVersionError {
    input: String,
}

impl FromStr for ProtocolVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError {
            input: s.to_string(),
        };
        let mut parts = s.split('.');
        let mut next = |required: bool| -> Result<Option<u8>, ParseVersionError> {
            match parts.next() {
                Some(part) => part.parse::<u8>().map(Some).map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(None),
            }
        };
        let major = next(true)?.ok_or_else(invalid)?;
        let minor = next(true)?.ok_or_else(invalid)?;
        let build = next(false)?.unwrap_or(0);
        let revision = next(false)?.unwrap_or(0);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(major, minor, build, revision))
    }
}

#[cfg(test)]
mod tests {
    use super::ProtocolVersion;

    #[test]
    fn ordering_is_tuple_ordering() {
        assert!(ProtocolVersion::new(2, 1, 0, 0) > ProtocolVersion::new(2, 0, 9, 9));
        assert!(ProtocolVersion::new(2, 5, 0, 0) > ProtocolVersion::new(1, 9, 0, 0));
    }

    #[test]
    fn at_least_compares_major_minor() {
        let version = ProtocolVersion::new(2, 1, 0, 0);
        assert!(version.at_least((2, 0)));
        assert!(version.at_least((2, 1)));
        assert!(!version.at_least((2, 3)));
    }

    #[test]
    fn at_least_ignores_build_and_revision() {
        let version = ProtocolVersion::new(2, 3, 0, 0);
        assert!(version.at_least((2, 3)));
    }

    #[test]
    fn parse_full_and_short_forms() {
        let full: ProtocolVersion = "2.5.0.0".parse().unwrap();
        assert_eq!(full, ProtocolVersion::new(2, 5, 0, 0));
        let short: ProtocolVersion = "2.5".parse().unwrap();
        assert_eq!(short, full);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<ProtocolVersion>().is_err());
        assert!("2".parse::<ProtocolVersion>().is_err());
        assert!("2.x".parse::<ProtocolVersion>().is_err());
        assert!("2.5.0.0.1".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let version = ProtocolVersion::new(2, 7, 0, 0);
        assert_eq!(version.to_string(), "2.7.0.0");
        assert_eq!(version.to_string().parse::<ProtocolVersion>().unwrap(), version);
    }
}
