//! Dotted version triples for build-tool and toolset versions.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum CMake version whose File API output this client understands.
pub const MIN_CMAKE_VERSION: ToolVersion = ToolVersion::new(3, 13, 7);

/// Highest CMake version for which the `toolchains` object kind is requested.
///
/// At or below this version the client asks for the full
/// cache + codemodel + toolchains combination. Above it only the simpler
/// cache + codemodel pair is requested and toolchain data is re-derived from
/// the cache when needed.
pub const TOOLCHAINS_MAX_VERSION: ToolVersion = ToolVersion::new(3, 27, 9);

/// A dotted `major.minor.patch` version.
///
/// Ordering is derived from field order, so `3.13.7 < 3.20.0` holds as
/// expected. Trailing suffixes such as `-rc2` or `-g1a2b3c` are ignored when
/// parsing; CMake appends them to development builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// The string did not start with a dotted numeric version.
#[derive(Debug, Error)]
#[error("invalid version string: {0:?}")]
pub struct InvalidVersion(pub String);

impl ToolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ToolVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let mut component = |last: bool| -> Result<u32, InvalidVersion> {
            let part = match parts.next() {
                Some(p) => p,
                None => return Ok(0),
            };
            // The last component may carry a suffix ("7-rc2"): take the
            // leading digit run only.
            let digits = if last {
                let end = part
                    .char_indices()
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(i, _)| i)
                    .unwrap_or(part.len());
                &part[..end]
            } else {
                part
            };
            digits.parse().map_err(|_| InvalidVersion(s.to_string()))
        };

        let major = component(false)?;
        let minor = component(false)?;
        let patch = component(true)?;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let v: ToolVersion = "3.21.4".parse().unwrap();
        assert_eq!(v, ToolVersion::new(3, 21, 4));
    }

    #[test]
    fn test_parse_suffix() {
        let v: ToolVersion = "3.29.0-rc2".parse().unwrap();
        assert_eq!(v, ToolVersion::new(3, 29, 0));
    }

    #[test]
    fn test_parse_short() {
        let v: ToolVersion = "14.29".parse().unwrap();
        assert_eq!(v, ToolVersion::new(14, 29, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<ToolVersion>().is_err());
        assert!("MSVC".parse::<ToolVersion>().is_err());
        assert!("a.b.c".parse::<ToolVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        let old: ToolVersion = "3.13.7".parse().unwrap();
        let new: ToolVersion = "3.20.0".parse().unwrap();
        assert!(old < new);
        assert!(new <= TOOLCHAINS_MAX_VERSION);
        assert!(old >= MIN_CMAKE_VERSION);
    }

    #[test]
    fn test_display_round_trip() {
        let v = ToolVersion::new(14, 29, 30133);
        assert_eq!(v.to_string().parse::<ToolVersion>().unwrap(), v);
    }
}
