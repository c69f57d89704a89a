use crate::core::error::{UpdateError, UpdateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build version in `major.minor[.build[.revision]]` form.
///
/// Release builds are numbered with up to four components (e.g.
/// `0.8.1.2135`). A component that was not written sorts below any written
/// one, so `1.0 < 1.0.0 < 1.0.0.0`. Field order matters: the derived
/// ordering compares major, minor, build, revision in turn and `None`
/// sorts before `Some(_)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    /// Create a version with all four components present
    pub fn full(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build: Some(build),
            revision: Some(revision),
        }
    }

    /// Parse a version string (e.g., "2.1", "2.1.0", "0.8.1.2135")
    ///
    /// Accepts two to four dot-separated non-negative integers, with
    /// surrounding whitespace ignored. Anything else (pre-release tags,
    /// empty components, signs) is rejected.
    pub fn parse(s: &str) -> UpdateResult<Self> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();

        if parts.len() < 2 || parts.len() > 4 {
            return Err(UpdateError::InvalidVersion(format!(
                "Expected 2 to 4 components: {}",
                s
            )));
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(UpdateError::InvalidVersion(format!(
                    "Invalid version component '{}' in {}",
                    part, s
                )));
            }
            let value: u32 = part.parse().map_err(|_| {
                UpdateError::InvalidVersion(format!("Version component out of range: {}", s))
            })?;
            numbers.push(value);
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            build: numbers.get(2).copied(),
            revision: numbers.get(3).copied(),
        })
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_components() {
        let v = Version::parse("2.1").unwrap();
        assert_eq!(v, Version::new(2, 1));
    }

    #[test]
    fn test_parse_four_components() {
        let v = Version::parse("0.8.1.2135").unwrap();
        assert_eq!(v, Version::full(0, 8, 1, 2135));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let v = Version::parse("  2.1.0 ").unwrap();
        assert_eq!(v.to_string(), "2.1.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "", "2", "abc", "1.2.3.4.5", "1..2", "1.2-beta", "v1.2.3", "-1.0", "1.2.x",
        ] {
            assert!(
                matches!(Version::parse(input), Err(UpdateError::InvalidVersion(_))),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(Version::parse("1.99999999999").is_err());
    }

    #[test]
    fn test_missing_components_sort_lower() {
        let two = Version::parse("1.0").unwrap();
        let three = Version::parse("1.0.0").unwrap();
        let four = Version::parse("1.0.0.0").unwrap();
        assert!(two < three);
        assert!(three < four);
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        let a = Version::parse("2.9.0").unwrap();
        let b = Version::parse("2.10.0").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_revision_breaks_ties() {
        let a = Version::parse("0.8.1.2135").unwrap();
        let b = Version::parse("0.8.1.2136").unwrap();
        assert!(a < b);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["2.1", "2.1.0", "10.0.0.4520"] {
            assert_eq!(Version::parse(input).unwrap().to_string(), input);
        }
    }
}
