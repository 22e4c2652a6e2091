// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Library version parsing and half-open version ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A `major.minor.patch` library version.
///
/// Parsing is lenient the way installed package versions need it to be:
/// only the leading digits of each component count, and missing components
/// default to zero, so `"3"`, `"3.2"` and `"3.2.0rc1"` all parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string such as `"3.1.2"` or `"2.0"`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        let input = input.strip_prefix('v').unwrap_or(input);
        if input.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = input.split('.').map(leading_number);
        let major = parts
            .next()
            .flatten()
            .ok_or_else(|| VersionError::Invalid(input.to_string()))?;
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);

        Ok(Self::new(major, minor, patch))
    }
}

fn leading_number(component: &str) -> Option<u64> {
    let end = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    component[..end].parse().ok()
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A half-open `[min, max)` version range. `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub min: Option<Version>,
    pub max: Option<Version>,
}

impl VersionRange {
    /// Every version.
    pub const ANY: Self = Self {
        min: None,
        max: None,
    };

    pub const fn new(min: Option<Version>, max: Option<Version>) -> Self {
        Self { min, max }
    }

    /// `[min, max)`.
    pub const fn between(min: Version, max: Version) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// `[min, ∞)`.
    pub const fn at_least(min: Version) -> Self {
        Self::new(Some(min), None)
    }

    /// `(-∞, max)`.
    pub const fn below(max: Version) -> Self {
        Self::new(None, Some(max))
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.min.map_or(true, |min| *version >= min) && self.max.map_or(true, |max| *version < max)
    }

    /// Whether the two ranges share at least one version.
    pub fn overlaps(&self, other: &Self) -> bool {
        let starts_before_other_ends = match (self.min, other.max) {
            (Some(min), Some(max)) => min < max,
            _ => true,
        };
        let other_starts_before_end = match (other.min, self.max) {
            (Some(min), Some(max)) => min < max,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min {
            Some(min) => write!(f, "[{}, ", min)?,
            None => write!(f, "(-inf, ")?,
        }
        match self.max {
            Some(max) => write!(f, "{})", max),
            None => write!(f, "inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        assert_eq!(Version::parse("3.1.2").unwrap(), Version::new(3, 1, 2));
    }

    #[test]
    fn test_parse_partial() {
        assert_eq!(Version::parse("2.0").unwrap(), Version::new(2, 0, 0));
        assert_eq!(Version::parse("3").unwrap(), Version::new(3, 0, 0));
        assert_eq!(Version::parse("v3.2").unwrap(), Version::new(3, 2, 0));
    }

    #[test]
    fn test_parse_prerelease_suffix() {
        assert_eq!(Version::parse("3.2.0rc1").unwrap(), Version::new(3, 2, 0));
        assert_eq!(Version::parse("3.1b2").unwrap(), Version::new(3, 1, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Version::parse(""), Err(VersionError::Empty));
        assert!(matches!(Version::parse("abc"), Err(VersionError::Invalid(_))));
    }

    #[test]
    fn test_ordering() {
        assert!(Version::new(2, 1, 0) < Version::new(3, 0, 0));
        assert!(Version::new(3, 1, 9) < Version::new(3, 2, 0));
    }

    #[test]
    fn test_range_contains_is_half_open() {
        let range = VersionRange::between(Version::new(2, 1, 0), Version::new(3, 0, 0));
        assert!(range.contains(&Version::new(2, 1, 0)));
        assert!(range.contains(&Version::new(2, 9, 9)));
        assert!(!range.contains(&Version::new(3, 0, 0)));
        assert!(!range.contains(&Version::new(2, 0, 5)));
    }

    #[test]
    fn test_range_unbounded() {
        assert!(VersionRange::ANY.contains(&Version::new(0, 0, 1)));
        assert!(VersionRange::at_least(Version::new(3, 2, 0)).contains(&Version::new(9, 0, 0)));
        assert!(!VersionRange::below(Version::new(3, 0, 0)).contains(&Version::new(3, 0, 0)));
    }

    #[test]
    fn test_range_overlaps() {
        let v2 = Version::new(2, 0, 0);
        let v3 = Version::new(3, 0, 0);
        let v4 = Version::new(4, 0, 0);
        assert!(!VersionRange::between(v2, v3).overlaps(&VersionRange::between(v3, v4)));
        assert!(VersionRange::between(v2, v4).overlaps(&VersionRange::between(v3, v4)));
        assert!(VersionRange::at_least(v3).overlaps(&VersionRange::below(v4)));
        assert!(!VersionRange::below(v3).overlaps(&VersionRange::at_least(v3)));
    }

    #[test]
    fn test_range_display() {
        let range = VersionRange::at_least(Version::new(3, 0, 0));
        assert_eq!(range.to_string(), "[3.0.0, inf)");
    }
}
