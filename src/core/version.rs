//! core::version
//!
//! Dotted version identifiers and range predicates.
//!
//! # Types
//!
//! - [`Version`] - An ordered sequence of non-negative integer segments
//! - [`VersionRange`] - A comparison predicate over versions (`<`, `<=`, `>`, `>=`, `==`)
//!
//! # Ordering
//!
//! Versions compare segment-wise from the left, numerically, with missing
//! trailing segments treated as zero. Segment count is not fixed:
//! `0.14.2` and `0.14.2.0` are equal, and `0.10` is greater than `0.9`
//! (lexical string comparison would get that one wrong).
//!
//! # Validation
//!
//! A version string is parsed strictly: at least one segment, every segment
//! a run of ASCII digits. Anything else is a hard error, never a silent
//! fallback.
//!
//! # Example
//!
//! ```
//! use carryover::core::version::{Version, VersionRange};
//!
//! let a = Version::parse("0.14.2").unwrap();
//! let b = Version::parse("0.14.2.0").unwrap();
//! assert_eq!(a, b);
//! assert!(Version::parse("0.10").unwrap() > Version::parse("0.9").unwrap());
//!
//! let range = VersionRange::parse(">=0.14.2").unwrap();
//! assert!(range.matches(&Version::parse("0.15.0").unwrap()));
//! assert!(!range.matches(&Version::parse("0.13.3.2").unwrap()));
//! ```

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version string is empty")]
    Empty,

    #[error("version '{version}' contains an empty segment")]
    EmptySegment { version: String },

    #[error("version '{version}' segment '{segment}' is not a non-negative integer")]
    BadSegment { version: String, segment: String },

    #[error("range '{input}' must start with one of <=, >=, ==, <, >")]
    BadOperator { input: String },
}

/// A dot-delimited version identifier with a variable number of segments.
///
/// Equality and ordering use zero-padded segment comparison, so values that
/// differ only in trailing zero segments are equal.
///
/// # Example
///
/// ```
/// use carryover::core::version::Version;
///
/// let v = Version::parse("0.15.4.1").unwrap();
/// assert_eq!(v.to_string(), "0.15.4.1");
/// assert_eq!(v.segments(), &[0, 15, 4, 1]);
///
/// assert!(Version::parse("").is_err());
/// assert!(Version::parse("0..1").is_err());
/// assert!(Version::parse("0.x.1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Parse a version from its dotted string form.
    ///
    /// # Errors
    ///
    /// Returns a [`VersionError`] if the string is empty, has an empty
    /// segment, or has a segment that is not a run of ASCII digits.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut segments = Vec::new();
        for segment in input.split('.') {
            if segment.is_empty() {
                return Err(VersionError::EmptySegment {
                    version: input.to_string(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::BadSegment {
                    version: input.to_string(),
                    segment: segment.to_string(),
                });
            }
            let value = segment.parse::<u64>().map_err(|_| VersionError::BadSegment {
                version: input.to_string(),
                segment: segment.to_string(),
            })?;
            segments.push(value);
        }

        Ok(Self { segments })
    }

    /// Build a version directly from integer segments.
    ///
    /// An empty segment list is normalized to the single segment `0`.
    pub fn from_segments(segments: impl Into<Vec<u64>>) -> Self {
        let mut segments = segments.into();
        if segments.is_empty() {
            segments.push(0);
        }
        Self { segments }
    }

    /// The integer segments, as parsed (trailing zeros are preserved).
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Segments with trailing zeros removed; the canonical form used for
    /// equality and hashing.
    fn trimmed(&self) -> &[u64] {
        let mut len = self.segments.len();
        while len > 0 && self.segments[len - 1] == 0 {
            len -= 1;
        }
        &self.segments[..len]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.segments.len().max(other.segments.len());
        for i in 0..width {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with Eq: "0.14.2" and "0.14.2.0" hash identically.
        self.trimmed().hash(state);
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

/// A predicate over [`Version`] built from a single comparison operator.
///
/// # Example
///
/// ```
/// use carryover::core::version::{Version, VersionRange};
///
/// let below = VersionRange::parse("<0.14.2").unwrap();
/// assert!(below.matches(&Version::parse("0.13.3.2").unwrap()));
/// assert!(!below.matches(&Version::parse("0.14.2.0").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Strictly below the bound.
    Less(Version),
    /// At or below the bound.
    AtMost(Version),
    /// Strictly above the bound.
    Greater(Version),
    /// At or above the bound.
    AtLeast(Version),
    /// Equal to the bound (under zero-padded comparison).
    Exactly(Version),
}

impl VersionRange {
    /// Parse a range from an operator-prefixed version string.
    ///
    /// Accepted forms: `<v`, `<=v`, `>v`, `>=v`, `==v`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.trim();
        if let Some(rest) = input.strip_prefix("<=") {
            return Ok(VersionRange::AtMost(Version::parse(rest)?));
        }
        if let Some(rest) = input.strip_prefix(">=") {
            return Ok(VersionRange::AtLeast(Version::parse(rest)?));
        }
        if let Some(rest) = input.strip_prefix("==") {
            return Ok(VersionRange::Exactly(Version::parse(rest)?));
        }
        if let Some(rest) = input.strip_prefix('<') {
            return Ok(VersionRange::Less(Version::parse(rest)?));
        }
        if let Some(rest) = input.strip_prefix('>') {
            return Ok(VersionRange::Greater(Version::parse(rest)?));
        }
        Err(VersionError::BadOperator {
            input: input.to_string(),
        })
    }

    /// Test whether a version falls inside this range.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionRange::Less(bound) => version < bound,
            VersionRange::AtMost(bound) => version <= bound,
            VersionRange::Greater(bound) => version > bound,
            VersionRange::AtLeast(bound) => version >= bound,
            VersionRange::Exactly(bound) => version == bound,
        }
    }

    /// The version the range compares against.
    pub fn bound(&self) -> &Version {
        match self {
            VersionRange::Less(bound)
            | VersionRange::AtMost(bound)
            | VersionRange::Greater(bound)
            | VersionRange::AtLeast(bound)
            | VersionRange::Exactly(bound) => bound,
        }
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionRange::Less(bound) => write!(f, "<{}", bound),
            VersionRange::AtMost(bound) => write!(f, "<={}", bound),
            VersionRange::Greater(bound) => write!(f, ">{}", bound),
            VersionRange::AtLeast(bound) => write!(f, ">={}", bound),
            VersionRange::Exactly(bound) => write!(f, "=={}", bound),
        }
    }
}
