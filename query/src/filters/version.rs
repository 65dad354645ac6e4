//! Version values for log/app version filters
//!
//! Versions are parsed leniently into `semver::Version`: a leading `v` is
//! dropped and missing minor/patch components are zero, so `"2.1"` orders as
//! `2.1.0`. Anything that still fails to parse is kept as opaque text and
//! orders after every semantic version. The original text is what gets
//! displayed and bound as a query parameter, so two spellings of the same
//! semantic version (`1.0`, `1.0.0`) are distinct values ordered by their text.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parsed: Option<semver::Version>,
}

impl Version {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            raw: raw.to_string(),
            parsed: parse_lenient(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Semantic form, if the text could be read as one
    pub fn semver(&self) -> Option<&semver::Version> {
        self.parsed.as_ref()
    }
}

fn parse_lenient(raw: &str) -> Option<semver::Version> {
    let body = raw.strip_prefix(['v', 'V']).unwrap_or(raw);
    if let Ok(version) = semver::Version::parse(body) {
        return Some(version);
    }

    let split_at = body.find(['-', '+']).unwrap_or(body.len());
    let (core, suffix) = body.split_at(split_at);
    let parts = core
        .split('.')
        .map(|p| p.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let get = |i: usize| parts.get(i).copied().unwrap_or(0);
    semver::Version::parse(&format!("{}.{}.{}{}", get(0), get(1), get(2), suffix)).ok()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a.cmp(b).then_with(|| self.raw.cmp(&other.raw)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.raw.cmp(&other.raw),
        }
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

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Accepts strings and bare numbers (`3`, `2.1`)
impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a version string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Version, E> {
                Ok(Version::parse(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Version, E> {
                Ok(Version::parse(&v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Version, E> {
                Ok(Version::parse(&v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Version, E> {
                Ok(Version::parse(&v.to_string()))
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(Version::parse("2.1").semver(), Some(&semver::Version::new(2, 1, 0)));
        assert_eq!(Version::parse("v3").semver(), Some(&semver::Version::new(3, 0, 0)));
        assert_eq!(
            Version::parse("1.2-beta").semver().map(|v| v.pre.as_str()),
            Some("beta")
        );
        assert!(Version::parse("1.2.3.4").semver().is_none());
        assert!(Version::parse("nightly").semver().is_none());
    }

    #[test]
    fn test_ordering_is_semantic() {
        assert!(Version::parse("1.10") > Version::parse("1.9"));
        assert!(Version::parse("2.0.0-rc.1") < Version::parse("2.0.0"));
        assert!(Version::parse("1.0") < Version::parse("1.0.1"));
    }

    #[test]
    fn test_spellings_stay_distinct() {
        let short = Version::parse("1.0");
        let long = Version::parse("1.0.0");
        assert_eq!(short.semver(), long.semver());
        assert_ne!(short, long);
        assert!(short < long);
        assert!(long < Version::parse("1.0.1"));

        let set: std::collections::BTreeSet<_> = [short, long].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_opaque_sorts_last() {
        assert!(Version::parse("nightly") > Version::parse("999.0"));
        assert!(Version::parse("alpha") < Version::parse("beta"));
    }

    #[test]
    fn test_keeps_original_text() {
        let v = Version::parse(" v2.1 ");
        assert_eq!(v.as_str(), "v2.1");
        assert_eq!(v.to_string(), "v2.1");
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let v: Version = serde_json::from_str(r#""1.4.2""#).unwrap();
        assert_eq!(v.semver(), Some(&semver::Version::new(1, 4, 2)));
        let v: Version = serde_json::from_str("3").unwrap();
        assert_eq!(v.semver(), Some(&semver::Version::new(3, 0, 0)));
        let v: Version = serde_json::from_str("2.5").unwrap();
        assert_eq!(v.semver(), Some(&semver::Version::new(2, 5, 0)));
    }
}
