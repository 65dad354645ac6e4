//! Filter parsing
//!
//! Parses JSON filter documents into a `FilterCollection` with validation.
//!
//! ```json
//! {
//!   "identity": {"session": {"mode": "include", "set": ["s1", "s2"]}},
//!   "sequencing": {"timestamp": {"min": "2024-01-01T00:00:00Z"}},
//!   "versions": {"app_version": {"mode": "exclude", "max": "1.4"}}
//! }
//! ```
//!
//! A filter object carries either `set` or `min`/`max`, never both. An object
//! with neither is `NoFilter`.

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::constants::{MAX_FILTER_ELEMENTS, MAX_FILTER_JSON_SIZE};
use crate::error::FilterParseError;

use super::collection::FilterCollection;
use super::types::{Filter, FilterMode, SetFilter};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilter<T> {
    #[serde(default)]
    mode: FilterMode,
    set: Option<Vec<T>>,
    min: Option<T>,
    max: Option<T>,
}

impl<T: Ord> RawFilter<T> {
    fn into_filter(self) -> Result<Filter<T>, &'static str> {
        match self.set {
            Some(_) if self.min.is_some() || self.max.is_some() => {
                Err("filter cannot combine 'set' with 'min'/'max'")
            }
            Some(elements) => Ok(Filter::Set(SetFilter::new(self.mode, elements))),
            None => Ok(Filter::range(self.mode, self.min, self.max)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Filter<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawFilter::<T>::deserialize(deserializer)?
            .into_filter()
            .map_err(de::Error::custom)
    }
}

/// Parse a filter collection from JSON
///
/// Validates document size, element count and field/shape combinations.
pub fn parse_filter_collection(json_str: &str) -> Result<FilterCollection, FilterParseError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(FilterParseError::TooLarge {
            limit: MAX_FILTER_JSON_SIZE,
        });
    }

    let collection: FilterCollection = serde_json::from_str(json_str)?;

    let count = collection.element_count();
    if count > MAX_FILTER_ELEMENTS {
        return Err(FilterParseError::TooManyElements {
            count,
            limit: MAX_FILTER_ELEMENTS,
        });
    }

    collection.validate()?;
    tracing::debug!(
        active = ?collection.active_fields(),
        elements = count,
        "Parsed filter collection"
    );
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::filters::{FilterField, RangeFilter, Version};

    #[test]
    fn parse_identity_sets() {
        let json = r#"{
            "identity": {
                "session": {"mode": "include", "set": ["1", "2", "3"]},
                "player": {"mode": "exclude", "set": ["a", "b", "c"]}
            }
        }"#;
        let collection = parse_filter_collection(json).unwrap();
        assert_eq!(
            collection.identity.session,
            Filter::include(["1", "2", "3"].map(String::from))
        );
        assert_eq!(
            collection.identity.player,
            Filter::exclude(["a", "b", "c"].map(String::from))
        );
    }

    #[test]
    fn parse_mode_defaults_to_include() {
        let json = r#"{"events": {"event_code": {"set": [1, 2]}}}"#;
        let collection = parse_filter_collection(json).unwrap();
        assert_eq!(collection.events.event_code, Filter::include([1, 2]));
    }

    #[test]
    fn parse_ranges() {
        let json = r#"{
            "sequencing": {
                "timestamp": {"mode": "exclude", "min": "2024-01-01T00:00:00Z"},
                "sessionIndex": {"min": 2, "max": 5}
            },
            "versions": {"app_version": {"max": "1.4"}}
        }"#;
        let collection = parse_filter_collection(json).unwrap();
        let jan1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            collection.sequencing.timestamp,
            Filter::Range(RangeFilter::exclude(Some(jan1), None))
        );
        assert_eq!(collection.sequencing.session_index, Filter::between(2, 5));
        assert_eq!(
            collection.versions.app_version,
            Filter::Range(RangeFilter::include(None, Some(Version::parse("1.4"))))
        );
    }

    #[test]
    fn parse_empty_object_is_no_filter() {
        let json = r#"{"identity": {"session": {"mode": "exclude"}}}"#;
        let collection = parse_filter_collection(json).unwrap();
        assert_eq!(collection.identity.session, Filter::NoFilter);
        assert!(collection.is_empty());
    }

    #[test]
    fn parse_rejects_set_mixed_with_range() {
        let json = r#"{"events": {"event_code": {"set": [1], "min": 0}}}"#;
        let err = parse_filter_collection(json).unwrap_err();
        assert!(matches!(err, FilterParseError::Json(_)));
        assert!(err.to_string().contains("cannot combine"));
    }

    #[test]
    fn parse_rejects_disallowed_shape() {
        let json = r#"{"identity": {"player": {"min": "a"}}}"#;
        let err = parse_filter_collection(json).unwrap_err();
        assert!(matches!(
            err,
            FilterParseError::Contradiction(crate::error::CompileError::ShapeNotAllowed {
                field: FilterField::Player,
                ..
            })
        ));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert!(parse_filter_collection(r#"{"identity": {"sesion": {}}}"#).is_err());
        assert!(parse_filter_collection(r#"{"identity": {"session": {"sett": []}}}"#).is_err());
    }

    #[test]
    fn parse_rejects_too_large() {
        let big = format!(r#"{{"identity": {{"session": {{"set": ["{}"]}}}}}}"#, "x".repeat(MAX_FILTER_JSON_SIZE));
        let err = parse_filter_collection(&big).unwrap_err();
        assert!(matches!(err, FilterParseError::TooLarge { .. }));
    }

    #[test]
    fn parse_rejects_too_many_elements() {
        let codes: Vec<String> = (0..=MAX_FILTER_ELEMENTS).map(|i| i.to_string()).collect();
        let json = format!(r#"{{"events": {{"event_code": {{"set": [{}]}}}}}}"#, codes.join(","));
        let err = parse_filter_collection(&json).unwrap_err();
        assert!(matches!(err, FilterParseError::TooManyElements { .. }));
    }

    #[test]
    fn parse_invalid_json() {
        assert!(matches!(
            parse_filter_collection("not valid json"),
            Err(FilterParseError::Json(_))
        ));
    }
}
