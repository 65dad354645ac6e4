//! Filter type definitions
//!
//! A `Filter` is one inclusion/exclusion predicate over a single value domain.
//! Evaluation here is the reference every backend compiler is tested against.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether matching the payload keeps or removes a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

impl FilterMode {
    pub fn is_exclude(&self) -> bool {
        matches!(self, FilterMode::Exclude)
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Include => f.write_str("include"),
            FilterMode::Exclude => f.write_str("exclude"),
        }
    }
}

/// Payload shape of a non-trivial filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterShape {
    Set,
    Range,
}

impl FilterShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterShape::Set => "set",
            FilterShape::Range => "range",
        }
    }
}

/// Set membership. An empty set matches nothing under INCLUDE and everything
/// under EXCLUDE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFilter<T> {
    pub mode: FilterMode,
    pub elements: BTreeSet<T>,
}

impl<T: Ord> SetFilter<T> {
    pub fn new(mode: FilterMode, elements: impl IntoIterator<Item = T>) -> Self {
        Self {
            mode,
            elements: elements.into_iter().collect(),
        }
    }

    pub fn include(elements: impl IntoIterator<Item = T>) -> Self {
        Self::new(FilterMode::Include, elements)
    }

    pub fn exclude(elements: impl IntoIterator<Item = T>) -> Self {
        Self::new(FilterMode::Exclude, elements)
    }

    pub fn is_satisfied_by(&self, value: &T) -> bool {
        self.elements.contains(value) != self.mode.is_exclude()
    }
}

/// Ordered range with optional bounds.
///
/// Bounds are inclusive under INCLUDE; EXCLUDE is the exact complement. A
/// range with neither bound is equivalent to `Filter::NoFilter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter<T> {
    pub mode: FilterMode,
    pub minimum: Option<T>,
    pub maximum: Option<T>,
}

impl<T: Ord> RangeFilter<T> {
    pub fn new(mode: FilterMode, minimum: Option<T>, maximum: Option<T>) -> Self {
        Self {
            mode,
            minimum,
            maximum,
        }
    }

    pub fn include(minimum: Option<T>, maximum: Option<T>) -> Self {
        Self::new(FilterMode::Include, minimum, maximum)
    }

    pub fn exclude(minimum: Option<T>, maximum: Option<T>) -> Self {
        Self::new(FilterMode::Exclude, minimum, maximum)
    }

    pub fn is_unbounded(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none()
    }

    /// True when both bounds are present and the minimum exceeds the maximum
    pub fn is_inverted(&self) -> bool {
        matches!((&self.minimum, &self.maximum), (Some(min), Some(max)) if min > max)
    }

    pub fn is_satisfied_by(&self, value: &T) -> bool {
        let exclude = self.mode.is_exclude();
        match (&self.minimum, &self.maximum) {
            (None, None) => true,
            (Some(min), Some(max)) => (min <= value && value <= max) != exclude,
            (Some(min), None) => (value >= min) != exclude,
            (None, Some(max)) => (value <= max) != exclude,
        }
    }
}

/// A single predicate variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    NoFilter,
    Set(SetFilter<T>),
    Range(RangeFilter<T>),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::NoFilter
    }
}

impl<T: Ord> Filter<T> {
    pub fn include(elements: impl IntoIterator<Item = T>) -> Self {
        Filter::Set(SetFilter::include(elements))
    }

    pub fn exclude(elements: impl IntoIterator<Item = T>) -> Self {
        Filter::Set(SetFilter::exclude(elements))
    }

    /// Range filter; both bounds absent collapses to `NoFilter`
    pub fn range(mode: FilterMode, minimum: Option<T>, maximum: Option<T>) -> Self {
        if minimum.is_none() && maximum.is_none() {
            return Filter::NoFilter;
        }
        Filter::Range(RangeFilter::new(mode, minimum, maximum))
    }

    pub fn between(minimum: T, maximum: T) -> Self {
        Self::range(FilterMode::Include, Some(minimum), Some(maximum))
    }

    pub fn is_satisfied_by(&self, value: &T) -> bool {
        match self {
            Filter::NoFilter => true,
            Filter::Set(set) => set.is_satisfied_by(value),
            Filter::Range(range) => range.is_satisfied_by(value),
        }
    }

    /// Matches every value, so it contributes nothing to a query.
    ///
    /// An empty INCLUDE set is not trivial: it matches nothing.
    pub fn is_trivial(&self) -> bool {
        match self {
            Filter::NoFilter => true,
            Filter::Set(set) => set.mode.is_exclude() && set.elements.is_empty(),
            Filter::Range(range) => range.is_unbounded(),
        }
    }

    /// Payload shape, `None` for `NoFilter` and unbounded ranges
    pub fn shape(&self) -> Option<FilterShape> {
        match self {
            Filter::NoFilter => None,
            Filter::Set(_) => Some(FilterShape::Set),
            Filter::Range(range) if range.is_unbounded() => None,
            Filter::Range(_) => Some(FilterShape::Range),
        }
    }

    pub fn mode(&self) -> FilterMode {
        match self {
            Filter::NoFilter => FilterMode::Include,
            Filter::Set(set) => set.mode,
            Filter::Range(range) => range.mode,
        }
    }

    /// Number of set elements carried (0 for ranges)
    pub fn element_count(&self) -> usize {
        match self {
            Filter::Set(set) => set.elements.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_always_satisfied() {
        let filter: Filter<i64> = Filter::NoFilter;
        assert!(filter.is_satisfied_by(&i64::MIN));
        assert!(filter.is_satisfied_by(&0));
        assert!(filter.is_trivial());
    }

    #[test]
    fn test_set_include_and_exclude() {
        let include = Filter::include(["a".to_string(), "b".to_string()]);
        assert!(include.is_satisfied_by(&"a".to_string()));
        assert!(!include.is_satisfied_by(&"z".to_string()));

        let exclude = Filter::exclude(["a".to_string()]);
        assert!(!exclude.is_satisfied_by(&"a".to_string()));
        assert!(exclude.is_satisfied_by(&"z".to_string()));
    }

    #[test]
    fn test_empty_set_asymmetry() {
        let include: Filter<i64> = Filter::include([]);
        let exclude: Filter<i64> = Filter::exclude([]);
        for v in [-1, 0, 1, 42] {
            assert!(!include.is_satisfied_by(&v));
            assert!(exclude.is_satisfied_by(&v));
        }
        assert!(!include.is_trivial());
        assert!(exclude.is_trivial());
    }

    #[test]
    fn test_range_both_bounds() {
        let include = Filter::between(10, 20);
        assert!(include.is_satisfied_by(&10));
        assert!(include.is_satisfied_by(&20));
        assert!(!include.is_satisfied_by(&21));

        let exclude = Filter::range(FilterMode::Exclude, Some(10), Some(20));
        assert!(!exclude.is_satisfied_by(&10));
        assert!(!exclude.is_satisfied_by(&15));
        assert!(exclude.is_satisfied_by(&9));
        assert!(exclude.is_satisfied_by(&21));
    }

    #[test]
    fn test_range_min_only() {
        let include = Filter::range(FilterMode::Include, Some(5), None);
        assert!(include.is_satisfied_by(&5));
        assert!(include.is_satisfied_by(&6));
        assert!(!include.is_satisfied_by(&4));

        let exclude = Filter::range(FilterMode::Exclude, Some(5), None);
        assert!(!exclude.is_satisfied_by(&5));
        assert!(exclude.is_satisfied_by(&4));
    }

    #[test]
    fn test_range_max_only() {
        let include = Filter::range(FilterMode::Include, None, Some(5));
        assert!(include.is_satisfied_by(&5));
        assert!(!include.is_satisfied_by(&6));

        let exclude = Filter::range(FilterMode::Exclude, None, Some(5));
        assert!(!exclude.is_satisfied_by(&5));
        assert!(exclude.is_satisfied_by(&6));
    }

    #[test]
    fn test_unbounded_range_is_no_filter() {
        let filter: Filter<i64> = Filter::range(FilterMode::Exclude, None, None);
        assert_eq!(filter, Filter::NoFilter);

        // a hand-built unbounded range still behaves as one
        let raw: Filter<i64> = Filter::Range(RangeFilter::exclude(None, None));
        assert!(raw.is_trivial());
        assert!(raw.shape().is_none());
        assert!(raw.is_satisfied_by(&7));
    }

    #[test]
    fn test_inverted_range() {
        assert!(RangeFilter::include(Some(9), Some(3)).is_inverted());
        assert!(!RangeFilter::include(Some(3), Some(3)).is_inverted());
        assert!(!RangeFilter::include(Some(9), None).is_inverted());
    }

    #[test]
    fn test_mode_serde() {
        let mode: FilterMode = serde_json::from_str(r#""exclude""#).unwrap();
        assert_eq!(mode, FilterMode::Exclude);
        assert_eq!(serde_json::to_string(&FilterMode::Include).unwrap(), r#""include""#);
    }
}
