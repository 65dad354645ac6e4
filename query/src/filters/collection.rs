//! Filter collections
//!
//! Four fixed axes (identity, sequencing, versions, events), each a struct of
//! optional filters. Every consumer walks the fields through
//! `FilterCollection::accept`, which visits them in one fixed order:
//! identity, sequencing, versions, events, and a fixed field order within
//! each axis. Compiled clauses rely on that order being stable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::fields;
use crate::error::CompileError;

use super::types::{Filter, FilterShape};
use super::value::FilterValue;
use super::version::Version;

/// A filterable field of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Session,
    Player,
    Timestamp,
    SessionIndex,
    LogVersion,
    AppVersion,
    AppBranch,
    EventName,
    EventCode,
}

impl FilterField {
    /// Every field, in visiting order
    pub const ALL: [FilterField; 9] = [
        FilterField::Session,
        FilterField::Player,
        FilterField::Timestamp,
        FilterField::SessionIndex,
        FilterField::LogVersion,
        FilterField::AppVersion,
        FilterField::AppBranch,
        FilterField::EventName,
        FilterField::EventCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Session => "session",
            FilterField::Player => "player",
            FilterField::Timestamp => "timestamp",
            FilterField::SessionIndex => "session_index",
            FilterField::LogVersion => "log_version",
            FilterField::AppVersion => "app_version",
            FilterField::AppBranch => "app_branch",
            FilterField::EventName => "event_name",
            FilterField::EventCode => "event_code",
        }
    }

    /// Logical record field whose column mapping backs this filter
    pub fn logical_field(&self) -> &'static str {
        match self {
            FilterField::Session => fields::SESSION_ID,
            FilterField::Player => fields::USER_ID,
            FilterField::Timestamp => fields::TIMESTAMP,
            FilterField::SessionIndex => fields::EVENT_SEQUENCE_INDEX,
            FilterField::LogVersion => fields::LOG_VERSION,
            FilterField::AppVersion => fields::APP_VERSION,
            FilterField::AppBranch => fields::APP_BRANCH,
            FilterField::EventName => fields::EVENT_NAME,
            FilterField::EventCode => fields::EVENT_CODE,
        }
    }

    /// Whether a filter of `shape` is meaningful for this field
    pub fn allows(&self, shape: FilterShape) -> bool {
        match self {
            FilterField::Session
            | FilterField::Player
            | FilterField::AppBranch
            | FilterField::EventName => shape == FilterShape::Set,
            FilterField::Timestamp => shape == FilterShape::Range,
            FilterField::SessionIndex
            | FilterField::LogVersion
            | FilterField::AppVersion
            | FilterField::EventCode => true,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityFilters {
    pub session: Filter<String>,
    pub player: Filter<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequencingFilters {
    pub timestamp: Filter<DateTime<Utc>>,
    #[serde(alias = "sessionIndex")]
    pub session_index: Filter<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionFilters {
    #[serde(alias = "logVersion")]
    pub log_version: Filter<Version>,
    #[serde(alias = "appVersion")]
    pub app_version: Filter<Version>,
    #[serde(alias = "appBranch")]
    pub app_branch: Filter<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventFilters {
    #[serde(alias = "eventName")]
    pub event_name: Filter<String>,
    #[serde(alias = "eventCode")]
    pub event_code: Filter<i64>,
}

/// All restrictions for one query; axes combine with AND
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterCollection {
    pub identity: IdentityFilters,
    pub sequencing: SequencingFilters,
    #[serde(alias = "version")]
    pub versions: VersionFilters,
    #[serde(alias = "event")]
    pub events: EventFilters,
}

/// Callback for `FilterCollection::accept`, invoked once per field
pub trait FilterVisitor {
    type Error;

    fn visit<T: FilterValue>(
        &mut self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), Self::Error>;
}

impl FilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit every field in the fixed order
    pub fn accept<V: FilterVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        visitor.visit(FilterField::Session, &self.identity.session)?;
        visitor.visit(FilterField::Player, &self.identity.player)?;
        visitor.visit(FilterField::Timestamp, &self.sequencing.timestamp)?;
        visitor.visit(FilterField::SessionIndex, &self.sequencing.session_index)?;
        visitor.visit(FilterField::LogVersion, &self.versions.log_version)?;
        visitor.visit(FilterField::AppVersion, &self.versions.app_version)?;
        visitor.visit(FilterField::AppBranch, &self.versions.app_branch)?;
        visitor.visit(FilterField::EventName, &self.events.event_name)?;
        visitor.visit(FilterField::EventCode, &self.events.event_code)?;
        Ok(())
    }

    /// Reject shape/field contradictions and inverted ranges
    pub fn validate(&self) -> Result<(), CompileError> {
        self.accept(&mut ShapeCheck)
    }

    /// Fields with a filter that restricts anything
    pub fn active_fields(&self) -> Vec<FilterField> {
        let mut collector = ActiveFields(Vec::new());
        let Ok(()) = self.accept(&mut collector);
        collector.0
    }

    pub fn is_empty(&self) -> bool {
        self.active_fields().is_empty()
    }

    /// Set elements carried across all fields
    pub fn element_count(&self) -> usize {
        let mut counter = ElementCount(0);
        let Ok(()) = self.accept(&mut counter);
        counter.0
    }
}

struct ShapeCheck;

impl FilterVisitor for ShapeCheck {
    type Error = CompileError;

    fn visit<T: FilterValue>(
        &mut self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), CompileError> {
        if let Some(shape) = filter.shape()
            && !field.allows(shape)
        {
            return Err(CompileError::ShapeNotAllowed {
                field,
                shape: shape.as_str(),
            });
        }
        if let Filter::Range(range) = filter
            && let (Some(min), Some(max)) = (&range.minimum, &range.maximum)
            && min > max
        {
            return Err(CompileError::InvertedRange {
                column: field.to_string(),
                min: min.to_value().to_string(),
                max: max.to_value().to_string(),
            });
        }
        Ok(())
    }
}

struct ActiveFields(Vec<FilterField>);

impl FilterVisitor for ActiveFields {
    type Error = std::convert::Infallible;

    fn visit<T: FilterValue>(
        &mut self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), Self::Error> {
        if !filter.is_trivial() {
            self.0.push(field);
        }
        Ok(())
    }
}

struct ElementCount(usize);

impl FilterVisitor for ElementCount {
    type Error = std::convert::Infallible;

    fn visit<T: FilterValue>(
        &mut self,
        _field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), Self::Error> {
        self.0 += filter.element_count();
        Ok(())
    }
}
