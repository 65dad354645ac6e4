//! Event records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::constants::fields;

use super::decoder::SessionSequence;
use super::record::{DomainRecord, FieldReader};
use super::value::{Value, Zone};

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventSource {
    /// Logged by the game client
    #[default]
    Game,
    /// Derived after the fact by a processing step
    Generated,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Game => "GAME",
            EventSource::Generated => "GENERATED",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GAME" => Ok(EventSource::Game),
            "GENERATED" => Ok(EventSource::Generated),
            other => Err(format!("unknown event source '{}'", other)),
        }
    }
}

/// One telemetry event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub session_id: String,
    pub app_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_name: String,
    pub event_data: Map<String, JsonValue>,
    pub event_source: EventSource,
    pub app_version: Option<String>,
    pub app_branch: Option<String>,
    pub log_version: Option<String>,
    pub time_offset: Option<Zone>,
    pub user_id: Option<String>,
    pub user_data: Map<String, JsonValue>,
    pub game_state: Map<String, JsonValue>,
    pub event_sequence_index: Option<i64>,
}

impl DomainRecord for Event {
    const FIELDS: &'static [&'static str] = &[
        fields::SESSION_ID,
        fields::APP_ID,
        fields::TIMESTAMP,
        fields::EVENT_NAME,
        fields::EVENT_DATA,
        fields::EVENT_SOURCE,
        fields::APP_VERSION,
        fields::APP_BRANCH,
        fields::LOG_VERSION,
        fields::TIME_OFFSET,
        fields::USER_ID,
        fields::USER_DATA,
        fields::GAME_STATE,
        fields::EVENT_SEQUENCE_INDEX,
    ];

    fn read(reader: &FieldReader<'_>) -> Self {
        let timestamp = reader.datetime(fields::TIMESTAMP).unwrap_or_else(|| {
            reader.warn(fields::TIMESTAMP, "Missing timestamp, using the Unix epoch");
            DateTime::<Utc>::UNIX_EPOCH
        });
        let event_source = match reader.text(fields::EVENT_SOURCE) {
            None => EventSource::default(),
            Some(text) => text.parse().unwrap_or_else(|err: String| {
                reader.warn(fields::EVENT_SOURCE, err);
                EventSource::default()
            }),
        };

        Event {
            session_id: reader.required_text(fields::SESSION_ID),
            app_id: reader.required_text(fields::APP_ID),
            timestamp,
            event_name: reader.required_text(fields::EVENT_NAME),
            event_data: reader.object(fields::EVENT_DATA),
            event_source,
            app_version: reader.text(fields::APP_VERSION),
            app_branch: reader.text(fields::APP_BRANCH),
            log_version: reader.text(fields::LOG_VERSION),
            time_offset: reader.zone(fields::TIME_OFFSET),
            user_id: reader.text(fields::USER_ID),
            user_data: reader.object(fields::USER_DATA),
            game_state: reader.object(fields::GAME_STATE),
            event_sequence_index: reader.int(fields::EVENT_SEQUENCE_INDEX),
        }
    }

    fn field_value(&self, field: &str) -> Value {
        match field {
            fields::SESSION_ID => Value::from(self.session_id.as_str()),
            fields::APP_ID => Value::from(self.app_id.as_str()),
            fields::TIMESTAMP => Value::DateTime(self.timestamp),
            fields::EVENT_NAME => Value::from(self.event_name.as_str()),
            fields::EVENT_DATA => Value::Json(JsonValue::Object(self.event_data.clone())),
            fields::EVENT_SOURCE => Value::from(self.event_source.as_str()),
            fields::APP_VERSION => Value::from(self.app_version.clone()),
            fields::APP_BRANCH => Value::from(self.app_branch.clone()),
            fields::LOG_VERSION => Value::from(self.log_version.clone()),
            fields::TIME_OFFSET => self.time_offset.map_or(Value::Null, Value::TimeZone),
            fields::USER_ID => Value::from(self.user_id.clone()),
            fields::USER_DATA => Value::Json(JsonValue::Object(self.user_data.clone())),
            fields::GAME_STATE => Value::Json(JsonValue::Object(self.game_state.clone())),
            fields::EVENT_SEQUENCE_INDEX => Value::from(self.event_sequence_index),
            _ => Value::Null,
        }
    }

    fn apply_fallback_defaults(&mut self, sequence: &mut SessionSequence) {
        let index = sequence.observe(&self.session_id);
        if self.event_sequence_index.is_none() {
            self.event_sequence_index = Some(index);
        }
    }
}
