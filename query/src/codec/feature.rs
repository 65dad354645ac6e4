//! Feature records
//!
//! A feature is one extracted measurement for a game unit (a session, a
//! player, a level attempt). `values` holds one entry per subfeature, in the
//! same order as `subfeatures`.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::constants::fields;

use super::record::{DomainRecord, FieldReader};
use super::value::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: String,
    pub feature_type: String,
    pub game_unit: String,
    pub game_unit_index: Option<i64>,
    pub app_id: String,
    pub user_id: Option<String>,
    pub session_id: String,
    pub subfeatures: Vec<String>,
    pub values: Vec<JsonValue>,
}

impl Feature {
    /// Pair each subfeature with its value. Extra values are named by position.
    pub fn named_values(&self) -> Vec<(String, &JsonValue)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let name = self
                    .subfeatures
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", self.name, i));
                (name, value)
            })
            .collect()
    }
}

impl DomainRecord for Feature {
    const FIELDS: &'static [&'static str] = &[
        fields::FEATURE_NAME,
        fields::FEATURE_TYPE,
        fields::GAME_UNIT,
        fields::GAME_UNIT_INDEX,
        fields::APP_ID,
        fields::USER_ID,
        fields::SESSION_ID,
        fields::SUBFEATURES,
        fields::FEATURE_VALUES,
    ];

    fn read(reader: &FieldReader<'_>) -> Self {
        let subfeatures = reader
            .list(fields::SUBFEATURES)
            .into_iter()
            .map(|item| match item {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        Feature {
            name: reader.required_text(fields::FEATURE_NAME),
            feature_type: reader.required_text(fields::FEATURE_TYPE),
            game_unit: reader.required_text(fields::GAME_UNIT),
            game_unit_index: reader.int(fields::GAME_UNIT_INDEX),
            app_id: reader.required_text(fields::APP_ID),
            user_id: reader.text(fields::USER_ID),
            session_id: reader.required_text(fields::SESSION_ID),
            subfeatures,
            values: reader.list(fields::FEATURE_VALUES),
        }
    }

    fn field_value(&self, field: &str) -> Value {
        match field {
            fields::FEATURE_NAME => Value::from(self.name.as_str()),
            fields::FEATURE_TYPE => Value::from(self.feature_type.as_str()),
            fields::GAME_UNIT => Value::from(self.game_unit.as_str()),
            fields::GAME_UNIT_INDEX => Value::from(self.game_unit_index),
            fields::APP_ID => Value::from(self.app_id.as_str()),
            fields::USER_ID => Value::from(self.user_id.clone()),
            fields::SESSION_ID => Value::from(self.session_id.as_str()),
            fields::SUBFEATURES => Value::Json(JsonValue::Array(
                self.subfeatures.iter().cloned().map(JsonValue::String).collect(),
            )),
            fields::FEATURE_VALUES => Value::Json(JsonValue::Array(self.values.clone())),
            _ => Value::Null,
        }
    }
}
