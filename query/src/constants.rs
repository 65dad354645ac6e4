// =============================================================================
// Application Identity
// =============================================================================

/// Binary name (for logging filters and help output)
pub const APP_NAME_LOWER: &str = "tq_compile";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TQ_LOG";

/// Environment variable for the default compile backend
pub const ENV_BACKEND: &str = "TQ_BACKEND";

// =============================================================================
// Filter Documents
// =============================================================================

/// Maximum size of a filter JSON document in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Maximum number of set elements across a whole filter document
pub const MAX_FILTER_ELEMENTS: usize = 10_000;

// =============================================================================
// Clause Rendering
// =============================================================================

/// Keyword prefixed to a non-empty compiled clause
pub const WHERE_PREFIX: &str = "WHERE ";

/// Token joining clause fragments
pub const CONJUNCTION: &str = "\nAND ";

/// Fragment that never matches (INCLUDE over an empty set)
pub const NEVER_TRUE: &str = "1=0";

/// Parameter name suffix for set members
pub const PARAM_SUFFIX_LIST: &str = "_list";

/// Parameter name suffix for a range minimum
pub const PARAM_SUFFIX_MIN: &str = "_min";

/// Parameter name suffix for a range maximum
pub const PARAM_SUFFIX_MAX: &str = "_max";

// =============================================================================
// Row Decoding
// =============================================================================

/// Default separator for List locators
pub const DEFAULT_CONCATENATOR: &str = ".";

/// Raw strings that always decode to null, whatever the declared type
pub const NULL_SENTINELS: &[&str] = &["None", "null", "nan"];

/// Logical field names shared by the schema mapping and the filter bindings
pub mod fields {
    pub const SESSION_ID: &str = "session_id";
    pub const APP_ID: &str = "app_id";
    pub const TIMESTAMP: &str = "timestamp";
    pub const EVENT_NAME: &str = "event_name";
    pub const EVENT_CODE: &str = "event_code";
    pub const EVENT_DATA: &str = "event_data";
    pub const EVENT_SOURCE: &str = "event_source";
    pub const APP_VERSION: &str = "app_version";
    pub const APP_BRANCH: &str = "app_branch";
    pub const LOG_VERSION: &str = "log_version";
    pub const TIME_OFFSET: &str = "time_offset";
    pub const USER_ID: &str = "user_id";
    pub const USER_DATA: &str = "user_data";
    pub const GAME_STATE: &str = "game_state";
    pub const EVENT_SEQUENCE_INDEX: &str = "event_sequence_index";

    pub const FEATURE_NAME: &str = "name";
    pub const FEATURE_TYPE: &str = "feature_type";
    pub const GAME_UNIT: &str = "game_unit";
    pub const GAME_UNIT_INDEX: &str = "game_unit_index";
    pub const SUBFEATURES: &str = "subfeatures";
    pub const FEATURE_VALUES: &str = "values";
}
