//! Query filter model
//!
//! Backend-independent filter types, collections and JSON parsing. Filters
//! support set membership and ordered ranges, each with an include/exclude
//! mode.
//!
//! ## Usage
//!
//! ```
//! use telemetry_query::filters::{Filter, FilterCollection, parse_filter_collection};
//!
//! let json = r#"{"identity": {"session": {"mode": "include", "set": ["s1"]}}}"#;
//! let collection = parse_filter_collection(json).unwrap();
//! assert_eq!(collection.identity.session, Filter::include(["s1".to_string()]));
//!
//! let mut manual = FilterCollection::new();
//! manual.events.event_code = Filter::between(100, 199);
//! assert!(manual.events.event_code.is_satisfied_by(&150));
//! ```

mod collection;
mod parser;
mod types;
mod value;
mod version;

pub use collection::{
    EventFilters, FilterCollection, FilterField, FilterVisitor, IdentityFilters,
    SequencingFilters, VersionFilters,
};
pub use parser::parse_filter_collection;
pub use types::{Filter, FilterMode, FilterShape, RangeFilter, SetFilter};
pub use value::FilterValue;
pub use version::Version;
