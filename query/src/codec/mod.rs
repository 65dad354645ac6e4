//! Schema-driven row codec
//!
//! Turns raw rows (cells in column order) into `Event`/`Feature` records using
//! a `TableSchema`, and writes records back into rows.

mod convert;
mod decoder;
mod diagnostics;
mod encode;
mod event;
mod feature;
mod record;
mod resolve;
mod value;

pub use convert::convert_to_type;
pub use decoder::{DecodeBatch, DecoderConfig, RowDecoder, SessionSequence};
pub use diagnostics::Diagnostics;
pub use encode::RowEncoder;
pub use event::{Event, EventSource};
pub use feature::Feature;
pub use record::{DomainRecord, Fallbacks, FieldReader};
pub use resolve::resolve_locator;
pub use value::{Value, Zone};
