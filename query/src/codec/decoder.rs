//! Row decoder
//!
//! Rows are decoded in source order. The session sequence counter fills
//! `event_sequence_index` when the source omits it and restarts whenever the
//! session id changes between consecutive rows, so a batch must not be
//! reordered or split across decoders.

use crate::error::DecodeError;
use crate::schema::TableSchema;

use super::diagnostics::Diagnostics;
use super::event::Event;
use super::feature::Feature;
use super::record::{DomainRecord, Fallbacks, FieldReader};
use super::value::Value;

/// Running index within the current session
#[derive(Debug, Default)]
pub struct SessionSequence {
    current: Option<String>,
    next: i64,
}

impl SessionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for the next row of `session_id`, starting at 0 per session
    pub fn observe(&mut self, session_id: &str) -> i64 {
        if self.current.as_deref() != Some(session_id) {
            self.current = Some(session_id.to_string());
            self.next = 0;
        }
        let index = self.next;
        self.next += 1;
        index
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.next = 0;
    }
}

/// Batch decoding behaviour
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfig {
    /// Abort on the first bad row instead of skipping it
    pub fail_fast: bool,
}

/// Records from a batch, plus how many rows were dropped
#[derive(Debug)]
pub struct DecodeBatch<R> {
    pub records: Vec<R>,
    pub skipped: usize,
}

pub struct RowDecoder<'a> {
    schema: &'a TableSchema,
    diagnostics: &'a Diagnostics,
    fallbacks: Fallbacks,
    config: DecoderConfig,
    sequence: SessionSequence,
    rows_seen: usize,
}

impl<'a> RowDecoder<'a> {
    pub fn new(schema: &'a TableSchema, diagnostics: &'a Diagnostics) -> Self {
        Self {
            schema,
            diagnostics,
            fallbacks: Fallbacks::default(),
            config: DecoderConfig::default(),
            sequence: SessionSequence::default(),
            rows_seen: 0,
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    /// Start a new, unrelated sequence of rows
    pub fn reset(&mut self) {
        self.sequence.reset();
        self.rows_seen = 0;
    }

    /// Decode one row. Only a row of the wrong width is an error; per-field
    /// problems are reported through `Diagnostics` and coerced.
    pub fn decode<R: DomainRecord>(&mut self, row: &[Value]) -> Result<R, DecodeError> {
        let row_number = self.rows_seen;
        self.rows_seen += 1;

        let expected = self.schema.columns().len();
        if row.len() != expected {
            return Err(DecodeError::RowLength {
                table: self.schema.name().to_string(),
                row: row_number,
                expected,
                actual: row.len(),
            });
        }

        let reader = FieldReader::new(row, self.schema, &self.fallbacks, self.diagnostics);
        let mut record = R::read(&reader);
        record.apply_fallback_defaults(&mut self.sequence);
        Ok(record)
    }

    /// Decode rows in order. With `fail_fast` the first error is returned;
    /// otherwise bad rows are skipped and counted.
    pub fn decode_all<R, I>(&mut self, rows: I) -> Result<DecodeBatch<R>, DecodeError>
    where
        R: DomainRecord,
        I: IntoIterator,
        I::Item: AsRef<[Value]>,
    {
        let mut records = Vec::new();
        let mut skipped = 0;

        for row in rows {
            match self.decode::<R>(row.as_ref()) {
                Ok(record) => records.push(record),
                Err(err) if self.config.fail_fast => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            tracing::debug!(
                table = %self.schema.name(),
                decoded = records.len(),
                skipped,
                "Decoded batch with some rows skipped"
            );
        }
        Ok(DecodeBatch { records, skipped })
    }

    pub fn decode_events<I>(&mut self, rows: I) -> Result<DecodeBatch<Event>, DecodeError>
    where
        I: IntoIterator,
        I::Item: AsRef<[Value]>,
    {
        self.decode_all(rows)
    }

    pub fn decode_features<I>(&mut self, rows: I) -> Result<DecodeBatch<Feature>, DecodeError>
    where
        I: IntoIterator,
        I::Item: AsRef<[Value]>,
    {
        self.decode_all(rows)
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
