//! Change processor implementation.
//!
//! Transforms raw change events into typed record changes for loading.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::IngestError;
use crate::processor::messages::{ChangeEvent, EntityKind, Record, RecordChange, RecordPatch};

/// Changes read from a batch of lines.
#[derive(Debug)]
pub struct ProcessedBatch {
    /// Changes of the lines before the first malformed one.
    pub changes: Vec<RecordChange>,
    /// Error of the first malformed line.
    pub failure: Option<IngestError>,
}

/// Processor that transforms change events into typed record changes.
///
/// Blank lines are skipped. Any malformed line is an error, located by its
/// line number.
pub struct ChangeProcessor {}

impl ChangeProcessor {
    /// Create a new change processor.
    pub fn new() -> Self {
        Self {}
    }

    /// Process a batch of numbered lines.
    ///
    /// Processing stops at the first malformed line. The changes read before
    /// it are still returned, alongside the error.
    ///
    /// # Arguments
    ///
    /// * `lines` - Pairs of one-based line number and line content
    ///
    /// # Returns
    ///
    /// The typed changes, in input order, and the first failure if any.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub fn process_batch(&self, lines: Vec<(usize, String)>) -> ProcessedBatch {
        let mut batch = ProcessedBatch {
            changes: Vec::with_capacity(lines.len()),
            failure: None,
        };

        for (line_number, line) in lines {
            match self.process_line(line_number, &line) {
                Ok(Some(change)) => batch.changes.push(change),
                Ok(None) => {}
                Err(e) => {
                    batch.failure = Some(e);
                    break;
                }
            }
        }

        debug!(
            processed_count = batch.changes.len(),
            failed = batch.failure.is_some(),
            "Processed change batch"
        );
        batch
    }

    /// Process a single line of an events file.
    pub fn process_line(
        &self,
        line_number: usize,
        line: &str,
    ) -> Result<Option<RecordChange>, IngestError> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let event: ChangeEvent = serde_json::from_str(line)
            .map_err(|e| IngestError::parse_at(line_number, e))?;

        self.process_event(event)
            .map(Some)
            .map_err(|e| IngestError::parse_at(line_number, e))
    }

    /// Process a single change event.
    pub fn process_event(&self, event: ChangeEvent) -> Result<RecordChange, serde_json::Error> {
        match event {
            ChangeEvent::Upsert { entity, record } => Ok(RecordChange::Upsert(match entity {
                EntityKind::Animal => Record::Animal(decode(record)?),
                EntityKind::Breed => Record::Breed(decode(record)?),
                EntityKind::Color => Record::Color(decode(record)?),
                EntityKind::FosterFamily => Record::FosterFamily(decode(record)?),
                EntityKind::User => Record::User(decode(record)?),
            })),
            ChangeEvent::Update { entity, patch } => Ok(RecordChange::Update(match entity {
                EntityKind::Animal => RecordPatch::Animal(decode(patch)?),
                EntityKind::Breed => RecordPatch::Breed(decode(patch)?),
                EntityKind::Color => RecordPatch::Color(decode(patch)?),
                EntityKind::FosterFamily => RecordPatch::FosterFamily(decode(patch)?),
                EntityKind::User => RecordPatch::User(decode(patch)?),
            })),
            ChangeEvent::Delete { entity, id } => Ok(RecordChange::Delete { entity, id }),
        }
    }
}

impl Default for ChangeProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}
