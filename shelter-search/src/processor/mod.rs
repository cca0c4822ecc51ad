//! Processor module for the shelter search ingest.
//!
//! Transforms raw change events into typed record changes.

mod change_processor;
mod messages;

pub use change_processor::{ChangeProcessor, ProcessedBatch};
pub use messages::{ChangeEvent, EntityKind, Record, RecordChange, RecordPatch, Snapshot};
