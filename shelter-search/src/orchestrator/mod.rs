//! Orchestrator module for the shelter search ingest.
//!
//! Coordinates the input readers, the processor, and the loader.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::{ChangeProcessor, ProcessedBatch, RecordChange, Snapshot};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Number of event lines processed and loaded together.
    pub lines_per_batch: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            lines_per_batch: 500,
        }
    }
}

/// Counters of a completed sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of change events read.
    pub events_processed: u64,
    /// Number of full records written.
    pub documents_indexed: u64,
}

/// Orchestrator that coordinates the ingest components.
pub struct Orchestrator {
    processor: ChangeProcessor,
    loader: SearchLoader,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(processor: ChangeProcessor, loader: SearchLoader) -> Self {
        Self::with_config(processor, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        processor: ChangeProcessor,
        loader: SearchLoader,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            processor,
            loader,
            config,
        }
    }

    /// Upload the settings of every index.
    #[instrument(skip(self))]
    pub async fn upload_settings(&self) -> Result<(), IngestError> {
        info!("Uploading index settings");
        self.loader.upload_settings().await
    }

    /// Rebuild every index from a JSON snapshot file.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn reindex_file(&self, path: impl AsRef<Path>, clear: bool) -> Result<(), IngestError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| IngestError::parse(format!("Invalid snapshot: {}", e)))?;

        info!(record_count = snapshot.len(), clear = clear, "Snapshot loaded");
        self.loader.reindex(&snapshot, clear).await
    }

    /// Apply the change events of a JSON lines file, in order.
    pub async fn sync_file(&mut self, path: impl AsRef<Path>) -> Result<SyncSummary, IngestError> {
        let file = File::open(path.as_ref()).await?;
        info!(path = %path.as_ref().display(), "Syncing change events");
        self.sync(BufReader::new(file)).await
    }

    /// Apply the change events read from `reader`, one JSON object per line.
    ///
    /// Stops at the first malformed line or failing provider call. On a
    /// malformed line, every change read before it is applied, buffered
    /// upserts included, before the parse error is returned.
    #[instrument(skip(self, reader))]
    pub async fn sync<R>(&mut self, reader: R) -> Result<SyncSummary, IngestError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut batch = Vec::with_capacity(self.config.lines_per_batch);
        let mut summary = SyncSummary::default();
        let mut line_number = 0;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            batch.push((line_number, line));

            if batch.len() >= self.config.lines_per_batch {
                self.process_lines(std::mem::take(&mut batch), &mut summary)
                    .await?;
            }
        }

        self.process_lines(batch, &mut summary).await?;
        self.loader.flush().await?;

        info!(
            events_processed = summary.events_processed,
            documents_indexed = summary.documents_indexed,
            "Sync completed"
        );
        Ok(summary)
    }

    async fn process_lines(
        &mut self,
        lines: Vec<(usize, String)>,
        summary: &mut SyncSummary,
    ) -> Result<(), IngestError> {
        if lines.is_empty() {
            return Ok(());
        }

        let ProcessedBatch { changes, failure } = self.processor.process_batch(lines);

        summary.events_processed += changes.len() as u64;
        summary.documents_indexed += changes
            .iter()
            .filter(|change| matches!(change, RecordChange::Upsert(_)))
            .count() as u64;

        debug!(change_count = changes.len(), "Loading changes");
        self.loader.load(changes).await?;

        match failure {
            Some(e) => {
                warn!(error = %e, "Malformed event, flushing changes read before it");
                self.loader.flush().await?;
                Err(e)
            }
            None => Ok(()),
        }
    }
}
