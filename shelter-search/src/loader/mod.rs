//! Loader module for the shelter search ingest.
//!
//! Loads typed record changes into the search indexes through the index
//! delegates.

use std::mem;

use shelter_search_repository::SearchIndexes;
use shelter_search_shared::{
    AnimalDocument, BreedDocument, ColorDocument, FosterFamilyDocument, UserDocument,
};
use tracing::{debug, error, info, instrument};

use crate::errors::IngestError;
use crate::processor::{EntityKind, Record, RecordChange, RecordPatch, Snapshot};

/// Configuration for the search loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of pending upserts that triggers a flush.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Upserts waiting to be flushed, per index.
#[derive(Debug, Default)]
struct PendingUpserts {
    animals: Vec<AnimalDocument>,
    breeds: Vec<BreedDocument>,
    colors: Vec<ColorDocument>,
    foster_families: Vec<FosterFamilyDocument>,
    users: Vec<UserDocument>,
}

impl PendingUpserts {
    fn push(&mut self, record: Record) {
        match record {
            Record::Animal(animal) => self.animals.push(animal),
            Record::Breed(breed) => self.breeds.push(breed),
            Record::Color(color) => self.colors.push(color),
            Record::FosterFamily(foster_family) => self.foster_families.push(foster_family),
            Record::User(user) => self.users.push(user),
        }
    }

    fn len(&self) -> usize {
        self.animals.len()
            + self.breeds.len()
            + self.colors.len()
            + self.foster_families.len()
            + self.users.len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loader that writes record changes into the search indexes.
///
/// Upserts are buffered and written in bulk. Updates and deletes are applied
/// immediately, after flushing every buffered upsert, so that the changes of a
/// record are applied in order.
pub struct SearchLoader {
    indexes: SearchIndexes,
    config: LoaderConfig,
    pending: PendingUpserts,
}

impl SearchLoader {
    /// Create a new search loader writing through the given delegates.
    pub fn new(indexes: SearchIndexes) -> Self {
        Self::with_config(indexes, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    pub fn with_config(indexes: SearchIndexes, config: LoaderConfig) -> Self {
        Self {
            indexes,
            config,
            pending: PendingUpserts::default(),
        }
    }

    /// Load a batch of changes.
    ///
    /// Stops at the first failing provider call.
    #[instrument(skip(self, changes), fields(change_count = changes.len()))]
    pub async fn load(&mut self, changes: Vec<RecordChange>) -> Result<(), IngestError> {
        for change in changes {
            match change {
                RecordChange::Upsert(record) => {
                    self.pending.push(record);
                    if self.pending.len() >= self.config.batch_size {
                        self.flush().await?;
                    }
                }
                RecordChange::Update(patch) => {
                    self.flush().await?;
                    self.update(patch).await?;
                }
                RecordChange::Delete { entity, id } => {
                    self.flush().await?;
                    self.delete(entity, &id).await?;
                }
            }
        }

        Ok(())
    }

    /// Flush all pending upserts to the search indexes.
    #[instrument(skip(self))]
    pub async fn flush(&mut self) -> Result<(), IngestError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let pending = mem::take(&mut self.pending);
        let count = pending.len();

        debug!(count = count, "Flushing upserts to search indexes");

        let result = async {
            self.indexes.animals.create_many(&pending.animals).await?;
            self.indexes.breeds.create_many(&pending.breeds).await?;
            self.indexes.colors.create_many(&pending.colors).await?;
            self.indexes
                .foster_families
                .create_many(&pending.foster_families)
                .await?;
            self.indexes.users.create_many(&pending.users).await
        }
        .await;

        if let Err(e) = result {
            error!(error = %e, count = count, "Failed to flush upserts");
            return Err(e.into());
        }

        Ok(())
    }

    async fn update(&self, patch: RecordPatch) -> Result<(), IngestError> {
        let result = match &patch {
            RecordPatch::Animal(patch) => self.indexes.animals.update(patch).await,
            RecordPatch::Breed(patch) => self.indexes.breeds.update(patch).await,
            RecordPatch::Color(patch) => self.indexes.colors.update(patch).await,
            RecordPatch::FosterFamily(patch) => self.indexes.foster_families.update(patch).await,
            RecordPatch::User(patch) => self.indexes.users.update(patch).await,
        };

        result.map_err(|e| {
            error!(error = %e, patch = ?patch, "Failed to update document");
            e.into()
        })
    }

    async fn delete(&self, entity: EntityKind, id: &str) -> Result<(), IngestError> {
        let result = match entity {
            EntityKind::Animal => self.indexes.animals.delete(id).await,
            EntityKind::Breed => self.indexes.breeds.delete(id).await,
            EntityKind::Color => self.indexes.colors.delete(id).await,
            EntityKind::FosterFamily => self.indexes.foster_families.delete(id).await,
            EntityKind::User => self.indexes.users.delete(id).await,
        };

        result.map_err(|e| {
            error!(error = %e, entity = ?entity, id = %id, "Failed to delete document");
            e.into()
        })
    }

    /// Rebuild every index from a snapshot.
    ///
    /// With `clear`, each index is emptied before its records are written, so
    /// records missing from the snapshot disappear from the index.
    #[instrument(skip(self, snapshot), fields(record_count = snapshot.len()))]
    pub async fn reindex(&self, snapshot: &Snapshot, clear: bool) -> Result<(), IngestError> {
        if clear {
            self.indexes.animals.delete_all().await?;
            self.indexes.breeds.delete_all().await?;
            self.indexes.colors.delete_all().await?;
            self.indexes.foster_families.delete_all().await?;
            self.indexes.users.delete_all().await?;
        }

        self.indexes.animals.create_many(&snapshot.animals).await?;
        self.indexes.breeds.create_many(&snapshot.breeds).await?;
        self.indexes.colors.create_many(&snapshot.colors).await?;
        self.indexes
            .foster_families
            .create_many(&snapshot.foster_families)
            .await?;
        self.indexes.users.create_many(&snapshot.users).await?;

        info!(
            animals = snapshot.animals.len(),
            breeds = snapshot.breeds.len(),
            colors = snapshot.colors.len(),
            foster_families = snapshot.foster_families.len(),
            users = snapshot.users.len(),
            "Reindex completed"
        );
        Ok(())
    }

    /// Upload the settings of every index.
    pub async fn upload_settings(&self) -> Result<(), IngestError> {
        self.indexes.upload_all_settings().await?;
        Ok(())
    }
}
