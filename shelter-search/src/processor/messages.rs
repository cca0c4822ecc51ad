//! Message types for the processor.
//!
//! Defines the input formats read from files and the typed changes that flow
//! through the ingest.

use serde::Deserialize;
use serde_json::Value;
use shelter_search_shared::{
    AnimalDocument, AnimalPatch, BreedDocument, BreedPatch, ColorDocument, ColorPatch,
    FosterFamilyDocument, FosterFamilyPatch, UserDocument, UserPatch,
};

/// Kinds of indexed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Animal,
    Breed,
    Color,
    FosterFamily,
    User,
}

/// A write-through change, as read from one line of an events file.
///
/// ```json
/// {"op": "upsert", "entity": "animal", "record": {"objectID": "a", ...}}
/// {"op": "update", "entity": "animal", "patch": {"objectID": "a", "alias": null}}
/// {"op": "delete", "entity": "animal", "id": "a"}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ChangeEvent {
    /// Entity was created or fully replaced.
    Upsert { entity: EntityKind, record: Value },
    /// Some fields of the entity changed.
    Update { entity: EntityKind, patch: Value },
    /// Entity was deleted or became unsearchable.
    Delete { entity: EntityKind, id: String },
}

/// A full copy of every searchable record, used to rebuild the indexes.
///
/// Missing lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub animals: Vec<AnimalDocument>,
    pub breeds: Vec<BreedDocument>,
    pub colors: Vec<ColorDocument>,
    pub foster_families: Vec<FosterFamilyDocument>,
    pub users: Vec<UserDocument>,
}

impl Snapshot {
    /// Total number of records.
    pub fn len(&self) -> usize {
        self.animals.len()
            + self.breeds.len()
            + self.colors.len()
            + self.foster_families.len()
            + self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A full record of any indexed entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Animal(AnimalDocument),
    Breed(BreedDocument),
    Color(ColorDocument),
    FosterFamily(FosterFamilyDocument),
    User(UserDocument),
}

/// A partial update of any indexed entity.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPatch {
    Animal(AnimalPatch),
    Breed(BreedPatch),
    Color(ColorPatch),
    FosterFamily(FosterFamilyPatch),
    User(UserPatch),
}

/// A typed change, ready for loading.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    Upsert(Record),
    Update(RecordPatch),
    Delete { entity: EntityKind, id: String },
}
