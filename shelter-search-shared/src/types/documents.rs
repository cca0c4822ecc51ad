//! Document types for the search indexes.
//!
//! Each document is the search projection of one system-of-record row: the
//! identifier plus only the fields needed to search, filter and highlight.
//! The identifier is serialized as `objectID`, dates as epoch milliseconds so
//! the search provider can range-filter them.
//!
//! Every document has a matching patch type for partial updates. Patch fields
//! left `None` are omitted from the update. Nullable document fields use a
//! double option in the patch: `Some(None)` is sent as an explicit `null` and
//! clears the field in the index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::enums::{AnimalStatus, Species, UserGroup};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Used together with `#[serde(default)]`: a missing key stays `None`, a
/// `null` value becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Search projection of an animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalDocument {
    #[serde(rename = "objectID")]
    pub id: String,
    pub alias: Option<String>,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub pick_up_date: DateTime<Utc>,
    pub pick_up_location: Option<String>,
    pub species: Species,
    pub status: AnimalStatus,
}

/// Highlighted searchable fields of an animal hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalHighlight {
    pub alias: Option<String>,
    pub name: String,
}

/// Partial update of an animal document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalPatch {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub alias: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub pick_up_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub pick_up_location: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AnimalStatus>,
}

impl AnimalPatch {
    /// Create an empty patch for the given animal.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alias: None,
            name: None,
            pick_up_date: None,
            pick_up_location: None,
            species: None,
            status: None,
        }
    }
}

/// Search projection of a breed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreedDocument {
    #[serde(rename = "objectID")]
    pub id: String,
    pub name: String,
    pub species: Species,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreedHighlight {
    pub name: String,
}

/// Partial update of a breed document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreedPatch {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
}

impl BreedPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            species: None,
        }
    }
}

/// Search projection of a coat color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorDocument {
    #[serde(rename = "objectID")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorHighlight {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorPatch {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ColorPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// Search projection of a foster family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FosterFamilyDocument {
    #[serde(rename = "objectID")]
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FosterFamilyHighlight {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FosterFamilyPatch {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl FosterFamilyPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }
}

/// Search projection of a back-office user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "objectID")]
    pub id: String,
    pub display_name: String,
    pub groups: Vec<UserGroup>,
    pub is_disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserHighlight {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<UserGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
}

impl UserPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            groups: None,
            is_disabled: None,
        }
    }
}
