//! # Shelter Search Shared
//!
//! This crate defines the data structures shared across the shelter search
//! subsystem: the documents projected into the search indexes, the typed
//! filter model (where-clauses), search hits and paginated results, and the
//! query-string codecs used by filter forms.

pub mod search_params;
pub mod types;

pub use search_params::{AnimalSearchParams, UserSearchParams};
pub use types::documents::{
    AnimalDocument, AnimalHighlight, AnimalPatch, BreedDocument, BreedHighlight, BreedPatch,
    ColorDocument, ColorHighlight, ColorPatch, FosterFamilyDocument, FosterFamilyHighlight,
    FosterFamilyPatch, UserDocument, UserHighlight, UserPatch,
};
pub use types::enums::{AnimalStatus, Species, UnknownVariant, UserGroup};
pub use types::filter::{DateRange, FilterValue, WhereClause};
pub use types::search_result::{FacetHit, PaginatedResult, SearchHit};
