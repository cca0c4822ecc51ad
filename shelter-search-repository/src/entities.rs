//! Index descriptors of every searchable entity, and the delegates built on
//! them.

use std::sync::Arc;

use shelter_search_shared::{
    AnimalDocument, AnimalHighlight, AnimalPatch, BreedDocument, BreedHighlight, BreedPatch,
    ColorDocument, ColorHighlight, ColorPatch, FacetHit, FosterFamilyDocument,
    FosterFamilyHighlight, FosterFamilyPatch, UserDocument, UserHighlight, UserPatch, WhereClause,
};
use tracing::{info, instrument};

use crate::config::FetchConfig;
use crate::delegate::{IndexDelegate, IndexedEntity};
use crate::errors::SearchIndexError;
use crate::filters::build_filter_expression;
use crate::interfaces::SearchIndexProvider;
use crate::types::{FacetAttribute, FacetSearchRequest, IndexSettings, Ranking};

impl IndexedEntity for AnimalDocument {
    type Highlighted = AnimalHighlight;
    type Patch = AnimalPatch;

    const INDEX_NAME: &'static str = "animals";

    fn id(&self) -> &str {
        &self.id
    }

    fn settings() -> IndexSettings {
        // Alias and name share the same priority.
        IndexSettings::new(["alias,name"])
            .with_facet(FacetAttribute::FilterOnly("species".into()))
            .with_facet(FacetAttribute::FilterOnly("status".into()))
            .with_facet(FacetAttribute::FilterOnly("pickUpDate".into()))
            .with_facet(FacetAttribute::Searchable(
                PickUpLocationDelegate::FACET_NAME.into(),
            ))
            .with_ranking(Ranking::Desc("pickUpDate".into()))
    }
}

impl IndexedEntity for BreedDocument {
    type Highlighted = BreedHighlight;
    type Patch = BreedPatch;

    const INDEX_NAME: &'static str = "breeds";

    fn id(&self) -> &str {
        &self.id
    }

    fn settings() -> IndexSettings {
        IndexSettings::new(["name"]).with_facet(FacetAttribute::FilterOnly("species".into()))
    }
}

impl IndexedEntity for ColorDocument {
    type Highlighted = ColorHighlight;
    type Patch = ColorPatch;

    const INDEX_NAME: &'static str = "colors";

    fn id(&self) -> &str {
        &self.id
    }

    fn settings() -> IndexSettings {
        IndexSettings::new(["name"])
    }
}

impl IndexedEntity for FosterFamilyDocument {
    type Highlighted = FosterFamilyHighlight;
    type Patch = FosterFamilyPatch;

    const INDEX_NAME: &'static str = "fosterFamilies";

    fn id(&self) -> &str {
        &self.id
    }

    fn settings() -> IndexSettings {
        IndexSettings::new(["displayName"])
    }
}

impl IndexedEntity for UserDocument {
    type Highlighted = UserHighlight;
    type Patch = UserPatch;

    const INDEX_NAME: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn settings() -> IndexSettings {
        IndexSettings::new(["displayName"])
            .with_facet(FacetAttribute::FilterOnly("groups".into()))
            .with_facet(FacetAttribute::FilterOnly("isDisabled".into()))
    }
}

/// Search over the pick-up locations of animals.
///
/// Locations are not indexed on their own: they are a searchable facet of the
/// animal index, queried through facet-value search.
#[derive(Clone)]
pub struct PickUpLocationDelegate {
    provider: Arc<dyn SearchIndexProvider>,
}

impl PickUpLocationDelegate {
    /// Facet of the animal index holding the locations.
    pub const FACET_NAME: &'static str = "pickUpLocation";

    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Find the locations matching `text` among the animals matching
    /// `where_clause`, most frequent first.
    #[instrument(skip(self, where_clause))]
    pub async fn find_many(
        &self,
        text: &str,
        where_clause: &WhereClause,
    ) -> Result<Vec<FacetHit>, SearchIndexError> {
        let request = FacetSearchRequest {
            facet_query: text.to_string(),
            filters: build_filter_expression(where_clause),
            max_facet_hits: None,
        };

        self.provider
            .search_for_facet_values(AnimalDocument::INDEX_NAME, Self::FACET_NAME, &request)
            .await
    }
}

/// Every search delegate, sharing one provider.
#[derive(Clone)]
pub struct SearchIndexes {
    pub animals: IndexDelegate<AnimalDocument>,
    pub breeds: IndexDelegate<BreedDocument>,
    pub colors: IndexDelegate<ColorDocument>,
    pub foster_families: IndexDelegate<FosterFamilyDocument>,
    pub users: IndexDelegate<UserDocument>,
    pub pick_up_locations: PickUpLocationDelegate,
}

impl SearchIndexes {
    pub fn new(provider: Arc<dyn SearchIndexProvider>, config: FetchConfig) -> Self {
        Self {
            animals: IndexDelegate::new(Arc::clone(&provider), config.clone()),
            breeds: IndexDelegate::new(Arc::clone(&provider), config.clone()),
            colors: IndexDelegate::new(Arc::clone(&provider), config.clone()),
            foster_families: IndexDelegate::new(Arc::clone(&provider), config.clone()),
            users: IndexDelegate::new(Arc::clone(&provider), config),
            pick_up_locations: PickUpLocationDelegate::new(provider),
        }
    }

    /// Upload the settings of every index.
    ///
    /// Stops at the first failure; settings uploads are idempotent so the
    /// whole operation can simply be run again.
    pub async fn upload_all_settings(&self) -> Result<(), SearchIndexError> {
        self.animals.upload_settings().await?;
        self.breeds.upload_settings().await?;
        self.colors.upload_settings().await?;
        self.foster_families.upload_settings().await?;
        self.users.upload_settings().await?;

        info!("Settings uploaded for every index");
        Ok(())
    }
}
