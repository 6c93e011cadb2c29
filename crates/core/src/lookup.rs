use std::collections::HashMap;

use crate::feature_set::{FeatureSet, FeatureSetRef};
use crate::source::{Source, SourceRef};
use crate::store::{Store, StoreRef};

/// Resolves the references a job holds to the collaborators they name.
///
/// Collaborators live in their own store; a job only carries keys.
pub trait EntityLookup {
    fn source(&self, key: &SourceRef) -> Option<&Source>;
    fn store(&self, key: &StoreRef) -> Option<&Store>;
    fn feature_set(&self, key: &FeatureSetRef) -> Option<&FeatureSet>;
}

/// In-memory [`EntityLookup`].
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    sources: HashMap<SourceRef, Source>,
    stores: HashMap<StoreRef, Store>,
    feature_sets: HashMap<FeatureSetRef, FeatureSet>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_source(&mut self, source: Source) -> &mut Self {
        self.sources.insert(source.reference(), source);
        self
    }

    pub fn insert_store(&mut self, store: Store) -> &mut Self {
        self.stores.insert(store.reference(), store);
        self
    }

    pub fn insert_feature_set(&mut self, feature_set: FeatureSet) -> &mut Self {
        self.feature_sets.insert(feature_set.reference(), feature_set);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.stores.is_empty() && self.feature_sets.is_empty()
    }
}

impl EntityLookup for EntityCatalog {
    fn source(&self, key: &SourceRef) -> Option<&Source> {
        self.sources.get(key)
    }

    fn store(&self, key: &StoreRef) -> Option<&Store> {
        self.stores.get(key)
    }

    fn feature_set(&self, key: &FeatureSetRef) -> Option<&FeatureSet> {
        self.feature_sets.get(key)
    }
}
