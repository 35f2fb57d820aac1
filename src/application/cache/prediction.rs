//! Latest prediction per entity.

use std::collections::BTreeMap;

use crate::domain::{EntityId, PredictionRecord};

/// Keyed store of the most recent [`PredictionRecord`] per entity.
///
/// Holds no lock of its own; it lives inside the pipeline state so that a
/// cache write commits together with the tracker update that produced it.
#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    records: BTreeMap<EntityId, PredictionRecord>,
}

impl PredictionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a prediction, replacing any previous one for the same entity.
    /// Returns the replaced record.
    pub fn record(&mut self, prediction: PredictionRecord) -> Option<PredictionRecord> {
        self.records.insert(prediction.entity_id.clone(), prediction)
    }

    /// Forget an entity's prediction.
    pub fn remove(&mut self, entity_id: &EntityId) -> Option<PredictionRecord> {
        self.records.remove(entity_id)
    }

    /// Look up the current prediction.
    #[must_use]
    pub fn get(&self, entity_id: &EntityId) -> Option<&PredictionRecord> {
        self.records.get(entity_id)
    }

    /// Copy of every current prediction, ordered by entity id.
    #[must_use]
    pub fn list_all(&self) -> BTreeMap<EntityId, PredictionRecord> {
        self.records.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
