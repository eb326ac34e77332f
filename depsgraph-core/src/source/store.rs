//! In-memory source graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::data::RefTarget;
use super::{EntityId, SourceEntity, SourceError, SourceGraph};

/// Owned authoring data, indexed by id in insertion order.
///
/// A store decoded with [`SourceStore::from_json`] is validated: every
/// reference resolves to an entity of the kind it requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStore {
    entities: IndexMap<EntityId, SourceEntity>,
}

impl SourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under `id`.
    pub fn insert(&mut self, id: EntityId, entity: SourceEntity) -> Result<(), SourceError> {
        if self.entities.contains_key(&id) {
            return Err(SourceError::DuplicateEntity(id));
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Get an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&SourceEntity> {
        self.entities.get(&id)
    }

    /// Iterate over all entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SourceEntity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Check that every reference resolves to an entity of the right kind.
    pub fn validate(&self) -> Result<(), SourceError> {
        for (&from, entity) in &self.entities {
            for (to, expected) in entity.references() {
                let target = self
                    .entities
                    .get(&to)
                    .ok_or(SourceError::DanglingReference { from, to })?;
                let found = target.kind();

                if !expected.accepts(found) {
                    return Err(match expected {
                        RefTarget::Kind(expected) => SourceError::KindMismatch {
                            id: to,
                            expected,
                            found,
                        },
                        _ => SourceError::NotObjectData { id: to, found },
                    });
                }
            }
        }
        Ok(())
    }

    /// Decode and validate a store from its JSON description.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let store: Self = serde_json::from_str(json)?;
        store.validate()?;
        Ok(store)
    }

    /// Encode the store as JSON.
    pub fn to_json(&self) -> Result<String, SourceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl SourceGraph for SourceStore {
    fn entity(&self, id: EntityId) -> Option<&SourceEntity> {
        self.entities.get(&id)
    }
}
