use scenekit_common::EntityId;
use std::collections::BTreeMap;

/// Storage for one component type, keyed by entity.
///
/// BTreeMap keeps iteration in `EntityId` order, which the join views rely
/// on to intersect tables in a single forward pass.
#[derive(Debug, Clone)]
pub struct ComponentTable<T> {
    rows: BTreeMap<EntityId, T>,
}

impl<T> Default for ComponentTable<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T> ComponentTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the previous value.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        self.rows.insert(entity, value)
    }

    /// Remove and return the value for `entity`.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.rows.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.rows.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.rows.get_mut(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.rows.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids with a value, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.rows.keys().copied()
    }

    /// Entries in ascending id order, ready for `join`.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.rows.iter().map(|(id, value)| (*id, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.rows.iter_mut().map(|(id, value)| (*id, value))
    }
}
