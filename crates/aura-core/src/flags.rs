use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Per-entity boolean flags, keyed by entity ID and flag name.
///
/// The engine treats keys as opaque. The store is what the host persists for
/// this crate; `BTreeMap` keeps serialized output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagStore {
    entries: BTreeMap<EntityId, BTreeMap<String, bool>>,
}

impl FlagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value, if the flag was ever set.
    pub fn get(&self, id: EntityId, key: &str) -> Option<bool> {
        self.entries.get(&id).and_then(|flags| flags.get(key)).copied()
    }

    /// Flags default to enabled; only an explicit `false` disables.
    pub fn is_enabled(&self, id: EntityId, key: &str) -> bool {
        self.get(id, key).unwrap_or(true)
    }

    /// Set a flag.
    pub fn set(&mut self, id: EntityId, key: impl Into<String>, value: bool) {
        self.entries
            .entry(id)
            .or_default()
            .insert(key.into(), value);
    }

    /// Flip a flag (starting from enabled). Returns the new value.
    pub fn toggle(&mut self, id: EntityId, key: &str) -> bool {
        let value = !self.is_enabled(id, key);
        self.set(id, key, value);
        value
    }

    /// Forget every flag of an entity. Called when it is disposed.
    pub fn clear_entity(&mut self, id: EntityId) {
        self.entries.remove(&id);
    }

    /// Keep only the entities for which `keep` returns `true`.
    pub fn retain_entities(&mut self, mut keep: impl FnMut(EntityId) -> bool) {
        self.entries.retain(|id, _| keep(*id));
    }

    /// Iterate `(entity, key, value)` triples in ID then key order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &str, bool)> {
        self.entries.iter().flat_map(|(id, flags)| {
            flags
                .iter()
                .map(move |(key, value)| (*id, key.as_str(), *value))
        })
    }

    /// Number of entities with at least one flag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no flags are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRE: &str = "fire_suppression";

    #[test]
    fn flags_default_to_enabled() {
        let flags = FlagStore::new();
        assert_eq!(flags.get(EntityId(1), FIRE), None);
        assert!(flags.is_enabled(EntityId(1), FIRE));
    }

    #[test]
    fn toggle_flips_from_enabled() {
        let mut flags = FlagStore::new();
        assert!(!flags.toggle(EntityId(1), FIRE));
        assert!(!flags.is_enabled(EntityId(1), FIRE));
        assert!(flags.toggle(EntityId(1), FIRE));
    }

    #[test]
    fn clear_entity_forgets_flags() {
        let mut flags = FlagStore::new();
        flags.set(EntityId(1), FIRE, false);
        flags.set(EntityId(2), FIRE, false);
        flags.clear_entity(EntityId(1));
        assert!(flags.is_enabled(EntityId(1), FIRE));
        assert_eq!(flags.len(), 1);

        flags.retain_entities(|id| id != EntityId(2));
        assert!(flags.is_empty());
    }

    #[test]
    fn json_round_trip_keeps_pairs() {
        let mut flags = FlagStore::new();
        flags.set(EntityId(7), FIRE, false);
        flags.set(EntityId(3), "glow", true);

        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(
            json,
            r#"{"3":{"glow":true},"7":{"fire_suppression":false}}"#
        );
        let back: FlagStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn iter_is_ordered() {
        let mut flags = FlagStore::new();
        flags.set(EntityId(2), "b", true);
        flags.set(EntityId(1), "z", false);
        flags.set(EntityId(1), "a", true);
        let seen: Vec<_> = flags.iter().collect();
        assert_eq!(
            seen,
            vec![
                (EntityId(1), "a", true),
                (EntityId(1), "z", false),
                (EntityId(2), "b", true),
            ]
        );
    }
}
