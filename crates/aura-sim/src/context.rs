use aura_core::{Catalog, EffectKind, EntityId, FlagStore, Map, MapId};

use crate::cache::AffectedSetCache;
use crate::event::{EventLog, SimEvent, SimEventKind};

/// Mutable context passed to each pass while one map is stepped.
pub struct SimContext<'a> {
    /// The map being stepped.
    pub map: &'a mut Map,
    /// The map's affected-set caches.
    pub cache: &'a mut AffectedSetCache,
    /// The map's persisted per-entity flags.
    pub flags: &'a FlagStore,
    /// Tag and effect names.
    pub catalog: &'a Catalog,
    /// The shared event log.
    pub events: &'a mut EventLog,
    /// The current tick.
    pub tick: u64,
}

impl SimContext<'_> {
    /// Emit a simulation event on this map at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.tick, self.map.id(), kind, description));
    }

    /// The current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The ID of the map being stepped.
    pub fn map_id(&self) -> MapId {
        self.map.id()
    }

    /// Display name of an entity on this map, or its ID if it is gone.
    pub fn entity_name(&self, id: EntityId) -> String {
        self.map
            .get(id)
            .map_or_else(|| id.to_string(), |e| e.name.clone())
    }

    /// Name of an effect kind as defined in the catalog.
    pub fn effect_name(&self, kind: EffectKind) -> String {
        self.catalog
            .effect_name(kind)
            .map_or_else(|| kind.to_string(), str::to_string)
    }
}
