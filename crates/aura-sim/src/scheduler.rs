//! Per-map cadence bookkeeping.

use aura_core::{Entity, EntityId, FlagStore, Map, MapId};

use crate::cache::AffectedSetCache;
use crate::error::SimResult;

/// One next-due counter per registered pass.
///
/// Counters start at zero, so every pass is due on the first step. A due
/// pass moves its counter to `tick + cadence`; ticks skipped by the host are
/// not replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickScheduler {
    next_due: Vec<u64>,
}

impl TickScheduler {
    /// Create a scheduler with no counters yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the pass in `slot` would run at `tick`.
    pub fn is_due(&self, slot: usize, tick: u64) -> bool {
        tick >= self.next_due(slot)
    }

    /// The tick at which `slot` is next due.
    pub fn next_due(&self, slot: usize) -> u64 {
        self.next_due.get(slot).copied().unwrap_or(0)
    }

    /// If `slot` is due at `tick`, schedule its next run and return `true`.
    pub fn poll(&mut self, slot: usize, tick: u64, cadence: u64) -> bool {
        if slot >= self.next_due.len() {
            self.next_due.resize(slot + 1, 0);
        }
        let due = &mut self.next_due[slot];
        if tick < *due {
            return false;
        }
        *due = tick.saturating_add(cadence.max(1));
        true
    }
}

/// Everything the engine keeps per map: cadence counters, affected-set
/// caches, and persisted flags.
///
/// Created alongside the map and dropped with it.
#[derive(Debug, Clone)]
pub struct MapContext {
    map: MapId,
    pub(crate) scheduler: TickScheduler,
    pub(crate) cache: AffectedSetCache,
    pub(crate) flags: FlagStore,
    reported: Vec<bool>,
}

impl MapContext {
    /// Fresh state for `map`: every pass due, caches empty, no flags.
    pub fn new(map: MapId) -> Self {
        Self {
            map,
            scheduler: TickScheduler::new(),
            cache: AffectedSetCache::new(),
            flags: FlagStore::new(),
            reported: Vec::new(),
        }
    }

    /// The map this context belongs to.
    pub fn map_id(&self) -> MapId {
        self.map
    }

    /// Cadence counters.
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Affected-set caches.
    pub fn cache(&self) -> &AffectedSetCache {
        &self.cache
    }

    /// Persisted per-entity flags.
    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// Persisted per-entity flags, mutably.
    pub fn flags_mut(&mut self) -> &mut FlagStore {
        &mut self.flags
    }

    /// Replace the flags, e.g. after loading a save.
    pub fn restore_flags(&mut self, flags: FlagStore) {
        self.flags = flags;
    }

    /// O(1) cache membership test. An unknown key is never affected.
    pub fn is_affected(&self, key: &str, id: EntityId) -> bool {
        self.cache.is_affected(key, id)
    }

    /// Drop per-entity state after the entity has been disposed.
    ///
    /// Cache entries are left alone; the next rebuild drops them.
    pub fn forget_entity(&mut self, id: EntityId) {
        self.flags.clear_entity(id);
    }

    /// Dispose of `id` on `map`, the map this context belongs to, and drop
    /// its flags so a later entity reusing the ID starts without them.
    pub fn despawn(&mut self, map: &mut Map, id: EntityId) -> SimResult<Entity> {
        let entity = map.despawn(id)?;
        self.forget_entity(id);
        Ok(entity)
    }

    /// Mark `slot` as reported skipped. Returns `true` the first time only.
    pub(crate) fn mark_reported(&mut self, slot: usize) -> bool {
        if slot >= self.reported.len() {
            self.reported.resize(slot + 1, false);
        }
        !std::mem::replace(&mut self.reported[slot], true)
    }
}
