use aura_core::{Catalog, CoreError, Entity, EntityId, Map, MapId, Position};
use tracing::{debug, info};

use crate::cache::CacheFamily;
use crate::clock::SimClock;
use crate::config::{CacheConfig, FamilyConfig, MirrorConfig, SimConfig};
use crate::decay::EffectDecay;
use crate::engine::{Engine, PassSummary};
use crate::error::{SimError, SimResult};
use crate::event::EventLog;
use crate::mirror::MirrorFamily;
use crate::propagation::PropagationFamily;
use crate::scheduler::MapContext;
use crate::system::System;

/// The top-level simulation orchestrator.
///
/// Owns the catalog, clock, event log, registered passes, and every map with
/// its [`MapContext`]. One call to [`Simulation::tick`] advances the clock
/// once and steps each map in insertion order.
pub struct Simulation {
    config: SimConfig,
    clock: SimClock,
    catalog: Catalog,
    engine: Engine,
    maps: Vec<(Map, MapContext)>,
    events: EventLog,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("passes", &self.engine.len())
            .field("maps", &self.maps.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create an empty simulation.
    pub fn new(config: SimConfig) -> Self {
        Self::with_catalog(config, Catalog::new())
    }

    /// Create an empty simulation around an existing catalog.
    pub fn with_catalog(config: SimConfig, catalog: Catalog) -> Self {
        Self {
            clock: SimClock::new(config.ticks_per_hour),
            events: EventLog::new(config.max_events),
            config,
            catalog,
            engine: Engine::new(),
            maps: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a pass. Passes run in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> SimResult<()> {
        self.engine.register(Box::new(system))
    }

    /// Register a propagation family.
    pub fn add_family(&mut self, config: &FamilyConfig) -> SimResult<()> {
        let family = PropagationFamily::resolve(config, &mut self.catalog)?;
        self.add_system(family)
    }

    /// Register a mirror family.
    pub fn add_mirror(&mut self, config: &MirrorConfig) -> SimResult<()> {
        let mirror = MirrorFamily::resolve(config, &mut self.catalog)?;
        self.add_system(mirror)
    }

    /// Register an affected-set cache.
    pub fn add_cache(&mut self, config: &CacheConfig) -> SimResult<()> {
        let cache = CacheFamily::resolve(config, &mut self.catalog)?;
        self.add_system(cache)
    }

    /// Register the effect countdown, running every `cadence` ticks.
    pub fn add_decay(&mut self, cadence: u64) -> SimResult<()> {
        let decay = EffectDecay::new(cadence);
        self.add_system(decay)
    }

    /// Add a map. Its context starts with every pass due.
    pub fn add_map(&mut self, map: Map) -> SimResult<MapId> {
        let id = map.id();
        if self.maps.iter().any(|(m, _)| m.id() == id) {
            return Err(SimError::DuplicateMap(id));
        }
        let ctx = self.engine.new_map_context(id);
        self.maps.push((map, ctx));
        debug!(map = %id, "map added");
        Ok(id)
    }

    /// Remove a map together with its context.
    pub fn remove_map(&mut self, id: MapId) -> SimResult<(Map, MapContext)> {
        let idx = self
            .maps
            .iter()
            .position(|(m, _)| m.id() == id)
            .ok_or(SimError::MapNotFound(id))?;
        Ok(self.maps.remove(idx))
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        let tick = self.clock.advance();
        for (map, ctx) in &mut self.maps {
            self.engine
                .on_simulation_step(map, ctx, &self.catalog, tick, &mut self.events);
        }
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
        info!(
            ticks = n,
            now = self.clock.tick(),
            events = self.events.len(),
            "simulation advanced"
        );
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// Spawn an entity on a map at `pos`.
    pub fn spawn(&mut self, map: MapId, entity: Entity, pos: Position) -> SimResult<EntityId> {
        let (map, ctx) = self.slot_mut(map)?;
        let id = map.spawn(entity.at(pos))?;
        ctx.forget_entity(id);
        Ok(id)
    }

    /// Dispose of an entity and forget its flags.
    pub fn despawn(&mut self, map: MapId, id: EntityId) -> SimResult<Entity> {
        let (map, ctx) = self.slot_mut(map)?;
        ctx.despawn(map, id)
    }

    /// An entity by ID, mutably. Tags, group, and effects may be edited in
    /// place; disposal goes through [`Simulation::despawn`].
    pub fn entity_mut(&mut self, map: MapId, id: EntityId) -> Option<&mut Entity> {
        self.slot_mut(map).ok().and_then(|(map, _)| map.get_mut(id))
    }

    /// Take an entity off its map (or put it back) without disposing it.
    pub fn set_spawned(&mut self, map: MapId, id: EntityId, spawned: bool) -> SimResult<()> {
        let (map, _) = self.slot_mut(map)?;
        Ok(map.set_spawned(id, spawned)?)
    }

    /// Move an entity to another map. Returns its ID there.
    ///
    /// Flags do not travel; the entity is a new arrival on the other map.
    pub fn transfer(&mut self, from: MapId, id: EntityId, to: MapId, pos: Position) -> SimResult<EntityId> {
        if from == to {
            let (map, _) = self.slot_mut(from)?;
            map.move_to(id, pos)?;
            return Ok(id);
        }
        let target = self.map(to).ok_or(SimError::MapNotFound(to))?;
        if !target.in_bounds(pos) {
            return Err(CoreError::OutOfBounds {
                pos,
                width: target.width(),
                height: target.height(),
            }
            .into());
        }
        let entity = self.despawn(from, id)?;
        self.spawn(to, entity, pos)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// O(1) cache membership test on one map. Unknown maps and keys read as
    /// unaffected.
    pub fn is_affected(&self, map: MapId, key: &str, id: EntityId) -> bool {
        self.context(map).is_some_and(|ctx| ctx.is_affected(key, id))
    }

    /// A map by ID.
    pub fn map(&self, id: MapId) -> Option<&Map> {
        self.maps.iter().find(|(m, _)| m.id() == id).map(|(m, _)| m)
    }

    /// The context of a map.
    pub fn context(&self, id: MapId) -> Option<&MapContext> {
        self.maps.iter().find(|(m, _)| m.id() == id).map(|(_, c)| c)
    }

    /// The context of a map, mutably.
    pub fn context_mut(&mut self, id: MapId) -> Option<&mut MapContext> {
        self.maps
            .iter_mut()
            .find(|(m, _)| m.id() == id)
            .map(|(_, c)| c)
    }

    /// All maps in insertion order.
    pub fn maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.iter().map(|(m, _)| m)
    }

    fn slot_mut(&mut self, id: MapId) -> SimResult<(&mut Map, &mut MapContext)> {
        self.maps
            .iter_mut()
            .find(|(m, _)| m.id() == id)
            .map(|(m, c)| (m, c))
            .ok_or(SimError::MapNotFound(id))
    }

    /// The name catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The name catalog, mutably. Define effects before registering the
    /// families that use them.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Registered passes, in dispatch order.
    pub fn passes(&self) -> Vec<PassSummary> {
        self.engine.summaries()
    }

    /// Access a pass by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.engine.get::<T>()
    }

    /// The configuration this simulation was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The current tick.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }
}
