//! TOML scenario files: effects, passes, one map, and its population.

use std::collections::BTreeMap;
use std::path::Path;

use aura_core::{Catalog, Category, Entity, FlagStore, GroupId, Map, MapId, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Affinity, CacheConfig, FamilyConfig, MirrorConfig, SimConfig, TargetFilter};
use crate::error::{SimError, SimResult};
use crate::simulation::Simulation;

/// A complete scenario.
///
/// Passes are registered countdown first, then mirrors, families, and caches,
/// each group in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Effect kinds to define.
    pub effects: Vec<String>,
    /// Run settings.
    pub simulation: SimConfig,
    /// The map.
    pub map: MapSpec,
    /// Host countdown, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<DecaySpec>,
    /// Propagation families.
    pub families: Vec<FamilyConfig>,
    /// Mirror families.
    pub mirrors: Vec<MirrorConfig>,
    /// Affected-set caches.
    pub caches: Vec<CacheConfig>,
    /// The population, spawned in order.
    pub entities: Vec<EntitySpec>,
    /// Initial flags, by entity name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Map dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSpec {
    /// Map ID.
    pub id: u32,
    /// Width in cells.
    pub width: i32,
    /// Height in cells.
    pub height: i32,
}

impl Default for MapSpec {
    fn default() -> Self {
        Self {
            id: 1,
            width: 250,
            height: 250,
        }
    }
}

/// Settings of the countdown pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecaySpec {
    /// Ticks between countdowns.
    pub cadence: u64,
}

impl Default for DecaySpec {
    fn default() -> Self {
        Self { cadence: 1 }
    }
}

/// One entity of the initial population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Display name.
    pub name: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Category.
    #[serde(default)]
    pub category: Category,
    /// Allegiance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Tag names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Alive at start.
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub alive: bool,
    /// On the map at start.
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub spawned: bool,
}

fn yes() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

impl EntitySpec {
    fn to_entity(&self, catalog: &mut Catalog) -> Entity {
        let mut entity = Entity::new(&self.name, self.category).at(Position::new(self.x, self.y));
        entity.group = self.group;
        entity.alive = self.alive;
        for tag in &self.tags {
            entity.add_tag(catalog.intern_tag(tag));
        }
        entity
    }
}

impl Scenario {
    /// Parse a scenario from TOML text.
    pub fn from_toml(text: &str) -> SimResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Render the scenario as TOML.
    pub fn to_toml(&self) -> SimResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// The map ID the scenario builds.
    pub fn map_id(&self) -> MapId {
        MapId(self.map.id)
    }

    /// Build a ready-to-run simulation.
    pub fn build(&self) -> SimResult<Simulation> {
        let mut sim = Simulation::new(self.simulation.clone());
        for name in &self.effects {
            sim.catalog_mut().define_effect(name);
        }

        if let Some(decay) = &self.decay {
            sim.add_decay(decay.cadence)?;
        }
        for mirror in &self.mirrors {
            sim.add_mirror(mirror)?;
        }
        for family in &self.families {
            sim.add_family(family)?;
        }
        for cache in &self.caches {
            sim.add_cache(cache)?;
        }

        let map_id = sim.add_map(Map::new(self.map_id(), self.map.width, self.map.height))?;
        for spec in &self.entities {
            let entity = spec.to_entity(sim.catalog_mut());
            let id = sim.spawn(map_id, entity, Position::new(spec.x, spec.y))?;
            if !spec.spawned {
                sim.set_spawned(map_id, id, false)?;
            }
        }

        let mut store = FlagStore::new();
        for (name, flags) in &self.flags {
            let id = sim
                .map(map_id)
                .and_then(|m| m.find_by_name(name))
                .map(Entity::id)
                .ok_or_else(|| SimError::InvalidConfig {
                    name: name.clone(),
                    reason: "flags given for an entity that is not in the scenario".to_string(),
                })?;
            for (key, value) in flags {
                store.set(id, key.as_str(), *value);
            }
        }
        sim.context_mut(map_id)
            .ok_or(SimError::MapNotFound(map_id))?
            .restore_flags(store);

        info!(
            entities = self.entities.len(),
            passes = sim.passes().len(),
            "scenario built"
        );
        Ok(sim)
    }

    /// A random colony of `count` entities on a `size` x `size` map.
    ///
    /// The same seed always yields the same scenario.
    pub fn scatter(seed: u64, count: usize, size: i32) -> Self {
        let size = size.max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut entities = Vec::with_capacity(count);

        for i in 0..count {
            let x = rng.random_range(0..size);
            let y = rng.random_range(0..size);
            let roll: u32 = rng.random_range(0..10);
            let spec = match roll {
                0..=3 => {
                    let mut tags = Vec::new();
                    for (tag, chance) in [
                        ("diplomat", 0.2),
                        ("beastmaster", 0.15),
                        ("green_thumb", 0.2),
                        ("tough", 0.25),
                    ] {
                        if rng.random_bool(chance) {
                            tags.push(tag.to_string());
                        }
                    }
                    let group = if rng.random_bool(0.8) { 1 } else { 2 };
                    EntitySpec {
                        name: format!("Colonist {}", i + 1),
                        x,
                        y,
                        category: Category::Humanlike,
                        group: Some(GroupId(group)),
                        tags,
                        alive: true,
                        spawned: true,
                    }
                }
                4..=5 => EntitySpec {
                    name: format!("Animal {}", i + 1),
                    x,
                    y,
                    category: Category::Animal,
                    group: rng.random_bool(0.5).then_some(GroupId(1)),
                    tags: Vec::new(),
                    alive: true,
                    spawned: true,
                },
                _ => EntitySpec {
                    name: format!("Plant {}", i + 1),
                    x,
                    y,
                    category: Category::Plant,
                    group: None,
                    tags: Vec::new(),
                    alive: true,
                    spawned: true,
                },
            };
            entities.push(spec);
        }

        Self {
            effects: vec!["presence".into(), "bond".into(), "sturdy".into()],
            simulation: SimConfig::default(),
            map: MapSpec {
                id: 1,
                width: size,
                height: size,
            },
            decay: Some(DecaySpec::default()),
            families: vec![
                FamilyConfig::new("presence", "diplomat", "presence")
                    .with_radius(16)
                    .with_refresh(15_000)
                    .with_toggle("presence_aura"),
                FamilyConfig::new("bond", "beastmaster", "bond")
                    .with_affinity(Affinity::Any)
                    .with_target(TargetFilter {
                        group: Some(GroupId(1)),
                        ..TargetFilter::category(Category::Animal)
                    }),
            ],
            mirrors: vec![MirrorConfig::new("sturdy", "tough", "sturdy")
                .with_target(TargetFilter::category(Category::Humanlike))],
            caches: vec![CacheConfig::new("tended_plants", "green_thumb")
                .with_target(TargetFilter::category(Category::Plant))],
            entities,
            flags: BTreeMap::new(),
        }
    }
}
