use aura_core::{Catalog, Category, GroupId};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::predicates::TargetRule;
use crate::spatial::{MAX_RADIUS, radius_squared};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Ticks per in-world hour, for reporting.
    pub ticks_per_hour: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_events: 10_000,
            ticks_per_hour: 2500,
        }
    }
}

impl SimConfig {
    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the number of ticks per in-world hour.
    pub fn with_ticks_per_hour(mut self, ticks: u64) -> Self {
        self.ticks_per_hour = ticks;
        self
    }
}

/// Which entities a family or cache may target, by name.
///
/// Resolved against the [`Catalog`] into a [`TargetRule`] at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFilter {
    /// Required category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Required group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Required tag name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl TargetFilter {
    /// Only entities of `category`.
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Resolve the tag name, interning it if this is its first mention.
    pub fn resolve(&self, catalog: &mut Catalog) -> TargetRule {
        TargetRule {
            category: self.category,
            group: self.group,
            tag: self.tag.as_deref().map(|t| catalog.intern_tag(t)),
        }
    }
}

/// Who an emitter may affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Affinity {
    /// Only allies of the emitter.
    Allies {
        /// Restrict targets to the principal category.
        #[serde(default = "default_principal_only")]
        principal_only: bool,
    },
    /// Any valid entity on the same map, the emitter included.
    Any,
}

fn default_principal_only() -> bool {
    true
}

impl Default for Affinity {
    fn default() -> Self {
        Self::Allies {
            principal_only: true,
        }
    }
}

/// One propagation family: emitters carrying a tag spread a timed effect to
/// eligible targets within a radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Unique pass name.
    pub name: String,
    /// Tag that marks emitters.
    pub emitter_tag: String,
    /// Effect kind to attach and refresh.
    pub effect: String,
    /// Range in cells.
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Ticks between passes.
    #[serde(default = "default_cadence")]
    pub cadence: u64,
    /// Remaining duration written on every refresh.
    #[serde(default = "default_refresh")]
    pub refresh: u64,
    /// Targets the family may touch.
    #[serde(default)]
    pub target: TargetFilter,
    /// Ally-only or any-entity mode.
    #[serde(default)]
    pub affinity: Affinity,
    /// Per-entity flag that switches an emitter off when explicitly `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle: Option<String>,
}

fn default_radius() -> u32 {
    20
}

fn default_cadence() -> u64 {
    250
}

fn default_refresh() -> u64 {
    5000
}

impl FamilyConfig {
    /// A family with the default radius (20), cadence (250), and refresh (5000).
    pub fn new(
        name: impl Into<String>,
        emitter_tag: impl Into<String>,
        effect: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            emitter_tag: emitter_tag.into(),
            effect: effect.into(),
            radius: default_radius(),
            cadence: default_cadence(),
            refresh: default_refresh(),
            target: TargetFilter::default(),
            affinity: Affinity::default(),
            toggle: None,
        }
    }

    /// Set the range in cells.
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the ticks between passes.
    pub fn with_cadence(mut self, cadence: u64) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set the refresh duration.
    pub fn with_refresh(mut self, refresh: u64) -> Self {
        self.refresh = refresh;
        self
    }

    /// Set the target filter.
    pub fn with_target(mut self, target: TargetFilter) -> Self {
        self.target = target;
        self
    }

    /// Set the affinity mode.
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Name the flag that can switch emitters off.
    pub fn with_toggle(mut self, flag: impl Into<String>) -> Self {
        self.toggle = Some(flag.into());
        self
    }

    /// The radius, squared.
    pub fn radius_sq(&self) -> i64 {
        radius_squared(self.radius)
    }

    /// Check the record before it is registered.
    pub fn validate(&self) -> SimResult<()> {
        check_name(&self.name)?;
        check_cadence(&self.name, self.cadence)?;
        check_radius(&self.name, self.radius)?;
        if self.refresh == 0 {
            return Err(invalid(&self.name, "refresh must be at least one tick"));
        }
        Ok(())
    }
}

/// A mirror family: effect present exactly while the tag is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Unique pass name.
    pub name: String,
    /// The tag being mirrored.
    pub tag: String,
    /// Effect kind attached while the tag is present.
    pub effect: String,
    /// Ticks between passes.
    #[serde(default = "default_mirror_cadence")]
    pub cadence: u64,
    /// Entities the mirror applies to.
    #[serde(default)]
    pub target: TargetFilter,
}

fn default_mirror_cadence() -> u64 {
    120
}

impl MirrorConfig {
    /// A mirror with the default cadence (120).
    pub fn new(name: impl Into<String>, tag: impl Into<String>, effect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            effect: effect.into(),
            cadence: default_mirror_cadence(),
            target: TargetFilter::default(),
        }
    }

    /// Set the ticks between passes.
    pub fn with_cadence(mut self, cadence: u64) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set the target filter.
    pub fn with_target(mut self, target: TargetFilter) -> Self {
        self.target = target;
        self
    }

    /// Check the record before it is registered.
    pub fn validate(&self) -> SimResult<()> {
        check_name(&self.name)?;
        check_cadence(&self.name, self.cadence)
    }
}

/// An affected-set cache: which entities stand near a tagged source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache key, also used as the pass name.
    pub key: String,
    /// Tag that marks sources.
    pub source_tag: String,
    /// Range in cells.
    #[serde(default = "default_cache_radius")]
    pub radius: u32,
    /// Ticks between rebuilds.
    #[serde(default = "default_cadence")]
    pub cadence: u64,
    /// Maximum entries per rebuild. 0 = unbounded.
    #[serde(default = "default_cap")]
    pub cap: usize,
    /// Entities that may enter the set.
    #[serde(default)]
    pub target: TargetFilter,
}

fn default_cache_radius() -> u32 {
    12
}

fn default_cap() -> usize {
    200
}

impl CacheConfig {
    /// A cache with the default radius (12), cadence (250), and cap (200).
    pub fn new(key: impl Into<String>, source_tag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_tag: source_tag.into(),
            radius: default_cache_radius(),
            cadence: default_cadence(),
            cap: default_cap(),
            target: TargetFilter::default(),
        }
    }

    /// Set the range in cells.
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the ticks between rebuilds.
    pub fn with_cadence(mut self, cadence: u64) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set the entry cap (0 = unbounded).
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Set the target filter.
    pub fn with_target(mut self, target: TargetFilter) -> Self {
        self.target = target;
        self
    }

    /// Check the record before it is registered.
    pub fn validate(&self) -> SimResult<()> {
        check_name(&self.key)?;
        check_cadence(&self.key, self.cadence)?;
        check_radius(&self.key, self.radius)
    }
}

fn invalid(name: &str, reason: &str) -> SimError {
    SimError::InvalidConfig {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn check_name(name: &str) -> SimResult<()> {
    if name.trim().is_empty() {
        return Err(invalid(name, "name must not be empty"));
    }
    Ok(())
}

fn check_cadence(name: &str, cadence: u64) -> SimResult<()> {
    if cadence == 0 {
        return Err(SimError::ZeroCadence(name.to_string()));
    }
    Ok(())
}

fn check_radius(name: &str, radius: u32) -> SimResult<()> {
    if radius > MAX_RADIUS {
        return Err(invalid(
            name,
            &format!("radius {radius} exceeds the maximum of {MAX_RADIUS}"),
        ));
    }
    Ok(())
}
