//! Affected-set caches: which entities stand near a tagged source.
//!
//! Sets are rebuilt wholesale on a cadence and read in O(1) in between. A
//! disposed or departed entity can stay in a set until the next rebuild.

use std::collections::{HashMap, HashSet};

use aura_core::{Catalog, Entity, EntityId, Map, TagId};
use tracing::debug;

use crate::config::CacheConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::predicates::TargetRule;
use crate::propagation::collect_emitters;
use crate::spatial::RadialPattern;
use crate::system::System;

/// Per-map sets of affected entity IDs, keyed by cache name.
#[derive(Debug, Clone, Default)]
pub struct AffectedSetCache {
    sets: HashMap<String, HashSet<EntityId>>,
}

/// Result of one rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildOutcome {
    /// Entries in the set afterwards.
    pub entries: usize,
    /// Whether the rebuild stopped at the cap.
    pub capped: bool,
}

impl AffectedSetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was in the `key` set at its last rebuild.
    /// A key that was never built reads as empty.
    pub fn is_affected(&self, key: &str, id: EntityId) -> bool {
        self.sets.get(key).is_some_and(|set| set.contains(&id))
    }

    /// The members of `key`, if it was ever built.
    pub fn members(&self, key: &str) -> Option<&HashSet<EntityId>> {
        self.sets.get(key)
    }

    /// Number of entries in `key`.
    pub fn entries(&self, key: &str) -> usize {
        self.sets.get(key).map_or(0, HashSet::len)
    }

    /// Keys of every set built so far.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Clear `key` and refill it from scratch.
    ///
    /// For each active source in order, cells in `pattern` are walked nearest
    /// first and every entity standing there that passes `target` is added.
    /// Only new additions count toward `cap`; once it is reached the rebuild
    /// stops. A `cap` of zero means no limit.
    pub fn rebuild(
        &mut self,
        key: &str,
        map: &Map,
        sources: &[EntityId],
        pattern: &RadialPattern,
        target: impl Fn(&Entity) -> bool,
        cap: usize,
    ) -> RebuildOutcome {
        let set = self.sets.entry(key.to_string()).or_default();
        set.clear();

        let limit = if cap == 0 { usize::MAX } else { cap };
        let mut capped = false;

        'sources: for &source_id in sources {
            let Some(source) = map.get(source_id) else {
                continue;
            };
            if !source.is_active() {
                continue;
            }
            for cell in pattern.cells_around(source.position(), map) {
                for &id in map.entities_at(cell) {
                    let Some(entity) = map.get(id) else {
                        continue;
                    };
                    if !target(entity) {
                        continue;
                    }
                    if set.insert(id) && set.len() >= limit {
                        capped = true;
                        break 'sources;
                    }
                }
            }
        }

        RebuildOutcome {
            entries: set.len(),
            capped,
        }
    }
}

/// A pass that rebuilds one cache on its cadence.
#[derive(Debug)]
pub struct CacheFamily {
    key: String,
    source_tag: Option<TagId>,
    pattern: RadialPattern,
    cadence: u64,
    cap: usize,
    target: TargetRule,
    inert: Option<String>,
}

impl CacheFamily {
    /// Validate `config` and resolve its names.
    pub fn resolve(config: &CacheConfig, catalog: &mut Catalog) -> SimResult<Self> {
        config.validate()?;
        let (source_tag, inert) = if config.source_tag.trim().is_empty() {
            (None, Some("no source tag configured".to_string()))
        } else {
            (Some(catalog.intern_tag(&config.source_tag)), None)
        };
        Ok(Self {
            key: config.key.clone(),
            source_tag,
            pattern: RadialPattern::new(config.radius),
            cadence: config.cadence,
            cap: config.cap,
            target: config.target.resolve(catalog),
            inert,
        })
    }

    /// The cache key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl System for CacheFamily {
    fn name(&self) -> &str {
        &self.key
    }

    fn cadence(&self) -> u64 {
        self.cadence
    }

    fn run(&self, ctx: &mut SimContext<'_>) {
        let Some(tag) = self.source_tag else {
            return;
        };
        let sources = collect_emitters(ctx.map, tag, ctx.flags, None);
        let outcome = ctx.cache.rebuild(
            &self.key,
            ctx.map,
            &sources,
            &self.pattern,
            |e| self.target.matches(e),
            self.cap,
        );

        debug!(
            cache = %self.key,
            tick = ctx.tick,
            sources = sources.len(),
            entries = outcome.entries,
            capped = outcome.capped,
            "cache rebuilt"
        );
        ctx.emit(
            SimEventKind::CacheRebuilt {
                key: self.key.clone(),
                entries: outcome.entries,
                capped: outcome.capped,
            },
            format!(
                "{} rebuilt with {} entries{}",
                self.key,
                outcome.entries,
                if outcome.capped { " (capped)" } else { "" }
            ),
        );
    }

    fn inert_reason(&self) -> Option<&str> {
        self.inert.as_deref()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
