//! The propagation engine: emitters spread a timed effect to nearby targets.

use aura_core::{Catalog, EffectKind, Entity, EntityId, FlagStore, Map, TagId};
use tracing::debug;

use crate::config::{Affinity, FamilyConfig};
use crate::context::SimContext;
use crate::effects::{Refresh, ensure_and_refresh};
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::predicates::{TargetRule, is_ally, same_map_active};
use crate::spatial::candidates_within;
use crate::system::System;

/// Active entities carrying `tag`, in population order.
///
/// With a `toggle` flag, emitters that switched it off explicitly are left
/// out.
pub fn collect_emitters(
    map: &Map,
    tag: TagId,
    flags: &FlagStore,
    toggle: Option<&str>,
) -> Vec<EntityId> {
    map.query()
        .tag(tag)
        .active()
        .execute()
        .into_iter()
        .filter(|e| toggle.is_none_or(|key| flags.is_enabled(e.id(), key)))
        .map(Entity::id)
        .collect()
}

/// What one propagation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    /// `(target, emitter)` pairs where the effect was newly attached.
    pub attached: Vec<(EntityId, EntityId)>,
    /// Targets whose existing effect had its countdown reset.
    pub refreshed: usize,
}

/// Shared knobs of one propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    /// Effect to attach.
    pub kind: EffectKind,
    /// Squared range.
    pub radius_sq: i64,
    /// Remaining duration written on every hit.
    pub refresh: u64,
    /// Ally-only or any-entity mode.
    pub affinity: Affinity,
}

/// Refresh `spread.kind` on every target covered by at least one emitter.
///
/// Targets are visited in population order. For each target passing
/// `target`, emitters are scanned in the given order and the first one that
/// is valid, in range, and compatible under the affinity binds; later
/// emitters are not consulted. Unmatched targets are left alone.
pub fn propagate(
    map: &mut Map,
    emitters: &[EntityId],
    target: impl Fn(&Entity) -> bool,
    spread: Spread,
) -> PropagationOutcome {
    let mut outcome = PropagationOutcome::default();
    if emitters.is_empty() {
        return outcome;
    }

    let targets = map.ids().to_vec();
    for target_id in targets {
        let source = {
            let Some(entity) = map.get(target_id) else {
                continue;
            };
            if !target(entity) {
                continue;
            }
            find_emitter(map, emitters, entity, spread)
        };
        let Some(source) = source else {
            continue;
        };

        match ensure_and_refresh(map, target_id, Some(spread.kind), spread.refresh) {
            Refresh::Attached => outcome.attached.push((target_id, source)),
            Refresh::Refreshed => outcome.refreshed += 1,
            Refresh::Skipped => {}
        }
    }
    outcome
}

fn find_emitter(map: &Map, emitters: &[EntityId], target: &Entity, spread: Spread) -> Option<EntityId> {
    let sources = emitters.iter().filter_map(|&id| map.get(id));
    candidates_within(target.position(), spread.radius_sq, sources)
        .filter(|source| source.is_active())
        .find(|source| match spread.affinity {
            Affinity::Allies { principal_only } => is_ally(source, target, principal_only),
            Affinity::Any => same_map_active(source, target),
        })
        .map(Entity::id)
}

/// A pass driven by one [`FamilyConfig`].
#[derive(Debug)]
pub struct PropagationFamily {
    name: String,
    emitter_tag: Option<TagId>,
    effect: Option<EffectKind>,
    effect_name: String,
    radius_sq: i64,
    cadence: u64,
    refresh: u64,
    target: TargetRule,
    affinity: Affinity,
    toggle: Option<String>,
    inert: Option<String>,
}

impl PropagationFamily {
    /// Validate `config` and resolve its names.
    ///
    /// An unknown effect does not fail registration; the family is kept but
    /// stays inert.
    pub fn resolve(config: &FamilyConfig, catalog: &mut Catalog) -> SimResult<Self> {
        config.validate()?;

        let effect = catalog.effect(&config.effect);
        let emitter_tag = (!config.emitter_tag.trim().is_empty())
            .then(|| catalog.intern_tag(&config.emitter_tag));
        let inert = if effect.is_none() {
            Some(format!("unknown effect \"{}\"", config.effect))
        } else if emitter_tag.is_none() {
            Some("no emitter tag configured".to_string())
        } else {
            None
        };

        Ok(Self {
            name: config.name.clone(),
            emitter_tag,
            effect,
            effect_name: config.effect.clone(),
            radius_sq: config.radius_sq(),
            cadence: config.cadence,
            refresh: config.refresh,
            target: config.target.resolve(catalog),
            affinity: config.affinity,
            toggle: config.toggle.clone(),
            inert,
        })
    }

    /// The resolved effect, if known.
    pub fn effect(&self) -> Option<EffectKind> {
        self.effect
    }
}

impl System for PropagationFamily {
    fn name(&self) -> &str {
        &self.name
    }

    fn cadence(&self) -> u64 {
        self.cadence
    }

    fn run(&self, ctx: &mut SimContext<'_>) {
        let (Some(tag), Some(kind)) = (self.emitter_tag, self.effect) else {
            return;
        };

        let emitters = collect_emitters(ctx.map, tag, ctx.flags, self.toggle.as_deref());
        let spread = Spread {
            kind,
            radius_sq: self.radius_sq,
            refresh: self.refresh,
            affinity: self.affinity,
        };
        let outcome = propagate(ctx.map, &emitters, |e| self.target.matches(e), spread);

        debug!(
            family = %self.name,
            tick = ctx.tick,
            emitters = emitters.len(),
            attached = outcome.attached.len(),
            refreshed = outcome.refreshed,
            "propagation pass"
        );

        for (target, source) in outcome.attached {
            let description = format!(
                "{} gained {} from {}",
                ctx.entity_name(target),
                self.effect_name,
                ctx.entity_name(source)
            );
            ctx.emit(
                SimEventKind::EffectAttached {
                    entity: target,
                    effect: kind,
                    source: Some(source),
                },
                description,
            );
        }
    }

    fn inert_reason(&self) -> Option<&str> {
        self.inert.as_deref()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
