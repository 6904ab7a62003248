//! Mirror families: an effect that is present exactly while a tag is.

use aura_core::{Catalog, EffectKind, TagId};
use tracing::debug;

use crate::config::MirrorConfig;
use crate::context::SimContext;
use crate::effects::{ensure_present, remove};
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::predicates::TargetRule;
use crate::system::System;

/// A pass driven by one [`MirrorConfig`].
///
/// Mirrored effects carry no countdown; only this pass removes them.
#[derive(Debug)]
pub struct MirrorFamily {
    name: String,
    tag: Option<TagId>,
    effect: Option<EffectKind>,
    effect_name: String,
    cadence: u64,
    target: TargetRule,
    inert: Option<String>,
}

impl MirrorFamily {
    /// Validate `config` and resolve its names.
    pub fn resolve(config: &MirrorConfig, catalog: &mut Catalog) -> SimResult<Self> {
        config.validate()?;

        let effect = catalog.effect(&config.effect);
        let tag = (!config.tag.trim().is_empty()).then(|| catalog.intern_tag(&config.tag));
        let inert = match (effect, tag) {
            (None, _) => Some(format!("unknown effect \"{}\"", config.effect)),
            (_, None) => Some("no tag configured".to_string()),
            _ => None,
        };

        Ok(Self {
            name: config.name.clone(),
            tag,
            effect,
            effect_name: config.effect.clone(),
            cadence: config.cadence,
            target: config.target.resolve(catalog),
            inert,
        })
    }
}

impl System for MirrorFamily {
    fn name(&self) -> &str {
        &self.name
    }

    fn cadence(&self) -> u64 {
        self.cadence
    }

    fn run(&self, ctx: &mut SimContext<'_>) {
        let (Some(tag), Some(kind)) = (self.tag, self.effect) else {
            return;
        };

        let mut attached = 0;
        let mut removed = 0;
        let ids = ctx.map.ids().to_vec();
        for id in ids {
            let has_tag = match ctx.map.get(id) {
                Some(entity) if self.target.matches(entity) => entity.has_tag(tag),
                _ => continue,
            };

            let name = ctx.entity_name(id);
            if has_tag {
                if ensure_present(ctx.map, id, kind) {
                    attached += 1;
                    ctx.emit(
                        SimEventKind::EffectAttached {
                            entity: id,
                            effect: kind,
                            source: None,
                        },
                        format!("{name} gained {}", self.effect_name),
                    );
                }
            } else if remove(ctx.map, id, kind) {
                removed += 1;
                ctx.emit(
                    SimEventKind::EffectRemoved {
                        entity: id,
                        effect: kind,
                    },
                    format!("{name} lost {}", self.effect_name),
                );
            }
        }

        debug!(mirror = %self.name, tick = ctx.tick, attached, removed, "mirror pass");
    }

    fn inert_reason(&self) -> Option<&str> {
        self.inert.as_deref()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
