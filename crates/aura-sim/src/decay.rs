//! Host countdown: timed effects lose their remaining duration over time.

use tracing::trace;

use crate::context::SimContext;
use crate::event::SimEventKind;
use crate::system::System;

/// Counts every timed effect down by its cadence and detaches expired ones.
///
/// Families only ever set remaining durations; this pass is what makes an
/// unrefreshed effect go away.
#[derive(Debug)]
pub struct EffectDecay {
    cadence: u64,
}

impl EffectDecay {
    /// Pass name.
    pub const NAME: &'static str = "effect_decay";

    /// A countdown running every `cadence` ticks (at least one).
    pub fn new(cadence: u64) -> Self {
        Self {
            cadence: cadence.max(1),
        }
    }
}

impl System for EffectDecay {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cadence(&self) -> u64 {
        self.cadence
    }

    fn run(&self, ctx: &mut SimContext<'_>) {
        let ids = ctx.map.ids().to_vec();
        for id in ids {
            let expired = match ctx.map.get_mut(id) {
                Some(entity) => entity.effects.count_down(self.cadence),
                None => continue,
            };
            for kind in expired {
                trace!(entity = %id, effect = %kind, "effect expired");
                let description = format!("{}'s {} wore off", ctx.entity_name(id), ctx.effect_name(kind));
                ctx.emit(SimEventKind::EffectExpired { entity: id, effect: kind }, description);
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
