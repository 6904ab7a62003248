//! Attach, refresh, and detach status effects on map entities.
//!
//! Every operation here is a silent no-op on an invalid target; callers never
//! need to check first.

use aura_core::{EffectKind, EntityId, Map, StatusEffect};
use tracing::trace;

use crate::predicates::target_eligible;

/// What [`ensure_and_refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The effect was absent and is now attached.
    Attached,
    /// The effect was present; its countdown was reset.
    Refreshed,
    /// Target invalid or kind unresolved. Nothing changed.
    Skipped,
}

impl Refresh {
    /// Returns `true` unless the call was skipped.
    pub fn applied(self) -> bool {
        self != Self::Skipped
    }
}

/// Make sure `target` carries `kind` with exactly `refresh` ticks remaining.
///
/// The countdown is overwritten, never extended: calling this twice in a row
/// leaves `refresh` ticks, not twice that.
pub fn ensure_and_refresh(
    map: &mut Map,
    target: EntityId,
    kind: Option<EffectKind>,
    refresh: u64,
) -> Refresh {
    let Some(kind) = kind else {
        return Refresh::Skipped;
    };
    let Some(entity) = map.get_mut(target) else {
        return Refresh::Skipped;
    };
    if !target_eligible(entity) {
        return Refresh::Skipped;
    }

    let (effect, attached) = entity.effects.ensure(kind);
    *effect = StatusEffect::timed(kind, refresh);
    trace!(%target, %kind, refresh, attached, "effect refreshed");
    if attached {
        Refresh::Attached
    } else {
        Refresh::Refreshed
    }
}

/// Attach `kind` without a countdown. Returns `true` if it was newly attached.
pub fn ensure_present(map: &mut Map, target: EntityId, kind: EffectKind) -> bool {
    let Some(entity) = map.get_mut(target) else {
        return false;
    };
    if !target_eligible(entity) {
        return false;
    }
    let (_, attached) = entity.effects.ensure(kind);
    if attached {
        trace!(%target, %kind, "effect attached");
    }
    attached
}

/// Detach `kind` from `target`. Returns `true` if it was present.
pub fn remove(map: &mut Map, target: EntityId, kind: EffectKind) -> bool {
    let removed = map
        .get_mut(target)
        .and_then(|entity| entity.effects.remove(kind))
        .is_some();
    if removed {
        trace!(%target, %kind, "effect removed");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{Category, Entity, MapId, Position};

    const GLOW: EffectKind = EffectKind(0);

    fn one_entity() -> (Map, EntityId) {
        let mut map = Map::new(MapId(1), 10, 10);
        let id = map
            .spawn(Entity::new("Ada", Category::Humanlike).at(Position::new(1, 1)))
            .unwrap();
        (map, id)
    }

    #[test]
    fn attach_then_refresh_sets_exact_value() {
        let (mut map, id) = one_entity();
        assert_eq!(ensure_and_refresh(&mut map, id, Some(GLOW), 5000), Refresh::Attached);

        map.get_mut(id).unwrap().effects.count_down(1200);
        assert_eq!(map.get(id).unwrap().effects.remaining(GLOW), Some(3800));

        assert_eq!(ensure_and_refresh(&mut map, id, Some(GLOW), 5000), Refresh::Refreshed);
        assert_eq!(map.get(id).unwrap().effects.remaining(GLOW), Some(5000));
        assert_eq!(map.get(id).unwrap().effects.len(), 1);
    }

    #[test]
    fn refresh_can_shorten_a_longer_countdown() {
        let (mut map, id) = one_entity();
        ensure_and_refresh(&mut map, id, Some(GLOW), 9000);
        ensure_and_refresh(&mut map, id, Some(GLOW), 100);
        assert_eq!(map.get(id).unwrap().effects.remaining(GLOW), Some(100));
    }

    #[test]
    fn invalid_targets_are_skipped() {
        let (mut map, id) = one_entity();
        assert_eq!(ensure_and_refresh(&mut map, id, None, 10), Refresh::Skipped);
        assert_eq!(ensure_and_refresh(&mut map, EntityId(99), Some(GLOW), 10), Refresh::Skipped);

        map.set_spawned(id, false).unwrap();
        assert!(!ensure_and_refresh(&mut map, id, Some(GLOW), 10).applied());
        assert!(!ensure_present(&mut map, id, GLOW));
        assert!(!map.get(id).unwrap().has_effect(GLOW));
    }

    #[test]
    fn present_then_remove() {
        let (mut map, id) = one_entity();
        assert!(ensure_present(&mut map, id, GLOW));
        assert!(!ensure_present(&mut map, id, GLOW));
        assert_eq!(map.get(id).unwrap().effects.remaining(GLOW), None);

        assert!(remove(&mut map, id, GLOW));
        assert!(!remove(&mut map, id, GLOW));
        assert!(!remove(&mut map, EntityId(99), GLOW));
    }
}
