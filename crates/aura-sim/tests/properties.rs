//! Property tests for propagation and cache rebuilds.

use aura_core::{Category, EffectKind, Entity, EntityId, FlagStore, GroupId, Map, MapId, Position, TagId};
use aura_sim::spatial::{RadialPattern, radius_squared, within_radius};
use aura_sim::{AffectedSetCache, Affinity, Spread, collect_emitters, propagate};
use proptest::prelude::*;

const EMITTER: TagId = TagId(0);
const GLOW: EffectKind = EffectKind(0);
const SIZE: i32 = 64;

fn arb_pos() -> impl Strategy<Value = (i32, i32)> {
    (0..SIZE, 0..SIZE)
}

fn colony(emitters: &[(i32, i32)], targets: &[(i32, i32)]) -> (Map, Vec<EntityId>, Vec<EntityId>) {
    let mut map = Map::new(MapId(1), SIZE, SIZE);
    let spawn = |map: &mut Map, name: &str, (x, y): (i32, i32), tagged: bool| {
        let mut e = Entity::new(name, Category::Humanlike).at(Position::new(x, y));
        e.group = Some(GroupId(1));
        if tagged {
            e.add_tag(EMITTER);
        }
        map.spawn(e).unwrap()
    };
    let e: Vec<_> = emitters.iter().map(|&p| spawn(&mut map, "emitter", p, true)).collect();
    let t: Vec<_> = targets.iter().map(|&p| spawn(&mut map, "target", p, false)).collect();
    (map, e, t)
}

fn spread(radius: u32, refresh: u64) -> Spread {
    Spread {
        kind: GLOW,
        radius_sq: radius_squared(radius),
        refresh,
        affinity: Affinity::Allies {
            principal_only: true,
        },
    }
}

proptest! {
    #[test]
    fn refresh_sets_exact_value(
        emitters in prop::collection::vec(arb_pos(), 1..4),
        targets in prop::collection::vec(arb_pos(), 1..12),
        radius in 0u32..40,
        refresh in 1u64..100_000,
        elapsed in 0u64..100_000,
    ) {
        let (mut map, _, target_ids) = colony(&emitters, &targets);
        let ids = collect_emitters(&map, EMITTER, &FlagStore::new(), None);
        propagate(&mut map, &ids, |e| !e.has_tag(EMITTER), spread(radius, refresh));
        for &id in &target_ids {
            map.get_mut(id).unwrap().effects.count_down(elapsed);
        }
        propagate(&mut map, &ids, |e| !e.has_tag(EMITTER), spread(radius, refresh));

        for (&id, &(x, y)) in target_ids.iter().zip(&targets) {
            let covered = emitters.iter().any(|&(ex, ey)| {
                within_radius(Position::new(ex, ey), Position::new(x, y), radius_squared(radius))
            });
            let effects = &map.get(id).unwrap().effects;
            if covered {
                prop_assert_eq!(effects.remaining(GLOW), Some(refresh));
                prop_assert_eq!(effects.len(), 1);
            } else {
                // Out of range of every emitter: never attached
                prop_assert!(!effects.contains(GLOW));
            }
        }
    }

    #[test]
    fn propagation_is_idempotent(
        emitters in prop::collection::vec(arb_pos(), 0..4),
        targets in prop::collection::vec(arb_pos(), 0..12),
        radius in 0u32..40,
    ) {
        let (mut map, _, _) = colony(&emitters, &targets);
        let ids = collect_emitters(&map, EMITTER, &FlagStore::new(), None);
        propagate(&mut map, &ids, |_| true, spread(radius, 5000));
        let once: Vec<_> = map.population().map(|e| e.effects.clone()).collect();

        let second = propagate(&mut map, &ids, |_| true, spread(radius, 5000));
        let twice: Vec<_> = map.population().map(|e| e.effects.clone()).collect();
        prop_assert_eq!(once, twice);
        prop_assert!(second.attached.is_empty());
    }

    #[test]
    fn cache_rebuild_is_bounded(
        plants in prop::collection::vec(arb_pos(), 0..120),
        sources in prop::collection::vec(arb_pos(), 1..4),
        radius in 0u32..20,
        cap in 0usize..50,
    ) {
        let mut map = Map::new(MapId(1), SIZE, SIZE);
        for &(x, y) in &plants {
            map.spawn(Entity::new("plant", Category::Plant).at(Position::new(x, y))).unwrap();
        }
        let source_ids: Vec<_> = sources
            .iter()
            .map(|&(x, y)| {
                map.spawn(Entity::new("grower", Category::Humanlike).at(Position::new(x, y)).with_tag(EMITTER))
                    .unwrap()
            })
            .collect();

        let pattern = RadialPattern::new(radius);
        let mut cache = AffectedSetCache::new();
        let is_plant = |e: &Entity| e.category == Category::Plant;
        let outcome = cache.rebuild("plants", &map, &source_ids, &pattern, is_plant, cap);

        if cap > 0 {
            prop_assert!(outcome.entries <= cap);
        }
        let r_sq = radius_squared(radius);
        for id in cache.members("plants").unwrap() {
            let plant = map.get(*id).unwrap();
            prop_assert!(is_plant(plant));
            let in_range = source_ids
                .iter()
                .any(|s| within_radius(map.get(*s).unwrap().position(), plant.position(), r_sq));
            prop_assert!(in_range, "cached plant {} is out of range", id);
        }

        // Uncapped rebuilds find every plant in range
        if cap == 0 {
            let expected = map
                .population()
                .filter(|e| is_plant(*e))
                .filter(|e| source_ids.iter().any(|s| {
                    within_radius(map.get(*s).unwrap().position(), e.position(), r_sq)
                }))
                .count();
            prop_assert_eq!(outcome.entries, expected);
        }
    }
}

#[test]
fn radius_twenty_boundary_scenario() {
    let (mut map, _, targets) = colony(&[(0, 0)], &[(14, 14), (15, 15)]);
    let ids = collect_emitters(&map, EMITTER, &FlagStore::new(), None);
    propagate(&mut map, &ids, |e| !e.has_tag(EMITTER), spread(20, 5000));

    assert_eq!(map.get(targets[0]).unwrap().effects.remaining(GLOW), Some(5000));
    assert!(!map.get(targets[1]).unwrap().has_effect(GLOW));
}
