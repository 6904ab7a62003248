use std::collections::BTreeMap;
use std::path::Path;

use aura_core::{Catalog, Category, Entity, EntityId, GroupId};
use serde::Serialize;

#[derive(Serialize)]
struct EffectView<'a> {
    effect: &'a str,
    remaining: Option<u64>,
}

#[derive(Serialize)]
struct EntityView<'a> {
    id: EntityId,
    name: &'a str,
    category: Category,
    x: i32,
    y: i32,
    group: Option<GroupId>,
    alive: bool,
    spawned: bool,
    tags: Vec<&'a str>,
    effects: Vec<EffectView<'a>>,
}

impl<'a> EntityView<'a> {
    fn new(entity: &'a Entity, catalog: &'a Catalog) -> Self {
        Self {
            id: entity.id(),
            name: &entity.name,
            category: entity.category,
            x: entity.position().x,
            y: entity.position().y,
            group: entity.group,
            alive: entity.alive,
            spawned: entity.is_spawned(),
            tags: entity
                .tags
                .iter()
                .filter_map(|t| catalog.tag_name(*t))
                .collect(),
            effects: entity
                .effects
                .iter()
                .map(|e| EffectView {
                    effect: catalog.effect_name(e.kind).unwrap_or("?"),
                    remaining: e.remaining,
                })
                .collect(),
        }
    }
}

pub fn run(path: &Path, ticks: u64, output: Option<&Path>) -> Result<(), String> {
    let (scenario, mut sim) = super::load(path)?;
    sim.run(ticks);

    let map_id = scenario.map_id();
    let map = sim
        .map(map_id)
        .ok_or_else(|| format!("map {map_id} missing after run"))?;
    let ctx = sim
        .context(map_id)
        .ok_or_else(|| format!("map {map_id} has no context"))?;

    let entities: Vec<_> = map
        .population()
        .map(|e| EntityView::new(e, sim.catalog()))
        .collect();
    let caches: BTreeMap<&str, Vec<EntityId>> = ctx
        .cache()
        .keys()
        .map(|key| {
            let mut ids: Vec<_> = ctx
                .cache()
                .members(key)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            ids.sort_unstable();
            (key, ids)
        })
        .collect();

    let export = serde_json::json!({
        "tick": sim.current_tick(),
        "map": {
            "id": map_id,
            "width": map.width(),
            "height": map.height(),
        },
        "entities": entities,
        "caches": caches,
        "flags": ctx.flags(),
        "events": sim.events().events(),
    });

    let mut content = serde_json::to_string_pretty(&export)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    content.push('\n');
    super::emit(&content, output)
}
