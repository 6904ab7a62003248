use crate::catalog::TagId;
use crate::entity::{Category, Entity, EntityId, GroupId};
use crate::map::Map;
use crate::status::EffectKind;

/// A builder for filtering a map's population.
///
/// Results keep population order; nothing is sorted.
pub struct QueryBuilder<'m> {
    map: &'m Map,
    tag_filters: Vec<TagId>,
    category: Option<Category>,
    group: Option<GroupId>,
    effect: Option<EffectKind>,
    active_only: bool,
    limit: Option<usize>,
}

impl<'m> QueryBuilder<'m> {
    /// Start a query over `map`.
    pub fn new(map: &'m Map) -> Self {
        Self {
            map,
            tag_filters: Vec::new(),
            category: None,
            group: None,
            effect: None,
            active_only: false,
            limit: None,
        }
    }

    /// Filter to entities carrying a tag. Repeatable; all must match.
    pub fn tag(mut self, tag: TagId) -> Self {
        self.tag_filters.push(tag);
        self
    }

    /// Filter by category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Filter by group.
    pub fn group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Filter to entities that currently carry an effect.
    pub fn with_effect(mut self, kind: EffectKind) -> Self {
        self.effect = Some(kind);
        self
    }

    /// Only alive, spawned entities.
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Execute the query and return matching entities.
    pub fn execute(self) -> Vec<&'m Entity> {
        let limit = self.limit.unwrap_or(usize::MAX);
        self.map
            .population()
            .filter(|e| self.matches(e))
            .take(limit)
            .collect()
    }

    /// Execute the query and return matching IDs.
    pub fn ids(self) -> Vec<EntityId> {
        self.execute().into_iter().map(Entity::id).collect()
    }

    /// Count matching entities without collecting them.
    pub fn count(self) -> usize {
        self.map.population().filter(|e| self.matches(e)).count()
    }

    fn matches(&self, entity: &Entity) -> bool {
        if self.active_only && !entity.is_active() {
            return false;
        }

        // Tag filters (all must match)
        if !self.tag_filters.iter().all(|t| entity.has_tag(*t)) {
            return false;
        }

        if self.category.is_some_and(|c| entity.category != c) {
            return false;
        }

        if self.group.is_some_and(|g| entity.group != Some(g)) {
            return false;
        }

        if self.effect.is_some_and(|k| !entity.has_effect(k)) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{MapId, Position};

    const KNIGHT: TagId = TagId(0);
    const HEALER: TagId = TagId(1);

    fn test_map() -> Map {
        let mut map = Map::new(MapId(1), 20, 20);

        map.spawn(
            Entity::new("Kael", Category::Humanlike)
                .in_group(GroupId(1))
                .with_tag(KNIGHT),
        )
        .unwrap();
        map.spawn(
            Entity::new("Elara", Category::Humanlike)
                .in_group(GroupId(1))
                .with_tag(KNIGHT)
                .with_tag(HEALER)
                .at(Position::new(1, 1)),
        )
        .unwrap();
        map.spawn(Entity::new("Muffalo", Category::Animal).at(Position::new(2, 2)))
            .unwrap();

        map
    }

    #[test]
    fn query_by_tag() {
        let map = test_map();
        assert_eq!(map.query().tag(KNIGHT).count(), 2);
        let both = map.query().tag(KNIGHT).tag(HEALER).execute();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Elara");
    }

    #[test]
    fn query_by_category_and_group() {
        let map = test_map();
        assert_eq!(map.query().category(Category::Animal).count(), 1);
        assert_eq!(map.query().group(GroupId(1)).count(), 2);
        assert_eq!(map.query().group(GroupId(9)).count(), 0);
    }

    #[test]
    fn query_keeps_population_order_and_limit() {
        let map = test_map();
        let names: Vec<_> = map.query().execute().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Kael", "Elara", "Muffalo"]);
        assert_eq!(map.query().limit(2).ids(), vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn query_active_skips_dead_and_unspawned() {
        let mut map = test_map();
        map.get_mut(EntityId(1)).unwrap().alive = false;
        map.set_spawned(EntityId(3), false).unwrap();
        assert_eq!(map.query().active().ids(), vec![EntityId(2)]);
    }

    #[test]
    fn query_with_effect() {
        let mut map = test_map();
        map.get_mut(EntityId(3)).unwrap().effects.ensure(EffectKind(0));
        assert_eq!(map.query().with_effect(EffectKind(0)).ids(), vec![EntityId(3)]);
    }
}
