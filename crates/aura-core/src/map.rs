use std::collections::HashMap;

use crate::entity::{Entity, EntityId, MapId, Position};
use crate::error::{CoreError, CoreResult};
use crate::query::QueryBuilder;

/// A single spatial map. Owns its entities.
///
/// Iteration order over the population is spawn order and stays stable while
/// entities come and go; families rely on it for first-match binding.
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    width: i32,
    height: i32,
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,

    // Indexes
    cells: HashMap<Position, Vec<EntityId>>,
    next_id: u32,
    free_ids: Vec<EntityId>,
}

impl Map {
    /// Create an empty `width` x `height` map.
    pub fn new(id: MapId, width: i32, height: i32) -> Self {
        Self {
            id,
            width: width.max(0),
            height: height.max(0),
            entities: HashMap::new(),
            order: Vec::new(),
            cells: HashMap::new(),
            next_id: 1,
            free_ids: Vec::new(),
        }
    }

    /// This map's ID.
    pub fn id(&self) -> MapId {
        self.id
    }

    /// Width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns `true` if `pos` lies on the map.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn check_bounds(&self, pos: Position) -> CoreResult<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(CoreError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Place an entity on the map at its current position. Returns its new ID.
    pub fn spawn(&mut self, mut entity: Entity) -> CoreResult<EntityId> {
        self.check_bounds(entity.position)?;

        let id = match self.free_ids.pop() {
            Some(id) => id,
            None => {
                let id = EntityId(self.next_id);
                self.next_id += 1;
                id
            }
        };

        entity.id = id;
        entity.map = Some(self.id);
        entity.spawned = true;
        self.cells.entry(entity.position).or_default().push(id);
        self.order.push(id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Dispose of an entity. Its ID becomes available for reuse.
    ///
    /// State kept outside the map under this ID (such as per-entity flags) is
    /// not touched; hosts holding such state dispose through their own
    /// context so a recycled ID starts clean.
    pub fn despawn(&mut self, id: EntityId) -> CoreResult<Entity> {
        let mut entity = self
            .entities
            .remove(&id)
            .ok_or(CoreError::EntityNotFound(id))?;

        self.order.retain(|eid| *eid != id);
        if entity.spawned {
            self.unindex(id, entity.position);
        }
        self.free_ids.push(id);

        entity.map = None;
        entity.spawned = false;
        Ok(entity)
    }

    /// Take an entity off (or put it back on) the map without disposing it.
    /// Unspawned entities keep their ID and stay in the population.
    pub fn set_spawned(&mut self, id: EntityId, spawned: bool) -> CoreResult<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(CoreError::EntityNotFound(id))?;
        if entity.spawned == spawned {
            return Ok(());
        }
        entity.spawned = spawned;
        let pos = entity.position;
        if spawned {
            self.cells.entry(pos).or_default().push(id);
        } else {
            self.unindex(id, pos);
        }
        Ok(())
    }

    /// Move an entity to another cell.
    pub fn move_to(&mut self, id: EntityId, pos: Position) -> CoreResult<()> {
        self.check_bounds(pos)?;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(CoreError::EntityNotFound(id))?;
        let old = entity.position;
        entity.position = pos;
        if entity.spawned && old != pos {
            self.unindex(id, old);
            self.cells.entry(pos).or_default().push(id);
        }
        Ok(())
    }

    fn unindex(&mut self, id: EntityId, pos: Position) {
        if let Some(ids) = self.cells.get_mut(&pos) {
            ids.retain(|eid| *eid != id);
            if ids.is_empty() {
                self.cells.remove(&pos);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// Get an entity by ID. `None` once it has been disposed.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Find an entity by name (case-insensitive). First match in population order.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        let name_lower = name.to_lowercase();
        self.population()
            .find(|e| e.name.to_lowercase() == name_lower)
    }

    /// Entity IDs in population order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// All entities in population order.
    pub fn population(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// IDs of spawned entities standing on `pos`.
    pub fn entities_at(&self, pos: Position) -> &[EntityId] {
        self.cells.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Start building a query over the population.
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// Number of entities, spawned or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the map holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Category;

    fn test_map() -> Map {
        Map::new(MapId(1), 50, 50)
    }

    fn colonist(name: &str, x: i32, y: i32) -> Entity {
        Entity::new(name, Category::Humanlike).at(Position::new(x, y))
    }

    #[test]
    fn spawn_assigns_ids_and_indexes_cells() {
        let mut map = test_map();
        let a = map.spawn(colonist("Ada", 3, 4)).unwrap();
        let b = map.spawn(colonist("Bo", 3, 4)).unwrap();

        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
        assert_eq!(map.entities_at(Position::new(3, 4)), &[a, b]);

        let ada = map.get(a).unwrap();
        assert!(ada.is_spawned());
        assert_eq!(ada.map_id(), Some(MapId(1)));
    }

    #[test]
    fn spawn_out_of_bounds_rejected() {
        let mut map = test_map();
        let result = map.spawn(colonist("Ada", 50, 0));
        assert!(matches!(result, Err(CoreError::OutOfBounds { .. })));
        assert!(map.is_empty());
    }

    #[test]
    fn ids_reused_only_after_disposal() {
        let mut map = test_map();
        let a = map.spawn(colonist("Ada", 0, 0)).unwrap();
        let b = map.spawn(colonist("Bo", 1, 0)).unwrap();
        assert_ne!(a, b);

        let gone = map.despawn(a).unwrap();
        assert_eq!(gone.map_id(), None);
        assert!(map.get(a).is_none());

        let c = map.spawn(colonist("Cy", 2, 0)).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn population_order_is_spawn_order() {
        let mut map = test_map();
        let a = map.spawn(colonist("Ada", 0, 0)).unwrap();
        let b = map.spawn(colonist("Bo", 1, 0)).unwrap();
        let c = map.spawn(colonist("Cy", 2, 0)).unwrap();
        map.despawn(b).unwrap();

        let names: Vec<_> = map.population().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Cy"]);
        assert_eq!(map.ids(), &[a, c]);
    }

    #[test]
    fn move_updates_cell_index() {
        let mut map = test_map();
        let a = map.spawn(colonist("Ada", 0, 0)).unwrap();
        map.move_to(a, Position::new(5, 5)).unwrap();

        assert!(map.entities_at(Position::new(0, 0)).is_empty());
        assert_eq!(map.entities_at(Position::new(5, 5)), &[a]);
        assert_eq!(map.get(a).unwrap().position(), Position::new(5, 5));
        assert!(map.move_to(a, Position::new(-1, 0)).is_err());
    }

    #[test]
    fn unspawned_entities_leave_the_cell_index() {
        let mut map = test_map();
        let a = map.spawn(colonist("Ada", 2, 2)).unwrap();
        map.set_spawned(a, false).unwrap();

        assert!(map.entities_at(Position::new(2, 2)).is_empty());
        assert!(!map.get(a).unwrap().is_spawned());
        assert_eq!(map.len(), 1);

        map.set_spawned(a, true).unwrap();
        assert_eq!(map.entities_at(Position::new(2, 2)), &[a]);
    }

    #[test]
    fn find_by_name_case_insensitive() {
        let mut map = test_map();
        map.spawn(colonist("Ada Lovelace", 0, 0)).unwrap();
        assert!(map.find_by_name("ada lovelace").is_some());
        assert!(map.find_by_name("nobody").is_none());
    }
}
