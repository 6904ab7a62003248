use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::TagId;
use crate::status::{EffectKind, StatusSet};

/// Identifier of an entity on a map.
///
/// Unique among the map's live entities. An ID is only handed out again after
/// the entity that held it has been disposed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Placeholder carried by entities that have not been spawned yet.
    pub const UNASSIGNED: EntityId = EntityId(0);

    /// Returns `true` if this is a real, map-assigned ID.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map-{}", self.0)
    }
}

/// Allegiance of an entity. Entities without a group are nobody's ally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

/// Integer cell coordinate on a map.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position from its two coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared horizontal distance to `other`. Exact, no square root.
    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// The position shifted by the given offsets.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Broad category of an entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// People. The principal category for ally-only families.
    Humanlike,
    /// Non-humanlike creatures.
    Animal,
    /// Plants and crops.
    Plant,
    /// Anything else (items, buildings, fires).
    #[default]
    Other,
}

impl Category {
    /// The category ally-only families restrict themselves to.
    pub const PRINCIPAL: Category = Category::Humanlike;

    /// Returns `true` for the principal category.
    pub fn is_principal(self) -> bool {
        self == Self::PRINCIPAL
    }

    /// Parse a category from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "humanlike" => Some(Self::Humanlike),
            "animal" => Some(Self::Animal),
            "plant" => Some(Self::Plant),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Humanlike => write!(f, "humanlike"),
            Self::Animal => write!(f, "animal"),
            Self::Plant => write!(f, "plant"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// An entity living on a map.
///
/// Identity, map membership, position, and the spawned flag are owned by the
/// [`Map`](crate::map::Map) so that its cell index can never drift; everything
/// else is freely mutable by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) map: Option<MapId>,
    pub(crate) position: Position,
    pub(crate) spawned: bool,
    /// Display name.
    pub name: String,
    /// Allegiance, if any.
    pub group: Option<GroupId>,
    /// Whether the entity is alive. Dead entities neither emit nor receive.
    pub alive: bool,
    /// Broad category.
    pub category: Category,
    /// Resolved tags (traits) carried by the entity.
    pub tags: Vec<TagId>,
    /// Status effects currently attached.
    pub effects: StatusSet,
}

impl Entity {
    /// Create an alive, unspawned entity at the origin.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            map: None,
            position: Position::default(),
            spawned: false,
            name: name.into(),
            group: None,
            alive: true,
            category,
            tags: Vec::new(),
            effects: StatusSet::default(),
        }
    }

    /// Set the position the entity will be spawned at.
    pub fn at(mut self, pos: Position) -> Self {
        self.position = pos;
        self
    }

    /// Set the entity's group.
    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: TagId) -> Self {
        self.add_tag(tag);
        self
    }

    /// The entity's ID. [`EntityId::UNASSIGNED`] until spawned.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The map the entity belongs to, if any.
    pub fn map_id(&self) -> Option<MapId> {
        self.map
    }

    /// Current cell.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the entity is placed on its map.
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// Alive, spawned, and owned by a map.
    pub fn is_active(&self) -> bool {
        self.alive && self.spawned && self.map.is_some()
    }

    /// Returns `true` if the entity carries `tag`.
    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }

    /// Add a tag. Adding a tag twice is a no-op.
    pub fn add_tag(&mut self, tag: TagId) {
        if !self.has_tag(tag) {
            self.tags.push(tag);
        }
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: TagId) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        self.tags.len() != before
    }

    /// Returns `true` if an instance of `kind` is attached.
    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.contains(kind)
    }
}
