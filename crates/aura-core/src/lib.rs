//! Core types for Aura: entities, maps, status effects, and the name catalog.
//!
//! This crate defines the data model the affect engine reads and writes. It
//! knows nothing about cadences or families: a [`Map`] owns its entities in a
//! stable iteration order, every entity carries its own [`StatusSet`], and the
//! [`Catalog`] turns tag and effect names into small integer ids once, up front.

/// Name interning for tags and status-effect kinds.
pub mod catalog;
/// Entity types, identifiers, positions, and categories.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Per-entity persisted flags.
pub mod flags;
/// A single spatial map that owns a population of entities.
pub mod map;
/// Query builder for filtering a map's population.
pub mod query;
/// Status-effect instances and the per-entity effect set.
pub mod status;

/// Re-export catalog types.
pub use catalog::{Catalog, TagId};
/// Re-export core entity types.
pub use entity::{Category, Entity, EntityId, GroupId, MapId, Position};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the flag store.
pub use flags::FlagStore;
/// Re-export the map model.
pub use map::Map;
/// Re-export status-effect types.
pub use status::{EffectKind, StatusEffect, StatusSet};
