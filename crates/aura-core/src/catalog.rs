use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::status::EffectKind;

/// Resolved identifier of a tag (a trait an entity may carry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u32);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag:{}", self.0)
    }
}

/// Interns tag and effect names into small integer IDs.
///
/// Tags are interned on first sight. Effect kinds must be defined explicitly,
/// so that a family naming an effect nobody defined resolves to `None` and can
/// be disabled instead of silently inventing a kind.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tags: Vec<String>,
    tag_index: HashMap<String, TagId>,
    effects: Vec<String>,
    effect_index: HashMap<String, EffectKind>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a tag name, returning its ID. Interning the same name twice
    /// returns the same ID.
    pub fn intern_tag(&mut self, name: &str) -> TagId {
        if let Some(id) = self.tag_index.get(name) {
            return *id;
        }
        let id = TagId(self.tags.len() as u32);
        self.tags.push(name.to_string());
        self.tag_index.insert(name.to_string(), id);
        id
    }

    /// Look up a tag without interning it.
    pub fn tag(&self, name: &str) -> Option<TagId> {
        self.tag_index.get(name).copied()
    }

    /// Look up a tag, failing if it was never interned.
    pub fn require_tag(&self, name: &str) -> CoreResult<TagId> {
        self.tag(name)
            .ok_or_else(|| CoreError::UnknownTag(name.to_string()))
    }

    /// The name behind a tag ID.
    pub fn tag_name(&self, id: TagId) -> Option<&str> {
        self.tags.get(id.0 as usize).map(String::as_str)
    }

    /// Define an effect kind. Defining the same name twice returns the same kind.
    pub fn define_effect(&mut self, name: &str) -> EffectKind {
        if let Some(kind) = self.effect_index.get(name) {
            return *kind;
        }
        let kind = EffectKind(self.effects.len() as u32);
        self.effects.push(name.to_string());
        self.effect_index.insert(name.to_string(), kind);
        kind
    }

    /// Look up a defined effect kind.
    pub fn effect(&self, name: &str) -> Option<EffectKind> {
        self.effect_index.get(name).copied()
    }

    /// Look up an effect kind, failing if it was never defined.
    pub fn require_effect(&self, name: &str) -> CoreResult<EffectKind> {
        self.effect(name)
            .ok_or_else(|| CoreError::UnknownEffect(name.to_string()))
    }

    /// The name behind an effect kind.
    pub fn effect_name(&self, kind: EffectKind) -> Option<&str> {
        self.effects.get(kind.0 as usize).map(String::as_str)
    }

    /// Iterate defined effect kinds with their names, in definition order.
    pub fn effects(&self) -> impl Iterator<Item = (EffectKind, &str)> {
        self.effects
            .iter()
            .enumerate()
            .map(|(i, name)| (EffectKind(i as u32), name.as_str()))
    }

    /// Number of interned tags.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Number of defined effect kinds.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }
}
