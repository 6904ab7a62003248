//! Pure eligibility predicates. Nothing here mutates state.

use aura_core::{Category, EffectKind, Entity, GroupId, TagId};

/// An entity can receive or emit an effect only while alive and spawned.
pub fn target_eligible(entity: &Entity) -> bool {
    entity.is_active()
}

/// Both entities are valid and stand on the same map.
pub fn same_map_active(a: &Entity, b: &Entity) -> bool {
    a.is_active() && b.is_active() && a.map_id() == b.map_id()
}

/// Returns `true` if `a` and `b` are the same entity.
pub fn is_identical(a: &Entity, b: &Entity) -> bool {
    a.id() == b.id() && a.map_id() == b.map_id()
}

/// Whether `target` counts as an ally of `source`.
///
/// Never true for an entity and itself, across maps, or when either side has
/// no group. With `principal_only`, the target must also belong to the
/// principal category.
pub fn is_ally(source: &Entity, target: &Entity, principal_only: bool) -> bool {
    if is_identical(source, target) {
        return false;
    }
    if principal_only && !target.category.is_principal() {
        return false;
    }
    if !same_map_active(source, target) {
        return false;
    }
    matches!((source.group, target.group), (Some(a), Some(b)) if a == b)
}

/// Two distinct allies that both carry `kind`, regardless of category.
pub fn share_effect(a: &Entity, b: &Entity, kind: EffectKind) -> bool {
    is_ally(a, b, false) && a.has_effect(kind) && b.has_effect(kind)
}

/// A resolved target predicate: which entities a family may touch.
///
/// Always requires [`target_eligible`]; every other field narrows further.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetRule {
    /// Required category.
    pub category: Option<Category>,
    /// Required group.
    pub group: Option<GroupId>,
    /// Required tag.
    pub tag: Option<TagId>,
}

impl TargetRule {
    /// A rule accepting every valid entity.
    pub fn any() -> Self {
        Self::default()
    }

    /// A rule accepting valid entities of one category.
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Apply the rule.
    pub fn matches(&self, entity: &Entity) -> bool {
        target_eligible(entity)
            && self.category.is_none_or(|c| entity.category == c)
            && self.group.is_none_or(|g| entity.group == Some(g))
            && self.tag.is_none_or(|t| entity.has_tag(t))
    }
}
