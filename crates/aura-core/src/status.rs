use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolved identifier of a status-effect kind.
///
/// Produced by [`Catalog::define_effect`](crate::catalog::Catalog::define_effect);
/// hot loops compare these instead of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectKind(pub u32);

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// One status-effect instance attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Which effect this is.
    pub kind: EffectKind,
    /// Ticks until the host countdown removes it. `None` never expires.
    pub remaining: Option<u64>,
}

impl StatusEffect {
    /// An effect without a countdown.
    pub fn permanent(kind: EffectKind) -> Self {
        Self {
            kind,
            remaining: None,
        }
    }

    /// An effect that expires after `ticks`.
    pub fn timed(kind: EffectKind, ticks: u64) -> Self {
        Self {
            kind,
            remaining: Some(ticks),
        }
    }
}

/// The status effects attached to a single entity.
///
/// Holds at most one instance per [`EffectKind`]; attaching is idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet {
    effects: Vec<StatusEffect>,
}

impl StatusSet {
    /// Get the instance of `kind`, if attached.
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Get the instance of `kind` mutably, if attached.
    pub fn get_mut(&mut self, kind: EffectKind) -> Option<&mut StatusEffect> {
        self.effects.iter_mut().find(|e| e.kind == kind)
    }

    /// Returns `true` if an instance of `kind` is attached.
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    /// Remaining ticks of `kind`, if attached and timed.
    pub fn remaining(&self, kind: EffectKind) -> Option<u64> {
        self.get(kind).and_then(|e| e.remaining)
    }

    /// Return the instance of `kind`, attaching a permanent one if absent.
    /// The flag is `true` when a new instance was attached.
    pub fn ensure(&mut self, kind: EffectKind) -> (&mut StatusEffect, bool) {
        let (idx, attached) = match self.effects.iter().position(|e| e.kind == kind) {
            Some(idx) => (idx, false),
            None => {
                self.effects.push(StatusEffect::permanent(kind));
                (self.effects.len() - 1, true)
            }
        };
        (&mut self.effects[idx], attached)
    }

    /// Detach the instance of `kind`. Returns it if it was attached.
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        let idx = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(idx))
    }

    /// Count every timed effect down by `elapsed` ticks and detach the ones
    /// that reach zero. Returns the detached kinds in attachment order.
    pub fn count_down(&mut self, elapsed: u64) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|e| match e.remaining.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(elapsed);
                if *left == 0 {
                    expired.push(e.kind);
                    false
                } else {
                    true
                }
            }
            None => true,
        });
        expired
    }

    /// Iterate attached effects in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Number of attached effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AURA: EffectKind = EffectKind(1);
    const DAMPENER: EffectKind = EffectKind(2);

    #[test]
    fn ensure_is_idempotent() {
        let mut set = StatusSet::default();
        let (_, attached) = set.ensure(AURA);
        assert!(attached);
        let (_, attached) = set.ensure(AURA);
        assert!(!attached);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ensure_returns_existing_instance() {
        let mut set = StatusSet::default();
        set.ensure(AURA).0.remaining = Some(10);
        let (effect, _) = set.ensure(AURA);
        assert_eq!(effect.remaining, Some(10));
    }

    #[test]
    fn remove_detaches() {
        let mut set = StatusSet::default();
        set.ensure(AURA);
        assert!(set.remove(AURA).is_some());
        assert!(set.remove(AURA).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn count_down_expires_timed_only() {
        let mut set = StatusSet::default();
        set.ensure(AURA).0.remaining = Some(2);
        set.ensure(DAMPENER);

        assert!(set.count_down(1).is_empty());
        assert_eq!(set.remaining(AURA), Some(1));

        assert_eq!(set.count_down(1), vec![AURA]);
        assert!(!set.contains(AURA));
        assert!(set.contains(DAMPENER));
    }

    #[test]
    fn timed_and_permanent_constructors() {
        assert_eq!(StatusEffect::timed(AURA, 5).remaining, Some(5));
        assert_eq!(StatusEffect::permanent(AURA).remaining, None);
    }

    #[test]
    fn count_down_saturates() {
        let mut set = StatusSet::default();
        set.ensure(AURA).0.remaining = Some(3);
        assert_eq!(set.count_down(250), vec![AURA]);
    }

    proptest::proptest! {
        #[test]
        fn one_instance_per_kind(kinds in proptest::collection::vec(0u32..6, 0..40)) {
            let mut set = StatusSet::default();
            for k in &kinds {
                set.ensure(EffectKind(*k));
            }
            let mut distinct = kinds.clone();
            distinct.sort_unstable();
            distinct.dedup();
            proptest::prop_assert_eq!(set.len(), distinct.len());
        }
    }
}
