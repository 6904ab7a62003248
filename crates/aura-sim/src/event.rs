use aura_core::{EffectKind, EntityId, MapId};
use serde::Serialize;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEventKind {
    // Effects
    /// A family attached an effect that was not present.
    EffectAttached {
        /// The entity that received the effect.
        entity: EntityId,
        /// The attached effect.
        effect: EffectKind,
        /// The emitter it was bound to, if any.
        source: Option<EntityId>,
    },
    /// A mirror removed an effect whose tag is gone.
    EffectRemoved {
        /// The entity that lost the effect.
        entity: EntityId,
        /// The removed effect.
        effect: EffectKind,
    },
    /// The countdown of a timed effect ran out.
    EffectExpired {
        /// The entity that lost the effect.
        entity: EntityId,
        /// The expired effect.
        effect: EffectKind,
    },

    // Caches
    /// An affected-set cache was rebuilt.
    CacheRebuilt {
        /// The cache key.
        key: String,
        /// Entries after the rebuild.
        entries: usize,
        /// Whether the rebuild stopped at the cap.
        capped: bool,
    },

    // Scheduling
    /// A pass could not run because its configuration is unresolved.
    PassSkipped {
        /// The pass name.
        pass: String,
        /// Why it is inert.
        reason: String,
    },

    // Custom
    /// A user-defined event.
    Custom {
        /// A label identifying the custom event type.
        label: String,
        /// The entities involved in this custom event.
        entities: Vec<EntityId>,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::EffectAttached { entity, source, .. } => {
                *entity == id || *source == Some(id)
            }
            Self::EffectRemoved { entity, .. } | Self::EffectExpired { entity, .. } => {
                *entity == id
            }
            Self::CacheRebuilt { .. } | Self::PassSkipped { .. } => false,
            Self::Custom { entities, .. } => entities.contains(&id),
        }
    }

    /// Short name of the variant, for tables and filters.
    pub fn label(&self) -> &str {
        match self {
            Self::EffectAttached { .. } => "attached",
            Self::EffectRemoved { .. } => "removed",
            Self::EffectExpired { .. } => "expired",
            Self::CacheRebuilt { .. } => "cache",
            Self::PassSkipped { .. } => "skipped",
            Self::Custom { label, .. } => label,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The map it happened on.
    pub map: MapId,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event.
    pub fn new(tick: u64, map: MapId, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            map,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events on `map` involving the given entity.
    pub fn events_for_entity(&self, map: MapId, id: EntityId) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.map == map && e.kind.involves(id))
            .collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: MapId = MapId(1);

    fn attached(entity: u32, source: u32) -> SimEventKind {
        SimEventKind::EffectAttached {
            entity: EntityId(entity),
            effect: EffectKind(0),
            source: Some(EntityId(source)),
        }
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(1, MAP, attached(2, 1), "test"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_for_entity(MAP, EntityId(2)).len(), 1);
        assert!(log.events_for_entity(MapId(2), EntityId(2)).is_empty());
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for i in 0..5 {
            log.push(SimEvent::new(i, MAP, attached(2, 1), "test"));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn event_kind_involves_entity() {
        let kind = attached(2, 1);
        assert!(kind.involves(EntityId(1)));
        assert!(kind.involves(EntityId(2)));
        assert!(!kind.involves(EntityId(3)));

        let kind = SimEventKind::EffectExpired {
            entity: EntityId(4),
            effect: EffectKind(0),
        };
        assert!(kind.involves(EntityId(4)));
        assert!(!kind.involves(EntityId(1)));

        let kind = SimEventKind::CacheRebuilt {
            key: "plants".into(),
            entries: 3,
            capped: false,
        };
        assert!(!kind.involves(EntityId(1)));

        let kind = SimEventKind::Custom {
            label: "test".into(),
            entities: vec![EntityId(1), EntityId(2)],
        };
        assert!(kind.involves(EntityId(2)));
        assert_eq!(kind.label(), "test");
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(1, MAP, attached(2, 1), "test"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn event_log_unlimited_capacity() {
        let mut log = EventLog::new(0);
        for i in 0..1000 {
            log.push(SimEvent::new(i, MAP, attached(2, 1), "test"));
        }
        assert_eq!(log.len(), 1000);
    }
}
