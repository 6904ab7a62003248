use aura_core::{Catalog, Map, MapId};
use tracing::{debug, warn};

use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::scheduler::MapContext;
use crate::system::System;

/// A registered pass, as reported to tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    /// Pass name.
    pub name: String,
    /// Ticks between runs.
    pub cadence: u64,
    /// Why the pass is inert, if it is.
    pub inert: Option<String>,
}

/// The registered passes and their dispatch order.
///
/// Hosts that own their maps drive this directly through
/// [`Engine::on_simulation_step`]; [`Simulation`](crate::Simulation) wraps it
/// for hosts that do not.
#[derive(Debug, Default)]
pub struct Engine {
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    /// An engine with no passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass. Passes run in registration order.
    pub fn register(&mut self, system: Box<dyn System>) -> SimResult<()> {
        if system.cadence() == 0 {
            return Err(SimError::ZeroCadence(system.name().to_string()));
        }
        if self.systems.iter().any(|s| s.name() == system.name()) {
            return Err(SimError::DuplicatePass(system.name().to_string()));
        }
        if let Some(reason) = system.inert_reason() {
            warn!(pass = system.name(), reason, "pass registered but inert");
        }
        debug!(
            pass = system.name(),
            cadence = system.cadence(),
            slot = self.systems.len(),
            "pass registered"
        );
        self.systems.push(system);
        Ok(())
    }

    /// Fresh per-map state for a map about to be stepped by this engine.
    pub fn new_map_context(&self, map: MapId) -> MapContext {
        MapContext::new(map)
    }

    /// Step one map at `tick`: run every due pass in order.
    ///
    /// Returns the number of passes that ran.
    pub fn on_simulation_step(
        &self,
        map: &mut Map,
        ctx: &mut MapContext,
        catalog: &Catalog,
        tick: u64,
        events: &mut EventLog,
    ) -> usize {
        if ctx.map_id() != map.id() {
            warn!(map = %map.id(), context = %ctx.map_id(), "map context belongs to another map");
            return 0;
        }

        let mut ran = 0;
        for (slot, system) in self.systems.iter().enumerate() {
            if !ctx.scheduler.poll(slot, tick, system.cadence()) {
                continue;
            }

            if let Some(reason) = system.inert_reason() {
                if ctx.mark_reported(slot) {
                    events.push(SimEvent::new(
                        tick,
                        map.id(),
                        SimEventKind::PassSkipped {
                            pass: system.name().to_string(),
                            reason: reason.to_string(),
                        },
                        format!("{} skipped: {reason}", system.name()),
                    ));
                }
                continue;
            }

            let mut sim_ctx = SimContext {
                map: &mut *map,
                cache: &mut ctx.cache,
                flags: &ctx.flags,
                catalog,
                events: &mut *events,
                tick,
            };
            system.run(&mut sim_ctx);
            ran += 1;
        }
        ran
    }

    /// Names of the registered passes, in dispatch order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|s| s.name())
    }

    /// Name, cadence, and inert reason of every pass, in dispatch order.
    pub fn summaries(&self) -> Vec<PassSummary> {
        self.systems
            .iter()
            .map(|s| PassSummary {
                name: s.name().to_string(),
                cadence: s.cadence(),
                inert: s.inert_reason().map(str::to_string),
            })
            .collect()
    }

    /// Access a pass by downcasting to a concrete type.
    pub fn get<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no passes are registered.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Logs its own name every time it runs.
    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        cadence: u64,
        inert: Option<&'static str>,
    }

    impl Recorder {
        fn new(name: &'static str, cadence: u64) -> Self {
            Self {
                name,
                cadence,
                inert: None,
            }
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn cadence(&self) -> u64 {
            self.cadence
        }

        fn run(&self, ctx: &mut SimContext<'_>) {
            ctx.emit(
                SimEventKind::Custom {
                    label: self.name.to_string(),
                    entities: Vec::new(),
                },
                self.name,
            );
        }

        fn inert_reason(&self) -> Option<&str> {
            self.inert
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn ran_at(events: &EventLog, tick: u64) -> Vec<&str> {
        events
            .events()
            .iter()
            .filter(|e| e.tick == tick)
            .filter_map(|e| match &e.kind {
                SimEventKind::Custom { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn due_passes_run_in_registration_order() {
        let mut engine = Engine::new();
        engine.register(Box::new(Recorder::new("mirror", 1))).unwrap();
        engine.register(Box::new(Recorder::new("presence", 2))).unwrap();
        engine.register(Box::new(Recorder::new("plants", 1))).unwrap();

        let catalog = Catalog::new();
        let mut map = Map::new(MapId(1), 5, 5);
        let mut ctx = engine.new_map_context(map.id());
        let mut events = EventLog::new(100);

        let ran: Vec<usize> = (1..=4)
            .map(|tick| engine.on_simulation_step(&mut map, &mut ctx, &catalog, tick, &mut events))
            .collect();

        assert_eq!(ran, vec![3, 2, 3, 2]);
        for tick in [1, 3] {
            assert_eq!(ran_at(&events, tick), vec!["mirror", "presence", "plants"]);
        }
        for tick in [2, 4] {
            assert_eq!(ran_at(&events, tick), vec!["mirror", "plants"]);
        }
        let names: Vec<_> = engine.pass_names().collect();
        assert_eq!(names, vec!["mirror", "presence", "plants"]);
    }

    #[test]
    fn context_of_another_map_runs_nothing() {
        let mut engine = Engine::new();
        engine.register(Box::new(Recorder::new("mirror", 1))).unwrap();

        let catalog = Catalog::new();
        let mut map = Map::new(MapId(1), 5, 5);
        let mut ctx = engine.new_map_context(MapId(2));
        let mut events = EventLog::new(100);

        assert_eq!(engine.on_simulation_step(&mut map, &mut ctx, &catalog, 1, &mut events), 0);
        assert!(events.is_empty());
        // The pass is still due for its own map
        assert_eq!(ctx.scheduler().next_due(0), 0);
    }

    #[test]
    fn inert_pass_is_reported_once_per_map() {
        let mut engine = Engine::new();
        engine
            .register(Box::new(Recorder {
                inert: Some("unknown effect \"chill\""),
                ..Recorder::new("chill", 10)
            }))
            .unwrap();
        engine.register(Box::new(Recorder::new("mirror", 10))).unwrap();

        let catalog = Catalog::new();
        let mut home = Map::new(MapId(1), 5, 5);
        let mut away = Map::new(MapId(2), 5, 5);
        let mut home_ctx = engine.new_map_context(home.id());
        let mut away_ctx = engine.new_map_context(away.id());
        let mut events = EventLog::new(100);

        for tick in [1, 11, 21] {
            let ran = engine.on_simulation_step(&mut home, &mut home_ctx, &catalog, tick, &mut events);
            assert_eq!(ran, 1);
        }
        engine.on_simulation_step(&mut away, &mut away_ctx, &catalog, 1, &mut events);

        let skipped: Vec<_> = events
            .events()
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::PassSkipped { .. }))
            .collect();
        assert_eq!(skipped.len(), 2);
        assert_eq!((skipped[0].tick, skipped[0].map), (1, MapId(1)));
        assert_eq!((skipped[1].tick, skipped[1].map), (1, MapId(2)));
        assert_eq!(skipped[0].description, "chill skipped: unknown effect \"chill\"");
        // The inert pass keeps its cadence even though it never runs
        assert_eq!(home_ctx.scheduler().next_due(0), 31);
        assert_eq!(ran_at(&events, 21), vec!["mirror"]);
    }

    #[test]
    fn register_rejects_zero_cadence_and_duplicates() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.register(Box::new(Recorder::new("idle", 0))),
            Err(SimError::ZeroCadence(_))
        ));
        engine.register(Box::new(Recorder::new("mirror", 5))).unwrap();
        assert!(matches!(
            engine.register(Box::new(Recorder::new("mirror", 7))),
            Err(SimError::DuplicatePass(_))
        ));

        assert_eq!(engine.len(), 1);
        assert_eq!(
            engine.summaries(),
            vec![PassSummary {
                name: "mirror".to_string(),
                cadence: 5,
                inert: None,
            }]
        );
        assert_eq!(engine.get::<Recorder>().map(|r| r.cadence), Some(5));
    }
}
