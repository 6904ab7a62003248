//! Cadence-driven spatial affect propagation over [`aura_core`] maps.
//!
//! Passes are registered once and then stepped per map: propagation families
//! spread timed status effects from tagged emitters to nearby targets, mirror
//! families keep an effect in step with a tag, caches remember which entities
//! stand near a tagged source, and an optional countdown expires effects that
//! stop being refreshed. All per-map state lives in a [`MapContext`].

/// Affected-set caches and the pass that rebuilds them.
pub mod cache;
/// Simulation clock.
pub mod clock;
/// Configuration records for runs, families, mirrors, and caches.
pub mod config;
/// Mutable context passed to passes.
pub mod context;
/// The countdown pass that expires timed effects.
pub mod decay;
/// Attach, refresh, and detach status effects.
pub mod effects;
/// Pass registration and per-map dispatch.
pub mod engine;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Mirror families.
pub mod mirror;
/// Eligibility predicates.
pub mod predicates;
/// The propagation engine and its family pass.
pub mod propagation;
/// TOML scenario files.
pub mod scenario;
/// Cadence counters and per-map context.
pub mod scheduler;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Radius tests and radial cell patterns.
pub mod spatial;
/// The trait that all passes implement.
pub mod system;

pub use cache::{AffectedSetCache, CacheFamily};
pub use clock::SimClock;
pub use config::{Affinity, CacheConfig, FamilyConfig, MirrorConfig, SimConfig, TargetFilter};
pub use context::SimContext;
pub use decay::EffectDecay;
pub use engine::{Engine, PassSummary};
pub use error::{SimError, SimResult};
pub use event::{EventLog, SimEvent, SimEventKind};
pub use mirror::MirrorFamily;
pub use propagation::{PropagationFamily, Spread, collect_emitters, propagate};
pub use scenario::Scenario;
pub use scheduler::{MapContext, TickScheduler};
pub use simulation::Simulation;
pub use system::System;
