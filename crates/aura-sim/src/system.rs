use crate::context::SimContext;

/// A periodic pass over one map.
///
/// Passes run in registration order, each only on ticks where it is due.
/// A pass cannot fail: anything it cannot act on is skipped.
pub trait System: std::fmt::Debug {
    /// Unique name for this pass.
    fn name(&self) -> &str;

    /// Ticks between runs. Never zero.
    fn cadence(&self) -> u64;

    /// Run the pass once.
    fn run(&self, ctx: &mut SimContext<'_>);

    /// Why this pass can never do anything, if so. Checked once at
    /// registration and reported once per map.
    fn inert_reason(&self) -> Option<&str> {
        None
    }

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;
}
