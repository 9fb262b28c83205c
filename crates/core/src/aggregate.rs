//! Aggregate root trait for snapshot-based domain models.

/// Aggregate root marker + minimal interface.
///
/// Intentionally small so domain modules can decide how they model state
/// transitions (pure functions, delta application, etc.) without bringing in
/// any infrastructure concerns.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Corresponds to the number of deltas applied to the snapshot; the
    /// external transaction boundary uses it for optimistic concurrency.
    fn version(&self) -> u64;
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` returns deltas.
/// - **State mutation**: `apply(&mut self, delta)` evolves state.
///
/// Aggregates must not perform IO or side effects. `handle` validates every
/// precondition before the first delta is produced, so a failed command
/// leaves no partial change to observe.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Delta: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single delta.
    ///
    /// Implementations should remain deterministic and should update their
    /// internal `version()` tracking consistently (+1 per applied delta).
    fn apply(&mut self, delta: &Self::Delta);

    /// Decide which deltas to emit given the current state and a command.
    ///
    /// This must not mutate state. State evolution is done through `apply`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Delta>, Self::Error>;
}
