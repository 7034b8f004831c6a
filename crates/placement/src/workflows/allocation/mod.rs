//! Capacity-aware, seeded allocation of interns to training facilities.
//!
//! A run builds a fresh [`CapacityLedger`], pins any locked assignments, then places
//! each qualification group facility by facility so that every facility mirrors the
//! sex mix of the group while spreading universities. Interns that do not fit are
//! returned as [`OverflowGroup`]s for an explicit spread-or-leave decision.

pub mod domain;
mod engine;
pub mod ledger;
mod lock;
mod overflow;
mod proportional;
pub mod report;

#[cfg(test)]
mod tests;

pub use domain::{
    FacilityCapacity, FacilityId, Intern, LockedAssignment, OverflowAction, OverflowGroup,
    PlacementState, Qualification,
};
pub use engine::{
    allocate, resolve_overflow, spread_seed, AllocationEngine, AllocationOutcome,
    OverflowResolution, DEFAULT_SEED,
};
pub use ledger::{CapacityLedger, LedgerEntry};
pub use overflow::OverflowPlan;
pub use report::PlacementReport;
