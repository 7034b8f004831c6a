use super::domain::{
    FacilityCapacity, Intern, LockedAssignment, OverflowGroup, PlacementState, Qualification,
};
use super::ledger::CapacityLedger;
use super::lock::apply_locks;
use super::overflow::{OverflowPlan, OverflowResolver};
use super::proportional::ProportionalAllocator;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

pub const DEFAULT_SEED: u64 = 42;

/// Seed of the generator used for spreading overflow. Kept distinct from the
/// allocation seed so the two phases never replay the same sequence.
pub fn spread_seed(seed: u64) -> u64 {
    seed.wrapping_add(1)
}

/// Result of one allocation call. `warnings` and `resolved` stay empty until overflow
/// is resolved.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub roster: Vec<Intern>,
    pub warnings: Vec<String>,
    pub overflow: Vec<OverflowGroup>,
    /// Qualifications whose overflow group has been spread or left unassigned.
    pub resolved: Vec<Qualification>,
    pub locked: Vec<usize>,
    pub ledger: CapacityLedger,
}

impl AllocationOutcome {
    /// Overflow interns stay `Overflow` until their group is resolved; afterwards they
    /// are `Spread` when placed and `Unassigned` otherwise.
    pub fn states(&self) -> Vec<PlacementState> {
        let locked: HashSet<usize> = self.locked.iter().copied().collect();
        let overflow: HashMap<usize, &Qualification> = self
            .overflow
            .iter()
            .flat_map(|group| {
                group
                    .interns
                    .iter()
                    .map(move |&index| (index, &group.qualification))
            })
            .collect();

        self.roster
            .iter()
            .enumerate()
            .map(|(index, intern)| {
                if locked.contains(&index) {
                    PlacementState::Locked
                } else if let Some(qualification) = overflow.get(&index) {
                    if !self.resolved.contains(qualification) {
                        PlacementState::Overflow
                    } else if intern.is_assigned() {
                        PlacementState::Spread
                    } else {
                        PlacementState::Unassigned
                    }
                } else if intern.is_assigned() {
                    PlacementState::Allocated
                } else {
                    PlacementState::Unassigned
                }
            })
            .collect()
    }

    pub fn overflow_count(&self) -> usize {
        self.overflow.iter().map(OverflowGroup::count).sum()
    }

    pub fn has_overflow(&self) -> bool {
        !self.overflow.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverflowResolution {
    pub roster: Vec<Intern>,
    pub warnings: Vec<String>,
    pub resolved: Vec<Qualification>,
}

/// Entry point for allocation runs. Holds only the seed; every call builds its own
/// ledger and generators, so an engine can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationEngine {
    seed: u64,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl AllocationEngine {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Resets the roster to the locked subset, then allocates everyone else.
    pub fn allocate(
        &self,
        mut roster: Vec<Intern>,
        capacities: &[FacilityCapacity],
        locked: Option<&[LockedAssignment]>,
    ) -> AllocationOutcome {
        let mut ledger = CapacityLedger::from_capacities(capacities);
        let locked = apply_locks(&mut roster, locked.unwrap_or_default(), &mut ledger);

        let mut allocator = ProportionalAllocator::new(ChaCha20Rng::seed_from_u64(self.seed));
        let leftovers = allocator.run(&mut roster, &mut ledger);

        let overflow: Vec<OverflowGroup> = leftovers
            .into_iter()
            .map(|(qualification, interns)| OverflowGroup {
                facilities: ledger.facilities_accepting(&qualification),
                qualification,
                interns,
            })
            .collect();

        let outcome = AllocationOutcome {
            roster,
            warnings: Vec::new(),
            overflow,
            resolved: Vec::new(),
            locked,
            ledger,
        };

        info!(
            seed = self.seed,
            interns = outcome.roster.len(),
            locked = outcome.locked.len(),
            overflow = outcome.overflow_count(),
            "allocation complete"
        );

        outcome
    }

    pub fn resolve_overflow(
        &self,
        mut roster: Vec<Intern>,
        overflow: &[OverflowGroup],
        plan: &OverflowPlan,
    ) -> OverflowResolution {
        let mut resolver = OverflowResolver::new(ChaCha20Rng::seed_from_u64(spread_seed(self.seed)));
        let warnings = resolver.resolve(&mut roster, overflow, plan);
        let resolved = overflow
            .iter()
            .map(|group| group.qualification.clone())
            .collect();
        OverflowResolution {
            roster,
            warnings,
            resolved,
        }
    }

    /// Allocates and immediately applies the overflow plan, folding its warnings into
    /// the outcome.
    pub fn allocate_and_resolve(
        &self,
        roster: Vec<Intern>,
        capacities: &[FacilityCapacity],
        locked: Option<&[LockedAssignment]>,
        plan: &OverflowPlan,
    ) -> AllocationOutcome {
        let mut outcome = self.allocate(roster, capacities, locked);
        if outcome.has_overflow() {
            let resolution =
                self.resolve_overflow(std::mem::take(&mut outcome.roster), &outcome.overflow, plan);
            outcome.roster = resolution.roster;
            outcome.warnings = resolution.warnings;
            outcome.resolved = resolution.resolved;
        }
        outcome
    }
}

pub fn allocate(
    roster: Vec<Intern>,
    capacities: &[FacilityCapacity],
    seed: u64,
    locked: Option<&[LockedAssignment]>,
) -> AllocationOutcome {
    AllocationEngine::new(seed).allocate(roster, capacities, locked)
}

pub fn resolve_overflow(
    roster: Vec<Intern>,
    overflow: &[OverflowGroup],
    plan: &OverflowPlan,
    seed: u64,
) -> OverflowResolution {
    AllocationEngine::new(seed).resolve_overflow(roster, overflow, plan)
}
