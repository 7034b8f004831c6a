use super::domain::{Intern, LockedAssignment};
use super::ledger::CapacityLedger;
use std::collections::BTreeSet;
use tracing::debug;

/// Clears every assignment on the roster, then pins the locked subset and debits the
/// ledger for each pinned intern. Returns the locked roster positions in ascending order.
///
/// Entries pointing outside the roster or carrying a blank facility are skipped; a
/// repeated position is applied once.
pub(crate) fn apply_locks(
    roster: &mut [Intern],
    locked: &[LockedAssignment],
    ledger: &mut CapacityLedger,
) -> Vec<usize> {
    for intern in roster.iter_mut() {
        intern.assigned_facility = None;
    }

    let mut pinned = BTreeSet::new();
    for assignment in locked {
        let Some(intern) = roster.get_mut(assignment.row) else {
            debug!(row = assignment.row, "locked row outside roster, skipping");
            continue;
        };
        let Some(facility) = assignment.pinned_facility() else {
            continue;
        };
        if !pinned.insert(assignment.row) {
            continue;
        }

        ledger.decrement(&facility, &intern.qualification, 1);
        intern.assigned_facility = Some(facility);
    }

    pinned.into_iter().collect()
}
