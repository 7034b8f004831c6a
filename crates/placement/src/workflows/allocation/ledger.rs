use super::domain::{FacilityCapacity, FacilityId, Qualification};
use std::collections::HashMap;

/// Remaining and initial capacity for one (facility, qualification) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub facility: FacilityId,
    pub qualification: Qualification,
    pub initial: u32,
    pub remaining: u32,
}

/// Per-call capacity bookkeeping. Entries keep the order in which their pair was
/// first seen in the capacity rows, which fixes the pre-shuffle facility order.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    entries: Vec<LedgerEntry>,
    index: HashMap<(FacilityId, Qualification), usize>,
}

impl CapacityLedger {
    pub fn from_capacities(capacities: &[FacilityCapacity]) -> Self {
        let mut ledger = Self::default();

        for row in capacities {
            let key = (row.facility.clone(), row.qualification.clone());
            match ledger.index.get(&key) {
                Some(&position) => {
                    let entry = &mut ledger.entries[position];
                    entry.initial = entry.initial.saturating_add(row.available_positions);
                    entry.remaining = entry.initial;
                }
                None => {
                    ledger.index.insert(key, ledger.entries.len());
                    ledger.entries.push(LedgerEntry {
                        facility: row.facility.clone(),
                        qualification: row.qualification.clone(),
                        initial: row.available_positions,
                        remaining: row.available_positions,
                    });
                }
            }
        }

        ledger
    }

    fn entry(&self, facility: &FacilityId, qualification: &Qualification) -> Option<&LedgerEntry> {
        self.index
            .get(&(facility.clone(), qualification.clone()))
            .map(|&position| &self.entries[position])
    }

    /// Remaining slots, zero for unknown pairs.
    pub fn remaining(&self, facility: &FacilityId, qualification: &Qualification) -> u32 {
        self.entry(facility, qualification)
            .map_or(0, |entry| entry.remaining)
    }

    pub fn initial(&self, facility: &FacilityId, qualification: &Qualification) -> u32 {
        self.entry(facility, qualification)
            .map_or(0, |entry| entry.initial)
    }

    /// Debits a pair, clamping at zero. Unknown pairs are ignored: locked rows may
    /// reference facilities that no longer offer the qualification.
    pub fn decrement(&mut self, facility: &FacilityId, qualification: &Qualification, count: u32) {
        if let Some(&position) = self.index.get(&(facility.clone(), qualification.clone())) {
            let entry = &mut self.entries[position];
            entry.remaining = entry.remaining.saturating_sub(count);
        }
    }

    /// Facilities with room left for the qualification, in first-seen order.
    pub fn available_for(&self, qualification: &Qualification) -> Vec<FacilityId> {
        self.entries
            .iter()
            .filter(|entry| &entry.qualification == qualification && entry.remaining > 0)
            .map(|entry| entry.facility.clone())
            .collect()
    }

    /// Facilities offering any positions for the qualification, in first-seen order.
    pub fn facilities_accepting(&self, qualification: &Qualification) -> Vec<FacilityId> {
        self.entries
            .iter()
            .filter(|entry| &entry.qualification == qualification && entry.initial > 0)
            .map(|entry| entry.facility.clone())
            .collect()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn total_remaining(&self) -> u64 {
        self.entries.iter().map(|entry| entry.remaining as u64).sum()
    }
}
