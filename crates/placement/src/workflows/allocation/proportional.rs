use super::domain::{Intern, Qualification};
use super::ledger::CapacityLedger;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Unplaced interns for one qualification, in sex-bucket order.
pub(crate) type Leftover = (Qualification, Vec<usize>);

/// Greedy, seeded, sex-proportional allocator with a university-diversity tie-break.
///
/// Draw order on the generator is fixed: for every qualification group in
/// first-encountered roster order, each sex bucket is shuffled (sorted key order),
/// then the list of facilities with room left is shuffled.
pub(crate) struct ProportionalAllocator<R> {
    rng: R,
}

struct SexBuckets {
    keys: Vec<String>,
    members: Vec<Vec<usize>>,
}

impl<R: Rng> ProportionalAllocator<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Places every unassigned intern it can and returns the remainder per qualification.
    pub(crate) fn run(&mut self, roster: &mut [Intern], ledger: &mut CapacityLedger) -> Vec<Leftover> {
        let mut leftovers = Vec::new();

        for (qualification, members) in group_unassigned(roster) {
            let remainder = self.allocate_group(roster, ledger, &qualification, &members);
            if !remainder.is_empty() {
                leftovers.push((qualification, remainder));
            }
        }

        leftovers
    }

    fn allocate_group(
        &mut self,
        roster: &mut [Intern],
        ledger: &mut CapacityLedger,
        qualification: &Qualification,
        members: &[usize],
    ) -> Vec<usize> {
        let mut buckets = bucket_by_sex(roster, members);
        for bucket in &mut buckets.members {
            bucket.shuffle(&mut self.rng);
        }

        let group_size = members.len() as f64;
        let ratios: Vec<f64> = buckets
            .members
            .iter()
            .map(|bucket| bucket.len() as f64 / group_size)
            .collect();

        let mut facilities = ledger.available_for(qualification);
        facilities.shuffle(&mut self.rng);

        debug!(
            %qualification,
            interns = members.len(),
            facilities = facilities.len(),
            sexes = ?buckets.keys,
            "allocating qualification group"
        );

        for facility in &facilities {
            let capacity = ledger.remaining(facility, qualification) as usize;
            if capacity == 0 {
                continue;
            }

            let available: Vec<usize> = buckets.members.iter().map(Vec::len).collect();
            let slots = split_slots(capacity, &ratios, &available);
            let chosen = draw_for_facility(roster, &slots, &mut buckets.members);
            for &index in &chosen {
                roster[index].assigned_facility = Some(facility.clone());
            }
            ledger.decrement(facility, qualification, chosen.len() as u32);
        }

        buckets.members.into_iter().flatten().collect()
    }
}

fn group_unassigned(roster: &[Intern]) -> Vec<(Qualification, Vec<usize>)> {
    let mut groups: Vec<(Qualification, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<&Qualification, usize> = HashMap::new();

    for (index, intern) in roster.iter().enumerate() {
        if intern.is_assigned() {
            continue;
        }
        match positions.get(&intern.qualification) {
            Some(&position) => groups[position].1.push(index),
            None => {
                positions.insert(&intern.qualification, groups.len());
                groups.push((intern.qualification.clone(), vec![index]));
            }
        }
    }

    groups
}

fn observed_sex(intern: &Intern) -> Option<&str> {
    intern
        .sex
        .as_deref()
        .map(str::trim)
        .filter(|sex| !sex.is_empty())
}

fn university_key(intern: &Intern) -> Option<&str> {
    intern
        .university
        .as_deref()
        .map(str::trim)
        .filter(|university| !university.is_empty())
}

// Interns without a sex value fall into the first bucket; a group with no observed
// values at all becomes a single bucket.
fn bucket_by_sex(roster: &[Intern], members: &[usize]) -> SexBuckets {
    let observed: BTreeSet<&str> = members
        .iter()
        .filter_map(|&index| observed_sex(&roster[index]))
        .collect();
    let mut keys: Vec<String> = observed.into_iter().map(str::to_string).collect();
    if keys.is_empty() {
        keys.push(String::new());
    }

    let mut buckets = vec![Vec::new(); keys.len()];
    for &index in members {
        let slot = observed_sex(&roster[index])
            .and_then(|sex| keys.iter().position(|key| key == sex))
            .unwrap_or(0);
        buckets[slot].push(index);
    }

    SexBuckets {
        keys,
        members: buckets,
    }
}

/// Splits a facility's capacity across sex buckets. Every bucket but the last gets
/// `round_half_even(capacity * ratio)` capped by undistributed capacity and by the
/// bucket's size; the last bucket takes whatever is left.
pub(crate) fn split_slots(capacity: usize, ratios: &[f64], available: &[usize]) -> Vec<usize> {
    if ratios.len() <= 1 {
        return vec![capacity];
    }

    let last = ratios.len() - 1;
    let mut undistributed = capacity;
    let mut slots = Vec::with_capacity(ratios.len());

    for (position, ratio) in ratios.iter().enumerate() {
        if position == last {
            slots.push(undistributed);
            break;
        }
        let share = (capacity as f64 * ratio).round_ties_even() as usize;
        let share = share.min(undistributed).min(available[position]);
        undistributed -= share;
        slots.push(share);
    }

    slots
}

/// Takes up to `slots[i]` interns from each bucket for one facility, preferring
/// universities the facility has seen least so far.
fn draw_for_facility(roster: &[Intern], slots: &[usize], buckets: &mut [Vec<usize>]) -> Vec<usize> {
    let mut university_counts: HashMap<Option<&str>, usize> = HashMap::new();
    let mut chosen = Vec::new();

    for (bucket, &wanted) in buckets.iter_mut().zip(slots) {
        for _ in 0..wanted {
            if bucket.is_empty() {
                break;
            }

            // Re-sorted before every draw: the counts move after each placement.
            bucket.sort_by_key(|&index| {
                university_counts
                    .get(&university_key(&roster[index]))
                    .copied()
                    .unwrap_or(0)
            });
            let next = bucket.remove(0);

            *university_counts
                .entry(university_key(&roster[next]))
                .or_insert(0) += 1;
            chosen.push(next);
        }
    }

    chosen
}
