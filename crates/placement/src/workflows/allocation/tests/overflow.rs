use super::common::*;
use crate::workflows::allocation::domain::{
    FacilityCapacity, FacilityId, Intern, OverflowAction, OverflowGroup, PlacementState,
    Qualification,
};
use crate::workflows::allocation::{
    resolve_overflow, spread_seed, AllocationEngine, OverflowPlan,
};

fn bsn_overflow() -> (Vec<Intern>, OverflowGroup) {
    let roster: Vec<Intern> = (0..5)
        .map(|position| intern(&format!("Nurse {position}"), "BSN", "F", "Makerere"))
        .collect();
    let group = OverflowGroup {
        qualification: Qualification::from("BSN"),
        interns: (0..5).collect(),
        facilities: vec![FacilityId::from("A"), FacilityId::from("B")],
    };
    (roster, group)
}

#[test]
fn spread_assigns_round_robin_over_shuffled_facilities() {
    let (roster, group) = bsn_overflow();
    let plan = OverflowPlan::new(OverflowAction::Spread);

    let resolution = resolve_overflow(roster, &[group], &plan, 42);

    let assigned = assignments(&resolution.roster);
    assert!(assigned.iter().all(Option::is_some));
    assert_ne!(assigned[0], assigned[1]);
    for (position, facility) in assigned.iter().enumerate() {
        assert_eq!(facility, &assigned[position % 2], "position {position} breaks the cycle");
    }
    assert_eq!(
        resolution.warnings,
        vec!["BSN: 5 intern(s) spread evenly beyond capacity".to_string()]
    );
}

#[test]
fn spread_is_deterministic_for_a_seed() {
    let plan = OverflowPlan::new(OverflowAction::Spread);
    let (roster, group) = bsn_overflow();
    let first = resolve_overflow(roster.clone(), &[group.clone()], &plan, 9);
    let second = resolve_overflow(roster, &[group], &plan, 9);

    assert_eq!(assignments(&first.roster), assignments(&second.roster));
}

#[test]
fn leave_unassigned_reports_without_mutation() {
    let (roster, group) = bsn_overflow();

    let resolution = resolve_overflow(roster, &[group], &OverflowPlan::default(), 42);

    assert!(resolution.roster.iter().all(|intern| !intern.is_assigned()));
    assert_eq!(
        resolution.warnings,
        vec!["BSN: 5 intern(s) left unassigned (no capacity)".to_string()]
    );
}

#[test]
fn spread_without_facilities_degrades_to_leave_unassigned() {
    let (roster, mut group) = bsn_overflow();
    group.facilities.clear();

    let resolution = resolve_overflow(roster, &[group], &OverflowPlan::new(OverflowAction::Spread), 42);

    assert!(resolution.roster.iter().all(|intern| !intern.is_assigned()));
    assert_eq!(
        resolution.warnings,
        vec!["BSN: 5 intern(s) left unassigned (no capacity)".to_string()]
    );
}

#[test]
fn plan_applies_per_qualification_actions() {
    let roster = vec![
        intern("A", "BDS", "F", "Makerere"),
        intern("B", "BDS", "M", "Gulu"),
        intern("C", "BDS", "F", "Gulu"),
        intern("D", "BSM", "F", "Mbarara"),
        intern("E", "BSM", "M", "Mbarara"),
    ];
    let capacities = vec![
        FacilityCapacity::new("Lira RRH", "BDS", 1),
        FacilityCapacity::new("Hoima RRH", "BSM", 1),
    ];
    let plan = OverflowPlan::new(OverflowAction::LeaveUnassigned).with("BDS", OverflowAction::Spread);

    let outcome =
        AllocationEngine::new(42).allocate_and_resolve(roster, &capacities, None, &plan);

    let bds: Vec<&Intern> = outcome
        .roster
        .iter()
        .filter(|intern| intern.qualification == Qualification::from("BDS"))
        .collect();
    assert!(bds
        .iter()
        .all(|intern| intern.assigned_facility == Some(FacilityId::from("Lira RRH"))));
    assert_eq!(
        outcome
            .roster
            .iter()
            .filter(|intern| intern.qualification == Qualification::from("BSM"))
            .filter(|intern| intern.is_assigned())
            .count(),
        1
    );
    assert_eq!(
        outcome.warnings,
        vec![
            "BDS: 2 intern(s) spread evenly beyond capacity".to_string(),
            "BSM: 1 intern(s) left unassigned (no capacity)".to_string(),
        ]
    );
}

fn bds_roster() -> Vec<Intern> {
    (0..5)
        .map(|position| {
            let sex = if position % 2 == 0 { "F" } else { "M" };
            intern(&format!("Dentist {position}"), "BDS", sex, "Makerere")
        })
        .collect()
}

fn count_state(states: &[PlacementState], wanted: PlacementState) -> usize {
    states.iter().filter(|state| **state == wanted).count()
}

#[test]
fn leaving_overflow_unassigned_marks_interns_unassigned() {
    let capacities = vec![FacilityCapacity::new("Lira RRH", "BDS", 2)];
    let plan = OverflowPlan::new(OverflowAction::LeaveUnassigned);

    let outcome =
        AllocationEngine::new(42).allocate_and_resolve(bds_roster(), &capacities, None, &plan);

    assert_eq!(
        outcome.warnings,
        vec!["BDS: 3 intern(s) left unassigned (no capacity)".to_string()]
    );
    assert_eq!(outcome.resolved, vec![Qualification::from("BDS")]);
    let states = outcome.states();
    assert_eq!(count_state(&states, PlacementState::Unassigned), 3);
    assert_eq!(count_state(&states, PlacementState::Allocated), 2);
    assert_eq!(count_state(&states, PlacementState::Overflow), 0);
    for (state, intern) in states.iter().zip(&outcome.roster) {
        assert_eq!(*state == PlacementState::Unassigned, !intern.is_assigned());
    }
}

#[test]
fn spread_overflow_is_distinguished_from_regular_allocation() {
    let capacities = vec![FacilityCapacity::new("Lira RRH", "BDS", 2)];
    let plan = OverflowPlan::new(OverflowAction::Spread);

    let outcome =
        AllocationEngine::new(42).allocate_and_resolve(bds_roster(), &capacities, None, &plan);

    let states = outcome.states();
    assert_eq!(count_state(&states, PlacementState::Spread), 3);
    assert_eq!(count_state(&states, PlacementState::Allocated), 2);
    assert!(outcome.roster.iter().all(Intern::is_assigned));
    for group in &outcome.overflow {
        for &index in &group.interns {
            assert_eq!(states[index], PlacementState::Spread);
        }
    }
}

#[test]
fn unresolved_overflow_stays_pending() {
    let capacities = vec![FacilityCapacity::new("Lira RRH", "BDS", 2)];

    let outcome = AllocationEngine::new(42).allocate(bds_roster(), &capacities, None);

    assert!(outcome.resolved.is_empty());
    assert_eq!(count_state(&outcome.states(), PlacementState::Overflow), 3);
}

#[test]
fn resolution_lists_every_handled_qualification() {
    let (roster, group) = bsn_overflow();

    let resolution = resolve_overflow(roster, &[group], &OverflowPlan::default(), 42);

    assert_eq!(resolution.resolved, vec![Qualification::from("BSN")]);
}

#[test]
fn spread_generator_is_distinct_from_allocation_seed() {
    assert_eq!(spread_seed(42), 43);
    assert_eq!(spread_seed(u64::MAX), 0);
}
