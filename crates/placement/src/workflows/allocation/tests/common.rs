use std::collections::HashMap;

use crate::workflows::allocation::domain::{FacilityCapacity, FacilityId, Intern, Qualification};
use crate::workflows::allocation::AllocationOutcome;

pub(super) fn intern(name: &str, qualification: &str, sex: &str, university: &str) -> Intern {
    Intern::new(name, qualification)
        .with_sex(sex)
        .with_university(university)
}

/// Mixed roster across three qualifications, two sexes, four universities, and a few
/// records with missing sex or university.
pub(super) fn mixed_roster() -> Vec<Intern> {
    let universities = ["Makerere", "Gulu", "Mbarara", "Busitema"];
    let qualifications = ["MBChB", "BSN", "BDS"];
    let mut roster = Vec::new();

    for position in 0..60 {
        let qualification = qualifications[position % qualifications.len()];
        let sex = if position % 5 < 3 { "F" } else { "M" };
        let university = universities[(position / 3) % universities.len()];
        let mut intern = intern(
            &format!("Intern {position:02}"),
            qualification,
            sex,
            university,
        );
        if position % 17 == 0 {
            intern.sex = None;
        }
        if position % 13 == 0 {
            intern.university = None;
        }
        roster.push(intern);
    }

    roster
}

pub(super) fn mixed_capacities() -> Vec<FacilityCapacity> {
    vec![
        FacilityCapacity::new("Mulago", "MBChB", 6),
        FacilityCapacity::new("Mbarara RRH", "MBChB", 5),
        FacilityCapacity::new("Gulu RRH", "MBChB", 4),
        FacilityCapacity::new("Mulago", "BSN", 7),
        FacilityCapacity::new("Jinja RRH", "BSN", 3),
        FacilityCapacity::new("Mulago", "BSN", 2),
        FacilityCapacity::new("Lira RRH", "BDS", 5),
        FacilityCapacity::new("Arua RRH", "BDS", 0),
    ]
}

pub(super) fn capacity_of(
    capacities: &[FacilityCapacity],
) -> HashMap<(FacilityId, Qualification), u32> {
    let mut totals = HashMap::new();
    for row in capacities {
        *totals
            .entry((row.facility.clone(), row.qualification.clone()))
            .or_insert(0) += row.available_positions;
    }
    totals
}

pub(super) fn placements(outcome: &AllocationOutcome) -> HashMap<(FacilityId, Qualification), u32> {
    let mut counts = HashMap::new();
    for intern in &outcome.roster {
        if let Some(facility) = &intern.assigned_facility {
            *counts
                .entry((facility.clone(), intern.qualification.clone()))
                .or_insert(0) += 1;
        }
    }
    counts
}

pub(super) fn assignments(roster: &[Intern]) -> Vec<Option<FacilityId>> {
    roster
        .iter()
        .map(|intern| intern.assigned_facility.clone())
        .collect()
}
