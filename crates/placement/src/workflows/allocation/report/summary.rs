use super::super::domain::{FacilityCapacity, FacilityId, Intern, Qualification};
use super::views::{
    CountEntry, CrosstabRow, FillRateEntry, PlacementReportSummary, PlacementTotals,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const UNKNOWN_LABEL: &str = "Unknown";

/// Placement analytics over a finished roster.
#[derive(Debug, Default, Clone)]
pub struct PlacementReport {
    pub total: usize,
    pub assigned: usize,
    pub crosstab: BTreeMap<FacilityId, BTreeMap<Qualification, usize>>,
    pub by_qualification: HashMap<String, usize>,
    pub by_sex: HashMap<String, usize>,
    pub by_university: HashMap<String, usize>,
    pub capacity_by_facility: BTreeMap<FacilityId, u32>,
}

impl PlacementReport {
    pub fn build(roster: &[Intern], capacities: &[FacilityCapacity]) -> Self {
        let mut report = Self {
            total: roster.len(),
            ..Self::default()
        };

        for row in capacities {
            let entry = report
                .capacity_by_facility
                .entry(row.facility.clone())
                .or_insert(0);
            *entry = entry.saturating_add(row.available_positions);
        }

        for intern in roster {
            let Some(facility) = &intern.assigned_facility else {
                continue;
            };
            report.assigned += 1;

            *report
                .crosstab
                .entry(facility.clone())
                .or_default()
                .entry(intern.qualification.clone())
                .or_insert(0) += 1;
            *report
                .by_qualification
                .entry(intern.qualification.to_string())
                .or_insert(0) += 1;
            *report.by_sex.entry(label_or_unknown(&intern.sex)).or_insert(0) += 1;
            *report
                .by_university
                .entry(label_or_unknown(&intern.university))
                .or_insert(0) += 1;
        }

        report
    }

    pub fn unassigned(&self) -> usize {
        self.total - self.assigned
    }

    pub fn assigned_to(&self, facility: &FacilityId) -> usize {
        self.crosstab
            .get(facility)
            .map_or(0, |counts| counts.values().sum())
    }

    pub fn summary(&self, generated_on: NaiveDate) -> PlacementReportSummary {
        let qualifications: Vec<Qualification> = self
            .crosstab
            .values()
            .flat_map(|counts| counts.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let crosstab: Vec<CrosstabRow> = self
            .crosstab
            .iter()
            .map(|(facility, counts)| {
                let counts: Vec<usize> = qualifications
                    .iter()
                    .map(|qualification| counts.get(qualification).copied().unwrap_or(0))
                    .collect();
                CrosstabRow {
                    facility: facility.to_string(),
                    total: counts.iter().sum(),
                    counts,
                }
            })
            .collect();

        let column_totals: Vec<usize> = (0..qualifications.len())
            .map(|column| crosstab.iter().map(|row| row.counts[column]).sum())
            .collect();

        PlacementReportSummary {
            generated_on,
            totals: PlacementTotals {
                total: self.total,
                assigned: self.assigned,
                unassigned: self.unassigned(),
            },
            qualifications: qualifications.iter().map(ToString::to_string).collect(),
            grand_total: column_totals.iter().sum(),
            crosstab,
            column_totals,
            by_qualification: ranked(&self.by_qualification),
            by_sex: ranked(&self.by_sex),
            by_university: ranked(&self.by_university),
            fill_rates: self.fill_rates(),
        }
    }

    fn fill_rates(&self) -> Vec<FillRateEntry> {
        let facilities: BTreeSet<&FacilityId> = self
            .capacity_by_facility
            .keys()
            .chain(self.crosstab.keys())
            .collect();

        facilities
            .into_iter()
            .map(|facility| {
                let assigned = self.assigned_to(facility);
                let capacity = self
                    .capacity_by_facility
                    .get(facility)
                    .copied()
                    .unwrap_or(0);
                let fill_rate_pct =
                    (capacity > 0).then(|| assigned as f64 / capacity as f64 * 100.0);
                FillRateEntry {
                    facility: facility.to_string(),
                    assigned,
                    capacity,
                    fill_rate_pct,
                    over_capacity: assigned > capacity as usize,
                }
            })
            .collect()
    }
}

fn label_or_unknown(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}

fn ranked(counts: &HashMap<String, usize>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .iter()
        .map(|(label, &count)| CountEntry {
            label: label.clone(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(name: &str, qualification: &str, sex: &str, facility: &str) -> Intern {
        let mut intern = Intern::new(name, qualification).with_sex(sex);
        intern.assigned_facility = Some(FacilityId::from(facility));
        intern
    }

    fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
    }

    #[test]
    fn summary_builds_crosstab_with_margins() {
        let roster = vec![
            placed("A", "MBChB", "F", "Mulago"),
            placed("B", "BSN", "M", "Mulago"),
            placed("C", "MBChB", "F", "Arua"),
            Intern::new("D", "BDS"),
        ];
        let capacities = vec![
            FacilityCapacity::new("Mulago", "MBChB", 1),
            FacilityCapacity::new("Mulago", "BSN", 1),
            FacilityCapacity::new("Arua", "MBChB", 4),
        ];

        let summary = PlacementReport::build(&roster, &capacities).summary(report_date());

        assert_eq!(summary.totals.total, 4);
        assert_eq!(summary.totals.assigned, 3);
        assert_eq!(summary.totals.unassigned, 1);
        assert_eq!(summary.qualifications, vec!["BSN", "MBChB"]);
        assert_eq!(summary.crosstab[0].facility, "Arua");
        assert_eq!(summary.crosstab[0].counts, vec![0, 1]);
        assert_eq!(summary.crosstab[1].counts, vec![1, 1]);
        assert_eq!(summary.column_totals, vec![1, 2]);
        assert_eq!(summary.grand_total, 3);
        assert_eq!(summary.by_sex[0], CountEntry { label: "F".to_string(), count: 2 });
        assert_eq!(summary.by_university[0].label, "Unknown");
    }

    #[test]
    fn fill_rate_flags_spread_beyond_capacity() {
        let roster = vec![
            placed("A", "BDS", "F", "Lira"),
            placed("B", "BDS", "M", "Lira"),
            placed("C", "BDS", "M", "Lira"),
        ];
        let capacities = vec![
            FacilityCapacity::new("Lira", "BDS", 2),
            FacilityCapacity::new("Soroti", "BDS", 0),
        ];

        let summary = PlacementReport::build(&roster, &capacities).summary(report_date());

        let lira = &summary.fill_rates[0];
        assert_eq!(lira.facility, "Lira");
        assert_eq!(lira.fill_rate_pct, Some(150.0));
        assert!(lira.over_capacity);
        let soroti = &summary.fill_rates[1];
        assert_eq!(soroti.fill_rate_pct, None);
        assert!(!soroti.over_capacity);
    }
}
