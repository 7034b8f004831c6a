use crate::workflows::allocation::Intern;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

pub const SCHEDULE_COLUMNS: [&str; 10] = [
    "Row",
    "Name",
    "Sex",
    "Qualification",
    "University",
    "Year of Completion",
    "National Identification Number",
    "Nationality",
    "Assigned Health Facility",
    "Locked",
];

#[derive(Debug, thiserror::Error)]
pub enum ScheduleExportError {
    #[error("failed to write schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode schedule CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes a roster as a schedule CSV grouped by facility, unassigned rows last.
///
/// `Row` holds the 1-based roster position, so the file re-imports as a lock subset.
#[derive(Debug, Clone, Default)]
pub struct ScheduleExporter {
    locked: HashSet<usize>,
}

impl ScheduleExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks zero-based roster rows as locked in the `Locked` column.
    pub fn with_locked(mut self, rows: &[usize]) -> Self {
        self.locked.extend(rows.iter().copied());
        self
    }

    pub fn to_path<P: AsRef<Path>>(
        &self,
        path: P,
        roster: &[Intern],
    ) -> Result<(), ScheduleExportError> {
        let file = std::fs::File::create(path)?;
        self.write(file, roster)
    }

    pub fn write<W: Write>(&self, writer: W, roster: &[Intern]) -> Result<(), ScheduleExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(SCHEDULE_COLUMNS)?;

        let mut rows: Vec<(usize, &Intern)> = roster.iter().enumerate().collect();
        rows.sort_by(|(_, left), (_, right)| {
            match (&left.assigned_facility, &right.assigned_facility) {
                (Some(left), Some(right)) => left.cmp(right),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });

        for (row, intern) in rows {
            let locked = if self.locked.contains(&row) { "yes" } else { "" };
            csv_writer.write_record([
                (row + 1).to_string().as_str(),
                intern.name.as_str(),
                intern.sex.as_deref().unwrap_or_default(),
                intern.qualification.as_str(),
                intern.university.as_deref().unwrap_or_default(),
                intern.year_of_completion.as_deref().unwrap_or_default(),
                intern.national_id.as_deref().unwrap_or_default(),
                intern.nationality.as_deref().unwrap_or_default(),
                intern
                    .assigned_facility
                    .as_ref()
                    .map(|facility| facility.as_str())
                    .unwrap_or_default(),
                locked,
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
