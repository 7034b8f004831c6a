mod export;
mod normalizer;
mod parser;

use crate::config::ImportConfig;
use crate::workflows::allocation::{FacilityCapacity, Intern, LockedAssignment, Qualification};
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub use export::{ScheduleExportError, ScheduleExporter, SCHEDULE_COLUMNS};
pub use parser::ScheduleEntry;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    HeaderNotFound {
        scanned: usize,
        expected: Vec<String>,
    },
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },
    NoQualificationColumns {
        expected: Vec<String>,
    },
    InvalidPositions {
        line: usize,
        column: String,
        value: String,
    },
    InvalidRow {
        line: usize,
        value: String,
    },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster file: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            RosterImportError::HeaderNotFound { scanned, expected } => write!(
                f,
                "could not find expected columns in first {} rows; looking for any of: {}",
                scanned,
                expected.join(", ")
            ),
            RosterImportError::MissingColumns { table, columns } => {
                write!(f, "{} file missing columns: {}", table, columns.join(", "))
            }
            RosterImportError::NoQualificationColumns { expected } => write!(
                f,
                "facilities file has no qualification columns; expected any of: {}",
                expected.join(", ")
            ),
            RosterImportError::InvalidPositions {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: '{}' is not a whole number of positions for {}",
                line, value, column
            ),
            RosterImportError::InvalidRow { line, value } => {
                write!(f, "line {}: '{}' is not a valid 1-based row number", line, value)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Facility capacities unpivoted from the wide facility sheet.
#[derive(Debug, Clone, Default)]
pub struct FacilitySheet {
    pub capacities: Vec<FacilityCapacity>,
    /// Qualification columns found in the sheet, in configured order.
    pub qualifications: Vec<Qualification>,
}

impl FacilitySheet {
    pub fn facility_count(&self) -> usize {
        let mut facilities: Vec<_> = self.capacities.iter().map(|row| &row.facility).collect();
        facilities.sort();
        facilities.dedup();
        facilities.len()
    }
}

/// A re-imported schedule, used both as a lock subset and as a finished roster.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn locked_assignments(&self) -> Vec<LockedAssignment> {
        self.entries
            .iter()
            .filter(|entry| entry.locked)
            .map(|entry| LockedAssignment {
                row: entry.row,
                facility: entry.intern.assigned_facility.clone(),
            })
            .collect()
    }

    /// Interns in roster order.
    pub fn roster(&self) -> Vec<Intern> {
        let mut entries: Vec<&ScheduleEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.row);
        entries.into_iter().map(|entry| entry.intern.clone()).collect()
    }
}

/// CSV importer for the intern roster, the facility sheet and exported schedules.
/// Header rows may sit below title rows; the first `header_scan_rows` rows are searched.
#[derive(Debug, Clone)]
pub struct RosterImporter {
    header_scan_rows: usize,
    qualifications: Vec<String>,
}

impl Default for RosterImporter {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl RosterImporter {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            header_scan_rows: config.header_scan_rows,
            qualifications: config.qualifications.clone(),
        }
    }

    pub fn interns_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Intern>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        self.interns_from_reader(file)
    }

    pub fn interns_from_reader<R: Read>(&self, reader: R) -> Result<Vec<Intern>, RosterImportError> {
        let table = parser::read_table(reader, &parser::INTERN_COLUMNS, self.header_scan_rows)?;
        let interns = parser::parse_interns(&table)?;
        debug!(interns = interns.len(), "intern roster imported");
        Ok(interns)
    }

    pub fn facilities_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<FacilitySheet, RosterImportError> {
        let file = std::fs::File::open(path)?;
        self.facilities_from_reader(file)
    }

    pub fn facilities_from_reader<R: Read>(&self, reader: R) -> Result<FacilitySheet, RosterImportError> {
        let mut key_columns = vec![parser::CENTRE_COLUMN];
        key_columns.extend(self.qualifications.iter().map(String::as_str));

        let table = parser::read_table(reader, &key_columns, self.header_scan_rows)?;
        let (capacities, qualifications) = parser::parse_facilities(&table, &self.qualifications)?;
        debug!(
            rows = capacities.len(),
            qualifications = qualifications.len(),
            "facility capacities imported"
        );
        Ok(FacilitySheet {
            capacities,
            qualifications,
        })
    }

    pub fn schedule_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Schedule, RosterImportError> {
        let file = std::fs::File::open(path)?;
        self.schedule_from_reader(file)
    }

    pub fn schedule_from_reader<R: Read>(&self, reader: R) -> Result<Schedule, RosterImportError> {
        let table = parser::read_table(
            reader,
            &[parser::ROW_COLUMN, parser::ASSIGNED_COLUMN],
            self.header_scan_rows,
        )?;
        let entries = parser::parse_schedule(&table)?;
        Ok(Schedule { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::FacilityId;
    use std::io::Cursor;

    const INTERNS_WITH_TITLE: &str = "Ministry of Health,,,,,,\n\
Intern Posting List 2025,,,,,,\n\
,,,,,,\n\
Name,Sex,Qualification,University,Year of Completion,National Identification Number,Nationality\n\
Achieng Sarah,F,MBChB,Makerere University,2024,CF123,Ugandan\n\
,,,,,,\n\
Okello John,M,BSN,,2023,,Ugandan\n";

    #[test]
    fn interns_header_is_detected_below_title_rows() {
        let interns = RosterImporter::default()
            .interns_from_reader(Cursor::new(INTERNS_WITH_TITLE))
            .expect("import succeeds");

        assert_eq!(interns.len(), 2);
        assert_eq!(interns[0].name, "Achieng Sarah");
        assert_eq!(interns[0].qualification, Qualification::from("MBChB"));
        assert_eq!(interns[1].university, None);
        assert_eq!(interns[1].national_id, None);
        assert!(interns.iter().all(|intern| !intern.is_assigned()));
    }

    #[test]
    fn interns_missing_columns_are_reported() {
        let error = RosterImporter::default()
            .interns_from_reader(Cursor::new("Name,Sex,Qualification\nA,F,BSN\n"))
            .expect_err("missing columns");

        match error {
            RosterImportError::MissingColumns { table, columns } => {
                assert_eq!(table, "interns");
                assert!(columns.contains(&"University".to_string()));
                assert!(columns.contains(&"Nationality".to_string()));
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn header_search_is_bounded() {
        let mut csv = "filler\n".repeat(3);
        csv.push_str("Name,Sex,Qualification\n");
        let importer = RosterImporter::from_config(&ImportConfig {
            header_scan_rows: 2,
            ..ImportConfig::default()
        });

        let error = importer
            .interns_from_reader(Cursor::new(csv))
            .expect_err("header beyond scan window");
        assert!(matches!(error, RosterImportError::HeaderNotFound { scanned: 2, .. }));
    }

    #[test]
    fn facilities_are_unpivoted_qualification_major() {
        let csv = "Internship Training Centre,MBChB,BSN,Notes\n\
Mulago NRH,4,2,referral\n\
Gulu RRH,,3.0,\n\
,5,5,\n\
Lira RRH,0,1,\n";

        let sheet = RosterImporter::default()
            .facilities_from_reader(Cursor::new(csv))
            .expect("import succeeds");

        let rows: Vec<(String, String, u32)> = sheet
            .capacities
            .iter()
            .map(|row| {
                (
                    row.facility.to_string(),
                    row.qualification.to_string(),
                    row.available_positions,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Mulago NRH".to_string(), "MBChB".to_string(), 4),
                ("Mulago NRH".to_string(), "BSN".to_string(), 2),
                ("Gulu RRH".to_string(), "BSN".to_string(), 3),
                ("Lira RRH".to_string(), "BSN".to_string(), 1),
            ]
        );
        assert_eq!(
            sheet.qualifications,
            vec![Qualification::from("MBChB"), Qualification::from("BSN")]
        );
        assert_eq!(sheet.facility_count(), 3);
    }

    #[test]
    fn facilities_need_a_qualification_column() {
        let error = RosterImporter::default()
            .facilities_from_reader(Cursor::new("Internship Training Centre,Beds\nMulago,40\n"))
            .expect_err("no qualification columns");

        assert!(matches!(error, RosterImportError::NoQualificationColumns { .. }));
    }

    #[test]
    fn facilities_reject_fractional_positions() {
        let error = RosterImporter::default()
            .facilities_from_reader(Cursor::new("Internship Training Centre,BDS\nMulago,2.5\n"))
            .expect_err("fractional positions");

        match error {
            RosterImportError::InvalidPositions { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "BDS");
                assert_eq!(value, "2.5");
            }
            other => panic!("expected invalid positions, got {other:?}"),
        }
    }

    #[test]
    fn positions_accept_blank_and_negative_as_zero() {
        assert_eq!(parser::parse_positions_for_tests(""), Some(0));
        assert_eq!(parser::parse_positions_for_tests("-3"), Some(0));
        assert_eq!(parser::parse_positions_for_tests("7"), Some(7));
        assert_eq!(parser::parse_positions_for_tests("seven"), None);
    }

    #[test]
    fn schedule_with_lock_column_only_locks_marked_rows() {
        let csv = "Row,Name,Qualification,Assigned Health Facility,Locked\n\
2,Okello John,BSN,Gulu RRH,yes\n\
1,Achieng Sarah,MBChB,Mulago NRH,\n\
3,Nakato Ruth,BSN,,\n";

        let schedule = RosterImporter::default()
            .schedule_from_reader(Cursor::new(csv))
            .expect("import succeeds");

        assert_eq!(
            schedule.locked_assignments(),
            vec![LockedAssignment::new(1, "Gulu RRH")]
        );
        let roster = schedule.roster();
        assert_eq!(roster[0].name, "Achieng Sarah");
        assert_eq!(roster[0].assigned_facility, Some(FacilityId::from("Mulago NRH")));
        assert_eq!(roster[2].assigned_facility, None);
    }

    #[test]
    fn schedule_without_lock_column_locks_every_assigned_row() {
        let csv = "Row,Assigned Health Facility\n1,Mulago NRH\n2,\n3,Lira RRH\n";

        let schedule = RosterImporter::default()
            .schedule_from_reader(Cursor::new(csv))
            .expect("import succeeds");

        let rows: Vec<usize> = schedule
            .locked_assignments()
            .iter()
            .map(|lock| lock.row)
            .collect();
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn schedule_rejects_row_zero() {
        let error = RosterImporter::default()
            .schedule_from_reader(Cursor::new("Row,Assigned Health Facility\n0,Mulago\n"))
            .expect_err("row numbers are 1-based");

        assert!(matches!(error, RosterImportError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = RosterImporter::default()
            .interns_from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            RosterImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
