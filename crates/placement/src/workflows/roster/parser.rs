use super::normalizer::{is_truthy, normalize_header, optional_cell};
use super::RosterImportError;
use crate::workflows::allocation::{FacilityCapacity, FacilityId, Intern, Qualification};
use csv::StringRecord;
use std::io::Read;

pub(crate) const INTERN_COLUMNS: [&str; 7] = [
    "Name",
    "Sex",
    "Qualification",
    "University",
    "Year of Completion",
    "National Identification Number",
    "Nationality",
];
pub(crate) const CENTRE_COLUMN: &str = "Internship Training Centre";
pub(crate) const ROW_COLUMN: &str = "Row";
pub(crate) const ASSIGNED_COLUMN: &str = "Assigned Health Facility";
pub(crate) const LOCKED_COLUMN: &str = "Locked";

/// Data rows under an auto-detected header. Rows carry their 1-based source line.
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<(usize, StringRecord)>,
}

impl Table {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn require(&self, names: &[&str], table: &'static str) -> Result<Vec<usize>, RosterImportError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RosterImportError::MissingColumns {
                table,
                columns: missing,
            });
        }
        Ok(names.iter().filter_map(|name| self.column(name)).collect())
    }
}

fn cell(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column.and_then(|column| record.get(column))
}

/// Reads every record, then takes the first row within `max_scan` rows that names any
/// of `key_columns` as the header. Fully blank data rows are dropped.
pub(crate) fn read_table<R: Read>(
    reader: R,
    key_columns: &[&str],
    max_scan: usize,
) -> Result<Table, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = csv_reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let header_position = records
        .iter()
        .take(max_scan)
        .position(|record| {
            record
                .iter()
                .any(|value| key_columns.contains(&normalize_header(value).as_str()))
        })
        .ok_or_else(|| RosterImportError::HeaderNotFound {
            scanned: max_scan,
            expected: key_columns.iter().map(|name| name.to_string()).collect(),
        })?;

    let headers = records[header_position]
        .iter()
        .map(normalize_header)
        .collect();
    let rows = records
        .into_iter()
        .enumerate()
        .skip(header_position + 1)
        .filter(|(_, record)| record.iter().any(|value| !value.trim().is_empty()))
        .map(|(position, record)| (position + 1, record))
        .collect();

    Ok(Table { headers, rows })
}

pub(crate) fn parse_interns(table: &Table) -> Result<Vec<Intern>, RosterImportError> {
    table.require(&INTERN_COLUMNS, "interns")?;
    Ok(table
        .rows
        .iter()
        .map(|(_, record)| intern_from_record(table, record))
        .collect())
}

fn intern_from_record(table: &Table, record: &StringRecord) -> Intern {
    let text = |name: &str| optional_cell(cell(record, table.column(name)));

    Intern {
        name: text("Name").unwrap_or_default(),
        sex: text("Sex"),
        qualification: Qualification(text("Qualification").unwrap_or_default()),
        university: text("University"),
        year_of_completion: text("Year of Completion"),
        national_id: text("National Identification Number"),
        nationality: text("Nationality"),
        assigned_facility: text(ASSIGNED_COLUMN).map(FacilityId),
    }
}

/// Unpivots the wide facility sheet, one qualification column at a time, keeping
/// positive positions only.
pub(crate) fn parse_facilities(
    table: &Table,
    qualifications: &[String],
) -> Result<(Vec<FacilityCapacity>, Vec<Qualification>), RosterImportError> {
    let centre = table
        .require(&[CENTRE_COLUMN], "facilities")?
        .first()
        .copied();

    let present: Vec<(usize, &String)> = qualifications
        .iter()
        .filter_map(|name| table.column(name).map(|column| (column, name)))
        .collect();
    if present.is_empty() {
        return Err(RosterImportError::NoQualificationColumns {
            expected: qualifications.to_vec(),
        });
    }

    let mut capacities = Vec::new();
    for &(column, name) in &present {
        for (line, record) in &table.rows {
            let Some(facility) = optional_cell(cell(record, centre)) else {
                continue;
            };
            let raw = record.get(column).unwrap_or_default();
            let positions =
                parse_positions(raw).ok_or_else(|| RosterImportError::InvalidPositions {
                    line: *line,
                    column: name.clone(),
                    value: raw.to_string(),
                })?;
            if positions > 0 {
                capacities.push(FacilityCapacity {
                    facility: FacilityId(facility),
                    qualification: Qualification(name.clone()),
                    available_positions: positions,
                });
            }
        }
    }

    let present = present
        .into_iter()
        .map(|(_, name)| Qualification(name.clone()))
        .collect();
    Ok((capacities, present))
}

/// Blank is zero; whole-number decimals ("3.0") are accepted; negatives count as zero.
fn parse_positions(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value <= 0.0 {
        return Some(0);
    }
    (value <= u32::MAX as f64).then_some(value as u32)
}

/// One row of a previously exported schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Zero-based roster position.
    pub row: usize,
    pub intern: Intern,
    pub locked: bool,
}

pub(crate) fn parse_schedule(table: &Table) -> Result<Vec<ScheduleEntry>, RosterImportError> {
    let required = table.require(&[ROW_COLUMN, ASSIGNED_COLUMN], "schedule")?;
    let row_column = required.first().copied();
    let lock_column = table.column(LOCKED_COLUMN);

    let mut entries = Vec::with_capacity(table.rows.len());
    for (line, record) in &table.rows {
        let raw = cell(record, row_column).unwrap_or_default();
        let row = raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|row| row.checked_sub(1))
            .ok_or_else(|| RosterImportError::InvalidRow {
                line: *line,
                value: raw.to_string(),
            })?;

        let intern = intern_from_record(table, record);
        let locked = match lock_column {
            Some(column) => record.get(column).is_some_and(is_truthy),
            None => intern.is_assigned(),
        };

        entries.push(ScheduleEntry {
            row,
            intern,
            locked,
        });
    }

    Ok(entries)
}

#[cfg(test)]
pub(crate) fn parse_positions_for_tests(raw: &str) -> Option<u32> {
    parse_positions(raw)
}
