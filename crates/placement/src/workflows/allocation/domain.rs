use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Professional category an intern holds and a facility accepts interns for.
///
/// The set of qualifications is data-driven; the engine never assumes a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualification(pub String);

impl Qualification {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Qualification {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Training centre identifier as it appears in the facility table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub String);

impl FacilityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One roster entry. Only `assigned_facility` is ever written by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intern {
    pub name: String,
    #[serde(default)]
    pub sex: Option<String>,
    pub qualification: Qualification,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub year_of_completion: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub assigned_facility: Option<FacilityId>,
}

impl Intern {
    pub fn new(name: impl Into<String>, qualification: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sex: None,
            qualification: Qualification(qualification.into()),
            university: None,
            year_of_completion: None,
            national_id: None,
            nationality: None,
            assigned_facility: None,
        }
    }

    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn with_university(mut self, university: impl Into<String>) -> Self {
        self.university = Some(university.into());
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_facility.is_some()
    }
}

/// Supply row: positions a facility offers for one qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityCapacity {
    pub facility: FacilityId,
    pub qualification: Qualification,
    pub available_positions: u32,
}

impl FacilityCapacity {
    pub fn new(
        facility: impl Into<String>,
        qualification: impl Into<String>,
        available_positions: u32,
    ) -> Self {
        Self {
            facility: FacilityId(facility.into()),
            qualification: Qualification(qualification.into()),
            available_positions,
        }
    }
}

/// A prior assignment to freeze before re-running the allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedAssignment {
    /// Zero-based roster position.
    pub row: usize,
    #[serde(default)]
    pub facility: Option<FacilityId>,
}

impl LockedAssignment {
    pub fn new(row: usize, facility: impl Into<String>) -> Self {
        Self {
            row,
            facility: Some(FacilityId(facility.into())),
        }
    }

    pub(crate) fn pinned_facility(&self) -> Option<FacilityId> {
        self.facility
            .as_ref()
            .map(|facility| facility.as_str().trim())
            .filter(|facility| !facility.is_empty())
            .map(FacilityId::from)
    }
}

/// Interns of one qualification that the proportional phase could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowGroup {
    pub qualification: Qualification,
    pub interns: Vec<usize>,
    /// Every facility accepting the qualification, whether or not it has room left.
    pub facilities: Vec<FacilityId>,
}

impl OverflowGroup {
    pub fn count(&self) -> usize {
        self.interns.len()
    }
}

/// Disposition for a qualification's overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowAction {
    /// Round-robin the interns over every accepting facility, exceeding capacity.
    Spread,
    #[default]
    LeaveUnassigned,
}

impl OverflowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spread => "Spread evenly beyond capacity",
            Self::LeaveUnassigned => "Leave unassigned",
        }
    }
}

impl FromStr for OverflowAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "spread" => Ok(Self::Spread),
            "leave_unassigned" | "leave" | "unassigned" => Ok(Self::LeaveUnassigned),
            other => Err(format!(
                "unknown overflow action '{other}' (expected spread or leave_unassigned)"
            )),
        }
    }
}

/// Where an intern ended up after an allocation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementState {
    Locked,
    Allocated,
    /// Placed by an overflow spread, beyond the facility's nominal capacity.
    Spread,
    Overflow,
    Unassigned,
}

impl PlacementState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Allocated => "Allocated",
            Self::Spread => "Spread beyond capacity",
            Self::Overflow => "Overflow",
            Self::Unassigned => "Unassigned",
        }
    }
}
