use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementTotals {
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

/// One facility row of the facility x qualification table; `counts` follows
/// `PlacementReportSummary::qualifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrosstabRow {
    pub facility: String,
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillRateEntry {
    pub facility: String,
    pub assigned: usize,
    pub capacity: u32,
    /// `None` when the facility offers no positions at all.
    pub fill_rate_pct: Option<f64>,
    pub over_capacity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementReportSummary {
    pub generated_on: NaiveDate,
    pub totals: PlacementTotals,
    pub qualifications: Vec<String>,
    pub crosstab: Vec<CrosstabRow>,
    pub column_totals: Vec<usize>,
    pub grand_total: usize,
    pub by_qualification: Vec<CountEntry>,
    pub by_sex: Vec<CountEntry>,
    pub by_university: Vec<CountEntry>,
    pub fill_rates: Vec<FillRateEntry>,
}
