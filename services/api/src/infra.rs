use chrono::NaiveDate;
use intern_placement::config::AllocationConfig;
use intern_placement::workflows::allocation::{OverflowAction, Qualification};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) allocation: AllocationConfig,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Parses `QUAL=ACTION`, e.g. `BDS=spread`.
pub(crate) fn parse_overflow_override(raw: &str) -> Result<(Qualification, OverflowAction), String> {
    let (qualification, action) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUALIFICATION=ACTION, got '{raw}'"))?;
    let qualification = qualification.trim();
    if qualification.is_empty() {
        return Err(format!("missing qualification in '{raw}'"));
    }
    let action = action.parse::<OverflowAction>()?;
    Ok((Qualification::from(qualification), action))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
