use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::model::punch::PunchRecord;

/// Report filters, applied to raw punches before they are reconstructed.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    /// Case-insensitive substring of the worker name
    #[schema(example = "jane")]
    pub name: Option<String>,
    /// Case-insensitive substring of the department name
    #[schema(example = "assembly")]
    pub department: Option<String>,
    /// Prefix of the ISO-8601 punch timestamp, e.g. `2024-01` or `2024-01-10`
    #[schema(example = "2024-01-10")]
    pub date: Option<String>,
    /// Case-insensitive substring of the RFID
    #[schema(example = "E1")]
    pub rfid: Option<String>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &PunchRecord) -> bool {
        contains_ci(record.name.as_deref(), active(&self.name))
            && contains_ci(record.department_name.as_deref(), active(&self.department))
            && contains_ci(record.identity.as_deref(), active(&self.rfid))
            && match active(&self.date) {
                None => true,
                Some(prefix) => record.occurred_at.to_rfc3339().starts_with(prefix),
            }
    }

    pub fn apply(&self, records: Vec<PunchRecord>) -> Vec<PunchRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_ci(field: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => field
            .map(|f| f.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

/// Distinct non-blank RFIDs in first-seen order.
pub fn unique_identities(records: &[PunchRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(|r| r.identity.as_deref())
        .filter(|id| !id.trim().is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
