use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One displayed punch time. Only out-punches are ever flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeEntry {
    #[schema(example = "05:00:00 PM")]
    pub time: String,
    pub is_missed: bool,
}

impl TimeEntry {
    pub fn new(time: impl Into<String>, is_missed: bool) -> Self {
        Self {
            time: time.into(),
            is_missed,
        }
    }
}

/// Attendance of one identity on one calendar day, rebuilt from raw punches.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(
    example = json!({
        "identity": "E1",
        "date": "2024-01-10",
        "in_times": [{ "time": "09:00:00 AM", "is_missed": false }],
        "out_times": [{ "time": "05:00:00 PM", "is_missed": false }],
        "duration": "08:00:00",
        "name": "Jane Doe",
        "department_name": "Assembly",
        "photo": null
    })
)]
pub struct DayAggregate {
    pub identity: String,

    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    pub in_times: Vec<TimeEntry>,
    pub out_times: Vec<TimeEntry>,

    /// Total worked time, `HH:MM:SS`.
    #[schema(example = "08:00:00")]
    pub duration: String,

    /// Most recent `occurred_at` in the group; only used for ordering.
    #[serde(skip)]
    pub latest_timestamp: DateTime<Utc>,

    pub name: Option<String>,
    pub department_name: Option<String>,
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_plain_date_and_hides_timestamp() {
        let day = DayAggregate {
            identity: "E1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            in_times: vec![TimeEntry::new("09:00:00 AM", false)],
            out_times: vec![TimeEntry::new("-", true)],
            duration: "00:00:00".into(),
            latest_timestamp: "2024-01-10T09:00:00Z".parse().unwrap(),
            name: Some("Jane Doe".into()),
            department_name: None,
            photo: None,
        };

        assert_eq!(
            serde_json::to_value(&day).unwrap(),
            json!({
                "identity": "E1",
                "date": "2024-01-10",
                "in_times": [{ "time": "09:00:00 AM", "is_missed": false }],
                "out_times": [{ "time": "-", "is_missed": true }],
                "duration": "00:00:00",
                "name": "Jane Doe",
                "department_name": null,
                "photo": null
            })
        );
    }
}
