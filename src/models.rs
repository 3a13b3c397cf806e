use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::policy::PunchAction;
use crate::model::day_aggregate::DayAggregate;
use crate::model::punch::{PunchRecord, PunchSource};
use crate::model::worker::Worker;

#[derive(Deserialize, ToSchema)]
pub struct SubmitPunchReq {
    #[schema(example = "E1")]
    pub rfid: String,
    #[schema(example = "acme")]
    pub subdomain: String,
    /// Defaults to `rfid`
    #[serde(default)]
    pub source: PunchSource,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "message": "Punch In recorded for Jane Doe",
    "action": "Punch In",
    "time": "09:00:00 AM"
}))]
pub struct SubmitPunchResponse {
    pub message: String,
    pub action: PunchAction,
    pub time: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceFetchResponse {
    pub attendance: Vec<PunchRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceReportResponse {
    pub data: Vec<DayAggregate>,
    #[schema(example = 1)]
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
pub struct RfidListResponse {
    #[schema(example = json!(["E1", "E2"]))]
    pub rfids: Vec<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct NextActionQuery {
    #[schema(example = "E1")]
    pub rfid: String,
}

#[derive(Serialize, ToSchema)]
pub struct NextActionResponse {
    pub rfid: String,
    pub action: PunchAction,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct WorkerQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Exact batch name
    pub batch: Option<String>,
    /// Substring of name or RFID
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct WorkerListResponse {
    pub data: Vec<Worker>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}
