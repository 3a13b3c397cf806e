use crate::attendance::filter::AttendanceFilter;
use crate::attendance::policy::PunchAction;
use crate::model::day_aggregate::{DayAggregate, TimeEntry};
use crate::model::punch::{PunchRecord, PunchSource};
use crate::model::worker::Worker;
use crate::models::{
    AttendanceFetchResponse, AttendanceReportResponse, NextActionQuery, NextActionResponse,
    RfidListResponse, SubmitPunchReq, SubmitPunchResponse, WorkerListResponse, WorkerQuery,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Punchclock API",
        version = "0.1.0",
        description = r#"
## Workforce Attendance

Multi-tenant attendance service: workers punch in and out by RFID tag, QR code
or face match, and administrators review the resulting daily attendance.

### 🔹 Key Features
- **Punch submission**
  - Each punch toggles the worker between in and out
  - A minimum interval between punches of the same worker is enforced (`429`)
- **Daily attendance**
  - Raw punches are paired into in/out times per worker per day
  - Unpaired or out-of-order punches are flagged as missed
  - Worked duration per day as `HH:MM:SS`
- **Export**
  - CSV download of the daily report, with the same filters

### 📦 Response Format
- JSON-based RESTful responses, `{"message": ...}` on errors
- Pagination supported for worker lists

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit_punch,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_report,
        crate::api::attendance::export_attendance,
        crate::api::attendance::list_rfids,
        crate::api::attendance::next_punch_action,

        crate::api::worker::list_workers,
        crate::api::worker::get_worker
    ),
    components(
        schemas(
            PunchRecord,
            PunchSource,
            PunchAction,
            TimeEntry,
            DayAggregate,
            AttendanceFilter,
            Worker,
            SubmitPunchReq,
            SubmitPunchResponse,
            AttendanceFetchResponse,
            AttendanceReportResponse,
            RfidListResponse,
            NextActionQuery,
            NextActionResponse,
            WorkerQuery,
            WorkerListResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Punch submission and attendance reports"),
        (name = "Worker", description = "Worker lookup APIs"),
    )
)]
pub struct ApiDoc;
