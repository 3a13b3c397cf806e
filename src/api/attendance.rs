use crate::{
    attendance::{
        export::{export_csv, report_filename},
        filter::{AttendanceFilter, unique_identities},
        policy::{LastPunch, next_action, plan_punch},
        reconstruct,
    },
    config::Config,
    error::ApiError,
    model::{
        punch::{PunchRecord, PunchRow},
        worker::Worker,
    },
    models::{
        AttendanceFetchResponse, AttendanceReportResponse, NextActionQuery, NextActionResponse,
        RfidListResponse, SubmitPunchReq, SubmitPunchResponse,
    },
    utils::last_punch_cache::LastPunchCache,
};
use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::Utc;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument, warn};

/// Tenant placeholder used by the landing site; never a real tenant.
const ROOT_SUBDOMAIN: &str = "main";

pub(crate) fn require_subdomain(subdomain: &str) -> Result<&str, ApiError> {
    let subdomain = subdomain.trim();
    if subdomain.is_empty() || subdomain == ROOT_SUBDOMAIN {
        return Err(ApiError::BadRequest(
            "Subdomain not found, check the URL.".to_string(),
        ));
    }
    Ok(subdomain)
}

async fn fetch_punches(pool: &MySqlPool, subdomain: &str) -> Result<Vec<PunchRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PunchRow>(
        r#"
        SELECT id, subdomain, rfid, created_at, local_time, presence,
               is_missed_out_punch, source, name, department_name, photo
        FROM attendance
        WHERE subdomain = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(subdomain)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PunchRecord::from).collect())
}

/// Raw punches of a tenant
#[utoipa::path(
    get,
    path = "/api/attendance/{subdomain}",
    params(("subdomain", description = "Tenant subdomain")),
    responses(
        (status = 200, description = "Raw punch records, newest first", body = AttendanceFetchResponse),
        (status = 400, description = "Missing subdomain", body = Object, example = json!({
            "message": "Subdomain not found, check the URL."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;
    let attendance = fetch_punches(pool.get_ref(), subdomain).await?;

    debug!(subdomain, count = attendance.len(), "Fetched attendance");
    Ok(HttpResponse::Ok().json(AttendanceFetchResponse { attendance }))
}

/// Per-worker, per-day attendance rebuilt from punches
#[utoipa::path(
    get,
    path = "/api/attendance/{subdomain}/report",
    params(("subdomain", description = "Tenant subdomain"), AttendanceFilter),
    responses(
        (status = 200, description = "Daily attendance, most recently active first", body = AttendanceReportResponse),
        (status = 400, description = "Missing subdomain"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_report(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    filter: web::Query<AttendanceFilter>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;
    let punches = filter.apply(fetch_punches(pool.get_ref(), subdomain).await?);
    let data = reconstruct(&punches);

    Ok(HttpResponse::Ok().json(AttendanceReportResponse {
        total: data.len(),
        data,
    }))
}

/// Daily attendance as a CSV download
#[utoipa::path(
    get,
    path = "/api/attendance/{subdomain}/export",
    params(("subdomain", description = "Tenant subdomain"), AttendanceFilter),
    responses(
        (status = 200, description = "CSV report", content_type = "text/csv", body = String),
        (status = 400, description = "Nothing to export", body = Object, example = json!({
            "message": "No attendance data to download"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn export_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    filter: web::Query<AttendanceFilter>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;
    let punches = filter.apply(fetch_punches(pool.get_ref(), subdomain).await?);
    let days = reconstruct(&punches);

    if days.is_empty() {
        return Err(ApiError::BadRequest(
            "No attendance data to download".to_string(),
        ));
    }

    let body = export_csv(&days)?;
    let filename = report_filename(Utc::now().date_naive());
    info!(subdomain, rows = days.len(), %filename, "Attendance report exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body))
}

/// Distinct RFIDs seen in a tenant's punches
#[utoipa::path(
    get,
    path = "/api/attendance/{subdomain}/rfids",
    params(("subdomain", description = "Tenant subdomain")),
    responses(
        (status = 200, description = "RFID suggestions", body = RfidListResponse),
        (status = 400, description = "Missing subdomain")
    ),
    tag = "Attendance"
)]
pub async fn list_rfids(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;
    let punches = fetch_punches(pool.get_ref(), subdomain).await?;

    Ok(HttpResponse::Ok().json(RfidListResponse {
        rfids: unique_identities(&punches),
    }))
}

/// What the next punch for an RFID would be
#[utoipa::path(
    get,
    path = "/api/attendance/{subdomain}/next",
    params(("subdomain", description = "Tenant subdomain"), NextActionQuery),
    responses(
        (status = 200, description = "Next punch action", body = NextActionResponse),
        (status = 400, description = "Missing subdomain or RFID")
    ),
    tag = "Attendance"
)]
pub async fn next_punch_action(
    pool: web::Data<MySqlPool>,
    cache: web::Data<LastPunchCache>,
    path: web::Path<String>,
    query: web::Query<NextActionQuery>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;
    let rfid = query.rfid.trim();
    if rfid.is_empty() {
        return Err(ApiError::BadRequest("Enter the RFID".to_string()));
    }

    let last = cache.lookup(pool.get_ref(), subdomain, rfid).await?;

    Ok(HttpResponse::Ok().json(NextActionResponse {
        rfid: rfid.to_string(),
        action: next_action(last.as_ref()),
    }))
}

/// Record a punch; presence toggles from the worker's previous punch
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SubmitPunchReq,
    responses(
        (status = 200, description = "Punch recorded", body = SubmitPunchResponse),
        (status = 400, description = "Missing RFID or subdomain"),
        (status = 404, description = "Unknown RFID", body = Object, example = json!({
            "message": "Worker not found"
        })),
        (status = 429, description = "Punched too recently", body = Object, example = json!({
            "message": "Please wait 95 seconds before punching again."
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "submit_punch",
    skip(pool, config, cache, payload),
    fields(subdomain = %payload.subdomain, rfid = %payload.rfid, source = %payload.source)
)]
pub async fn submit_punch(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    cache: web::Data<LastPunchCache>,
    payload: web::Json<SubmitPunchReq>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&payload.subdomain)?;
    let rfid = payload.rfid.trim();
    if rfid.is_empty() {
        return Err(ApiError::BadRequest("Enter the RFID".to_string()));
    }

    let worker = sqlx::query_as::<_, Worker>(
        r#"
        SELECT id, subdomain, rfid, name, department_name, batch, photo
        FROM workers
        WHERE subdomain = ? AND rfid = ?
        LIMIT 1
        "#,
    )
    .bind(subdomain)
    .bind(rfid)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| {
        info!("Punch rejected: unknown RFID");
        ApiError::NotFound("Worker not found".to_string())
    })?;

    let last = cache.lookup(pool.get_ref(), subdomain, rfid).await?;
    let now = Utc::now();

    let plan = plan_punch(
        last.as_ref(),
        now,
        config.local_offset,
        config.punch_min_interval(),
    )
    .map_err(|remaining| {
        warn!(wait_secs = remaining.num_seconds(), "Punch rejected: too soon");
        ApiError::TooManyRequests(format!(
            "Please wait {} seconds before punching again.",
            remaining.num_seconds().max(1)
        ))
    })?;

    sqlx::query(
        r#"
        INSERT INTO attendance
        (subdomain, rfid, name, department_name, photo, presence, local_time,
         is_missed_out_punch, source, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(subdomain)
    .bind(rfid)
    .bind(&worker.name)
    .bind(&worker.department_name)
    .bind(&worker.photo)
    .bind(plan.action.presence())
    .bind(&plan.local_time)
    .bind(plan.missed_out_hint)
    .bind(payload.source.as_ref())
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    cache
        .record(
            subdomain,
            rfid,
            LastPunch {
                presence: plan.action.presence(),
                occurred_at: now,
            },
        )
        .await;

    info!(
        action = %plan.action,
        missed_out = plan.missed_out_hint,
        time = %plan.local_time,
        "Punch recorded"
    );

    Ok(HttpResponse::Ok().json(SubmitPunchResponse {
        message: format!("{} recorded for {}", plan.action, worker.name),
        action: plan.action,
        time: plan.local_time,
    }))
}
