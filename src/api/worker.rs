use crate::{
    api::attendance::require_subdomain,
    error::ApiError,
    model::worker::Worker,
    models::{WorkerListResponse, WorkerQuery},
    utils::query_utils::{SqlValue, WhereClause, bind_as, bind_scalar, like_pattern},
};
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::debug;

/// Row offset of a 1-based page; widened so large page numbers cannot overflow.
fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

// -------------------- Handler --------------------

#[utoipa::path(
    get,
    path = "/api/workers/{subdomain}",
    params(
        ("subdomain", Path, description = "Tenant subdomain"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("batch", Query, description = "Filter by batch"),
        ("search", Query, description = "Search by name or RFID")
    ),
    responses(
        (status = 200, description = "Paginated worker list", body = WorkerListResponse),
        (status = 400, description = "Missing subdomain")
    ),
    tag = "Worker"
)]
pub async fn list_workers(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<WorkerQuery>,
) -> Result<impl Responder, ApiError> {
    let subdomain = require_subdomain(&path)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut clause = WhereClause::new();
    clause.push("subdomain = ?", [SqlValue::String(subdomain.to_string())]);

    if let Some(batch) = query.batch.as_deref().filter(|b| !b.is_empty()) {
        clause.push("batch = ?", [SqlValue::String(batch.to_string())]);
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        clause.push(
            "(name LIKE ? OR rfid LIKE ?)",
            [like_pattern(search), like_pattern(search)],
        );
    }

    let where_sql = clause.sql();

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) AS total FROM workers {}", where_sql);
    debug!(sql = %count_sql, bindings = ?clause.values(), "Counting workers");

    let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), clause.values())
        .fetch_one(pool.get_ref())
        .await?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT id, subdomain, rfid, name, department_name, batch, photo \
         FROM workers {} ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching workers");

    let workers = bind_as(sqlx::query_as::<_, Worker>(&data_sql), clause.values())
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(WorkerListResponse {
        data: workers,
        page,
        per_page,
        total,
    }))
}

/// Get Worker by ID
#[utoipa::path(
    get,
    path = "/api/workers/{subdomain}/{worker_id}",
    params(
        ("subdomain", Path, description = "Tenant subdomain"),
        ("worker_id", Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Worker found", body = Worker),
        (status = 404, description = "Worker not found", body = Object, example = json!({
            "message": "Worker not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Worker"
)]
pub async fn get_worker(
    pool: web::Data<MySqlPool>,
    path: web::Path<(String, u64)>,
) -> Result<impl Responder, ApiError> {
    let (subdomain, worker_id) = path.into_inner();
    let subdomain = require_subdomain(&subdomain)?;

    let worker = sqlx::query_as::<_, Worker>(
        r#"
        SELECT id, subdomain, rfid, name, department_name, batch, photo
        FROM workers
        WHERE subdomain = ? AND id = ?
        "#,
    )
    .bind(subdomain)
    .bind(worker_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    Ok(HttpResponse::Ok().json(worker))
}
