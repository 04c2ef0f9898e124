//! Fixed-statement report endpoints
//!
//! Thin handlers in the shape of the service surface this crate exists to
//! support: borrow the pool, run one fixed statement, shape the rows as
//! JSON. A manager that is not ready turns into an immediate 503; handlers
//! never retry or wait for recovery.

use std::time::Instant;

use actix_web::web::Data;
use actix_web::{HttpResponse, Responder, get};
use sea_orm::{ConnectionTrait, FromQueryResult, JsonValue, Statement};
use serde_json::json;
use tracing::error;

use crate::DatabaseManager;
use crate::metrics::AppMetrics;

#[get("/customers/count")]
pub async fn customer_count(
    manager: Data<DatabaseManager>,
    metrics: Data<AppMetrics>,
) -> impl Responder {
    run_report(
        &manager,
        &metrics,
        "customer_count",
        "SELECT COUNT(*) AS total FROM customers",
    )
    .await
}

#[get("/customers/names")]
pub async fn customer_names(
    manager: Data<DatabaseManager>,
    metrics: Data<AppMetrics>,
) -> impl Responder {
    run_report(
        &manager,
        &metrics,
        "customer_names",
        "SELECT first_name, last_name FROM customers",
    )
    .await
}

#[get("/orders/pending")]
pub async fn pending_orders(
    manager: Data<DatabaseManager>,
    metrics: Data<AppMetrics>,
) -> impl Responder {
    run_report(
        &manager,
        &metrics,
        "pending_orders",
        "SELECT COUNT(*) AS pending FROM orders WHERE status = 'Pending'",
    )
    .await
}

/// Borrow the pool and execute one fixed statement.
async fn run_report(
    manager: &DatabaseManager,
    metrics: &AppMetrics,
    report: &str,
    sql: &str,
) -> HttpResponse {
    let connection = match manager.acquire() {
        Ok(connection) => connection,
        Err(err) => {
            return HttpResponse::ServiceUnavailable().json(json!({ "error": err.to_string() }));
        }
    };

    let started = Instant::now();
    let statement = Statement::from_string(connection.get_database_backend(), sql);

    match JsonValue::find_by_statement(statement)
        .all(connection.as_ref())
        .await
    {
        Ok(rows) => {
            metrics.record_query(report, true, started.elapsed().as_secs_f64());
            HttpResponse::Ok().json(json!({ "status": "ok", "data": rows }))
        }
        Err(err) => {
            metrics.record_query(report, false, started.elapsed().as_secs_f64());
            error!(report, error = %err, "report query failed");
            HttpResponse::InternalServerError()
                .json(json!({ "error": format!("Database error: {err}") }))
        }
    }
}
