use crate::infra::AppState;
use admissions::pipeline::{
    cohort_router, dashboard_router, enquiry_router, AdminActor, AdmissionsStore, CohortService,
    DashboardService, EnquiryService, StoreError, UserId,
};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Assembles the full API surface on top of one shared store.
pub(crate) fn with_pipeline_routes<S>(store: Arc<S>) -> Router
where
    S: AdmissionsStore + 'static,
{
    let enquiries = Arc::new(EnquiryService::new(store.clone()));
    let cohorts = Arc::new(CohortService::new(store.clone()));
    let dashboard = Arc::new(DashboardService::new(store.clone()));

    enquiry_router(enquiries)
        .merge(cohort_router(cohorts))
        .merge(dashboard_router(dashboard))
        .merge(admin_user_routes(store))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

fn admin_user_routes<S>(store: Arc<S>) -> Router
where
    S: AdmissionsStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/users/:id",
            axum::routing::delete(remove_user_endpoint::<S>),
        )
        .with_state(store)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Removes a user account. Student accounts take every dependent record
/// with them in one all-or-nothing cascade; the response reports what was
/// touched.
pub(crate) async fn remove_user_endpoint<S>(
    State(store): State<Arc<S>>,
    _admin: AdminActor,
    Path(id): Path<String>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match store.remove_student_cascade(&UserId(id)) {
        Ok(summary) => {
            let payload = json!({ "success": true, "data": summary });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(StoreError::NotFound) => {
            let payload = json!({ "success": false, "message": "user not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "success": false, "message": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
