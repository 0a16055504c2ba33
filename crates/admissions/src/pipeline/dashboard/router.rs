use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::DashboardService;
use crate::pipeline::actor::AdminActor;
use crate::pipeline::store::AdmissionsStore;

/// Router builder exposing the dashboard aggregation endpoint.
pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: AdmissionsStore + 'static,
{
    Router::new()
        .route("/api/v1/admin/dashboard-stats", get(stats_handler::<S>))
        .with_state(service)
}

pub(crate) async fn stats_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    _admin: AdminActor,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.stats(Utc::now()) {
        Ok(stats) => {
            let payload = json!({ "success": true, "data": stats });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        // Any failure aborts the whole aggregation; no partial results.
        Err(error) => {
            let payload = json!({ "success": false, "message": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
