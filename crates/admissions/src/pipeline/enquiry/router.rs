use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EnquiryDraft, EnquiryError, EnquiryId, EnquiryStatus, ProcessToAdmissionRequest, ProgramType};
use super::service::EnquiryService;
use crate::pipeline::actor::{AdminActor, MaybeActor};
use crate::pipeline::store::{AdmissionsStore, Page, StoreError};

/// Router builder exposing the enquiry intake and administration endpoints.
pub fn enquiry_router<S>(service: Arc<EnquiryService<S>>) -> Router
where
    S: AdmissionsStore + 'static,
{
    Router::new()
        .route("/api/v1/admission-enquiries", post(create_handler::<S>))
        .route(
            "/api/v1/admission-enquiries/program/:program_type",
            get(list_handler::<S>),
        )
        .route(
            "/api/v1/admission-enquiries/:id/status",
            put(update_status_handler::<S>),
        )
        .route(
            "/api/v1/admission-enquiries/:id/process-to-admission",
            post(process_handler::<S>),
        )
        .route("/api/v1/admission-enquiries/:id", delete(delete_handler::<S>))
        .with_state(service)
}

fn error_response(error: EnquiryError) -> Response {
    match error {
        EnquiryError::Validation { missing } => {
            let payload = json!({
                "success": false,
                "message": "required fields are missing",
                "missing": missing,
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        EnquiryError::InvalidProgram { .. } | EnquiryError::InvalidStatus { .. } => {
            let payload = json!({ "success": false, "message": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        EnquiryError::Duplicate(existing) => {
            let payload = json!({
                "success": false,
                "message": "an enquiry already exists for this email and program",
                "data": *existing,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        EnquiryError::Store(StoreError::NotFound) => {
            let payload = json!({ "success": false, "message": "enquiry not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        EnquiryError::Store(other) => {
            let payload = json!({ "success": false, "message": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<EnquiryService<S>>>,
    MaybeActor(actor): MaybeActor,
    axum::Json(draft): axum::Json<EnquiryDraft>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.create(draft, actor.as_ref()) {
        Ok(enquiry) => {
            let payload = json!({ "success": true, "data": enquiry });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) page: Option<usize>,
    pub(crate) limit: Option<usize>,
    pub(crate) status: Option<String>,
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<EnquiryService<S>>>,
    _admin: AdminActor,
    Path(program_type): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    let Some(program) = ProgramType::parse(&program_type) else {
        let payload = json!({
            "success": false,
            "message": format!("programType '{program_type}' must be one of UG, PG, PHD"),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    };

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match EnquiryStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                let payload = json!({
                    "success": false,
                    "message": format!("unknown status filter '{raw}'"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    let page = Page::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));
    match service.list_by_program(program, status, page) {
        Ok(result) => {
            let payload = json!({ "success": true, "data": result });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateBody {
    pub(crate) status: String,
}

pub(crate) async fn update_status_handler<S>(
    State(service): State<Arc<EnquiryService<S>>>,
    AdminActor(actor): AdminActor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<StatusUpdateBody>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.update_status(&EnquiryId(id), &body.status, &actor) {
        Ok(enquiry) => {
            let payload = json!({ "success": true, "data": enquiry });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn process_handler<S>(
    State(service): State<Arc<EnquiryService<S>>>,
    AdminActor(actor): AdminActor,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ProcessToAdmissionRequest>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.process_to_admission(&EnquiryId(id), request, &actor) {
        Ok(enquiry) => {
            let payload = json!({ "success": true, "data": enquiry });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<EnquiryService<S>>>,
    _admin: AdminActor,
    Path(id): Path<String>,
) -> Response
where
    S: AdmissionsStore + 'static,
{
    match service.delete(&EnquiryId(id)) {
        Ok(removed) => {
            let payload = json!({
                "success": true,
                "message": "enquiry and linked enrollments deleted",
                "data": removed,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
