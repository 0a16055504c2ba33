use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::{CohortFilter, CohortService};
use crate::pipeline::actor::AdminActor;
use crate::pipeline::directory::{AccountType, CourseId};
use crate::pipeline::store::{AdmissionsStore, Page, StoreError};

/// Router builder exposing the admin cohort queries.
pub fn cohort_router<S>(service: Arc<CohortService<S>>) -> Router
where
    S: AdmissionsStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/registered-students",
            get(registered_handler::<S>),
        )
        .route("/api/v1/admin/course-students", get(course_handler::<S>))
        .route(
            "/api/v1/admin/enrolled-students",
            get(fee_paid_handler::<S>),
        )
        .route(
            "/api/v1/admin/ugpg-enrolled-students",
            get(ugpg_handler::<S>),
        )
        .route(
            "/api/v1/admin/phd-enrolled-students",
            get(phd_enrolled_handler::<S>),
        )
        .route(
            "/api/v1/admin/phd-enrollment-paid-students",
            get(phd_fee_paid_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CohortQuery {
    pub(crate) page: Option<usize>,
    pub(crate) limit: Option<usize>,
    pub(crate) search: Option<String>,
    pub(crate) role: Option<String>,
    pub(crate) course: Option<String>,
}

impl CohortQuery {
    fn page(&self) -> Page {
        Page::new(self.page.unwrap_or(1), self.limit.unwrap_or(10))
    }

    fn filter(&self) -> Result<CohortFilter, Response> {
        let role = match self.role.as_deref() {
            None => None,
            Some(raw) => match AccountType::parse(raw) {
                Some(role) => Some(role),
                None => {
                    let payload = json!({
                        "success": false,
                        "message": format!("unknown role filter '{raw}'"),
                    });
                    return Err((StatusCode::BAD_REQUEST, axum::Json(payload)).into_response());
                }
            },
        };

        Ok(CohortFilter {
            role,
            course: self.course.clone().map(CourseId),
            search: self.search.clone(),
        })
    }
}

fn store_error_response(error: StoreError) -> Response {
    let payload = json!({ "success": false, "message": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

macro_rules! cohort_handler {
    ($name:ident, $method:ident) => {
        pub(crate) async fn $name<S>(
            State(service): State<Arc<CohortService<S>>>,
            _admin: AdminActor,
            Query(query): Query<CohortQuery>,
        ) -> Response
        where
            S: AdmissionsStore + 'static,
        {
            let filter = match query.filter() {
                Ok(filter) => filter,
                Err(rejection) => return rejection,
            };
            match service.$method(&filter, query.page()) {
                Ok(result) => {
                    let payload = json!({ "success": true, "data": result });
                    (StatusCode::OK, axum::Json(payload)).into_response()
                }
                Err(error) => store_error_response(error),
            }
        }
    };
}

cohort_handler!(registered_handler, registered);
cohort_handler!(course_handler, course_enrolled);
cohort_handler!(fee_paid_handler, enrollment_fee_paid);
cohort_handler!(ugpg_handler, ugpg_enrolled);
cohort_handler!(phd_enrolled_handler, phd_enrolled);
cohort_handler!(phd_fee_paid_handler, phd_enrollment_paid);
