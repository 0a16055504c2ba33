use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::pipeline::actor::ActorContext;
use crate::pipeline::directory::{AccountType, UserId};
use crate::pipeline::enquiry::{EnquiryDraft, EnquiryService};
use crate::pipeline::memory::MemoryStore;

pub(super) fn admin_actor() -> ActorContext {
    ActorContext {
        id: UserId("adm-1".to_string()),
        email: "admissions-desk@example.edu".to_string(),
        account_type: AccountType::Admin,
    }
}

pub(super) fn student_actor(id: &str) -> ActorContext {
    ActorContext {
        id: UserId(id.to_string()),
        email: format!("{id}@example.edu"),
        account_type: AccountType::Student,
    }
}

pub(super) fn draft(email: &str, program: &str) -> EnquiryDraft {
    EnquiryDraft {
        name: Some("Asha Verma".to_string()),
        email: Some(email.to_string()),
        phone: Some("+91-9800000001".to_string()),
        program_type: Some(program.to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(2004, 6, 12),
        qualification: Some("Class XII".to_string()),
        board_school_name: Some("CBSE".to_string()),
        graduation_course: Some("B.Sc. Physics".to_string()),
        gender: Some("female".to_string()),
        percentage: Some(88.4),
        stream: Some("Science".to_string()),
    }
}

pub(super) fn build_service() -> (Arc<EnquiryService<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(EnquiryService::new(store.clone()));
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
