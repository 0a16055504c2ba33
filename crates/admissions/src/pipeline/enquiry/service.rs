use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    AdmissionDetails, AdmissionEnquiry, EnquiryDraft, EnquiryError, EnquiryId, EnquiryNote,
    EnquiryStatus, ProcessToAdmissionRequest, ProgramType,
};
use crate::pipeline::actor::ActorContext;
use crate::pipeline::directory::AccountType;
use crate::pipeline::enrollment::{Enrollment, EnrollmentId};
use crate::pipeline::store::{AdmissionsStore, Page, PageResult, StoreError};

static ENQUIRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ENROLLMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_enquiry_id() -> EnquiryId {
    let id = ENQUIRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EnquiryId(format!("enq-{id:06}"))
}

fn next_enrollment_id() -> EnrollmentId {
    let id = ENROLLMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EnrollmentId(format!("enr-{id:06}"))
}

/// Intake and administration over admission enquiries.
pub struct EnquiryService<S> {
    store: Arc<S>,
}

impl<S: AdmissionsStore> EnquiryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validates and persists a new enquiry. One enquiry per (email,
    /// program): a duplicate submission surfaces the existing record so the
    /// caller can branch. When a student actor is attached, a pending
    /// enrollment is created atomically with the enquiry.
    pub fn create(
        &self,
        draft: EnquiryDraft,
        actor: Option<&ActorContext>,
    ) -> Result<AdmissionEnquiry, EnquiryError> {
        let fields = draft.validate()?;

        if let Some(existing) = self
            .store
            .find_enquiry_by_email_and_program(&fields.email, fields.program_type)?
        {
            return Err(EnquiryError::Duplicate(Box::new(existing)));
        }

        let now = Utc::now();
        let student = actor.filter(|actor| actor.account_type == AccountType::Student);
        let enquiry = AdmissionEnquiry {
            id: next_enquiry_id(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            program_type: fields.program_type,
            date_of_birth: fields.date_of_birth,
            gender: fields.gender,
            last_class: fields.last_class,
            board_school_name: fields.board_school_name,
            percentage: fields.percentage,
            stream: fields.stream,
            graduation_course: fields.graduation_course,
            status: EnquiryStatus::New,
            notes: Vec::new(),
            admission_details: None,
            user: student.map(|actor| actor.id.clone()),
            created_at: now,
        };

        let enrollment = student.map(|actor| {
            Enrollment::pending(
                next_enrollment_id(),
                actor.id.clone(),
                fields.program_type,
                now,
            )
        });

        let stored = self
            .store
            .insert_enquiry_with_enrollment(enquiry, enrollment)?;
        info!(
            enquiry = %stored.id.0,
            program = stored.program_type.label(),
            "admission enquiry created"
        );
        Ok(stored)
    }

    /// Moves an enquiry to one of the reviewer-settable statuses and
    /// appends the audit note. Rejects before mutating anything.
    pub fn update_status(
        &self,
        id: &EnquiryId,
        raw_status: &str,
        actor: &ActorContext,
    ) -> Result<AdmissionEnquiry, EnquiryError> {
        let status = EnquiryStatus::parse(raw_status)
            .filter(|status| status.reviewer_settable())
            .ok_or_else(|| EnquiryError::InvalidStatus {
                raw: raw_status.to_string(),
            })?;

        let mut enquiry = self
            .store
            .fetch_enquiry(id)?
            .ok_or(StoreError::NotFound)?;

        enquiry.status = status;
        enquiry.notes.push(EnquiryNote {
            author: actor.email.clone(),
            body: format!("Status changed to {}", status.label()),
            recorded_at: Utc::now(),
        });

        self.store.update_enquiry(enquiry.clone())?;
        Ok(enquiry)
    }

    /// Overwrites the admission details wholesale and appends a note when
    /// one is provided. The review status is deliberately left untouched:
    /// processing never moves the review pipeline.
    pub fn process_to_admission(
        &self,
        id: &EnquiryId,
        request: ProcessToAdmissionRequest,
        actor: &ActorContext,
    ) -> Result<AdmissionEnquiry, EnquiryError> {
        let mut enquiry = self
            .store
            .fetch_enquiry(id)?
            .ok_or(StoreError::NotFound)?;

        let now = Utc::now();
        enquiry.admission_details = Some(AdmissionDetails {
            source: request.source,
            is_scholarship: request.is_scholarship,
            scholarship_type: request.scholarship_type,
            follow_up_date: request.follow_up_date,
            fee: request.fee,
            processed_by: actor.email.clone(),
            processed_at: now,
        });

        if let Some(body) = request.notes.filter(|body| !body.trim().is_empty()) {
            enquiry.notes.push(EnquiryNote {
                author: actor.email.clone(),
                body,
                recorded_at: now,
            });
        }

        self.store.update_enquiry(enquiry.clone())?;
        Ok(enquiry)
    }

    /// Hard-deletes the enquiry together with any enrollments it spawned.
    pub fn delete(&self, id: &EnquiryId) -> Result<AdmissionEnquiry, EnquiryError> {
        let removed = self.store.delete_enquiry_cascade(id)?;
        info!(enquiry = %removed.id.0, "admission enquiry deleted");
        Ok(removed)
    }

    /// Paginated program listing, newest first, optionally narrowed to one
    /// status.
    pub fn list_by_program(
        &self,
        program: ProgramType,
        status: Option<EnquiryStatus>,
        page: Page,
    ) -> Result<PageResult<AdmissionEnquiry>, EnquiryError> {
        let mut rows = self.store.enquiries_by_program(program)?;
        if let Some(status) = status {
            rows.retain(|row| row.status == status);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PageResult::paginate(rows, page))
    }
}
