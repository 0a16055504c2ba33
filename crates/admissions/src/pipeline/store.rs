//! Storage abstraction over the document-store collections.
//!
//! Most operations map one-to-one onto a single collection. The three
//! `*_cascade`/compound operations are the places the original system left
//! multi-document writes non-transactional; here they are part of the store
//! contract and implementations must make them all-or-nothing.

use serde::Serialize;

use super::confirmation::AdmissionConfirmation;
use super::directory::{Batch, Course, CourseProgress, UserAccount, UserId, UserType};
use super::enquiry::{AdmissionEnquiry, EnquiryId, ProgramType};
use super::enrollment::Enrollment;
use super::ledger::{InstallmentPlan, PlanId};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Paginated query result.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

impl<T> PageResult<T> {
    /// Slices an already-filtered, already-ordered result set. An empty set
    /// still reports one page, so `page <= pages` holds for the first page.
    pub fn paginate(items: Vec<T>, page: Page) -> Self {
        let total = items.len();
        let pages = total.div_ceil(page.limit).max(1);
        let items = items
            .into_iter()
            .skip((page.page - 1) * page.limit)
            .take(page.limit)
            .collect();
        Self {
            items,
            total,
            page: page.page,
            pages,
        }
    }
}

/// Counts of the records touched by a student cascade delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSummary {
    pub batches_unassigned: usize,
    pub progress_deleted: usize,
    pub confirmations_deleted: usize,
    pub plans_deleted: usize,
    pub courses_unlinked: usize,
}

/// Store contract covering every collection the pipeline reads or writes.
pub trait AdmissionsStore: Send + Sync {
    // Enquiries. The insert is compound: when an enrollment accompanies the
    // enquiry, both persist or neither does.
    fn insert_enquiry_with_enrollment(
        &self,
        enquiry: AdmissionEnquiry,
        enrollment: Option<Enrollment>,
    ) -> Result<AdmissionEnquiry, StoreError>;
    fn fetch_enquiry(&self, id: &EnquiryId) -> Result<Option<AdmissionEnquiry>, StoreError>;
    fn find_enquiry_by_email_and_program(
        &self,
        email: &str,
        program: ProgramType,
    ) -> Result<Option<AdmissionEnquiry>, StoreError>;
    fn update_enquiry(&self, enquiry: AdmissionEnquiry) -> Result<(), StoreError>;
    /// Deletes the enquiry and any enrollments sharing its (user, program),
    /// all-or-nothing. Returns the removed enquiry.
    fn delete_enquiry_cascade(&self, id: &EnquiryId) -> Result<AdmissionEnquiry, StoreError>;
    fn enquiries_by_program(&self, program: ProgramType) -> Result<Vec<AdmissionEnquiry>, StoreError>;

    // Enrollments.
    fn insert_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError>;
    fn enrollments_for_user(&self, user: &UserId) -> Result<Vec<Enrollment>, StoreError>;

    // Installment plans.
    fn insert_plan(&self, plan: InstallmentPlan) -> Result<(), StoreError>;
    fn update_plan(&self, plan: InstallmentPlan) -> Result<(), StoreError>;
    fn fetch_plan(&self, id: &PlanId) -> Result<Option<InstallmentPlan>, StoreError>;
    fn plans(&self) -> Result<Vec<InstallmentPlan>, StoreError>;
    fn plans_for_student(&self, student: &UserId) -> Result<Vec<InstallmentPlan>, StoreError>;

    // Admission confirmations.
    fn insert_confirmation(&self, confirmation: AdmissionConfirmation) -> Result<(), StoreError>;
    fn confirmations(&self) -> Result<Vec<AdmissionConfirmation>, StoreError>;

    // Users.
    fn insert_user(&self, user: UserAccount) -> Result<(), StoreError>;
    fn update_user(&self, user: UserAccount) -> Result<(), StoreError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError>;
    fn users(&self) -> Result<Vec<UserAccount>, StoreError>;
    /// Removes a student and every dependent record (batch memberships,
    /// progress, confirmations, plans, course links), all-or-nothing.
    /// Non-student accounts are removed without a cascade.
    fn remove_student_cascade(&self, id: &UserId) -> Result<CascadeSummary, StoreError>;

    // User types.
    fn user_type_by_name(&self, name: &str) -> Result<Option<UserType>, StoreError>;
    /// Provisioning hook: creates the named type when absent. Called at
    /// startup, never from read handlers.
    fn ensure_user_type(&self, name: &str) -> Result<UserType, StoreError>;

    // Courses, progress, batches.
    fn insert_course(&self, course: Course) -> Result<(), StoreError>;
    fn courses(&self) -> Result<Vec<Course>, StoreError>;
    fn insert_progress(&self, progress: CourseProgress) -> Result<(), StoreError>;
    fn progress_records(&self) -> Result<Vec<CourseProgress>, StoreError>;
    fn insert_batch(&self, batch: Batch) -> Result<(), StoreError>;
    fn batches(&self) -> Result<Vec<Batch>, StoreError>;
}
