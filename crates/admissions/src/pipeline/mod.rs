//! Admission and enrollment reconciliation pipeline.
//!
//! The pipeline is split along the collections of the backing document
//! store: enquiry intake and administration, enrollment records, the
//! installment ledger, admission confirmations, and the user/course
//! directory. `cohorts` and `dashboard` are the read-only reconciliation
//! layers that classify students and aggregate revenue across those
//! collections.

pub mod actor;
pub mod cohorts;
pub mod confirmation;
pub mod dashboard;
pub mod directory;
pub mod enquiry;
pub mod enrollment;
pub mod ledger;
pub mod memory;
pub mod store;

pub use actor::{
    ActorContext, AdminActor, MaybeActor, ACTOR_EMAIL_HEADER, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER,
};
pub use cohorts::{cohort_router, CohortFilter, CohortMember, CohortService, UgPgCohortPage};
pub use confirmation::{AdmissionConfirmation, ConfirmationId, ConfirmationStatus};
pub use dashboard::revenue;
pub use dashboard::{dashboard_router, DashboardService, DashboardStats};
pub use directory::{
    AccountType, Batch, BatchId, Course, CourseId, CourseProgress, CourseSection, PaymentDetails,
    PaymentStatus, UserAccount, UserId, UserType, UserTypeId, PHD_USER_TYPE, UGPG_COURSE_TAG,
};
pub use enquiry::{
    enquiry_router, AdmissionDetails, AdmissionEnquiry, EnquiryDraft, EnquiryError, EnquiryId,
    EnquiryNote, EnquiryService, EnquiryStatus, ProcessToAdmissionRequest, ProgramType,
};
pub use enrollment::{Enrollment, EnrollmentId, EnrollmentStatus};
pub use ledger::{
    Installment, InstallmentPlan, InstallmentStatus, LedgerError, LedgerService, PlanId, PlanStatus,
};
pub use memory::MemoryStore;
pub use store::{AdmissionsStore, CascadeSummary, Page, PageResult, StoreError};
