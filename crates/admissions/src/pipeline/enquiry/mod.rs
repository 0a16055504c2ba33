//! Admission enquiry intake and administration.
//!
//! Public submissions become lead records here; admins move them through
//! the review statuses, process them toward admission, or delete them
//! (cascading to the enrollments they spawned).

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdmissionDetails, AdmissionEnquiry, EnquiryDraft, EnquiryError, EnquiryId, EnquiryNote,
    EnquiryStatus, ProcessToAdmissionRequest, ProgramType,
};
pub use router::enquiry_router;
pub use service::EnquiryService;
