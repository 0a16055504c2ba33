//! Admission confirmation records.
//!
//! A `Confirmed` record is the authoritative proof that a student's course
//! fee cleared; the cohort and dashboard layers treat it as the
//! highest-priority evidence source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::{CourseId, PaymentDetails, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfirmationId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionConfirmation {
    pub id: ConfirmationId,
    pub student: UserId,
    pub course: CourseId,
    pub status: ConfirmationStatus,
    pub payment: PaymentDetails,
    pub created_at: DateTime<Utc>,
}

impl AdmissionConfirmation {
    pub fn is_confirmed(&self) -> bool {
        self.status == ConfirmationStatus::Confirmed
    }
}
