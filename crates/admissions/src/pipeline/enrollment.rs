//! Per-user program application records.
//!
//! An enrollment tracks the review status of one application, independent of
//! any fee payment. A user can accumulate several records over time; the
//! most recently created one is authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::UserId;
use super::enquiry::ProgramType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnrollmentId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user: UserId,
    pub program_type: ProgramType,
    pub status: EnrollmentStatus,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Fresh pending application, as created alongside an authenticated
    /// enquiry submission.
    pub fn pending(id: EnrollmentId, user: UserId, program_type: ProgramType, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user,
            program_type,
            status: EnrollmentStatus::Pending,
            rejection_reason: None,
            applied_at: now,
            approved_at: None,
            approved_by: None,
            created_at: now,
        }
    }
}

/// Resolves a user's current application: latest `created_at` wins.
pub fn current_enrollment<'a, I>(records: I) -> Option<&'a Enrollment>
where
    I: IntoIterator<Item = &'a Enrollment>,
{
    records.into_iter().max_by_key(|record| record.created_at)
}
