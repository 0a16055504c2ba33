//! User, course, and batch records shared across the pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Canonical form used when ids sourced from different collections are
    /// set-unioned.
    pub fn normalized(&self) -> &str {
        self.0.trim()
    }
}

/// Identifier wrapper for user-type classifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserTypeId(pub String);

/// Identifier wrapper for courses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(pub String);

/// Identifier wrapper for batches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub String);

/// Name of the user type gating the PhD cohorts.
pub const PHD_USER_TYPE: &str = "PhD";

/// Tag carried by courses that count toward the UG/PG cohort.
pub const UGPG_COURSE_TAG: &str = "UGPG";

/// Platform roles as forwarded by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Student,
    Instructor,
    Admin,
    SuperAdmin,
}

impl AccountType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "instructor" => Some(Self::Instructor),
            "admin" => Some(Self::Admin),
            "superadmin" | "super_admin" | "super-admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AccountType::Student => "Student",
            AccountType::Instructor => "Instructor",
            AccountType::Admin => "Admin",
            AccountType::SuperAdmin => "SuperAdmin",
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, AccountType::Admin | AccountType::SuperAdmin)
    }
}

/// Enrollment-fee settlement state denormalized onto the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Payment evidence embedded in user and confirmation records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub amount: u64,
    pub paid_at: DateTime<Utc>,
}

/// The slice of the platform user record the reconciliation layer reads.
///
/// `enrollment_fee_paid`, `payment_status`, and `payment_details` are legacy
/// denormalized flags: they are the lowest-priority evidence source when no
/// dedicated confirmation or installment record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
    pub enrollment_fee_paid: bool,
    pub payment_status: PaymentStatus,
    pub payment_details: Option<PaymentDetails>,
    pub user_type: Option<UserTypeId>,
    pub courses: Vec<CourseId>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Both denormalized flags must agree before the legacy record counts as
    /// a settled enrollment fee.
    pub fn enrollment_fee_cleared(&self) -> bool {
        self.enrollment_fee_paid && self.payment_status == PaymentStatus::Completed
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.email.to_lowercase().contains(&needle)
    }
}

/// Named classifier attached to user accounts (e.g. "PhD").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserType {
    pub id: UserTypeId,
    pub name: String,
}

/// Section of a course; lecture counts feed completion classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSection {
    pub title: String,
    pub lectures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub tag: Option<String>,
    pub sections: Vec<CourseSection>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn total_lectures(&self) -> u32 {
        self.sections.iter().map(|section| section.lectures).sum()
    }

    pub fn is_ugpg(&self) -> bool {
        self.tag.as_deref() == Some(UGPG_COURSE_TAG)
    }
}

/// Per-user, per-course viewing progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub user: UserId,
    pub course: CourseId,
    pub done_videos: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
    pub course: CourseId,
    pub students: Vec<UserId>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Classification used by the dashboard batch card.
    pub fn schedule_state(&self, today: NaiveDate) -> BatchScheduleState {
        if self.starts_on > today {
            BatchScheduleState::Upcoming
        } else if self.ends_on.is_some_and(|ends| ends < today) {
            BatchScheduleState::Completed
        } else {
            BatchScheduleState::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchScheduleState {
    Upcoming,
    Active,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(flags: (bool, PaymentStatus)) -> UserAccount {
        UserAccount {
            id: UserId("u-1".to_string()),
            name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            account_type: AccountType::Student,
            enrollment_fee_paid: flags.0,
            payment_status: flags.1,
            payment_details: None,
            user_type: None,
            courses: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn fee_cleared_requires_both_flags() {
        assert!(user((true, PaymentStatus::Completed)).enrollment_fee_cleared());
        assert!(!user((true, PaymentStatus::Pending)).enrollment_fee_cleared());
        assert!(!user((false, PaymentStatus::Completed)).enrollment_fee_cleared());
    }

    #[test]
    fn search_matches_name_or_email_case_insensitively() {
        let account = user((false, PaymentStatus::Pending));
        assert!(account.matches_search("ASHA"));
        assert!(account.matches_search("@example"));
        assert!(!account.matches_search("priya"));
    }

    #[test]
    fn batch_schedule_classification() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let mut batch = Batch {
            id: BatchId("b-1".to_string()),
            name: "Spring UG".to_string(),
            course: CourseId("c-1".to_string()),
            students: Vec::new(),
            starts_on: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            ends_on: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        assert_eq!(batch.schedule_state(today), BatchScheduleState::Upcoming);

        batch.starts_on = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(batch.schedule_state(today), BatchScheduleState::Active);

        batch.ends_on = Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(batch.schedule_state(today), BatchScheduleState::Completed);
    }
}
