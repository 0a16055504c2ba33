//! Read-only cohort reconciliation.
//!
//! "Is this student enrolled" has no single source of truth: it is
//! reconstructed at query time from user flags, admission confirmations,
//! and course tags. Every query here classifies the `users` collection with
//! a different filter combination; none of them mutates state.

pub mod router;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::directory::{AccountType, CourseId, UserAccount, UserTypeId, PHD_USER_TYPE};
use super::store::{AdmissionsStore, Page, PageResult, StoreError};

pub use router::cohort_router;

/// Optional narrowing applied on top of a cohort's base filter.
#[derive(Debug, Clone, Default)]
pub struct CohortFilter {
    pub role: Option<AccountType>,
    pub course: Option<CourseId>,
    pub search: Option<String>,
}

/// Sanitized member view exposed to the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub account_type: &'static str,
    pub enrollment_fee_paid: bool,
    pub course_count: usize,
}

impl CohortMember {
    fn from_user(user: &UserAccount) -> Self {
        Self {
            id: user.id.0.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            account_type: user.account_type.label(),
            enrollment_fee_paid: user.enrollment_fee_cleared(),
            course_count: user.courses.len(),
        }
    }
}

/// UG/PG cohort page; carries the bootstrap flag for the missing PhD type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgPgCohortPage {
    #[serde(flatten)]
    pub page: PageResult<CohortMember>,
    /// True when no "PhD" user type exists yet: the PhD-exclusion clause is
    /// then omitted entirely and every fee-paid UG/PG course student
    /// passes, PhD students included.
    pub phd_type_missing: bool,
}

pub struct CohortService<S> {
    store: Arc<S>,
}

impl<S: AdmissionsStore> CohortService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every registered account, optionally narrowed by role and search.
    pub fn registered(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<PageResult<CohortMember>, StoreError> {
        self.classify(filter, page, |_| true)
    }

    /// Student accounts holding at least one course, optionally one course
    /// in particular.
    pub fn course_enrolled(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<PageResult<CohortMember>, StoreError> {
        let course = filter.course.clone();
        self.classify(filter, page, move |user| {
            user.account_type == AccountType::Student
                && match &course {
                    Some(course) => user.courses.contains(course),
                    None => !user.courses.is_empty(),
                }
        })
    }

    /// Students whose enrollment fee has settled per the denormalized user
    /// flags.
    pub fn enrollment_fee_paid(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<PageResult<CohortMember>, StoreError> {
        self.classify(filter, page, |user| {
            user.account_type == AccountType::Student && user.enrollment_fee_cleared()
        })
    }

    /// Fee-paid students enrolled in a UG/PG-tagged course, excluding PhD
    /// students when the PhD user type exists. When it does not, the
    /// exclusion clause is omitted (preserved bootstrap behavior, flagged
    /// in the response).
    pub fn ugpg_enrolled(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<UgPgCohortPage, StoreError> {
        let phd_type = self.store.user_type_by_name(PHD_USER_TYPE)?;
        let phd_type_missing = phd_type.is_none();
        if phd_type_missing {
            warn!("no PhD user type exists; UG/PG cohort cannot exclude PhD students");
        }
        let phd_id = phd_type.map(|user_type| user_type.id);

        let ugpg_courses: BTreeSet<CourseId> = self
            .store
            .courses()?
            .into_iter()
            .filter(|course| course.is_ugpg())
            .map(|course| course.id)
            .collect();

        let result = self.classify(filter, page, move |user| {
            user.account_type == AccountType::Student
                && user.enrollment_fee_cleared()
                && user.courses.iter().any(|course| ugpg_courses.contains(course))
                && excludes_phd(user, phd_id.as_ref())
        })?;

        Ok(UgPgCohortPage {
            page: result,
            phd_type_missing,
        })
    }

    /// Fully enrolled PhD students: PhD type, fee paid, and a Confirmed
    /// admission on record. Zero confirmations means a deliberately empty
    /// cohort, never a fallback to the fee-paid set.
    pub fn phd_enrolled(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<PageResult<CohortMember>, StoreError> {
        let confirmed: BTreeSet<String> = self
            .store
            .confirmations()?
            .iter()
            .filter(|confirmation| confirmation.is_confirmed())
            .map(|confirmation| confirmation.student.normalized().to_string())
            .collect();

        let phd_id = self
            .store
            .user_type_by_name(PHD_USER_TYPE)?
            .map(|user_type| user_type.id);

        self.classify(filter, page, move |user| {
            is_phd(user, phd_id.as_ref())
                && user.enrollment_fee_cleared()
                && confirmed.contains(user.id.normalized())
        })
    }

    /// PhD students who have paid the enrollment fee, with or without a
    /// course-fee confirmation.
    pub fn phd_enrollment_paid(
        &self,
        filter: &CohortFilter,
        page: Page,
    ) -> Result<PageResult<CohortMember>, StoreError> {
        let phd_id = self
            .store
            .user_type_by_name(PHD_USER_TYPE)?
            .map(|user_type| user_type.id);

        self.classify(filter, page, move |user| {
            is_phd(user, phd_id.as_ref()) && user.enrollment_fee_cleared()
        })
    }

    fn classify<F>(
        &self,
        filter: &CohortFilter,
        page: Page,
        base: F,
    ) -> Result<PageResult<CohortMember>, StoreError>
    where
        F: Fn(&UserAccount) -> bool,
    {
        let mut users = self.store.users()?;
        users.retain(|user| {
            base(user)
                && filter.role.map_or(true, |role| user.account_type == role)
                && filter
                    .search
                    .as_deref()
                    .map_or(true, |needle| user.matches_search(needle))
        });
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let members = users.iter().map(CohortMember::from_user).collect();
        Ok(PageResult::paginate(members, page))
    }
}

fn is_phd(user: &UserAccount, phd_id: Option<&UserTypeId>) -> bool {
    match phd_id {
        Some(phd_id) => user.user_type.as_ref() == Some(phd_id),
        None => false,
    }
}

/// No user type at all also passes; only an explicit PhD type is excluded.
fn excludes_phd(user: &UserAccount, phd_id: Option<&UserTypeId>) -> bool {
    match (phd_id, &user.user_type) {
        (Some(phd_id), Some(user_type)) => user_type != phd_id,
        _ => true,
    }
}
