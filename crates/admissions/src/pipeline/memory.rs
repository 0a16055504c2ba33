//! In-process implementation of [`AdmissionsStore`].
//!
//! All collections live behind one mutex, so the compound operations get
//! their all-or-nothing guarantee by validating before mutating under a
//! single lock. A database-backed store would map the same contract onto
//! sessions/transactions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::confirmation::{AdmissionConfirmation, ConfirmationId};
use super::directory::{
    AccountType, Batch, BatchId, Course, CourseId, CourseProgress, UserAccount, UserId, UserType,
    UserTypeId,
};
use super::enquiry::{AdmissionEnquiry, EnquiryId, ProgramType};
use super::enrollment::{Enrollment, EnrollmentId};
use super::ledger::{InstallmentPlan, PlanId};
use super::store::{AdmissionsStore, CascadeSummary, StoreError};

#[derive(Default)]
struct State {
    enquiries: BTreeMap<EnquiryId, AdmissionEnquiry>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    plans: BTreeMap<PlanId, InstallmentPlan>,
    confirmations: BTreeMap<ConfirmationId, AdmissionConfirmation>,
    users: BTreeMap<UserId, UserAccount>,
    user_types: BTreeMap<UserTypeId, UserType>,
    courses: BTreeMap<CourseId, Course>,
    progress: Vec<CourseProgress>,
    batches: BTreeMap<BatchId, Batch>,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    type_sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl AdmissionsStore for MemoryStore {
    fn insert_enquiry_with_enrollment(
        &self,
        enquiry: AdmissionEnquiry,
        enrollment: Option<Enrollment>,
    ) -> Result<AdmissionEnquiry, StoreError> {
        let mut state = self.lock()?;
        if state.enquiries.contains_key(&enquiry.id) {
            return Err(StoreError::Conflict);
        }
        if let Some(enrollment) = &enrollment {
            if state.enrollments.contains_key(&enrollment.id) {
                return Err(StoreError::Conflict);
            }
        }

        state.enquiries.insert(enquiry.id.clone(), enquiry.clone());
        if let Some(enrollment) = enrollment {
            state.enrollments.insert(enrollment.id.clone(), enrollment);
        }
        Ok(enquiry)
    }

    fn fetch_enquiry(&self, id: &EnquiryId) -> Result<Option<AdmissionEnquiry>, StoreError> {
        Ok(self.lock()?.enquiries.get(id).cloned())
    }

    fn find_enquiry_by_email_and_program(
        &self,
        email: &str,
        program: ProgramType,
    ) -> Result<Option<AdmissionEnquiry>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .enquiries
            .values()
            .find(|enquiry| {
                enquiry.program_type == program && enquiry.email.eq_ignore_ascii_case(email)
            })
            .cloned())
    }

    fn update_enquiry(&self, enquiry: AdmissionEnquiry) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.enquiries.contains_key(&enquiry.id) {
            return Err(StoreError::NotFound);
        }
        state.enquiries.insert(enquiry.id.clone(), enquiry);
        Ok(())
    }

    fn delete_enquiry_cascade(&self, id: &EnquiryId) -> Result<AdmissionEnquiry, StoreError> {
        let mut state = self.lock()?;
        let enquiry = state.enquiries.remove(id).ok_or(StoreError::NotFound)?;
        if let Some(user) = &enquiry.user {
            let program = enquiry.program_type;
            state
                .enrollments
                .retain(|_, record| !(record.user == *user && record.program_type == program));
        }
        Ok(enquiry)
    }

    fn enquiries_by_program(
        &self,
        program: ProgramType,
    ) -> Result<Vec<AdmissionEnquiry>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .enquiries
            .values()
            .filter(|enquiry| enquiry.program_type == program)
            .cloned()
            .collect())
    }

    fn insert_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.enrollments.contains_key(&enrollment.id) {
            return Err(StoreError::Conflict);
        }
        state.enrollments.insert(enrollment.id.clone(), enrollment);
        Ok(())
    }

    fn enrollments_for_user(&self, user: &UserId) -> Result<Vec<Enrollment>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .enrollments
            .values()
            .filter(|record| record.user == *user)
            .cloned()
            .collect())
    }

    fn insert_plan(&self, plan: InstallmentPlan) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.plans.contains_key(&plan.id) {
            return Err(StoreError::Conflict);
        }
        state.plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    fn update_plan(&self, plan: InstallmentPlan) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.plans.contains_key(&plan.id) {
            return Err(StoreError::NotFound);
        }
        state.plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    fn fetch_plan(&self, id: &PlanId) -> Result<Option<InstallmentPlan>, StoreError> {
        Ok(self.lock()?.plans.get(id).cloned())
    }

    fn plans(&self) -> Result<Vec<InstallmentPlan>, StoreError> {
        Ok(self.lock()?.plans.values().cloned().collect())
    }

    fn plans_for_student(&self, student: &UserId) -> Result<Vec<InstallmentPlan>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .plans
            .values()
            .filter(|plan| plan.student == *student)
            .cloned()
            .collect())
    }

    fn insert_confirmation(&self, confirmation: AdmissionConfirmation) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.confirmations.contains_key(&confirmation.id) {
            return Err(StoreError::Conflict);
        }
        state
            .confirmations
            .insert(confirmation.id.clone(), confirmation);
        Ok(())
    }

    fn confirmations(&self) -> Result<Vec<AdmissionConfirmation>, StoreError> {
        Ok(self.lock()?.confirmations.values().cloned().collect())
    }

    fn insert_user(&self, user: UserAccount) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.users.contains_key(&user.id) {
            return Err(StoreError::Conflict);
        }
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn update_user(&self, user: UserAccount) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    fn users(&self) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn remove_student_cascade(&self, id: &UserId) -> Result<CascadeSummary, StoreError> {
        let mut state = self.lock()?;
        let user = state.users.get(id).ok_or(StoreError::NotFound)?;

        // Non-students have no dependent admission records to unwind.
        if user.account_type != AccountType::Student {
            state.users.remove(id);
            return Ok(CascadeSummary::default());
        }

        let mut summary = CascadeSummary {
            courses_unlinked: user.courses.len(),
            ..CascadeSummary::default()
        };

        for batch in state.batches.values_mut() {
            let before = batch.students.len();
            batch.students.retain(|student| student != id);
            if batch.students.len() < before {
                summary.batches_unassigned += 1;
            }
        }

        let before = state.progress.len();
        state.progress.retain(|record| record.user != *id);
        summary.progress_deleted = before - state.progress.len();

        let before = state.confirmations.len();
        state
            .confirmations
            .retain(|_, record| record.student != *id);
        summary.confirmations_deleted = before - state.confirmations.len();

        let before = state.plans.len();
        state.plans.retain(|_, plan| plan.student != *id);
        summary.plans_deleted = before - state.plans.len();

        state.users.remove(id);

        Ok(summary)
    }

    fn user_type_by_name(&self, name: &str) -> Result<Option<UserType>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .user_types
            .values()
            .find(|user_type| user_type.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    fn ensure_user_type(&self, name: &str) -> Result<UserType, StoreError> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .user_types
            .values()
            .find(|user_type| user_type.name.eq_ignore_ascii_case(name))
        {
            return Ok(existing.clone());
        }

        let sequence = self.type_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let user_type = UserType {
            id: UserTypeId(format!("utype-{sequence:03}")),
            name: name.to_string(),
        };
        state
            .user_types
            .insert(user_type.id.clone(), user_type.clone());
        Ok(user_type)
    }

    fn insert_course(&self, course: Course) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.courses.contains_key(&course.id) {
            return Err(StoreError::Conflict);
        }
        state.courses.insert(course.id.clone(), course);
        Ok(())
    }

    fn courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.lock()?.courses.values().cloned().collect())
    }

    fn insert_progress(&self, progress: CourseProgress) -> Result<(), StoreError> {
        self.lock()?.progress.push(progress);
        Ok(())
    }

    fn progress_records(&self) -> Result<Vec<CourseProgress>, StoreError> {
        Ok(self.lock()?.progress.clone())
    }

    fn insert_batch(&self, batch: Batch) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.batches.contains_key(&batch.id) {
            return Err(StoreError::Conflict);
        }
        state.batches.insert(batch.id.clone(), batch);
        Ok(())
    }

    fn batches(&self) -> Result<Vec<Batch>, StoreError> {
        Ok(self.lock()?.batches.values().cloned().collect())
    }
}
