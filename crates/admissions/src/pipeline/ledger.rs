//! Per-student, per-course installment ledger.
//!
//! Two transition families exist here and nowhere else in the pipeline:
//! installments flip Pending -> Overdue when their due date passes, and the
//! plan status is always derived (Completed when nothing remains, Defaulted
//! while any installment is overdue, Active otherwise). Plan status is never
//! settable from outside.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::directory::{CourseId, UserId};
use super::store::{AdmissionsStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Active,
    Completed,
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub number: u32,
    pub amount: u64,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
}

/// Reminder bookkeeping; nothing in the pipeline fires these on a timer,
/// the fields exist so a scheduler can pick up where the ledger left off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLog {
    pub sent: Vec<DateTime<Utc>>,
    pub last_sent: Option<DateTime<Utc>>,
    pub next_due: Option<NaiveDate>,
    pub grace_period_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPlan {
    pub id: PlanId,
    pub student: UserId,
    pub course: CourseId,
    pub total_amount: u64,
    pub paid_amount: u64,
    pub remaining_amount: u64,
    pub installments: Vec<Installment>,
    pub status: PlanStatus,
    pub reminders: ReminderLog,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("installment {number} not found on plan")]
    UnknownInstallment { number: u32 },
    #[error("installment {number} is already paid")]
    AlreadyPaid { number: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InstallmentPlan {
    /// Builds a fresh plan from a payment schedule of (amount, due date)
    /// pairs. Installments are numbered from 1 in schedule order.
    pub fn new(
        id: PlanId,
        student: UserId,
        course: CourseId,
        schedule: Vec<(u64, NaiveDate)>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let installments: Vec<Installment> = schedule
            .into_iter()
            .enumerate()
            .map(|(index, (amount, due_date))| Installment {
                number: index as u32 + 1,
                amount,
                due_date,
                status: InstallmentStatus::Pending,
                paid_at: None,
                payment_id: None,
                order_id: None,
            })
            .collect();
        let total_amount = installments.iter().map(|i| i.amount).sum();

        Self {
            id,
            student,
            course,
            total_amount,
            paid_amount: 0,
            remaining_amount: total_amount,
            installments,
            status: PlanStatus::Active,
            reminders: ReminderLog {
                grace_period_days: 0,
                ..ReminderLog::default()
            },
            created_at,
        }
    }

    /// The date the next reminder should go out: `lead_days` before the
    /// earliest pending due date. `None` once nothing is pending.
    pub fn next_reminder_date(&self, lead_days: i64) -> Option<NaiveDate> {
        self.installments
            .iter()
            .filter(|installment| installment.status == InstallmentStatus::Pending)
            .map(|installment| installment.due_date)
            .min()
            .map(|due| due - Duration::days(lead_days))
    }

    /// Applies the time-triggered transitions for `today` and re-derives the
    /// plan status. Returns whether anything changed, so callers know to
    /// persist.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let mut changed = false;
        for installment in &mut self.installments {
            if installment.status == InstallmentStatus::Pending && installment.due_date < today {
                installment.status = InstallmentStatus::Overdue;
                changed = true;
            }
        }

        let derived = self.derive_plan_status();
        if derived != self.status {
            self.status = derived;
            changed = true;
        }
        changed
    }

    /// Records a cleared payment against one installment. Keeps
    /// `remaining_amount == total_amount - paid_amount` true mechanically
    /// and re-derives the plan status.
    pub fn apply_payment(
        &mut self,
        number: u32,
        payment_id: impl Into<String>,
        order_id: impl Into<String>,
        paid_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let installment = self
            .installments
            .iter_mut()
            .find(|installment| installment.number == number)
            .ok_or(LedgerError::UnknownInstallment { number })?;

        if installment.status == InstallmentStatus::Paid {
            return Err(LedgerError::AlreadyPaid { number });
        }

        installment.status = InstallmentStatus::Paid;
        installment.paid_at = Some(paid_at);
        installment.payment_id = Some(payment_id.into());
        installment.order_id = Some(order_id.into());

        self.paid_amount = self
            .installments
            .iter()
            .filter(|installment| installment.status == InstallmentStatus::Paid)
            .map(|installment| installment.amount)
            .sum();
        self.remaining_amount = self.total_amount.saturating_sub(self.paid_amount);
        self.status = self.derive_plan_status();
        Ok(())
    }

    /// Logs a dispatched reminder and recomputes when the next one is due.
    pub fn mark_reminder_sent(&mut self, when: DateTime<Utc>, lead_days: i64) {
        self.reminders.sent.push(when);
        self.reminders.last_sent = Some(when);
        self.reminders.next_due = self.next_reminder_date(lead_days);
    }

    pub fn has_paid_installment(&self) -> bool {
        self.installments
            .iter()
            .any(|installment| installment.status == InstallmentStatus::Paid)
    }

    pub fn paid_installments(&self) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(|installment| installment.status == InstallmentStatus::Paid)
    }

    fn derive_plan_status(&self) -> PlanStatus {
        if self.remaining_amount == 0 {
            PlanStatus::Completed
        } else if self
            .installments
            .iter()
            .any(|installment| installment.status == InstallmentStatus::Overdue)
        {
            PlanStatus::Defaulted
        } else {
            PlanStatus::Active
        }
    }
}

/// Thin store-facing wrapper: plan lookups plus the sweep a scheduler (or
/// the demo) runs to roll overdue state forward.
pub struct LedgerService<S> {
    store: Arc<S>,
    reminder_lead_days: i64,
}

impl<S: AdmissionsStore> LedgerService<S> {
    pub fn new(store: Arc<S>, reminder_lead_days: i64) -> Self {
        Self {
            store,
            reminder_lead_days,
        }
    }

    /// Refreshes every plan against `today`, persisting only those that
    /// changed. Returns the number of plans updated.
    pub fn refresh_all(&self, today: NaiveDate) -> Result<usize, LedgerError> {
        let mut updated = 0;
        for mut plan in self.store.plans()? {
            if plan.refresh_status(today) {
                plan.reminders.next_due = plan.next_reminder_date(self.reminder_lead_days);
                self.store.update_plan(plan)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub fn plans_for_student(&self, student: &UserId) -> Result<Vec<InstallmentPlan>, LedgerError> {
        Ok(self.store.plans_for_student(student)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan() -> InstallmentPlan {
        InstallmentPlan::new(
            PlanId("plan-1".to_string()),
            UserId("stu-1".to_string()),
            CourseId("course-1".to_string()),
            vec![
                (10_000, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
                (10_000, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()),
                (5_000, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()),
            ],
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_plan_totals_schedule_and_starts_active() {
        let plan = plan();
        assert_eq!(plan.total_amount, 25_000);
        assert_eq!(plan.remaining_amount, 25_000);
        assert_eq!(plan.status, PlanStatus::Active);
        assert_eq!(plan.installments[2].number, 3);
    }

    #[test]
    fn past_due_pending_installment_becomes_overdue_and_plan_defaults() {
        let mut plan = plan();
        let changed = plan.refresh_status(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
        assert!(changed);
        assert_eq!(plan.installments[0].status, InstallmentStatus::Overdue);
        assert_eq!(plan.installments[1].status, InstallmentStatus::Pending);
        assert_eq!(plan.status, PlanStatus::Defaulted);
    }

    #[test]
    fn due_today_is_not_yet_overdue() {
        let mut plan = plan();
        let changed = plan.refresh_status(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert!(!changed);
        assert_eq!(plan.installments[0].status, InstallmentStatus::Pending);
        assert_eq!(plan.status, PlanStatus::Active);
    }

    #[test]
    fn next_reminder_is_three_days_before_earliest_pending() {
        let plan = plan();
        assert_eq!(
            plan.next_reminder_date(3),
            Some(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap())
        );
    }

    #[test]
    fn next_reminder_is_none_once_nothing_pending() {
        let mut plan = plan();
        let paid_at = Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap();
        for number in 1..=3 {
            plan.apply_payment(number, format!("pay-{number}"), format!("ord-{number}"), paid_at)
                .expect("payment applies");
        }
        assert_eq!(plan.next_reminder_date(3), None);
    }

    #[test]
    fn apply_payment_keeps_remaining_invariant_and_completes_plan() {
        let mut plan = plan();
        let paid_at = Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap();

        plan.apply_payment(1, "pay-1", "ord-1", paid_at).expect("first payment");
        assert_eq!(plan.paid_amount, 10_000);
        assert_eq!(plan.remaining_amount, 15_000);
        assert_eq!(plan.status, PlanStatus::Active);
        assert!(plan.has_paid_installment());

        plan.apply_payment(2, "pay-2", "ord-2", paid_at).expect("second payment");
        plan.apply_payment(3, "pay-3", "ord-3", paid_at).expect("final payment");
        assert_eq!(plan.remaining_amount, 0);
        assert_eq!(plan.status, PlanStatus::Completed);
    }

    #[test]
    fn paying_an_overdue_installment_clears_the_default() {
        let mut plan = plan();
        plan.refresh_status(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
        assert_eq!(plan.status, PlanStatus::Defaulted);

        let paid_at = Utc.with_ymd_and_hms(2026, 1, 21, 9, 0, 0).unwrap();
        plan.apply_payment(1, "pay-1", "ord-1", paid_at).expect("late payment");
        assert_eq!(plan.status, PlanStatus::Active);
    }

    #[test]
    fn double_payment_is_rejected() {
        let mut plan = plan();
        let paid_at = Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap();
        plan.apply_payment(1, "pay-1", "ord-1", paid_at).expect("payment applies");
        match plan.apply_payment(1, "pay-1b", "ord-1b", paid_at) {
            Err(LedgerError::AlreadyPaid { number: 1 }) => {}
            other => panic!("expected already-paid error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_installment_is_rejected() {
        let mut plan = plan();
        let paid_at = Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap();
        match plan.apply_payment(9, "pay-9", "ord-9", paid_at) {
            Err(LedgerError::UnknownInstallment { number: 9 }) => {}
            other => panic!("expected unknown-installment error, got {other:?}"),
        }
    }

    #[test]
    fn reminder_log_tracks_dispatches() {
        let mut plan = plan();
        let when = Utc.with_ymd_and_hms(2026, 1, 12, 8, 0, 0).unwrap();
        plan.mark_reminder_sent(when, 3);
        assert_eq!(plan.reminders.sent.len(), 1);
        assert_eq!(plan.reminders.last_sent, Some(when));
        assert_eq!(
            plan.reminders.next_due,
            Some(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap())
        );
    }
}
