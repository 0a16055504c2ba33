//! Admin dashboard statistics aggregator.
//!
//! One request recomputes everything: creation deltas over trailing 30-day
//! windows, revenue and purchase series under the evidence precedence from
//! [`revenue`], completion classification, and the deduplicated
//! total-enrolled union. Either the whole object is produced or the request
//! fails; there are no partial results.

pub mod revenue;
pub mod router;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use super::directory::{AccountType, BatchScheduleState, CourseId};
use super::store::{AdmissionsStore, StoreError};
use revenue::{
    amount_series, count_series, first_with_data, merge_amounts, pct, FeeEvidence, MonthKey,
    MonthlyAmount, MonthlyCount,
};

pub use router::dashboard_router;

/// Trailing-window creation count with its percent delta.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDelta {
    pub current: u64,
    pub previous: u64,
    pub change_pct: f64,
}

impl WindowDelta {
    fn from_counts(current: u64, previous: u64) -> Self {
        Self {
            current,
            previous,
            change_pct: pct(current, previous),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCards {
    pub courses: WindowDelta,
    pub batches: WindowDelta,
    pub students: WindowDelta,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub completed_courses: u64,
    pub pending_courses: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStats {
    pub monthly_earnings: Vec<MonthlyAmount>,
    pub total_revenue: u64,
    /// Which evidence source supplied the course-fee share of the series.
    pub course_fee_source: FeeEvidence,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub monthly_purchases: Vec<MonthlyCount>,
    pub total_purchases: u64,
    pub purchase_source: FeeEvidence,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsStats {
    pub total_courses: u64,
    pub total_batches: u64,
    pub total_students: u64,
    /// Cardinality of the three-source student-id union; a student with a
    /// confirmation, a paid installment, and the legacy flags counts once.
    pub total_students_enrolled: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub upcoming: u64,
    pub active: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub cards: DashboardCards,
    pub learning: LearningStats,
    pub revenue: RevenueStats,
    pub students: StudentStats,
    pub totals: TotalsStats,
    pub batch: BatchStats,
}

pub struct DashboardService<S> {
    store: Arc<S>,
}

fn month_key(at: DateTime<Utc>) -> MonthKey {
    MonthKey {
        year: at.year(),
        month: at.month(),
    }
}

fn window_counts<I>(timestamps: I, now: DateTime<Utc>) -> (u64, u64)
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let window = Duration::days(30);
    let current_start = now - window;
    let previous_start = now - window - window;

    let mut current = 0;
    let mut previous = 0;
    for at in timestamps {
        if at > current_start && at <= now {
            current += 1;
        } else if at > previous_start && at <= current_start {
            previous += 1;
        }
    }
    (current, previous)
}

impl<S: AdmissionsStore> DashboardService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Computes the full dashboard object as of `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, StoreError> {
        let users = self.store.users()?;
        let courses = self.store.courses()?;
        let batches = self.store.batches()?;
        let plans = self.store.plans()?;
        let confirmations = self.store.confirmations()?;
        let progress = self.store.progress_records()?;

        let students: Vec<_> = users
            .iter()
            .filter(|user| user.account_type == AccountType::Student)
            .collect();

        let (course_curr, course_prev) =
            window_counts(courses.iter().map(|course| course.created_at), now);
        let (batch_curr, batch_prev) =
            window_counts(batches.iter().map(|batch| batch.created_at), now);
        let (student_curr, student_prev) =
            window_counts(students.iter().map(|user| user.created_at), now);

        let cards = DashboardCards {
            courses: WindowDelta::from_counts(course_curr, course_prev),
            batches: WindowDelta::from_counts(batch_curr, batch_prev),
            students: WindowDelta::from_counts(student_curr, student_prev),
        };

        // Course-fee revenue: confirmations outrank paid installments.
        let confirmation_series = amount_series(
            confirmations
                .iter()
                .filter(|confirmation| confirmation.is_confirmed())
                .map(|confirmation| {
                    (month_key(confirmation.payment.paid_at), confirmation.payment.amount)
                }),
        );
        let installment_series = amount_series(plans.iter().flat_map(|plan| {
            plan.paid_installments().filter_map(|installment| {
                installment
                    .paid_at
                    .map(|paid_at| (month_key(paid_at), installment.amount))
            })
        }));
        let (course_fee_source, course_fee_series) = first_with_data(vec![
            (FeeEvidence::Confirmations, confirmation_series),
            (FeeEvidence::PaidInstallments, installment_series),
        ]);

        // Enrollment fees always come from the user records.
        let enrollment_series = amount_series(students.iter().filter_map(|user| {
            user.enrollment_fee_cleared()
                .then(|| user.payment_details.as_ref())
                .flatten()
                .map(|details| (month_key(details.paid_at), details.amount))
        }));

        let monthly_earnings = merge_amounts(course_fee_series, enrollment_series);
        let total_revenue = monthly_earnings.iter().map(|entry| entry.amount).sum();
        let revenue = RevenueStats {
            monthly_earnings,
            total_revenue,
            course_fee_source,
        };

        // Purchases: the same precedence, one tier deeper.
        let confirmation_purchases = count_series(
            confirmations
                .iter()
                .filter(|confirmation| confirmation.is_confirmed())
                .map(|confirmation| month_key(confirmation.payment.paid_at)),
        );
        let installment_purchases = count_series(plans.iter().flat_map(|plan| {
            plan.paid_installments()
                .filter_map(|installment| installment.paid_at.map(month_key))
        }));
        let user_purchases = count_series(students.iter().filter_map(|user| {
            user.enrollment_fee_cleared()
                .then(|| user.payment_details.as_ref())
                .flatten()
                .map(|details| month_key(details.paid_at))
        }));
        let (purchase_source, monthly_purchases) = first_with_data(vec![
            (FeeEvidence::Confirmations, confirmation_purchases),
            (FeeEvidence::PaidInstallments, installment_purchases),
            (FeeEvidence::UserFlags, user_purchases),
        ]);
        let total_purchases = monthly_purchases.iter().map(|entry| entry.count).sum();
        let students_stats = StudentStats {
            monthly_purchases,
            total_purchases,
            purchase_source,
        };

        // Completion: zero-lecture courses are excluded from both counters.
        let lecture_totals: BTreeMap<&CourseId, u32> = courses
            .iter()
            .map(|course| (&course.id, course.total_lectures()))
            .collect();
        let mut completed_courses = 0;
        let mut pending_courses = 0;
        for record in &progress {
            match lecture_totals.get(&record.course) {
                Some(&total) if total > 0 => {
                    if record.done_videos >= total {
                        completed_courses += 1;
                    } else {
                        pending_courses += 1;
                    }
                }
                _ => {}
            }
        }
        let learning = LearningStats {
            completed_courses,
            pending_courses,
        };

        // The one deliberately careful computation: three id sources,
        // string-normalized, set-unioned.
        let mut enrolled: BTreeSet<String> = BTreeSet::new();
        enrolled.extend(
            confirmations
                .iter()
                .filter(|confirmation| confirmation.is_confirmed())
                .map(|confirmation| confirmation.student.normalized().to_string()),
        );
        enrolled.extend(
            plans
                .iter()
                .filter(|plan| plan.has_paid_installment())
                .map(|plan| plan.student.normalized().to_string()),
        );
        enrolled.extend(
            students
                .iter()
                .filter(|user| user.enrollment_fee_cleared())
                .map(|user| user.id.normalized().to_string()),
        );

        let totals = TotalsStats {
            total_courses: courses.len() as u64,
            total_batches: batches.len() as u64,
            total_students: students.len() as u64,
            total_students_enrolled: enrolled.len() as u64,
        };

        let today = now.date_naive();
        let mut batch = BatchStats {
            upcoming: 0,
            active: 0,
            completed: 0,
        };
        for record in &batches {
            match record.schedule_state(today) {
                BatchScheduleState::Upcoming => batch.upcoming += 1,
                BatchScheduleState::Active => batch.active += 1,
                BatchScheduleState::Completed => batch.completed += 1,
            }
        }

        Ok(DashboardStats {
            cards,
            learning,
            revenue,
            students: students_stats,
            totals,
            batch,
        })
    }
}
