//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use admissions::pipeline::{
    AccountType, AdmissionConfirmation, Batch, BatchId, ConfirmationId, ConfirmationStatus,
    Course, CourseId, CourseProgress, CourseSection, InstallmentPlan, PaymentDetails,
    PaymentStatus, PlanId, UserAccount, UserId, UserTypeId,
};

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn student(id: &str, name: &str, created: DateTime<Utc>) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        name: name.to_string(),
        email: format!("{id}@example.edu"),
        account_type: AccountType::Student,
        enrollment_fee_paid: false,
        payment_status: PaymentStatus::Pending,
        payment_details: None,
        user_type: None,
        courses: Vec::new(),
        created_at: created,
    }
}

pub fn fee_paid(mut user: UserAccount, amount: u64, paid: DateTime<Utc>) -> UserAccount {
    user.enrollment_fee_paid = true;
    user.payment_status = PaymentStatus::Completed;
    user.payment_details = Some(PaymentDetails {
        amount,
        paid_at: paid,
    });
    user
}

pub fn with_courses(mut user: UserAccount, courses: &[&str]) -> UserAccount {
    user.courses = courses.iter().map(|id| CourseId(id.to_string())).collect();
    user
}

pub fn typed(mut user: UserAccount, user_type: &UserTypeId) -> UserAccount {
    user.user_type = Some(user_type.clone());
    user
}

pub fn course(id: &str, tag: Option<&str>, lectures: &[u32], created: DateTime<Utc>) -> Course {
    Course {
        id: CourseId(id.to_string()),
        name: format!("Course {id}"),
        tag: tag.map(str::to_string),
        sections: lectures
            .iter()
            .enumerate()
            .map(|(index, count)| CourseSection {
                title: format!("Section {}", index + 1),
                lectures: *count,
            })
            .collect(),
        created_at: created,
    }
}

pub fn progress(user: &str, course: &str, done: u32, created: DateTime<Utc>) -> CourseProgress {
    CourseProgress {
        user: UserId(user.to_string()),
        course: CourseId(course.to_string()),
        done_videos: done,
        created_at: created,
    }
}

pub fn batch(id: &str, course: &str, starts: NaiveDate, ends: Option<NaiveDate>, created: DateTime<Utc>) -> Batch {
    Batch {
        id: BatchId(id.to_string()),
        name: format!("Batch {id}"),
        course: CourseId(course.to_string()),
        students: Vec::new(),
        starts_on: starts,
        ends_on: ends,
        created_at: created,
    }
}

pub fn confirmation(id: &str, studentid: &str, courseid: &str, amount: u64, paid: DateTime<Utc>) -> AdmissionConfirmation {
    AdmissionConfirmation {
        id: ConfirmationId(id.to_string()),
        student: UserId(studentid.to_string()),
        course: CourseId(courseid.to_string()),
        status: ConfirmationStatus::Confirmed,
        payment: PaymentDetails {
            amount,
            paid_at: paid,
        },
        created_at: paid,
    }
}

pub fn plan(id: &str, studentid: &str, courseid: &str, schedule: Vec<(u64, NaiveDate)>, created: DateTime<Utc>) -> InstallmentPlan {
    InstallmentPlan::new(
        PlanId(id.to_string()),
        UserId(studentid.to_string()),
        CourseId(courseid.to_string()),
        schedule,
        created,
    )
}
