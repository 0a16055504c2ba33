use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::pipeline::{
    AccountType, ActorContext, AdmissionConfirmation, AdmissionsStore, CohortFilter, CohortService,
    ConfirmationId, ConfirmationStatus, Course, CourseId, CourseSection, DashboardService,
    EnquiryDraft, EnquiryService, InstallmentPlan, LedgerService, MemoryStore, Page,
    PaymentDetails, PaymentStatus, PlanId, UserAccount, UserId, UserTypeId, PHD_USER_TYPE,
    UGPG_COURSE_TAG,
};
use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the ledger sweep (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = Utc::now();

    println!("Admissions pipeline demo (evaluated {today})");

    let store = Arc::new(MemoryStore::new());
    let phd_type = store.ensure_user_type(PHD_USER_TYPE)?;
    seed_directory(&store, &phd_type.id.0, today)?;

    println!("\nEnquiry intake");
    let enquiries = EnquiryService::new(store.clone());
    let applicant = ActorContext {
        id: UserId("s-applicant".to_string()),
        email: "ravi@example.edu".to_string(),
        account_type: AccountType::Student,
    };
    let enquiry = match enquiries.create(demo_draft(), Some(&applicant)) {
        Ok(enquiry) => enquiry,
        Err(err) => {
            println!("  Intake rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Received enquiry {} for {} ({})",
        enquiry.id.0,
        enquiry.name,
        enquiry.program_type.label()
    );
    match enquiries.create(demo_draft(), Some(&applicant)) {
        Ok(_) => println!("- Duplicate submission unexpectedly accepted"),
        Err(err) => println!("- Duplicate submission rejected: {err}"),
    }

    let reviewer = ActorContext {
        id: UserId("adm-1".to_string()),
        email: "admissions-desk@example.edu".to_string(),
        account_type: AccountType::Admin,
    };
    match enquiries.update_status(&enquiry.id, "contacted", &reviewer) {
        Ok(reviewed) => println!(
            "- Reviewer moved the enquiry to '{}' ({} note(s) on file)",
            reviewed.status.label(),
            reviewed.notes.len()
        ),
        Err(err) => println!("- Status update failed: {err}"),
    }

    println!("\nInstallment ledger");
    let ledger = LedgerService::new(store.clone(), config.pipeline.reminder_lead_days);
    let swept = ledger.refresh_all(today)?;
    println!("- Overdue sweep touched {swept} plan(s)");
    for plan in store.plans()? {
        println!(
            "- Plan {} for {}: {:?}, {} paid / {} total, next reminder {}",
            plan.id.0,
            plan.student.0,
            plan.status,
            plan.paid_amount,
            plan.total_amount,
            plan.reminders
                .next_due
                .map(|date| date.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }

    println!("\nCohorts");
    let cohorts = CohortService::new(store.clone());
    let page = Page::new(1, config.pipeline.default_page_size);
    let filter = CohortFilter::default();
    println!(
        "- Registered accounts: {}",
        cohorts.registered(&filter, page)?.total
    );
    println!(
        "- Enrollment fee paid: {}",
        cohorts.enrollment_fee_paid(&filter, page)?.total
    );
    let ugpg = cohorts.ugpg_enrolled(&filter, page)?;
    println!(
        "- UG/PG enrolled: {} (PhD type missing: {})",
        ugpg.page.total, ugpg.phd_type_missing
    );
    println!(
        "- PhD enrolled (confirmed): {}",
        cohorts.phd_enrolled(&filter, page)?.total
    );

    println!("\nDashboard");
    let dashboard = DashboardService::new(store.clone());
    let stats = dashboard.stats(now)?;
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  Dashboard payload unavailable: {err}"),
    }

    Ok(())
}

fn demo_draft() -> EnquiryDraft {
    EnquiryDraft {
        name: Some("Ravi Menon".to_string()),
        email: Some("ravi@example.edu".to_string()),
        phone: Some("+91-9800000042".to_string()),
        program_type: Some("UG".to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(2005, 3, 14),
        qualification: Some("Class XII".to_string()),
        board_school_name: Some("CBSE".to_string()),
        graduation_course: Some("B.Sc. Mathematics".to_string()),
        gender: None,
        percentage: Some(88.5),
        stream: Some("Science".to_string()),
    }
}

fn seed_directory(
    store: &Arc<MemoryStore>,
    phd_type_id: &str,
    today: NaiveDate,
) -> Result<(), AppError> {
    let created = Utc
        .with_ymd_and_hms(today.year(), 1, 5, 10, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    store.insert_course(Course {
        id: CourseId("c-ug-physics".to_string()),
        name: "B.Sc. Physics".to_string(),
        tag: Some(UGPG_COURSE_TAG.to_string()),
        sections: vec![CourseSection {
            title: "Mechanics".to_string(),
            lectures: 12,
        }],
        created_at: created,
    })?;
    store.insert_course(Course {
        id: CourseId("c-phd-physics".to_string()),
        name: "PhD Physics".to_string(),
        tag: None,
        sections: Vec::new(),
        created_at: created,
    })?;

    store.insert_user(UserAccount {
        id: UserId("s-1".to_string()),
        name: "Asha Verma".to_string(),
        email: "asha@example.edu".to_string(),
        account_type: AccountType::Student,
        enrollment_fee_paid: true,
        payment_status: PaymentStatus::Completed,
        payment_details: Some(PaymentDetails {
            amount: 1_000,
            paid_at: created,
        }),
        user_type: None,
        courses: vec![CourseId("c-ug-physics".to_string())],
        created_at: created,
    })?;
    store.insert_user(UserAccount {
        id: UserId("s-2".to_string()),
        name: "Binod Rao".to_string(),
        email: "binod@example.edu".to_string(),
        account_type: AccountType::Student,
        enrollment_fee_paid: true,
        payment_status: PaymentStatus::Completed,
        payment_details: Some(PaymentDetails {
            amount: 1_000,
            paid_at: created,
        }),
        user_type: Some(UserTypeId(phd_type_id.to_string())),
        courses: vec![CourseId("c-phd-physics".to_string())],
        created_at: created,
    })?;

    store.insert_confirmation(AdmissionConfirmation {
        id: ConfirmationId("cf-1".to_string()),
        student: UserId("s-2".to_string()),
        course: CourseId("c-phd-physics".to_string()),
        status: ConfirmationStatus::Confirmed,
        payment: PaymentDetails {
            amount: 80_000,
            paid_at: created,
        },
        created_at: created,
    })?;

    // One installment already behind schedule so the sweep has work to do.
    let mut plan = InstallmentPlan::new(
        PlanId("p-1".to_string()),
        UserId("s-1".to_string()),
        CourseId("c-ug-physics".to_string()),
        vec![
            (20_000, today - Duration::days(40)),
            (20_000, today - Duration::days(10)),
            (20_000, today + Duration::days(20)),
        ],
        created,
    );
    plan.apply_payment(1, "pay-demo-1", "ord-demo-1", created)?;
    store.insert_plan(plan)?;

    Ok(())
}
