use super::common::*;
use crate::pipeline::enquiry::domain::{EnquiryError, EnquiryStatus, ProcessToAdmissionRequest, ProgramType};
use crate::pipeline::enrollment::EnrollmentStatus;
use crate::pipeline::store::{AdmissionsStore, Page, StoreError};

#[test]
fn lowercase_program_is_canonicalized_and_status_defaults_to_new() {
    let (service, _) = build_service();

    let enquiry = service
        .create(draft("asha@example.edu", "ug"), None)
        .expect("enquiry persists");

    assert_eq!(enquiry.program_type, ProgramType::Ug);
    assert_eq!(enquiry.program_type.label(), "UG");
    assert_eq!(enquiry.status, EnquiryStatus::New);
    assert_eq!(enquiry.email, "asha@example.edu");
    assert!(enquiry.notes.is_empty());
    assert!(enquiry.user.is_none());
}

#[test]
fn duplicate_email_and_program_yields_conflict_with_existing_record() {
    let (service, store) = build_service();

    let first = service
        .create(draft("asha@example.edu", "UG"), None)
        .expect("first enquiry persists");

    match service.create(draft("ASHA@example.edu", "ug"), None) {
        Err(EnquiryError::Duplicate(existing)) => assert_eq!(existing.id, first.id),
        other => panic!("expected duplicate conflict, got {other:?}"),
    }

    let stored = store
        .enquiries_by_program(ProgramType::Ug)
        .expect("listing succeeds");
    assert_eq!(stored.len(), 1, "second submission must not persist");
}

#[test]
fn rejected_duplicate_from_a_student_leaves_no_enrollment_behind() {
    let (service, store) = build_service();
    let first = student_actor("stu-1");
    let second = student_actor("stu-2");

    service
        .create(draft("shared@example.edu", "UG"), Some(&first))
        .expect("first enquiry persists");

    match service.create(draft("SHARED@example.edu", "ug"), Some(&second)) {
        Err(EnquiryError::Duplicate(_)) => {}
        other => panic!("expected duplicate conflict, got {other:?}"),
    }

    let stored = store
        .enquiries_by_program(ProgramType::Ug)
        .expect("listing succeeds");
    assert_eq!(stored.len(), 1);
    assert!(
        store
            .enrollments_for_user(&second.id)
            .expect("enrollments load")
            .is_empty(),
        "the rejected submission must not persist its companion enrollment"
    );
}

#[test]
fn same_email_different_program_is_not_a_duplicate() {
    let (service, _) = build_service();

    service
        .create(draft("asha@example.edu", "UG"), None)
        .expect("UG enquiry persists");
    service
        .create(draft("asha@example.edu", "PG"), None)
        .expect("PG enquiry persists");
}

#[test]
fn missing_fields_are_reported_together() {
    let (service, _) = build_service();

    let mut incomplete = draft("asha@example.edu", "UG");
    incomplete.phone = None;
    incomplete.qualification = Some("   ".to_string());
    incomplete.graduation_course = None;
    incomplete.date_of_birth = None;

    match service.create(incomplete, None) {
        Err(EnquiryError::Validation { missing }) => {
            let keys: Vec<_> = missing.keys().copied().collect();
            assert_eq!(
                keys,
                vec!["dateOfBirth", "graduationCourse", "phone", "qualification"]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_program_type_is_rejected() {
    let (service, _) = build_service();

    match service.create(draft("asha@example.edu", "MBA"), None) {
        Err(EnquiryError::InvalidProgram { raw }) => assert_eq!(raw, "MBA"),
        other => panic!("expected invalid program error, got {other:?}"),
    }
}

#[test]
fn student_submission_creates_companion_pending_enrollment() {
    let (service, store) = build_service();
    let student = student_actor("stu-7");

    let enquiry = service
        .create(draft("stu-7@example.edu", "PHD"), Some(&student))
        .expect("enquiry persists");
    assert_eq!(enquiry.user.as_ref(), Some(&student.id));

    let enrollments = store
        .enrollments_for_user(&student.id)
        .expect("enrollments load");
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].status, EnrollmentStatus::Pending);
    assert_eq!(enrollments[0].program_type, ProgramType::Phd);
}

#[test]
fn admin_submission_creates_no_enrollment() {
    let (service, store) = build_service();
    let admin = admin_actor();

    service
        .create(draft("walkin@example.edu", "UG"), Some(&admin))
        .expect("enquiry persists");

    let enrollments = store
        .enrollments_for_user(&admin.id)
        .expect("enrollments load");
    assert!(enrollments.is_empty());
}

#[test]
fn status_update_appends_audit_note() {
    let (service, _) = build_service();
    let admin = admin_actor();

    let enquiry = service
        .create(draft("asha@example.edu", "UG"), None)
        .expect("enquiry persists");
    let updated = service
        .update_status(&enquiry.id, "contacted", &admin)
        .expect("status updates");

    assert_eq!(updated.status, EnquiryStatus::Contacted);
    assert_eq!(updated.notes.len(), 1);
    assert_eq!(updated.notes[0].author, admin.email);
    assert_eq!(updated.notes[0].body, "Status changed to contacted");
}

#[test]
fn disallowed_status_leaves_document_unchanged() {
    let (service, store) = build_service();
    let admin = admin_actor();

    let enquiry = service
        .create(draft("asha@example.edu", "UG"), None)
        .expect("enquiry persists");

    match service.update_status(&enquiry.id, "archived", &admin) {
        Err(EnquiryError::InvalidStatus { raw }) => assert_eq!(raw, "archived"),
        other => panic!("expected invalid status error, got {other:?}"),
    }
    // "admitted" parses but is not reviewer-settable either.
    assert!(matches!(
        service.update_status(&enquiry.id, "admitted", &admin),
        Err(EnquiryError::InvalidStatus { .. })
    ));

    let stored = store
        .fetch_enquiry(&enquiry.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, EnquiryStatus::New);
    assert!(stored.notes.is_empty(), "no note on a rejected update");
}

#[test]
fn status_update_of_missing_enquiry_is_not_found() {
    let (service, _) = build_service();
    let admin = admin_actor();

    match service.update_status(&crate::pipeline::enquiry::EnquiryId("ghost".to_string()), "pending", &admin) {
        Err(EnquiryError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn process_to_admission_overwrites_details_and_keeps_status() {
    let (service, _) = build_service();
    let admin = admin_actor();

    let enquiry = service
        .create(draft("asha@example.edu", "UG"), None)
        .expect("enquiry persists");
    service
        .update_status(&enquiry.id, "contacted", &admin)
        .expect("status updates");

    let first = service
        .process_to_admission(
            &enquiry.id,
            ProcessToAdmissionRequest {
                source: Some("walk-in".to_string()),
                is_scholarship: true,
                scholarship_type: Some("merit".to_string()),
                follow_up_date: None,
                fee: Some(45_000),
                notes: Some("Scholarship docs pending".to_string()),
            },
            &admin,
        )
        .expect("processing succeeds");

    let details = first.admission_details.as_ref().expect("details set");
    assert!(details.is_scholarship);
    assert_eq!(details.processed_by, admin.email);
    assert_eq!(first.status, EnquiryStatus::Contacted, "status untouched");
    assert_eq!(first.notes.len(), 2, "status note plus processing note");

    // A second processing pass replaces the details wholesale.
    let second = service
        .process_to_admission(
            &enquiry.id,
            ProcessToAdmissionRequest {
                source: Some("phone".to_string()),
                ..ProcessToAdmissionRequest::default()
            },
            &admin,
        )
        .expect("reprocessing succeeds");
    let details = second.admission_details.as_ref().expect("details set");
    assert_eq!(details.source.as_deref(), Some("phone"));
    assert!(!details.is_scholarship, "overwrite, not merge");
    assert_eq!(second.notes.len(), 2, "blank notes append nothing");
}

#[test]
fn delete_cascades_matching_enrollments() {
    let (service, store) = build_service();
    let student = student_actor("stu-9");

    let enquiry = service
        .create(draft("stu-9@example.edu", "PG"), Some(&student))
        .expect("enquiry persists");
    assert_eq!(store.enrollments_for_user(&student.id).unwrap().len(), 1);

    service.delete(&enquiry.id).expect("delete succeeds");

    assert!(store.fetch_enquiry(&enquiry.id).unwrap().is_none());
    assert!(store.enrollments_for_user(&student.id).unwrap().is_empty());
}

#[test]
fn listing_filters_by_status_and_paginates_newest_first() {
    let (service, _) = build_service();
    let admin = admin_actor();

    let first = service
        .create(draft("a@example.edu", "UG"), None)
        .expect("persists");
    let _second = service
        .create(draft("b@example.edu", "UG"), None)
        .expect("persists");
    let _other_program = service
        .create(draft("c@example.edu", "PG"), None)
        .expect("persists");

    service
        .update_status(&first.id, "rejected", &admin)
        .expect("status updates");

    let all = service
        .list_by_program(ProgramType::Ug, None, Page::new(1, 10))
        .expect("listing succeeds");
    assert_eq!(all.total, 2);

    let rejected = service
        .list_by_program(ProgramType::Ug, Some(EnquiryStatus::Rejected), Page::new(1, 10))
        .expect("listing succeeds");
    assert_eq!(rejected.total, 1);
    assert_eq!(rejected.items[0].id, first.id);

    let paged = service
        .list_by_program(ProgramType::Ug, None, Page::new(2, 1))
        .expect("listing succeeds");
    assert_eq!(paged.items.len(), 1);
    assert_eq!(paged.pages, 2);
}
