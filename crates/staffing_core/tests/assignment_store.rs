mod common;

use common::{at, Fixture};
use staffing_core::assignment::classifier::classify_body;
use staffing_core::{
    classify, Assignment, AssignmentService, AssignmentSet, ConflictKind, EmployeeDirectory,
    ErrorKindTag, Event, LocalStaffingStore, PageRequest, ServiceError, SortDir,
};
use uuid::Uuid;

fn set(event_id: Uuid, assignments: &[Assignment]) -> AssignmentSet {
    AssignmentSet::from_assignments(event_id, assignments.iter().copied())
}

fn rejected_kind(err: &ServiceError) -> Option<ErrorKindTag> {
    err.body().and_then(|body| body.kind)
}

#[tokio::test]
async fn create_then_fetch_returns_exact_set() {
    let fx = Fixture::new();
    let e7 = fx.employee("Eva Sousa", &["store_manager"]);
    let v3 = fx.event(13, 15);

    fx.store
        .create(v3, &set(v3, &[Assignment::manager(e7)]))
        .await
        .unwrap();

    let rows = fx.store.fetch_current(v3).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].staff_id, e7);
    assert!(rows[0].store_manager);
    assert_eq!(rows[0].full_name, "Eva Sousa");
    assert!(rows[0].roles.iter().any(|role| role.as_str() == "STORE_MANAGER"));
}

#[tokio::test]
async fn overlapping_event_is_rejected_as_time_conflict() {
    let fx = Fixture::new();
    let e7 = fx.employee("Eva Sousa", &[]);
    let v1 = fx.event(9, 12);
    let v2 = fx.event(10, 11);

    fx.store
        .create(v1, &set(v1, &[Assignment::manager(e7)]))
        .await
        .unwrap();
    let err = fx
        .store
        .create(v2, &set(v2, &[Assignment::staff(e7)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Rejected { status: 409, .. }));
    assert_eq!(rejected_kind(&err), Some(ErrorKindTag::TimeConflict));
    assert_eq!(classify(&err).kind, ConflictKind::TimeConflict);
    assert!(fx.store.fetch_current(v2).await.unwrap().is_empty());
}

#[tokio::test]
async fn conflict_text_is_recognized_without_kind_tag() {
    let fx = Fixture::new();
    let e7 = fx.employee("Eva Sousa", &[]);
    let v1 = fx.event(9, 12);
    let v2 = fx.event(10, 11);

    fx.store
        .create(v1, &set(v1, &[Assignment::manager(e7)]))
        .await
        .unwrap();
    let err = fx
        .store
        .create(v2, &set(v2, &[Assignment::staff(e7)]))
        .await
        .unwrap_err();

    let mut body = err.body().cloned().unwrap();
    assert!(body.message.contains("Eva Sousa"));
    body.kind = None;
    assert_eq!(classify_body(&body).kind, ConflictKind::TimeConflict);
}

#[tokio::test]
async fn manager_rule_is_left_to_the_editor() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let v1 = fx.event(9, 12);

    fx.store
        .create(v1, &set(v1, &[Assignment::staff(e1)]))
        .await
        .unwrap();

    let rows = fx.store.fetch_current(v1).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].store_manager);
}

#[tokio::test]
async fn adjacent_and_disjoint_events_do_not_conflict() {
    let fx = Fixture::new();
    let e7 = fx.employee("Eva Sousa", &[]);
    let morning = fx.event(9, 12);
    let noon = fx.event(12, 13);
    let afternoon = fx.event(13, 15);

    for event_id in [morning, noon, afternoon] {
        fx.store
            .create(event_id, &set(event_id, &[Assignment::manager(e7)]))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn replacing_own_event_is_not_a_conflict() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let e2 = fx.employee("Rui Costa", &[]);
    let v1 = fx.event(9, 12);

    fx.store
        .create(v1, &set(v1, &[Assignment::manager(e1)]))
        .await
        .unwrap();
    fx.store
        .replace(v1, &set(v1, &[Assignment::manager(e1), Assignment::staff(e2)]))
        .await
        .unwrap();

    assert_eq!(fx.store.fetch_current(v1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn replace_omitting_staff_removes_them() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let e2 = fx.employee("Rui Costa", &[]);
    let v1 = fx.event(9, 12);

    fx.store
        .create(v1, &set(v1, &[Assignment::manager(e1), Assignment::staff(e2)]))
        .await
        .unwrap();
    fx.store
        .replace(v1, &set(v1, &[Assignment::manager(e1)]))
        .await
        .unwrap();

    let rows = fx.store.fetch_current(v1).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].staff_id, e1);

    // e2 is free again and can take an overlapping event.
    let v2 = fx.event(10, 11);
    fx.store
        .create(v2, &set(v2, &[Assignment::manager(e2)]))
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_replace_leaves_rows_untouched() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let e2 = fx.employee("Rui Costa", &[]);
    let v1 = fx.event(9, 12);
    let v2 = fx.event(11, 14);

    fx.store
        .create(v1, &set(v1, &[Assignment::manager(e1)]))
        .await
        .unwrap();
    fx.store
        .create(v2, &set(v2, &[Assignment::manager(e2)]))
        .await
        .unwrap();
    let before = fx.store.fetch_current(v2).await.unwrap();

    let err = fx
        .store
        .replace(v2, &set(v2, &[Assignment::manager(e2), Assignment::staff(e1)]))
        .await
        .unwrap_err();

    assert_eq!(rejected_kind(&err), Some(ErrorKindTag::TimeConflict));
    assert_eq!(fx.store.fetch_current(v2).await.unwrap(), before);
}

#[tokio::test]
async fn empty_submission_is_rejected_server_side() {
    let fx = Fixture::new();
    let v1 = fx.event(9, 12);

    let err = fx.store.replace(v1, &AssignmentSet::new(v1)).await.unwrap_err();

    assert_eq!(rejected_kind(&err), Some(ErrorKindTag::EmptyList));
    assert_eq!(classify(&err).kind, ConflictKind::EmptyList);
}

#[tokio::test]
async fn create_on_staffed_event_is_rejected() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let v1 = fx.event(9, 12);
    let submission = set(v1, &[Assignment::manager(e1)]);

    fx.store.create(v1, &submission).await.unwrap();
    let err = fx.store.create(v1, &submission).await.unwrap_err();

    assert!(matches!(err, ServiceError::Rejected { status: 409, .. }));
    assert_eq!(classify(&err).kind, ConflictKind::Unknown);
}

#[tokio::test]
async fn unknown_event_and_employee_are_not_found() {
    let fx = Fixture::new();
    let e1 = fx.employee("Ana Lima", &[]);
    let v1 = fx.event(9, 12);

    let missing_event = Uuid::new_v4();
    let err = fx.store.fetch_current(missing_event).await.unwrap_err();
    assert!(matches!(err, ServiceError::Rejected { status: 404, .. }));

    let stranger = Uuid::new_v4();
    let err = fx
        .store
        .replace(v1, &set(v1, &[Assignment::manager(e1), Assignment::staff(stranger)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Rejected { status: 404, .. }));
    assert!(err.to_string().contains(&stranger.to_string()));
}

#[tokio::test]
async fn directory_pages_are_sorted_and_complete() {
    let fx = Fixture::new();
    for name in ["Carla Dias", "ana lima", "Bruno Reis"] {
        fx.employee(name, &[]);
    }

    let first = fx
        .store
        .list_page(&PageRequest::first(2, "fullName", SortDir::Asc))
        .await
        .unwrap();
    assert_eq!(first.total_elements, 3);
    assert_eq!(first.total_pages, 2);
    assert!(!first.last);
    let names: Vec<_> = first.content.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["ana lima", "Bruno Reis"]);

    let all = fx
        .store
        .list_all(&PageRequest::first(2, "fullName", SortDir::Desc))
        .await
        .unwrap();
    let names: Vec<_> = all.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["Carla Dias", "Bruno Reis", "ana lima"]);
}

#[tokio::test]
async fn directory_rejects_unknown_sort_field() {
    let fx = Fixture::new();
    let err = fx
        .store
        .list_page(&PageRequest::first(10, "salary", SortDir::Asc))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffing.sqlite3");
    let event = Event::new(Uuid::new_v4(), at(9), at(12));
    let staff = Uuid::new_v4();

    {
        let store = LocalStaffingStore::open(&path).unwrap();
        store
            .upsert_employee(&staffing_core::Employee::new(staff, "Ana Lima", "ana@example.com"))
            .unwrap();
        store.upsert_event(&event).unwrap();
        store
            .create(event.id, &set(event.id, &[Assignment::manager(staff)]))
            .await
            .unwrap();
    }

    let reopened = LocalStaffingStore::open(&path).unwrap();
    assert_eq!(reopened.event(event.id).unwrap(), Some(event));
    assert_eq!(reopened.fetch_current(event.id).await.unwrap().len(), 1);
}
