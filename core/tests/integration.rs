//! Full lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port inside the test runtime, then
//! drives every accessor over real HTTP with `ReqwestTransport`. Validates
//! that request building, relationship reconciliation and error
//! normalization line up with what the server actually does.

use scolarite_core::{Accessors, ApiClient, CourseUnit, Grade, Outcome, ReqwestTransport, Student, Track};

async fn start_server() -> Accessors<ReqwestTransport> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    let client = ApiClient::new(&format!("http://{addr}"), ReqwestTransport::new()).with_api_key("test-key");
    Accessors::new(client)
}

#[tokio::test]
async fn crud_and_relationship_lifecycle() {
    let api = start_server().await;

    // Step 1: everything starts empty.
    assert!(api.tracks().list().await.unwrap().is_empty());
    assert!(api.students().list().await.unwrap().is_empty());

    // Step 2: create two tracks; names round-trip.
    let licence = api.tracks().create(&Track::new("Licence Informatique", 2023)).await.unwrap();
    let master = api.tracks().create(&Track::new("Master MIAGE", 2024)).await.unwrap();
    assert_eq!(licence.name.as_deref(), Some("Licence Informatique"));
    let licence_id = licence.id.unwrap();
    let master_id = master.id.unwrap();

    // Step 3: create a student in the licence track.
    let student = Student::new("Durand", "Alice", "22001234", "alice@univ.fr").with_track(licence.clone());
    let created = api.students().create(&student).await.unwrap();
    let student_id = created.id.unwrap();
    assert_eq!(created.track_id(), Some(licence_id));

    // Step 4: move the student to the master track.
    let moved = created.clone().with_track(master.clone());
    api.students().update(student_id, &moved, Some(licence_id)).await.unwrap();
    let fetched = api.students().get(student_id).await.unwrap();
    assert_eq!(fetched.track_id(), Some(master_id));
    assert_eq!(fetched.track.unwrap().name.as_deref(), Some("Master MIAGE"));

    // Step 5: drop the track altogether.
    let mut trackless = moved.clone();
    trackless.track = None;
    api.students().update(student_id, &trackless, Some(master_id)).await.unwrap();
    assert_eq!(api.students().get(student_id).await.unwrap().track, None);

    // Step 6: course unit taught in the master track.
    let unit = api.course_units().create(&CourseUnit::new("245896", "Informatique")).await.unwrap();
    let unit_id = unit.id.unwrap();
    api.tracks().add_course_unit_to_track(master_id, unit_id).await.unwrap();
    assert_eq!(api.course_units().get(unit_id).await.unwrap().track_ids(), vec![master_id]);
    api.tracks().remove_course_unit_from_track(master_id, unit_id).await.unwrap();
    assert!(api.course_units().get(unit_id).await.unwrap().tracks.is_empty());

    // Step 7: grades by id and by composite key.
    assert_eq!(api.grades().get_by_student_and_course_unit(student_id, unit_id).await, None);
    let grade = api.grades().create(&Grade::new(student_id, unit_id, 12.5)).await.unwrap();
    let by_key = api
        .grades()
        .get_by_student_and_course_unit(student_id, unit_id)
        .await
        .unwrap();
    assert_eq!(by_key, grade);

    let updated = api
        .grades()
        .update_by_student_and_course_unit(student_id, unit_id, 16.0)
        .await
        .unwrap();
    assert_eq!(updated.value, Some(16.0));
    assert_eq!(api.grades().get(grade.id.unwrap()).await.unwrap().value, Some(16.0));

    api.grades()
        .delete_by_student_and_course_unit(student_id, unit_id)
        .await
        .unwrap();
    assert_eq!(api.grades().get_by_student_and_course_unit(student_id, unit_id).await, None);
    let err = api
        .grades()
        .delete_by_student_and_course_unit(student_id, unit_id)
        .await
        .unwrap_err();
    assert!(err.api_error().is_not_found());

    // Step 8: delete the student; get is now a failure.
    api.students().delete(student_id).await.unwrap();
    assert!(api.students().get(student_id).await.is_err());
}

#[tokio::test]
async fn backend_messages_reach_the_caller() {
    let api = start_server().await;

    let err = api.students().create(&Student::default()).await.unwrap_err();
    assert_eq!(err.message(), "The Nom field is required.");

    let err = api.tracks().get(999).await.unwrap_err();
    assert_eq!(err.message(), "track 999 does not exist");
}

#[tokio::test]
async fn failed_link_leaves_student_without_track() {
    let api = start_server().await;

    let track = api.tracks().create(&Track::new("Licence Informatique", 2023)).await.unwrap();
    let track_id = track.id.unwrap();
    let student = api
        .students()
        .create(&Student::new("Martin", "Louis", "21009876", "louis@univ.fr").with_track(track))
        .await
        .unwrap();
    let student_id = student.id.unwrap();

    // Track 999 does not exist: the unlink succeeds, the link fails.
    let moved = student.clone().with_track(Track::reference(999));
    let err = api
        .students()
        .update(student_id, &moved, Some(track_id))
        .await
        .unwrap_err();

    assert_eq!(err.outcome(), Outcome::PartiallyApplied);
    assert_eq!(err.message(), "track 999 does not exist");
    assert_eq!(api.students().get(student_id).await.unwrap().track, None);
}
