use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, seeded_app, CourseUnit, Grade, Student, Track};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Drive several requests against one router instance, sharing its state.
struct Session {
    service: axum::routing::RouterIntoService<String>,
}

impl Session {
    fn new(router: axum::Router) -> Self {
        Self {
            service: router.into_service(),
        }
    }

    async fn send(&mut self, request: Request<String>) -> axum::response::Response {
        ServiceExt::ready(&mut self.service)
            .await
            .unwrap()
            .call(request)
            .await
            .unwrap()
    }
}

// --- tracks ---

#[tokio::test]
async fn list_tracks_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/Parcours")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let tracks: Vec<Track> = body_json(resp).await;
    assert!(tracks.is_empty());
}

#[tokio::test]
async fn seeded_app_lists_two_tracks() {
    let resp = seeded_app()
        .oneshot(empty_request("GET", "/api/Parcours"))
        .await
        .unwrap();

    let tracks: Vec<Track> = body_json(resp).await;
    let names: Vec<_> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Licence Informatique", "Master MIAGE"]);
}

#[tokio::test]
async fn create_track_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/Parcours",
            r#"{"Id":null,"NomParcours":"Master MIAGE","AnneeFormation":2024}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let track: Track = body_json(resp).await;
    assert_eq!(track.id, 1);
    assert_eq!(track.name, "Master MIAGE");
    assert_eq!(track.formation_year, Some(2024));
}

#[tokio::test]
async fn get_track_not_found_has_message() {
    let resp = app().oneshot(empty_request("GET", "/api/Parcours/9")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "track 9 does not exist");
}

#[tokio::test]
async fn bad_identifier_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/Parcours/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- students ---

#[tokio::test]
async fn create_student_validation_errors_are_field_keyed() {
    let resp = app()
        .oneshot(json_request("POST", "/api/Etudiant", r#"{"Email":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "One or more validation errors occurred.");
    let fields: Vec<_> = body["errors"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(fields, vec!["Nom", "Prenom", "NumEtud", "Email"]);
    assert_eq!(body["errors"]["Nom"][0], "The Nom field is required.");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let resp = app()
        .oneshot(json_request("POST", "/api/Etudiant", r#"{"Nom": 12"#))
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn student_track_links() {
    let mut session = Session::new(seeded_app());

    let resp = session
        .send(json_request(
            "POST",
            "/api/Etudiant",
            r#"{"Nom":"Durand","Prenom":"Alice","NumEtud":"22001234","Email":"alice@univ.fr","ParcoursSuivi":1}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let student: Student = body_json(resp).await;
    assert_eq!(student.track.as_ref().map(|t| t.id), Some(1));
    let id = student.id;

    // PUT does not move the student.
    let resp = session
        .send(json_request(
            "PUT",
            &format!("/api/Etudiant/{id}"),
            r#"{"Nom":"Durand","Prenom":"Alice","NumEtud":"22001234","Email":"alice@univ.fr","ParcoursSuivi":2}"#,
        ))
        .await;
    let student: Student = body_json(resp).await;
    assert_eq!(student.track.as_ref().map(|t| t.id), Some(1));

    // Unlinking from a track the student does not follow fails.
    let resp = session
        .send(empty_request("DELETE", &format!("/api/Parcours/2/etudiants/{id}")))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = session
        .send(empty_request("DELETE", &format!("/api/Parcours/1/etudiants/{id}")))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = session
        .send(empty_request("POST", &format!("/api/Parcours/2/etudiants/{id}")))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = session.send(empty_request("GET", &format!("/api/Etudiant/{id}"))).await;
    let student: Student = body_json(resp).await;
    assert_eq!(student.track.map(|t| t.name), Some("Master MIAGE".to_string()));
}

#[tokio::test]
async fn linking_to_missing_track_is_404() {
    let mut session = Session::new(app());
    session
        .send(json_request(
            "POST",
            "/api/Etudiant",
            r#"{"Nom":"Martin","Prenom":"Louis","NumEtud":"1"}"#,
        ))
        .await;

    let resp = session.send(empty_request("POST", "/api/Parcours/5/etudiants/1")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "track 5 does not exist");
}

// --- course units ---

#[tokio::test]
async fn course_unit_track_edges() {
    let mut session = Session::new(seeded_app());

    let resp = session.send(empty_request("POST", "/api/Parcours/2/Ues/1")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = session.send(empty_request("POST", "/api/Parcours/2/Ues/1")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = session.send(empty_request("GET", "/api/Ue/1")).await;
    let unit: CourseUnit = body_json(resp).await;
    let track_ids: Vec<_> = unit.tracks.iter().map(|t| t.id).collect();
    assert_eq!(track_ids, vec![1, 2]);

    let resp = session.send(empty_request("DELETE", "/api/Parcours/1/Ues/1")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = session.send(empty_request("DELETE", "/api/Parcours/1/Ues/1")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_course_unit_with_tracks() {
    let resp = seeded_app()
        .oneshot(json_request(
            "POST",
            "/api/Ue",
            r#"{"NumeroUe":"778899","Intitule":"Réseaux","EnseigneeDans":[1,2]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let unit: CourseUnit = body_json(resp).await;
    assert_eq!(unit.id, 3);
    assert_eq!(unit.tracks.len(), 2);
}

// --- grades ---

#[tokio::test]
async fn grade_composite_lifecycle() {
    let mut session = Session::new(seeded_app());
    session
        .send(json_request(
            "POST",
            "/api/Etudiant",
            r#"{"Nom":"Durand","Prenom":"Alice","NumEtud":"22001234"}"#,
        ))
        .await;

    // Lookup before any grade: empty list, not 404.
    let resp = session.send(empty_request("GET", "/api/Note/etudiant/1/ue/2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let grades: Vec<Grade> = body_json(resp).await;
    assert!(grades.is_empty());

    let resp = session
        .send(json_request(
            "POST",
            "/api/Note",
            r#"{"id":null,"valeur":11.0,"etudiantId":1,"ueId":2}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Grade = body_json(resp).await;

    let resp = session
        .send(json_request(
            "POST",
            "/api/Note",
            r#"{"valeur":9.0,"etudiantId":1,"ueId":2}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = session
        .send(json_request(
            "PUT",
            "/api/Note/etudiant/1/ue/2",
            r#"{"IdEtudiant":1,"IdUe":2,"Valeur":15.5}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Grade = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.value, 15.5);

    let resp = session.send(empty_request("GET", "/api/Note/etudiant/1/ue/2")).await;
    let grades: Vec<Grade> = body_json(resp).await;
    assert_eq!(grades, vec![updated]);

    let resp = session.send(empty_request("DELETE", "/api/Note/etudiant/1/ue/2")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = session.send(empty_request("DELETE", "/api/Note/etudiant/1/ue/2")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "no grade for student 1 in course unit 2");
}

#[tokio::test]
async fn grade_value_out_of_range() {
    let resp = app()
        .oneshot(json_request("POST", "/api/Note", r#"{"valeur":21}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["valeur"][0], "The field valeur must be between 0 and 20.");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut session = Session::new(app());

    // create
    let resp = session
        .send(json_request(
            "POST",
            "/api/Parcours",
            r#"{"NomParcours":"Licence Informatique","AnneeFormation":2023}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Track = body_json(resp).await;
    let id = created.id;

    // list
    let resp = session.send(empty_request("GET", "/api/Parcours")).await;
    let tracks: Vec<Track> = body_json(resp).await;
    assert_eq!(tracks, vec![created.clone()]);

    // update
    let resp = session
        .send(json_request(
            "PUT",
            &format!("/api/Parcours/{id}"),
            r#"{"NomParcours":"Licence Informatique","AnneeFormation":2025}"#,
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Track = body_json(resp).await;
    assert_eq!(updated.formation_year, Some(2025));

    // delete
    let resp = session.send(empty_request("DELETE", &format!("/api/Parcours/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete is a 404
    let resp = session.send(empty_request("GET", &format!("/api/Parcours/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete is empty
    let resp = session.send(empty_request("GET", "/api/Parcours")).await;
    let tracks: Vec<Track> = body_json(resp).await;
    assert!(tracks.is_empty());
}
