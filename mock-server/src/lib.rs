//! In-memory stand-in for the academic records backend.
//!
//! Serves the same REST surface as the real API (`/api/Etudiant`,
//! `/api/Parcours`, `/api/Ue`, `/api/Note`, the link endpoints and the
//! composite grade endpoints) with the same wire names and error body shapes,
//! so the client can run end-to-end without a backend.

mod failure;
mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub use failure::{Failure, Validation};
pub use store::Store;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Track {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "NomParcours")]
    pub name: String,
    #[serde(rename = "AnneeFormation")]
    pub formation_year: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Student {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Nom")]
    pub last_name: String,
    #[serde(rename = "Prenom")]
    pub first_name: String,
    #[serde(rename = "NumEtud")]
    pub student_number: String,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "ParcoursSuivi")]
    pub track: Option<Track>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CourseUnit {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "NumeroUe")]
    pub code: String,
    #[serde(rename = "Intitule")]
    pub title: String,
    #[serde(rename = "EnseigneeDans")]
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub id: i64,
    #[serde(rename = "valeur")]
    pub value: f64,
    #[serde(rename = "etudiantId")]
    pub student_id: i64,
    #[serde(rename = "ueId")]
    pub course_unit_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackInput {
    #[serde(rename = "NomParcours", default)]
    pub name: Option<String>,
    #[serde(rename = "AnneeFormation", default)]
    pub formation_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentInput {
    #[serde(rename = "Nom", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Prenom", default)]
    pub first_name: Option<String>,
    #[serde(rename = "NumEtud", default)]
    pub student_number: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "ParcoursSuivi", default)]
    pub track_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseUnitInput {
    #[serde(rename = "NumeroUe", default)]
    pub code: Option<String>,
    #[serde(rename = "Intitule", default)]
    pub title: Option<String>,
    #[serde(rename = "EnseigneeDans", default)]
    pub track_ids: Option<Vec<i64>>,
}

/// Accepts both the entity names (`valeur`, `etudiantId`, `ueId`) and the
/// composite-update names (`Valeur`, `IdEtudiant`, `IdUe`).
#[derive(Debug, Default, Deserialize)]
pub struct GradeInput {
    #[serde(rename = "valeur", alias = "Valeur", default)]
    pub value: Option<f64>,
    #[serde(rename = "etudiantId", alias = "IdEtudiant", default)]
    pub student_id: Option<i64>,
    #[serde(rename = "ueId", alias = "IdUe", default)]
    pub course_unit_id: Option<i64>,
}

pub type Db = Arc<RwLock<Store>>;

/// An empty backend.
pub fn app() -> Router {
    router(Store::default())
}

/// A backend with two tracks and two course units already present.
pub fn seeded_app() -> Router {
    router(Store::seeded())
}

fn router(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/Etudiant", get(list_students).post(create_student))
        .route(
            "/api/Etudiant/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/Parcours", get(list_tracks).post(create_track))
        .route(
            "/api/Parcours/{id}",
            get(get_track).put(update_track).delete(delete_track),
        )
        .route(
            "/api/Parcours/{id}/etudiants/{student_id}",
            post(link_student).delete(unlink_student),
        )
        .route(
            "/api/Parcours/{id}/Ues/{course_unit_id}",
            post(link_course_unit).delete(unlink_course_unit),
        )
        .route("/api/Ue", get(list_course_units).post(create_course_unit))
        .route(
            "/api/Ue/{id}",
            get(get_course_unit).put(update_course_unit).delete(delete_course_unit),
        )
        .route("/api/Note", get(list_grades).post(create_grade))
        .route(
            "/api/Note/{id}",
            get(get_grade).put(update_grade).delete(delete_grade),
        )
        .route(
            "/api/Note/etudiant/{student_id}/ue/{course_unit_id}",
            get(find_grades).put(update_grade_by_key).delete(delete_grade_by_key),
        )
        .with_state(db)
}

/// Serve an empty backend on `listener`.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

// --- students ---

async fn list_students(State(db): State<Db>) -> Json<Vec<Student>> {
    let store = db.read().await;
    Json(store.students())
}

async fn create_student(
    State(db): State<Db>,
    Json(input): Json<StudentInput>,
) -> Result<(StatusCode, Json<Student>), Failure> {
    let student = db.write().await.create_student(input)?;
    info!(student_id = student.id, "student created");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Student>, Failure> {
    let store = db.read().await;
    store.student(id).map(Json)
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StudentInput>,
) -> Result<Json<Student>, Failure> {
    let mut store = db.write().await;
    store.update_student(id, input).map(Json)
}

async fn delete_student(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    db.write().await.delete_student(id)?;
    info!(student_id = id, "student deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- tracks ---

async fn list_tracks(State(db): State<Db>) -> Json<Vec<Track>> {
    let store = db.read().await;
    Json(store.tracks())
}

async fn create_track(
    State(db): State<Db>,
    Json(input): Json<TrackInput>,
) -> Result<(StatusCode, Json<Track>), Failure> {
    let track = db.write().await.create_track(input)?;
    info!(track_id = track.id, "track created");
    Ok((StatusCode::CREATED, Json(track)))
}

async fn get_track(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Track>, Failure> {
    let store = db.read().await;
    store.track(id).map(Json)
}

async fn update_track(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<TrackInput>,
) -> Result<Json<Track>, Failure> {
    let mut store = db.write().await;
    store.update_track(id, input).map(Json)
}

async fn delete_track(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    db.write().await.delete_track(id)?;
    info!(track_id = id, "track deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn link_student(
    State(db): State<Db>,
    Path((track_id, student_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    db.write().await.link_student(track_id, student_id)?;
    info!(track_id, student_id, "student linked to track");
    Ok(StatusCode::NO_CONTENT)
}

async fn unlink_student(
    State(db): State<Db>,
    Path((track_id, student_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    db.write().await.unlink_student(track_id, student_id)?;
    info!(track_id, student_id, "student unlinked from track");
    Ok(StatusCode::NO_CONTENT)
}

async fn link_course_unit(
    State(db): State<Db>,
    Path((track_id, course_unit_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    db.write().await.link_course_unit(track_id, course_unit_id)?;
    info!(track_id, course_unit_id, "course unit linked to track");
    Ok(StatusCode::NO_CONTENT)
}

async fn unlink_course_unit(
    State(db): State<Db>,
    Path((track_id, course_unit_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    db.write().await.unlink_course_unit(track_id, course_unit_id)?;
    info!(track_id, course_unit_id, "course unit unlinked from track");
    Ok(StatusCode::NO_CONTENT)
}

// --- course units ---

async fn list_course_units(State(db): State<Db>) -> Json<Vec<CourseUnit>> {
    let store = db.read().await;
    Json(store.course_units())
}

async fn create_course_unit(
    State(db): State<Db>,
    Json(input): Json<CourseUnitInput>,
) -> Result<(StatusCode, Json<CourseUnit>), Failure> {
    let unit = db.write().await.create_course_unit(input)?;
    info!(course_unit_id = unit.id, "course unit created");
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn get_course_unit(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<CourseUnit>, Failure> {
    let store = db.read().await;
    store.course_unit(id).map(Json)
}

async fn update_course_unit(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<CourseUnitInput>,
) -> Result<Json<CourseUnit>, Failure> {
    let mut store = db.write().await;
    store.update_course_unit(id, input).map(Json)
}

async fn delete_course_unit(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    db.write().await.delete_course_unit(id)?;
    info!(course_unit_id = id, "course unit deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- grades ---

async fn list_grades(State(db): State<Db>) -> Json<Vec<Grade>> {
    let store = db.read().await;
    Json(store.grades())
}

async fn create_grade(
    State(db): State<Db>,
    Json(input): Json<GradeInput>,
) -> Result<(StatusCode, Json<Grade>), Failure> {
    let grade = db.write().await.create_grade(input)?;
    info!(grade_id = grade.id, "grade created");
    Ok((StatusCode::CREATED, Json(grade)))
}

async fn get_grade(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Grade>, Failure> {
    let store = db.read().await;
    store.grade(id).map(Json)
}

async fn update_grade(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<GradeInput>,
) -> Result<Json<Grade>, Failure> {
    let mut store = db.write().await;
    store.update_grade(id, input).map(Json)
}

async fn delete_grade(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, Failure> {
    db.write().await.delete_grade(id)?;
    info!(grade_id = id, "grade deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_grades(
    State(db): State<Db>,
    Path((student_id, course_unit_id)): Path<(i64, i64)>,
) -> Json<Vec<Grade>> {
    let store = db.read().await;
    Json(store.find_grades(student_id, course_unit_id))
}

async fn update_grade_by_key(
    State(db): State<Db>,
    Path((student_id, course_unit_id)): Path<(i64, i64)>,
    Json(input): Json<GradeInput>,
) -> Result<Json<Grade>, Failure> {
    let mut store = db.write().await;
    store
        .update_grade_by_key(student_id, course_unit_id, input)
        .map(Json)
}

async fn delete_grade_by_key(
    State(db): State<Db>,
    Path((student_id, course_unit_id)): Path<(i64, i64)>,
) -> Result<StatusCode, Failure> {
    db.write().await.delete_grade_by_key(student_id, course_unit_id)?;
    info!(student_id, course_unit_id, "grade deleted by key");
    Ok(StatusCode::NO_CONTENT)
}
