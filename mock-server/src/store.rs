//! In-memory tables and the rules the real backend enforces.
//!
//! Membership lives in the link operations: student create/update payloads
//! carry a track id, but only create honors it. After that a student changes
//! track exclusively through `link_student` / `unlink_student`, and a course
//! unit's tracks through `link_course_unit` / `unlink_course_unit`.

use std::collections::{BTreeMap, BTreeSet};

use crate::failure::{Failure, Validation};
use crate::{CourseUnit, CourseUnitInput, Grade, GradeInput, Student, StudentInput, Track, TrackInput};

struct Table<R> {
    rows: BTreeMap<i64, R>,
    next_id: i64,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<R> Table<R> {
    fn insert(&mut self, row: impl FnOnce(i64) -> R) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row(id));
        id
    }

    fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }
}

struct StudentRow {
    last_name: String,
    first_name: String,
    student_number: String,
    email: Option<String>,
    track_id: Option<i64>,
}

struct CourseUnitRow {
    code: String,
    title: String,
}

struct StudentFields {
    last_name: String,
    first_name: String,
    student_number: String,
    email: Option<String>,
}

#[derive(Default)]
pub struct Store {
    students: Table<StudentRow>,
    tracks: Table<Track>,
    course_units: Table<CourseUnitRow>,
    grades: Table<Grade>,
    /// (course unit id, track id)
    taught_in: BTreeSet<(i64, i64)>,
}

fn track_not_found(id: i64) -> Failure {
    Failure::not_found(format!("track {id} does not exist"))
}

fn student_not_found(id: i64) -> Failure {
    Failure::not_found(format!("student {id} does not exist"))
}

fn course_unit_not_found(id: i64) -> Failure {
    Failure::not_found(format!("course unit {id} does not exist"))
}

fn grade_not_found(id: i64) -> Failure {
    Failure::not_found(format!("grade {id} does not exist"))
}

fn no_grade_for(student_id: i64, course_unit_id: i64) -> Failure {
    Failure::not_found(format!(
        "no grade for student {student_id} in course unit {course_unit_id}"
    ))
}

impl Store {
    /// Two tracks and two course units, one taught in each.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        let licence = store.tracks.insert(|id| Track {
            id,
            name: "Licence Informatique".to_string(),
            formation_year: Some(2023),
        });
        let master = store.tracks.insert(|id| Track {
            id,
            name: "Master MIAGE".to_string(),
            formation_year: Some(2024),
        });
        let informatique = store.course_units.insert(|_| CourseUnitRow {
            code: "245896".to_string(),
            title: "Informatique".to_string(),
        });
        let transverse = store.course_units.insert(|_| CourseUnitRow {
            code: "5464853".to_string(),
            title: "Compétence transverse".to_string(),
        });
        store.taught_in.insert((informatique, licence));
        store.taught_in.insert((transverse, master));
        store
    }

    // --- tracks ---

    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.rows.values().cloned().collect()
    }

    pub fn track(&self, id: i64) -> Result<Track, Failure> {
        self.tracks.rows.get(&id).cloned().ok_or_else(|| track_not_found(id))
    }

    pub fn create_track(&mut self, input: TrackInput) -> Result<Track, Failure> {
        let (name, formation_year) = validate_track(&input)?;
        let id = self.tracks.insert(|id| Track {
            id,
            name,
            formation_year,
        });
        self.track(id)
    }

    pub fn update_track(&mut self, id: i64, input: TrackInput) -> Result<Track, Failure> {
        let (name, formation_year) = validate_track(&input)?;
        let track = self.tracks.rows.get_mut(&id).ok_or_else(|| track_not_found(id))?;
        track.name = name;
        track.formation_year = formation_year;
        Ok(track.clone())
    }

    pub fn delete_track(&mut self, id: i64) -> Result<(), Failure> {
        self.tracks.rows.remove(&id).ok_or_else(|| track_not_found(id))?;
        for student in self.students.rows.values_mut() {
            if student.track_id == Some(id) {
                student.track_id = None;
            }
        }
        self.taught_in.retain(|(_, track_id)| *track_id != id);
        Ok(())
    }

    // --- students ---

    fn student_view(&self, id: i64, row: &StudentRow) -> Student {
        Student {
            id,
            last_name: row.last_name.clone(),
            first_name: row.first_name.clone(),
            student_number: row.student_number.clone(),
            email: row.email.clone(),
            track: row.track_id.and_then(|track_id| self.tracks.rows.get(&track_id).cloned()),
        }
    }

    pub fn students(&self) -> Vec<Student> {
        self.students
            .rows
            .iter()
            .map(|(id, row)| self.student_view(*id, row))
            .collect()
    }

    pub fn student(&self, id: i64) -> Result<Student, Failure> {
        let row = self.students.rows.get(&id).ok_or_else(|| student_not_found(id))?;
        Ok(self.student_view(id, row))
    }

    pub fn create_student(&mut self, input: StudentInput) -> Result<Student, Failure> {
        let fields = validate_student(&input, &self.tracks)?;
        self.ensure_unique_number(&fields.student_number, None)?;
        let id = self.students.insert(|_| StudentRow {
            last_name: fields.last_name,
            first_name: fields.first_name,
            student_number: fields.student_number,
            email: fields.email,
            track_id: input.track_id,
        });
        self.student(id)
    }

    /// The track id in `input` is validated but ignored.
    pub fn update_student(&mut self, id: i64, input: StudentInput) -> Result<Student, Failure> {
        let fields = validate_student(&input, &self.tracks)?;
        if !self.students.contains(id) {
            return Err(student_not_found(id));
        }
        self.ensure_unique_number(&fields.student_number, Some(id))?;
        if let Some(row) = self.students.rows.get_mut(&id) {
            row.last_name = fields.last_name;
            row.first_name = fields.first_name;
            row.student_number = fields.student_number;
            row.email = fields.email;
        }
        self.student(id)
    }

    pub fn delete_student(&mut self, id: i64) -> Result<(), Failure> {
        self.students.rows.remove(&id).ok_or_else(|| student_not_found(id))?;
        self.grades.rows.retain(|_, grade| grade.student_id != id);
        Ok(())
    }

    fn ensure_unique_number(&self, number: &str, except: Option<i64>) -> Result<(), Failure> {
        let taken = self
            .students
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != except && row.student_number == number);
        if taken {
            return Err(Failure::conflict(format!("student number {number} is already in use")));
        }
        Ok(())
    }

    /// A student follows at most one track; linking replaces any previous one.
    pub fn link_student(&mut self, track_id: i64, student_id: i64) -> Result<(), Failure> {
        if !self.tracks.contains(track_id) {
            return Err(track_not_found(track_id));
        }
        let row = self
            .students
            .rows
            .get_mut(&student_id)
            .ok_or_else(|| student_not_found(student_id))?;
        row.track_id = Some(track_id);
        Ok(())
    }

    pub fn unlink_student(&mut self, track_id: i64, student_id: i64) -> Result<(), Failure> {
        if !self.tracks.contains(track_id) {
            return Err(track_not_found(track_id));
        }
        let row = self
            .students
            .rows
            .get_mut(&student_id)
            .ok_or_else(|| student_not_found(student_id))?;
        if row.track_id != Some(track_id) {
            return Err(Failure::not_found(format!(
                "student {student_id} does not follow track {track_id}"
            )));
        }
        row.track_id = None;
        Ok(())
    }

    // --- course units ---

    fn course_unit_view(&self, id: i64, row: &CourseUnitRow) -> CourseUnit {
        CourseUnit {
            id,
            code: row.code.clone(),
            title: row.title.clone(),
            tracks: self
                .taught_in
                .iter()
                .filter(|(unit_id, _)| *unit_id == id)
                .filter_map(|(_, track_id)| self.tracks.rows.get(track_id).cloned())
                .collect(),
        }
    }

    pub fn course_units(&self) -> Vec<CourseUnit> {
        self.course_units
            .rows
            .iter()
            .map(|(id, row)| self.course_unit_view(*id, row))
            .collect()
    }

    pub fn course_unit(&self, id: i64) -> Result<CourseUnit, Failure> {
        let row = self
            .course_units
            .rows
            .get(&id)
            .ok_or_else(|| course_unit_not_found(id))?;
        Ok(self.course_unit_view(id, row))
    }

    pub fn create_course_unit(&mut self, input: CourseUnitInput) -> Result<CourseUnit, Failure> {
        let mut check = Validation::default();
        let code = check.required("NumeroUe", &input.code);
        let title = check.required("Intitule", &input.title);
        let track_ids = input.track_ids.unwrap_or_default();
        for track_id in &track_ids {
            if !self.tracks.contains(*track_id) {
                check.reject("EnseigneeDans", format!("track {track_id} does not exist"));
            }
        }
        check.finish()?;

        let id = self.course_units.insert(|_| CourseUnitRow { code, title });
        self.taught_in
            .extend(track_ids.into_iter().map(|track_id| (id, track_id)));
        self.course_unit(id)
    }

    /// Track membership in `input` is ignored.
    pub fn update_course_unit(&mut self, id: i64, input: CourseUnitInput) -> Result<CourseUnit, Failure> {
        let mut check = Validation::default();
        let code = check.required("NumeroUe", &input.code);
        let title = check.required("Intitule", &input.title);
        check.finish()?;

        let row = self
            .course_units
            .rows
            .get_mut(&id)
            .ok_or_else(|| course_unit_not_found(id))?;
        row.code = code;
        row.title = title;
        self.course_unit(id)
    }

    pub fn delete_course_unit(&mut self, id: i64) -> Result<(), Failure> {
        self.course_units
            .rows
            .remove(&id)
            .ok_or_else(|| course_unit_not_found(id))?;
        self.taught_in.retain(|(unit_id, _)| *unit_id != id);
        self.grades.rows.retain(|_, grade| grade.course_unit_id != id);
        Ok(())
    }

    pub fn link_course_unit(&mut self, track_id: i64, course_unit_id: i64) -> Result<(), Failure> {
        if !self.tracks.contains(track_id) {
            return Err(track_not_found(track_id));
        }
        if !self.course_units.contains(course_unit_id) {
            return Err(course_unit_not_found(course_unit_id));
        }
        if !self.taught_in.insert((course_unit_id, track_id)) {
            return Err(Failure::conflict(format!(
                "course unit {course_unit_id} is already taught in track {track_id}"
            )));
        }
        Ok(())
    }

    pub fn unlink_course_unit(&mut self, track_id: i64, course_unit_id: i64) -> Result<(), Failure> {
        if !self.taught_in.remove(&(course_unit_id, track_id)) {
            return Err(Failure::not_found(format!(
                "course unit {course_unit_id} is not taught in track {track_id}"
            )));
        }
        Ok(())
    }

    // --- grades ---

    pub fn grades(&self) -> Vec<Grade> {
        self.grades.rows.values().cloned().collect()
    }

    pub fn grade(&self, id: i64) -> Result<Grade, Failure> {
        self.grades.rows.get(&id).cloned().ok_or_else(|| grade_not_found(id))
    }

    fn grade_id_for(&self, student_id: i64, course_unit_id: i64) -> Option<i64> {
        self.grades
            .rows
            .values()
            .find(|grade| grade.student_id == student_id && grade.course_unit_id == course_unit_id)
            .map(|grade| grade.id)
    }

    pub fn create_grade(&mut self, input: GradeInput) -> Result<Grade, Failure> {
        let (value, student_id, course_unit_id) = self.validate_grade(&input)?;
        if self.grade_id_for(student_id, course_unit_id).is_some() {
            return Err(Failure::conflict(format!(
                "a grade already exists for student {student_id} in course unit {course_unit_id}"
            )));
        }
        let id = self.grades.insert(|id| Grade {
            id,
            value,
            student_id,
            course_unit_id,
        });
        self.grade(id)
    }

    pub fn update_grade(&mut self, id: i64, input: GradeInput) -> Result<Grade, Failure> {
        let (value, student_id, course_unit_id) = self.validate_grade(&input)?;
        if !self.grades.contains(id) {
            return Err(grade_not_found(id));
        }
        if let Some(other) = self.grade_id_for(student_id, course_unit_id).filter(|other| *other != id) {
            return Err(Failure::conflict(format!(
                "grade {other} already exists for student {student_id} in course unit {course_unit_id}"
            )));
        }
        self.grades.rows.insert(
            id,
            Grade {
                id,
                value,
                student_id,
                course_unit_id,
            },
        );
        self.grade(id)
    }

    pub fn delete_grade(&mut self, id: i64) -> Result<(), Failure> {
        self.grades.rows.remove(&id).ok_or_else(|| grade_not_found(id))?;
        Ok(())
    }

    /// Zero or one grade: the backend answers composite lookups with a list.
    pub fn find_grades(&self, student_id: i64, course_unit_id: i64) -> Vec<Grade> {
        self.grade_id_for(student_id, course_unit_id)
            .and_then(|id| self.grades.rows.get(&id).cloned())
            .into_iter()
            .collect()
    }

    /// The keys in the path win over any in the body.
    pub fn update_grade_by_key(
        &mut self,
        student_id: i64,
        course_unit_id: i64,
        input: GradeInput,
    ) -> Result<Grade, Failure> {
        let mut check = Validation::default();
        let value = check_value(&mut check, "Valeur", input.value);
        check.finish()?;

        let id = self
            .grade_id_for(student_id, course_unit_id)
            .ok_or_else(|| no_grade_for(student_id, course_unit_id))?;
        if let Some(grade) = self.grades.rows.get_mut(&id) {
            grade.value = value;
        }
        self.grade(id)
    }

    pub fn delete_grade_by_key(&mut self, student_id: i64, course_unit_id: i64) -> Result<(), Failure> {
        let id = self
            .grade_id_for(student_id, course_unit_id)
            .ok_or_else(|| no_grade_for(student_id, course_unit_id))?;
        self.grades.rows.remove(&id);
        Ok(())
    }

    fn validate_grade(&self, input: &GradeInput) -> Result<(f64, i64, i64), Failure> {
        let mut check = Validation::default();
        let value = check_value(&mut check, "valeur", input.value);
        let student_id = match input.student_id {
            Some(id) if self.students.contains(id) => id,
            Some(id) => {
                check.reject("etudiantId", format!("student {id} does not exist"));
                id
            }
            None => {
                check.reject("etudiantId", "The etudiantId field is required.");
                0
            }
        };
        let course_unit_id = match input.course_unit_id {
            Some(id) if self.course_units.contains(id) => id,
            Some(id) => {
                check.reject("ueId", format!("course unit {id} does not exist"));
                id
            }
            None => {
                check.reject("ueId", "The ueId field is required.");
                0
            }
        };
        check.finish()?;
        Ok((value, student_id, course_unit_id))
    }
}

fn check_value(check: &mut Validation, field: &str, value: Option<f64>) -> f64 {
    match value {
        Some(value) if (0.0..=20.0).contains(&value) => value,
        Some(value) => {
            check.reject(field, format!("The field {field} must be between 0 and 20."));
            value
        }
        None => {
            check.reject(field, format!("The {field} field is required."));
            0.0
        }
    }
}

fn validate_track(input: &TrackInput) -> Result<(String, Option<i32>), Failure> {
    let mut check = Validation::default();
    let name = check.required("NomParcours", &input.name);
    if let Some(year) = input.formation_year {
        if !(1900..=2100).contains(&year) {
            check.reject(
                "AnneeFormation",
                "The field AnneeFormation must be between 1900 and 2100.",
            );
        }
    }
    check.finish()?;
    Ok((name, input.formation_year))
}

fn validate_student(input: &StudentInput, tracks: &Table<Track>) -> Result<StudentFields, Failure> {
    let mut check = Validation::default();
    let last_name = check.required("Nom", &input.last_name);
    let first_name = check.required("Prenom", &input.first_name);
    let student_number = check.required("NumEtud", &input.student_number);
    let email = input
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string);
    if let Some(email) = &email {
        if !email.contains('@') {
            check.reject("Email", "The Email field is not a valid e-mail address.");
        }
    }
    if let Some(track_id) = input.track_id {
        if !tracks.contains(track_id) {
            check.reject("ParcoursSuivi", format!("track {track_id} does not exist"));
        }
    }
    check.finish()?;
    Ok(StudentFields {
        last_name,
        first_name,
        student_number,
        email,
    })
}
