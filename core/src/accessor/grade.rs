use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{Accessor, Entity};
use crate::error::{ApiError, Error, Result};
use crate::transport::Transport;
use crate::types::{Grade, Id};

/// Body of a PUT on the composite-key endpoint.
#[derive(Debug, Serialize)]
struct CompositeUpdate {
    #[serde(rename = "IdEtudiant")]
    student_id: Id,
    #[serde(rename = "IdUe")]
    course_unit_id: Id,
    #[serde(rename = "Valeur")]
    value: f64,
}

impl<T: Transport> Accessor<Grade, T> {
    pub async fn update(&self, id: Id, grade: &Grade) -> Result<Grade> {
        self.replace(id, grade)
            .await
            .map_err(|e| Error::new(e, Grade::MESSAGES.update))
    }

    /// The grade a student got in a course unit, if any.
    ///
    /// The backend answers with either an object or a collection; a collection
    /// yields its first element. An empty collection and any failure, including
    /// 404, both mean "no grade" and return `None`.
    pub async fn get_by_student_and_course_unit(&self, student_id: Id, course_unit_id: Id) -> Option<Grade> {
        let path = composite_path(student_id, course_unit_id);
        let lookup = match self.client().get::<Value>(&path).await {
            Ok(value) => first_grade(value),
            Err(err) => Err(err),
        };
        match lookup {
            Ok(grade) => grade,
            Err(err) => {
                debug!(student_id, course_unit_id, error = %err, "grade lookup failed, treating as absent");
                None
            }
        }
    }

    /// Unlike the lookup, failures here are raised.
    pub async fn update_by_student_and_course_unit(
        &self,
        student_id: Id,
        course_unit_id: Id,
        value: f64,
    ) -> Result<Grade> {
        let body = CompositeUpdate {
            student_id,
            course_unit_id,
            value,
        };
        let to_error = |e: ApiError| Error::new(e, Grade::MESSAGES.update);
        let response = self
            .client()
            .put(&composite_path(student_id, course_unit_id), &body)
            .await
            .map_err(to_error)?;
        if response.body.trim().is_empty() {
            return Ok(Grade::new(student_id, course_unit_id, value));
        }
        crate::client::parse_json(&response).map_err(to_error)
    }

    pub async fn delete_by_student_and_course_unit(&self, student_id: Id, course_unit_id: Id) -> Result<()> {
        self.client()
            .delete(&composite_path(student_id, course_unit_id))
            .await
            .map_err(|e| Error::new(e, Grade::MESSAGES.delete))
    }
}

fn first_grade(value: Value) -> std::result::Result<Option<Grade>, ApiError> {
    let value = match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        Value::Null => return Ok(None),
        other => other,
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn composite_path(student_id: Id, course_unit_id: Id) -> String {
    format!("{}/etudiant/{student_id}/ue/{course_unit_id}", Grade::PATH)
}
