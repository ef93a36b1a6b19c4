use tracing::{info, warn};

use super::{item_path, Accessor, Entity};
use crate::error::{Error, Result};
use crate::reconcile::{track_changes, LinkChange};
use crate::transport::Transport;
use crate::types::{Id, Student, Track};

const ADD_TO_TRACK: &str = "cannot add the student to the track";
const REMOVE_FROM_TRACK: &str = "cannot remove the student from the track";

impl<T: Transport> Accessor<Student, T> {
    /// Update a student, moving them between tracks first if needed.
    ///
    /// `previous_track_id` must be the track the student followed before this
    /// edit; it is trusted as-is and never re-fetched. When it differs from the
    /// new track, the student is unlinked from the old track, then linked to the
    /// new one, then the student's own fields are PUT. The calls run strictly
    /// in that order and the first failure stops the sequence.
    ///
    /// Nothing is rolled back. If a later call fails after earlier link changes
    /// succeeded, the returned error lists them in `applied_changes()` and
    /// reports `Outcome::PartiallyApplied`; after a failed link following a
    /// successful unlink, the student follows no track at all.
    pub async fn update(&self, id: Id, student: &Student, previous_track_id: Option<Id>) -> Result<Student> {
        let mut applied = Vec::new();
        for change in track_changes(previous_track_id, student.track_id()) {
            let result = match change {
                LinkChange::Unlink(track_id) => self.remove_student_from_track(track_id, id).await,
                LinkChange::Link(track_id) => self.add_student_to_track(track_id, id).await,
            };
            if let Err(err) = result {
                return Err(abandon(id, err, applied));
            }
            applied.push(change);
        }

        match self.replace(id, student).await {
            Ok(updated) => Ok(updated),
            Err(e) => Err(abandon(id, Error::new(e, Student::MESSAGES.update), applied)),
        }
    }

    pub async fn add_student_to_track(&self, track_id: Id, student_id: Id) -> Result<()> {
        self.client()
            .post_empty(&membership_path(track_id, student_id))
            .await
            .map_err(|e| Error::new(e, ADD_TO_TRACK))?;
        info!(student_id, track_id, "student added to track");
        Ok(())
    }

    pub async fn remove_student_from_track(&self, track_id: Id, student_id: Id) -> Result<()> {
        self.client()
            .delete(&membership_path(track_id, student_id))
            .await
            .map_err(|e| Error::new(e, REMOVE_FROM_TRACK))?;
        info!(student_id, track_id, "student removed from track");
        Ok(())
    }
}

fn abandon(student_id: Id, err: Error, applied: Vec<LinkChange>) -> Error {
    if !applied.is_empty() {
        warn!(
            student_id,
            applied = ?applied,
            error = %err,
            "student update failed after track membership changed"
        );
    }
    err.with_applied(applied)
}

fn membership_path(track_id: Id, student_id: Id) -> String {
    format!("{}/etudiants/{student_id}", item_path::<Track>(track_id))
}
