use tracing::info;

use super::{item_path, Accessor, Entity};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{Id, Track};

const ADD_COURSE_UNIT: &str = "cannot add the course unit to the track";
const REMOVE_COURSE_UNIT: &str = "cannot remove the course unit from the track";

impl<T: Transport> Accessor<Track, T> {
    /// PUT the track's own fields. Course-unit membership is not diffed; use
    /// the explicit add/remove calls.
    pub async fn update(&self, id: Id, track: &Track) -> Result<Track> {
        self.replace(id, track)
            .await
            .map_err(|e| Error::new(e, Track::MESSAGES.update))
    }

    pub async fn add_course_unit_to_track(&self, track_id: Id, course_unit_id: Id) -> Result<()> {
        self.client()
            .post_empty(&course_unit_link_path(track_id, course_unit_id))
            .await
            .map_err(|e| Error::new(e, ADD_COURSE_UNIT))?;
        info!(track_id, course_unit_id, "course unit added to track");
        Ok(())
    }

    pub async fn remove_course_unit_from_track(&self, track_id: Id, course_unit_id: Id) -> Result<()> {
        self.client()
            .delete(&course_unit_link_path(track_id, course_unit_id))
            .await
            .map_err(|e| Error::new(e, REMOVE_COURSE_UNIT))?;
        info!(track_id, course_unit_id, "course unit removed from track");
        Ok(())
    }
}

fn course_unit_link_path(track_id: Id, course_unit_id: Id) -> String {
    format!("{}/Ues/{course_unit_id}", item_path::<Track>(track_id))
}
