use super::{Accessor, Entity};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{CourseUnit, Id};

impl<T: Transport> Accessor<CourseUnit, T> {
    pub async fn update(&self, id: Id, course_unit: &CourseUnit) -> Result<CourseUnit> {
        self.replace(id, course_unit)
            .await
            .map_err(|e| Error::new(e, CourseUnit::MESSAGES.update))
    }
}
