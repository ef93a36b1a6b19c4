//! Data-access objects, one per entity type.
//!
//! # Design
//! `Accessor<E, T>` implements the operations every resource shares (create,
//! get, delete, list) once, driven by the `Entity` impl: its collection path
//! and its default failure messages. `update` differs per resource, so each
//! entity gets its own impl block in a submodule, alongside its relationship
//! operations. Accessors hold only a handle to the shared client; the backend
//! is the source of truth.

mod course_unit;
mod grade;
mod student;
mod track;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{parse_json, ApiClient};
use crate::error::{ApiError, Error, Result};
use crate::transport::Transport;
use crate::types::{CourseUnit, Grade, Id, Student, Track};

/// Default failure messages, shown when the backend gives no usable one.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub create: &'static str,
    pub get: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub list: &'static str,
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection endpoint, e.g. `/api/Etudiant`.
    const PATH: &'static str;
    const MESSAGES: Messages;

    fn set_id(&mut self, id: Id);
}

impl Entity for Student {
    const PATH: &'static str = "/api/Etudiant";
    const MESSAGES: Messages = Messages {
        create: "cannot create the student",
        get: "cannot retrieve the student",
        update: "cannot update the student",
        delete: "cannot delete the student",
        list: "cannot retrieve the students",
    };

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

impl Entity for Track {
    const PATH: &'static str = "/api/Parcours";
    const MESSAGES: Messages = Messages {
        create: "cannot create the track",
        get: "cannot retrieve the track",
        update: "cannot update the track",
        delete: "cannot delete the track",
        list: "cannot retrieve the tracks",
    };

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

impl Entity for CourseUnit {
    const PATH: &'static str = "/api/Ue";
    const MESSAGES: Messages = Messages {
        create: "cannot create the course unit",
        get: "cannot retrieve the course unit",
        update: "cannot update the course unit",
        delete: "cannot delete the course unit",
        list: "cannot retrieve the course units",
    };

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

impl Entity for Grade {
    const PATH: &'static str = "/api/Note";
    const MESSAGES: Messages = Messages {
        create: "cannot create the grade",
        get: "cannot retrieve the grade",
        update: "cannot update the grade",
        delete: "cannot delete the grade",
        list: "cannot retrieve the grades",
    };

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

pub struct Accessor<E, T> {
    client: Arc<ApiClient<T>>,
    _entity: PhantomData<fn() -> E>,
}

pub type StudentAccessor<T> = Accessor<Student, T>;
pub type TrackAccessor<T> = Accessor<Track, T>;
pub type CourseUnitAccessor<T> = Accessor<CourseUnit, T>;
pub type GradeAccessor<T> = Accessor<Grade, T>;

impl<E, T> Accessor<E, T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }
}

impl<E: Entity, T: Transport> Accessor<E, T> {
    /// POST the entity, relationship fields reduced to identifiers, and return
    /// the backend's representation.
    pub async fn create(&self, entity: &E) -> Result<E> {
        self.client
            .post(E::PATH, entity)
            .await
            .map_err(|e| Error::new(e, E::MESSAGES.create))
    }

    /// Not-found is an ordinary failure here.
    pub async fn get(&self, id: Id) -> Result<E> {
        self.client
            .get(&item_path::<E>(id))
            .await
            .map_err(|e| Error::new(e, E::MESSAGES.get))
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.client
            .delete(&item_path::<E>(id))
            .await
            .map_err(|e| Error::new(e, E::MESSAGES.delete))
    }

    /// Every entity, in the order the backend sent them.
    pub async fn list(&self) -> Result<Vec<E>> {
        self.client
            .get(E::PATH)
            .await
            .map_err(|e| Error::new(e, E::MESSAGES.list))
    }

    /// PUT the entity. A bodiless 2xx echoes back what was sent.
    async fn replace(&self, id: Id, entity: &E) -> std::result::Result<E, ApiError> {
        let response = self.client.put(&item_path::<E>(id), entity).await?;
        if response.body.trim().is_empty() {
            let mut echoed = entity.clone();
            echoed.set_id(id);
            return Ok(echoed);
        }
        parse_json(&response)
    }
}

fn item_path<E: Entity>(id: Id) -> String {
    format!("{}/{id}", E::PATH)
}
