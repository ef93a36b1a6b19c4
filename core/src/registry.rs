//! One accessor per entity type, sharing one client.
//!
//! Build an `Accessors` once at startup and hand out references to it. Each
//! accessor is created on first use and lives as long as the registry.

use std::sync::{Arc, OnceLock};

use crate::accessor::{Accessor, CourseUnitAccessor, GradeAccessor, StudentAccessor, TrackAccessor};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::ReqwestTransport;

pub struct Accessors<T> {
    client: Arc<ApiClient<T>>,
    students: OnceLock<StudentAccessor<T>>,
    tracks: OnceLock<TrackAccessor<T>>,
    course_units: OnceLock<CourseUnitAccessor<T>>,
    grades: OnceLock<GradeAccessor<T>>,
}

impl<T> Accessors<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client: Arc::new(client),
            students: OnceLock::new(),
            tracks: OnceLock::new(),
            course_units: OnceLock::new(),
            grades: OnceLock::new(),
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn students(&self) -> &StudentAccessor<T> {
        self.students.get_or_init(|| Accessor::new(Arc::clone(&self.client)))
    }

    pub fn tracks(&self) -> &TrackAccessor<T> {
        self.tracks.get_or_init(|| Accessor::new(Arc::clone(&self.client)))
    }

    pub fn course_units(&self) -> &CourseUnitAccessor<T> {
        self.course_units.get_or_init(|| Accessor::new(Arc::clone(&self.client)))
    }

    pub fn grades(&self) -> &GradeAccessor<T> {
        self.grades.get_or_init(|| Accessor::new(Arc::clone(&self.client)))
    }
}

impl Accessors<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::new(ApiClient::from_config(config, transport)))
    }
}
