//! Client-side data access for the academic records REST API.
//!
//! # Overview
//! Translates typed operations on students, tracks, course units and grades
//! into HTTP calls, normalizes backend failures into presentable messages, and
//! keeps the student/track and track/course-unit relationships consistent
//! across the backend's separate link endpoints.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest`s and parses `HttpResponse`s; a
//!   `Transport` executes them. `ReqwestTransport` is the real one.
//! - `Accessor<E, T>` is the data-access object for one entity type. All of
//!   them share one `ApiClient` through the `Accessors` registry.
//! - Every accessor failure is an `Error` whose message comes from
//!   `normalize::error_message`.
//! - Student updates diff the previous and new track (`reconcile`) and issue
//!   unlink/link calls before the PUT. There is no rollback; partial failures
//!   are reported through `Error::outcome`.

pub mod accessor;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod reconcile;
pub mod registry;
pub mod transport;
pub mod types;

pub use accessor::{
    Accessor, CourseUnitAccessor, Entity, GradeAccessor, Messages, StudentAccessor, TrackAccessor,
};
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Error, Outcome, ResponseBody, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::error_message;
pub use reconcile::LinkChange;
pub use registry::Accessors;
pub use transport::{ReqwestTransport, Transport};
pub use types::{CourseUnit, Grade, Id, Student, Track};
