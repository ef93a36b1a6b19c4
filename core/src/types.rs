//! Entity model for the academic records API.
//!
//! # Design
//! Field names on the wire are the backend's (`Nom`, `ParcoursSuivi`, ...).
//! Relationship fields are written as identifiers only; on read they accept
//! either identifiers or nested objects, since the backend returns both
//! depending on the endpoint.

use serde::{Deserialize, Serialize};

/// Backend-assigned identifier.
pub type Id = i64;

/// A study track ("Parcours").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "Id", alias = "id", default)]
    pub id: Option<Id>,
    #[serde(rename = "NomParcours", default)]
    pub name: Option<String>,
    #[serde(rename = "AnneeFormation", default)]
    pub formation_year: Option<i32>,
}

impl Track {
    pub fn new(name: impl Into<String>, formation_year: i32) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            formation_year: Some(formation_year),
        }
    }

    /// A reference to an existing track known only by its identifier.
    pub fn reference(id: Id) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// A student ("Etudiant"). Follows at most one track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "Id", alias = "id", default)]
    pub id: Option<Id>,
    #[serde(rename = "Nom", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Prenom", default)]
    pub first_name: Option<String>,
    #[serde(rename = "NumEtud", default)]
    pub student_number: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "ParcoursSuivi", default, with = "track_ref")]
    pub track: Option<Track>,
}

impl Student {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        student_number: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            last_name: Some(last_name.into()),
            first_name: Some(first_name.into()),
            student_number: Some(student_number.into()),
            email: Some(email.into()),
            track: None,
        }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    pub fn track_id(&self) -> Option<Id> {
        self.track.as_ref().and_then(|track| track.id)
    }
}

/// A course unit ("Ue"), taught in any number of tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseUnit {
    #[serde(rename = "Id", alias = "ID", alias = "id", default)]
    pub id: Option<Id>,
    #[serde(rename = "NumeroUe", default)]
    pub code: Option<String>,
    #[serde(rename = "Intitule", default)]
    pub title: Option<String>,
    #[serde(rename = "EnseigneeDans", default, with = "track_refs")]
    pub tracks: Vec<Track>,
}

impl CourseUnit {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            code: Some(code.into()),
            title: Some(title.into()),
            tracks: Vec::new(),
        }
    }

    pub fn track_ids(&self) -> Vec<Id> {
        self.tracks.iter().filter_map(|track| track.id).collect()
    }
}

/// A grade ("Note"). Addressable by its own id or by (student, course unit).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(alias = "Id", default)]
    pub id: Option<Id>,
    #[serde(rename = "valeur", alias = "Valeur", default)]
    pub value: Option<f64>,
    #[serde(rename = "etudiantId", alias = "IdEtudiant", default)]
    pub student_id: Option<Id>,
    #[serde(rename = "ueId", alias = "IdUe", default)]
    pub course_unit_id: Option<Id>,
}

impl Grade {
    pub fn new(student_id: Id, course_unit_id: Id, value: f64) -> Self {
        Self {
            id: None,
            value: Some(value),
            student_id: Some(student_id),
            course_unit_id: Some(course_unit_id),
        }
    }
}

/// A relationship field as the backend may send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum TrackRef {
    Id(Id),
    Track(Track),
}

impl From<TrackRef> for Track {
    fn from(value: TrackRef) -> Self {
        match value {
            TrackRef::Id(id) => Track::reference(id),
            TrackRef::Track(track) => track,
        }
    }
}

mod track_ref {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Track, TrackRef};

    pub fn serialize<S: Serializer>(track: &Option<Track>, serializer: S) -> Result<S::Ok, S::Error> {
        track.as_ref().and_then(|track| track.id).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Track>, D::Error> {
        Ok(Option::<TrackRef>::deserialize(deserializer)?.map(Track::from))
    }
}

mod track_refs {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Track, TrackRef};

    pub fn serialize<S: Serializer>(tracks: &[Track], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(tracks.iter().filter_map(|track| track.id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Track>, D::Error> {
        let refs = Option::<Vec<TrackRef>>::deserialize(deserializer)?;
        Ok(refs.unwrap_or_default().into_iter().map(Track::from).collect())
    }
}
