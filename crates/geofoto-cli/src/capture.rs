//! Capture-and-upload: photo, location, form, upload, public URL, insert, gallery.
//!
//! Each step runs only after the previous one succeeded. The metadata row is
//! inserted last, so a failed upload never leaves a record pointing nowhere.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Coordinates, NewRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Camera,
    Location,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => f.write_str("camera"),
            Self::Location => f.write_str("location"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("{0} permission denied")]
    PermissionDenied(Capability),

    #[error("failed to capture photo: {0}")]
    CaptureFailed(String),

    #[error("failed to get location: {0}")]
    LocationFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("failed to upload photo: {0}")]
    UploadFailed(String),

    #[error("failed to save record: {0}")]
    InsertFailed(String),
}

pub struct Photo {
    pub bytes: Vec<u8>,
}

/// What the user typed into the form, before trimming.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub submitter_name: String,
    pub business_name: String,
}

pub trait Camera {
    fn capture(&self) -> Result<Photo, CaptureError>;
}

pub trait Locator {
    fn locate(&self, photo: &Photo) -> Result<Coordinates, CaptureError>;
}

pub trait Form {
    fn collect(&self) -> Result<FormInput, CaptureError>;
}

#[async_trait]
pub trait PhotoBackend: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<(), CaptureError>;

    fn public_url(&self, name: &str) -> String;

    async fn insert(&self, record: &NewRecord) -> Result<Uuid, CaptureError>;
}

pub trait Gallery {
    fn save(&self, photo: &Photo, name: &str) -> std::io::Result<PathBuf>;
}

#[derive(Debug)]
pub struct CaptureOutcome {
    pub id: Uuid,
    pub file_name: String,
    pub record: NewRecord,
    /// Where the photo was copied locally, or why that failed. The record is
    /// already stored either way.
    pub gallery: Result<PathBuf, String>,
}

pub struct Workflow<'a> {
    pub camera: &'a dyn Camera,
    pub locator: &'a dyn Locator,
    pub form: &'a dyn Form,
    pub backend: &'a dyn PhotoBackend,
    pub gallery: &'a dyn Gallery,
}

impl Workflow<'_> {
    pub async fn run(&self) -> Result<CaptureOutcome, CaptureError> {
        let photo = self.camera.capture()?;
        let coords = self.locator.locate(&photo)?;

        let input = self.form.collect()?;
        let (submitter_name, business_name) = validate_form(&input)?;

        let now = Utc::now();
        let file_name = photo_file_name(now);
        self.backend.upload(&file_name, photo.bytes.clone()).await?;

        let photo_url = self.backend.public_url(&file_name);
        if photo_url.is_empty() {
            return Err(CaptureError::UploadFailed("no public URL for upload".into()));
        }

        let record = NewRecord {
            nama_penginput: submitter_name,
            nama_usaha: business_name,
            timestamp: now,
            latitude: coords.latitude,
            longitude: coords.longitude,
            photo_url,
        };
        let id = self.backend.insert(&record).await?;

        let gallery = self
            .gallery
            .save(&photo, &file_name)
            .map_err(|e| e.to_string());

        Ok(CaptureOutcome {
            id,
            file_name,
            record,
            gallery,
        })
    }
}

fn validate_form(input: &FormInput) -> Result<(String, String), CaptureError> {
    let submitter = input.submitter_name.trim();
    let business = input.business_name.trim();
    if submitter.is_empty() || business.is_empty() {
        return Err(CaptureError::Validation(
            "submitter name and business name are both required".into(),
        ));
    }
    Ok((submitter.to_string(), business.to_string()))
}

pub fn photo_file_name(at: DateTime<Utc>) -> String {
    format!("foto_{}.jpg", at.timestamp_millis())
}
