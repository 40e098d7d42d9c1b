//! Command-line stand-ins for the phone: a JPEG on disk is the camera frame, the
//! photo's GPS tags (or explicit coordinates) are the location fix, stdin is the
//! form and a local directory is the gallery.

use std::cell::RefCell;
use std::fs;
use std::io::{self, BufRead, Cursor, ErrorKind, Write};
use std::path::PathBuf;

use exif::{In, Tag, Value};

use crate::capture::{Camera, Capability, CaptureError, Form, FormInput, Gallery, Locator, Photo};
use crate::model::Coordinates;

const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Camera for FileCamera {
    fn capture(&self) -> Result<Photo, CaptureError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => CaptureError::PermissionDenied(Capability::Camera),
            _ => CaptureError::CaptureFailed(format!("{}: {}", self.path.display(), e)),
        })?;

        if !bytes.starts_with(&JPEG_MAGIC) {
            return Err(CaptureError::CaptureFailed(format!(
                "{} is not a JPEG image",
                self.path.display()
            )));
        }

        Ok(Photo { bytes })
    }
}

pub enum LocationSource {
    Fixed(Coordinates),
    Exif,
}

impl Locator for LocationSource {
    fn locate(&self, photo: &Photo) -> Result<Coordinates, CaptureError> {
        match self {
            Self::Fixed(coords) => Ok(*coords),
            Self::Exif => read_gps(&photo.bytes),
        }
    }
}

fn read_gps(bytes: &[u8]) -> Result<Coordinates, CaptureError> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map_err(|e| CaptureError::LocationFailed(format!("no EXIF data in photo ({e})")))?;

    let latitude = gps_coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S');
    let longitude = gps_coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W');

    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok_or_else(|| {
            CaptureError::LocationFailed(format!("GPS tags out of range: {lat}, {lon}"))
        }),
        _ => Err(CaptureError::LocationFailed(
            "photo has no GPS position; pass --lat and --lon".into(),
        )),
    }
}

fn gps_coordinate(exif: &exif::Exif, value_tag: Tag, ref_tag: Tag, negative: u8) -> Option<f64> {
    let degrees = match &exif.get_field(value_tag, In::PRIMARY)?.value {
        Value::Rational(parts) if parts.len() >= 3 => {
            dms_to_degrees(parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64())
        }
        Value::SRational(parts) if parts.len() >= 3 => {
            dms_to_degrees(parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64())
        }
        _ => return None,
    };

    let hemisphere = match &exif.get_field(ref_tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values.first().and_then(|v| v.first()).copied(),
        _ => None,
    }?;

    Some(if hemisphere.eq_ignore_ascii_case(&negative) {
        -degrees
    } else {
        degrees
    })
}

fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Asks on the terminal for whichever field was not given on the command line.
pub struct PromptForm {
    submitter_name: Option<String>,
    business_name: Option<String>,
    input: RefCell<Box<dyn BufRead>>,
}

impl PromptForm {
    pub fn stdin(submitter_name: Option<String>, business_name: Option<String>) -> Self {
        Self::with_input(
            submitter_name,
            business_name,
            Box::new(io::BufReader::new(io::stdin())),
        )
    }

    pub fn with_input(
        submitter_name: Option<String>,
        business_name: Option<String>,
        input: Box<dyn BufRead>,
    ) -> Self {
        Self {
            submitter_name,
            business_name,
            input: RefCell::new(input),
        }
    }

    fn field(&self, label: &str, preset: &Option<String>) -> Result<String, CaptureError> {
        if let Some(value) = preset {
            return Ok(value.clone());
        }

        print!("{label}: ");
        io::stdout().flush().ok();

        let mut line = String::new();
        self.input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|e| CaptureError::Validation(format!("could not read {label}: {e}")))?;
        Ok(line)
    }
}

impl Form for PromptForm {
    fn collect(&self) -> Result<FormInput, CaptureError> {
        Ok(FormInput {
            submitter_name: self.field("Submitter name", &self.submitter_name)?,
            business_name: self.field("Business name", &self.business_name)?,
        })
    }
}

pub struct DirGallery {
    dir: PathBuf,
}

impl DirGallery {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl Gallery for DirGallery {
    fn save(&self, photo: &Photo, name: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, &photo.bytes)?;
        Ok(path)
    }
}
