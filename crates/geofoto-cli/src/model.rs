use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn map_link(&self) -> String {
        map_link(self.latitude, self.longitude)
    }
}

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://maps.google.com/maps?q={},{}", latitude, longitude)
}

/// Row inserted after a successful upload. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecord {
    pub nama_penginput: String,
    pub nama_usaha: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub nama_penginput: String,
    pub nama_usaha: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
}

impl Record {
    pub fn map_link(&self) -> String {
        map_link(self.latitude, self.longitude)
    }
}

#[derive(Tabled)]
pub struct RecordRow {
    pub id: Uuid,
    pub business: String,
    pub submitter: String,
    #[tabled(rename = "captured at")]
    pub captured: String,
    pub map: String,
}

impl From<&Record> for RecordRow {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id,
            business: r.nama_usaha.clone(),
            submitter: r.nama_penginput.clone(),
            captured: r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            map: r.map_link(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_link_points_at_coordinates() {
        let c = Coordinates::new(-6.175392, 106.827153).unwrap();
        assert_eq!(
            c.map_link(),
            "https://maps.google.com/maps?q=-6.175392,106.827153"
        );
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn new_record_uses_backend_field_names() {
        let rec = NewRecord {
            nama_penginput: "Sari".into(),
            nama_usaha: "Warung Sari".into(),
            timestamp: "2024-05-01T08:30:00Z".parse().unwrap(),
            latitude: -6.2,
            longitude: 106.8,
            photo_url: "https://x/foto_1.jpg".into(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["nama_penginput"], "Sari");
        assert_eq!(json["timestamp"], "2024-05-01T08:30:00Z");
        assert!(json.get("id").is_none());
    }
}
