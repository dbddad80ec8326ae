//! The catalog record.
//!
//! [`PhotoRecord`] is the whole contract with the browsing UI: the catalog
//! file is a JSON array of these, keys in camelCase. Absent values are written
//! as `null` rather than omitted, so every record has the same shape.

use serde::{Deserialize, Serialize};

/// One successfully processed photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Relative path with separators turned into dashes, extension dropped.
    pub id: String,
    pub file_name: String,
    /// Root-relative web path of the original (web-safe sources) or the
    /// optimized derivative.
    pub src: String,
    /// Root-relative web path of the thumbnail.
    pub thumbnail: String,
    pub category: String,
    /// 0 when unknown.
    pub width: u32,
    pub height: u32,
    /// RFC 3339 UTC instant, millisecond precision.
    pub date_taken: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<f64>,
    pub shutter_speed: Option<String>,
    pub iso: Option<u32>,
    /// Whole millimeters.
    pub focal_length: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PhotoRecord {
        PhotoRecord {
            id: "landscape-dawn".into(),
            file_name: "dawn.jpg".into(),
            src: "/photos/landscape/dawn.jpg".into(),
            thumbnail: "/thumbnails/landscape/dawn.jpg".into(),
            category: "landscape".into(),
            width: 6000,
            height: 4000,
            date_taken: Some("2024-06-01T08:30:00.000Z".into()),
            camera: Some("Canon EOS R5".into()),
            lens: None,
            aperture: Some(2.8),
            shutter_speed: Some("1/250s".into()),
            iso: Some(100),
            focal_length: Some(35),
        }
    }

    #[test]
    fn serializes_camel_case_keys_in_order() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.starts_with(
            r#"{"id":"landscape-dawn","fileName":"dawn.jpg","src":"/photos/landscape/dawn.jpg","thumbnail":"#
        ));
        assert!(json.contains(r#""dateTaken":"2024-06-01T08:30:00.000Z""#));
        assert!(json.contains(r#""shutterSpeed":"1/250s""#));
        assert!(json.ends_with(r#""iso":100,"focalLength":35}"#));
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let json = serde_json::to_value(&record()).unwrap();
        assert!(json["lens"].is_null());
        assert_eq!(json["aperture"], 2.8);
    }

    #[test]
    fn deserialize_roundtrip() {
        let json = serde_json::to_string(&record()).unwrap();
        let back: PhotoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }
}
