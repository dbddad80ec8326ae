//! EXIF extraction and normalization.
//!
//! Two steps, kept apart so the second is testable without files:
//!
//! 1. [`read_exif`] pulls a fixed tag whitelist out of a file into a
//!    [`RawExif`] (raw EXIF encodings, nothing interpreted yet).
//! 2. [`normalize`] turns that into display-ready values ([`NormalizedExif`]).
//!
//! A missing or corrupt EXIF block is not an error for the photo: callers fall
//! back to `RawExif::default()` and every field ends up absent.
//!
//! ## Field rules
//!
//! | Field | Rule |
//! |---|---|
//! | `width`/`height` | `PixelX/YDimension` → `ImageWidth/Length` → decoded size → 0 |
//! | `dateTaken` | `DateTimeOriginal` (+ `OffsetTimeOriginal`, else UTC) as RFC 3339 with millis |
//! | `camera` | trimmed model, with make prepended unless the model already starts with it |
//! | `shutterSpeed` | `"2s"` for ≥ 1s, `"1/100s"` below, absent for 0 |
//! | `focalLength` | rounded millimeters |
//! | `aperture`, `iso` | passed through |

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use exif::{Exif, In, Reader, Tag, Value};
use std::io::BufReader;
use std::path::Path;

use crate::imaging::Dimensions;

/// Timestamp layouts accepted for `DateTimeOriginal`. The first is the EXIF
/// standard; the others show up in files written by non-camera software.
const DATE_FORMATS: &[&str] = &["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Tag values as stored, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExif {
    pub date_time_original: Option<String>,
    pub offset_time_original: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub f_number: Option<f64>,
    pub exposure_time: Option<f64>,
    pub iso: Option<u32>,
    pub focal_length: Option<f64>,
    /// `PixelXDimension` / `PixelYDimension` from the Exif IFD.
    pub exif_width: Option<u32>,
    pub exif_height: Option<u32>,
    /// `ImageWidth` / `ImageLength` from IFD0.
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub orientation: Option<u16>,
}

impl RawExif {
    pub fn from_exif(exif: &Exif) -> Self {
        Self {
            date_time_original: ascii(exif, Tag::DateTimeOriginal),
            offset_time_original: ascii(exif, Tag::OffsetTimeOriginal),
            make: ascii(exif, Tag::Make),
            model: ascii(exif, Tag::Model),
            lens_model: ascii(exif, Tag::LensModel),
            f_number: rational(exif, Tag::FNumber),
            exposure_time: rational(exif, Tag::ExposureTime),
            iso: uint(exif, Tag::PhotographicSensitivity),
            focal_length: rational(exif, Tag::FocalLength),
            exif_width: uint(exif, Tag::PixelXDimension),
            exif_height: uint(exif, Tag::PixelYDimension),
            image_width: uint(exif, Tag::ImageWidth),
            image_height: uint(exif, Tag::ImageLength),
            orientation: uint(exif, Tag::Orientation).and_then(|v| u16::try_from(v).ok()),
        }
    }
}

/// Read the tag whitelist from any container kamadak-exif understands
/// (JPEG, TIFF-based RAW, HEIF, PNG, WebP).
pub fn read_exif(path: &Path) -> Result<RawExif, exif::Error> {
    let file = std::fs::File::open(path)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file))?;
    Ok(RawExif::from_exif(&exif))
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|raw| String::from_utf8_lossy(raw).trim_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn rational(exif: &Exif, tag: Tag) -> Option<f64> {
    let value = match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => values.first().map(|r| r.to_f64()),
        Value::SRational(values) => values.first().map(|r| r.to_f64()),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

/// Display-ready shooting information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedExif {
    pub date_taken: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<f64>,
    pub shutter_speed: Option<String>,
    pub iso: Option<u32>,
    pub focal_length: Option<u32>,
}

pub fn normalize(raw: &RawExif) -> NormalizedExif {
    NormalizedExif {
        date_taken: raw
            .date_time_original
            .as_deref()
            .and_then(|dt| parse_date_taken(dt, raw.offset_time_original.as_deref())),
        camera: format_camera(raw.make.as_deref(), raw.model.as_deref()),
        lens: raw
            .lens_model
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        aperture: raw.f_number,
        shutter_speed: raw.exposure_time.and_then(format_shutter_speed),
        iso: raw.iso,
        focal_length: raw
            .focal_length
            .filter(|f| *f >= 0.0)
            .map(|f| f.round() as u32),
    }
}

/// Pixel dimensions by precedence, each axis independently:
/// EXIF-reported, then container-reported, then decoded, then 0.
pub fn resolve_dimensions(raw: &RawExif, decoded: Option<Dimensions>) -> (u32, u32) {
    let pick = |sources: [Option<u32>; 3]| {
        sources
            .into_iter()
            .flatten()
            .find(|v| *v > 0)
            .unwrap_or(0)
    };
    (
        pick([raw.exif_width, raw.image_width, decoded.map(|d| d.width)]),
        pick([raw.exif_height, raw.image_height, decoded.map(|d| d.height)]),
    )
}

/// Parse an EXIF timestamp into an RFC 3339 UTC instant with millisecond
/// precision (`2024-06-01T08:30:00.000Z`).
///
/// `offset` is the `OffsetTimeOriginal` value (`+02:00`); without one the
/// timestamp is taken as UTC so the output doesn't depend on the build host.
pub fn parse_date_taken(value: &str, offset: Option<&str>) -> Option<String> {
    let value = value.trim();
    let naive = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())?;

    let instant: DateTime<Utc> = match offset.and_then(parse_offset) {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()?
            .with_timezone(&Utc),
        None => naive.and_utc(),
    };
    Some(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `+HH:MM` / `-HH:MM`.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// `"2s"` / `"0.5s"`-style for exposures of a second or longer, unit fraction
/// otherwise. Zero, negative and non-finite exposures are absent.
///
/// ```
/// # use contact_sheet::metadata::format_shutter_speed;
/// assert_eq!(format_shutter_speed(0.01).as_deref(), Some("1/100s"));
/// assert_eq!(format_shutter_speed(2.0).as_deref(), Some("2s"));
/// assert_eq!(format_shutter_speed(0.0), None);
/// ```
pub fn format_shutter_speed(exposure: f64) -> Option<String> {
    if !exposure.is_finite() || exposure <= 0.0 {
        return None;
    }
    if exposure >= 1.0 {
        Some(format!("{exposure}s"))
    } else {
        Some(format!("1/{}s", (1.0 / exposure).round() as u64))
    }
}

/// Camera label from make and model.
///
/// ```
/// # use contact_sheet::metadata::format_camera;
/// assert_eq!(format_camera(Some("Canon"), Some("Canon EOS R5")).as_deref(), Some("Canon EOS R5"));
/// assert_eq!(format_camera(Some("Sony"), Some("ILCE-7RM4")).as_deref(), Some("Sony ILCE-7RM4"));
/// ```
pub fn format_camera(make: Option<&str>, model: Option<&str>) -> Option<String> {
    let model = model.map(str::trim).filter(|m| !m.is_empty())?;
    match make.map(str::trim).filter(|m| !m.is_empty()) {
        Some(make) if !model.to_lowercase().starts_with(&make.to_lowercase()) => {
            Some(format!("{make} {model}"))
        }
        _ => Some(model.to_string()),
    }
}
