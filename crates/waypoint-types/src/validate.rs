//! Input checks shared by the HTTP handlers. Nothing here touches the
//! database or the filesystem.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No data provided")]
    NoData,

    #[error("Position is required")]
    MissingPosition,

    #[error("Position must be an array with 2 elements")]
    PositionArity,

    #[error("Invalid coordinate values")]
    InvalidCoordinate,

    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid {0}: expected an ISO-8601 timestamp")]
    Timestamp(&'static str),

    #[error("Invalid birthday: expected YYYY-MM-DD")]
    Birthday,

    #[error("Invalid {0}: expected a number")]
    Number(&'static str),

    #[error("Invalid points: {0}")]
    Points(String),
}

/// One recorded GPS fix inside a track.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: String,
}

/// Parse a marker body into `(latitude, longitude)`.
///
/// The body must be an object with a `position` array of exactly two
/// elements, each either a JSON number or a numeric string.
pub fn parse_position(body: &Value) -> Result<(f64, f64), ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NoData)?;
    if obj.is_empty() {
        return Err(ValidationError::NoData);
    }

    let position = obj.get("position").ok_or(ValidationError::MissingPosition)?;
    let coords = position.as_array().ok_or(ValidationError::PositionArity)?;
    let [lat, lng] = coords.as_slice() else {
        return Err(ValidationError::PositionArity);
    };

    let lat = parse_coordinate(lat).ok_or(ValidationError::InvalidCoordinate)?;
    let lng = parse_coordinate(lng).ok_or(ValidationError::InvalidCoordinate)?;
    Ok((lat, lng))
}

fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Parse an optional numeric form field. Empty means absent.
pub fn parse_optional_float(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or(ValidationError::Number(field)),
    }
}

/// Accepts RFC 3339 (`2024-05-01T08:00:00Z`, `...+08:00`), naive date-times
/// with `T` or space and optional seconds/fraction, and bare dates.
/// Offsets are folded into UTC.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| ValidationError::Timestamp(field))
}

/// Optional timestamp: `None` and blank strings both mean "not set".
/// On success returns the trimmed text, which is what gets stored.
pub fn optional_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(field, s).map(|_| Some(s.to_string())),
    }
}

pub fn parse_birthday(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::Birthday)
}

/// Blank birthdays are treated as unset.
pub fn optional_birthday(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_birthday(s).map(Some),
    }
}

/// Check that `points` is an array of `{lat, lng, timestamp}` records.
/// Returns the number of points.
pub fn check_points(points: &RawValue) -> Result<usize, ValidationError> {
    let parsed: Vec<TrackPoint> = serde_json::from_str(points.get())
        .map_err(|e| ValidationError::Points(e.to_string()))?;

    if let Some(i) = parsed
        .iter()
        .position(|p| !p.lat.is_finite() || !p.lng.is_finite())
    {
        return Err(ValidationError::Points(format!("point {i} has a non-finite coordinate")));
    }

    Ok(parsed.len())
}
