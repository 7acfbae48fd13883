use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

// -- JWT Claims --

/// JWT claims issued at login and checked by the auth middleware.
/// `sub` is the integer user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Common --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub nickname: Option<String>,
    /// Serialised as `YYYY-MM-DD`.
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub preferences: Option<Value>,
}

/// Partial profile update. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

// -- Journal --

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJournalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedJournalResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Markers --

/// A map marker. `position` is `[latitude, longitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerResponse {
    pub id: i64,
    pub position: [f64; 2],
    pub description: String,
}

// -- Tracks --

/// `points` and the timestamps are kept as the client sent them so they
/// come back unchanged.
#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub points: Option<Box<RawValue>>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTrackRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub points: Option<Box<RawValue>>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub id: i64,
    pub name: String,
    pub points: Box<RawValue>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub distance: f64,
}

// -- Photos --

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub created_at: DateTime<Utc>,
    pub exif_data: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    pub filename: String,
    pub created_at: DateTime<Utc>,
}
