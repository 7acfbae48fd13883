//! Database row types. These map directly to SQLite rows and are kept apart
//! from the waypoint-types wire models so the DB layer stays independent.

use chrono::{DateTime, NaiveDate, Utc};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    pub nickname: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    /// Opaque JSON text
    pub preferences: Option<String>,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub nickname: Option<&'a str>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<&'a str>,
}

/// Profile fields to overwrite. `None` keeps the stored value.
#[derive(Default)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub preferences: Option<String>,
}

pub struct JournalRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct MarkerRow {
    pub id: i64,
    pub user_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
}

pub struct TrackRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// JSON array text, exactly as submitted
    pub points: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub distance: f64,
}

pub struct NewTrack<'a> {
    pub name: &'a str,
    pub points: &'a str,
    pub start_time: &'a str,
    pub end_time: Option<&'a str>,
    pub distance: f64,
}

/// Track fields to overwrite. `None` keeps the stored value.
#[derive(Default)]
pub struct TrackUpdate<'a> {
    pub name: Option<&'a str>,
    pub points: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub distance: Option<f64>,
}

pub struct PhotoRow {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub exif_data: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub struct NewPhoto<'a> {
    pub user_id: i64,
    pub filename: &'a str,
    pub original_filename: &'a str,
    pub file_path: &'a str,
    pub exif_data: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
