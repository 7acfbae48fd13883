use crate::Database;
use crate::models::{
    JournalRow, MarkerRow, NewPhoto, NewTrack, NewUser, PhotoRow, ProfileUpdate, TrackRow,
    TrackUpdate, UserRow,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row, params};

// Every non-user query filters on `user_id`, so a row owned by someone else
// is indistinguishable from a missing one.

impl Database {
    // -- Users --

    /// Returns `None` if the username is already taken.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, email, password, nickname, birthday, phone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(username) DO NOTHING",
                params![
                    user.username,
                    user.email,
                    user.password_hash,
                    user.nickname,
                    user.birthday,
                    user.phone
                ],
            )?;
            Ok((inserted == 1).then(|| conn.last_insert_rowid()))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Returns false if the user does not exist.
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    nickname    = COALESCE(?2, nickname),
                    email       = COALESCE(?3, email),
                    birthday    = COALESCE(?4, birthday),
                    phone       = COALESCE(?5, phone),
                    preferences = COALESCE(?6, preferences)
                 WHERE id = ?1",
                params![
                    id,
                    update.nickname,
                    update.email,
                    update.birthday,
                    update.phone,
                    update.preferences
                ],
            )?;
            Ok(changed == 1)
        })
    }

    /// Delete a user and, through the cascade, everything they own.
    /// Returns the file paths of their photos so the caller can remove them,
    /// or `None` if the user did not exist.
    pub fn delete_user(&self, id: i64) -> Result<Option<Vec<String>>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let paths = {
                let mut stmt = tx.prepare("SELECT file_path FROM photos WHERE user_id = ?1")?;
                stmt.query_map([id], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;

            Ok((deleted == 1).then_some(paths))
        })
    }

    // -- Journals --

    /// Newest first.
    pub fn list_journals(&self, user_id: i64) -> Result<Vec<JournalRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, content, created_at, updated_at
                 FROM journals
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([user_id], journal_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_journal(&self, user_id: i64, title: &str, content: &str) -> Result<JournalRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO journals (user_id, title, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![user_id, title, content, now],
            )?;
            Ok(JournalRow {
                id: conn.last_insert_rowid(),
                user_id,
                title: title.to_string(),
                content: content.to_string(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_journal(&self, id: i64, user_id: i64) -> Result<Option<JournalRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, title, content, created_at, updated_at
                 FROM journals WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
                journal_from_row,
            )
            .optional()
        })
    }

    /// Partial update; touches `updated_at`. Returns false if not found.
    pub fn update_journal(
        &self,
        id: i64,
        user_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<bool> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE journals SET
                    title      = COALESCE(?3, title),
                    content    = COALESCE(?4, content),
                    updated_at = ?5
                 WHERE id = ?1 AND user_id = ?2",
                params![id, user_id, title, content, now],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn delete_journal(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_owned("journals", id, user_id)
    }

    // -- Markers --

    pub fn list_markers(&self, user_id: i64) -> Result<Vec<MarkerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, latitude, longitude, description
                 FROM markers WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MarkerRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        latitude: row.get(2)?,
                        longitude: row.get(3)?,
                        description: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_marker(
        &self,
        user_id: i64,
        latitude: f64,
        longitude: f64,
        description: &str,
    ) -> Result<MarkerRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO markers (user_id, latitude, longitude, description)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, latitude, longitude, description],
            )?;
            Ok(MarkerRow {
                id: conn.last_insert_rowid(),
                user_id,
                latitude,
                longitude,
                description: description.to_string(),
            })
        })
    }

    pub fn delete_marker(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_owned("markers", id, user_id)
    }

    // -- Tracks --

    pub fn list_tracks(&self, user_id: i64) -> Result<Vec<TrackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRACK_COLUMNS} FROM tracks WHERE user_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([user_id], track_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_track(&self, user_id: i64, track: &NewTrack<'_>) -> Result<TrackRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tracks (user_id, name, points, start_time, end_time, distance)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    track.name,
                    track.points,
                    track.start_time,
                    track.end_time,
                    track.distance
                ],
            )?;
            Ok(TrackRow {
                id: conn.last_insert_rowid(),
                user_id,
                name: track.name.to_string(),
                points: track.points.to_string(),
                start_time: track.start_time.to_string(),
                end_time: track.end_time.map(str::to_string),
                distance: track.distance,
            })
        })
    }

    /// Partial update. Returns the row as stored afterwards, or `None` if not found.
    pub fn update_track(
        &self,
        id: i64,
        user_id: i64,
        update: &TrackUpdate<'_>,
    ) -> Result<Option<TrackRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tracks SET
                    name     = COALESCE(?3, name),
                    points   = COALESCE(?4, points),
                    end_time = COALESCE(?5, end_time),
                    distance = COALESCE(?6, distance)
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    id,
                    user_id,
                    update.name,
                    update.points,
                    update.end_time,
                    update.distance
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_track(conn, id, user_id)
        })
    }

    pub fn delete_track(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_owned("tracks", id, user_id)
    }

    // -- Photos --

    pub fn list_photos(&self, user_id: i64) -> Result<Vec<PhotoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PHOTO_COLUMNS} FROM photos WHERE user_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([user_id], photo_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_photo(&self, photo: &NewPhoto<'_>) -> Result<PhotoRow> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO photos
                    (user_id, filename, original_filename, file_path, exif_data, latitude, longitude, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    photo.user_id,
                    photo.filename,
                    photo.original_filename,
                    photo.file_path,
                    photo.exif_data,
                    photo.latitude,
                    photo.longitude,
                    now
                ],
            )?;
            Ok(PhotoRow {
                id: conn.last_insert_rowid(),
                user_id: photo.user_id,
                filename: photo.filename.to_string(),
                original_filename: photo.original_filename.to_string(),
                file_path: photo.file_path.to_string(),
                exif_data: photo.exif_data.map(str::to_string),
                latitude: photo.latitude,
                longitude: photo.longitude,
                created_at: now,
            })
        })
    }

    pub fn get_photo(&self, id: i64, user_id: i64) -> Result<Option<PhotoRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                photo_from_row,
            )
            .optional()
        })
    }

    pub fn delete_photo(&self, id: i64, user_id: i64) -> Result<bool> {
        self.delete_owned("photos", id, user_id)
    }

    /// `table` is always one of the literals above, never user input.
    fn delete_owned(&self, table: &'static str, id: i64, user_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                &format!("DELETE FROM {table} WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
            )?;
            Ok(deleted == 1)
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password, nickname, birthday, phone, preferences";

const TRACK_COLUMNS: &str = "id, user_id, name, points, start_time, end_time, distance";

const PHOTO_COLUMNS: &str = "id, user_id, filename, original_filename, file_path, exif_data, latitude, longitude, created_at";

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        user_from_row,
    )
    .optional()
}

fn query_track(conn: &Connection, id: i64, user_id: i64) -> Result<Option<TrackRow>> {
    conn.query_row(
        &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1 AND user_id = ?2"),
        [id, user_id],
        track_from_row,
    )
    .optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        nickname: row.get(4)?,
        birthday: row.get(5)?,
        phone: row.get(6)?,
        preferences: row.get(7)?,
    })
}

fn journal_from_row(row: &Row<'_>) -> rusqlite::Result<JournalRow> {
    Ok(JournalRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<TrackRow> {
    Ok(TrackRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        points: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        distance: row.get(6)?,
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<PhotoRow> {
    Ok(PhotoRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        original_filename: row.get(3)?,
        file_path: row.get(4)?,
        exif_data: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
