use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                password    TEXT NOT NULL,
                nickname    TEXT,
                birthday    TEXT,
                phone       TEXT,
                preferences TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE journals (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title       TEXT NOT NULL DEFAULT '',
                content     TEXT NOT NULL CHECK (length(content) > 0),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_journals_user
                ON journals(user_id, created_at);

            CREATE TABLE markers (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                latitude    REAL NOT NULL,
                longitude   REAL NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX idx_markers_user ON markers(user_id);

            CREATE TABLE tracks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name        TEXT NOT NULL,
                points      TEXT NOT NULL,
                start_time  TEXT NOT NULL,
                end_time    TEXT,
                distance    REAL NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_tracks_user ON tracks(user_id);

            CREATE TABLE photos (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id             INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                filename            TEXT NOT NULL UNIQUE,
                original_filename   TEXT NOT NULL,
                file_path           TEXT NOT NULL,
                exif_data           TEXT,
                latitude            REAL,
                longitude           REAL,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_photos_user ON photos(user_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
