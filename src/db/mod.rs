//! Track record store backed by SQLite.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! This is the only persistence boundary the pipeline knows about:
//! find/insert by file path, list all, update the cover reference,
//! bump the play counter. The core never deletes rows.

use crate::model::{NewTrack, Track};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "streamlet.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Insert a new track record.
///
/// The file path column is UNIQUE; inserting a path that already exists
/// is a constraint violation. Callers are expected to check with
/// [`find_track_by_path`] first (the scanner's dedup step).
///
/// Returns the database ID of the new track.
pub async fn insert_track(pool: &SqlitePool, track: &NewTrack) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tracks (file_path, title, artist, album, duration, file_format, file_size)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&track.file_path)
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(track.duration)
    .bind(&track.file_format)
    .bind(track.file_size)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

const TRACK_COLUMNS: &str = "id, file_path, title, artist, album, duration, \
                             file_format, file_size, cover_url, play_count";

/// Find a track by its relative file path.
pub async fn find_track_by_path(pool: &SqlitePool, path: &str) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE file_path = ?"
    ))
    .bind(path)
    .fetch_optional(pool)
    .await
}

/// Get a track by its database ID.
pub async fn get_track_by_id(pool: &SqlitePool, track_id: i64) -> sqlx::Result<Option<Track>> {
    sqlx::query_as::<_, Track>(&format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?"))
        .bind(track_id)
        .fetch_optional(pool)
        .await
}

/// Get all tracks from the database.
///
/// This is the input set for a cover reconciliation pass.
pub async fn get_all_tracks(pool: &SqlitePool) -> sqlx::Result<Vec<Track>> {
    sqlx::query_as::<_, Track>(&format!("SELECT {TRACK_COLUMNS} FROM tracks"))
        .fetch_all(pool)
        .await
}

/// Update a track's cover reference.
pub async fn update_cover_url(
    pool: &SqlitePool,
    track_id: i64,
    cover_url: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE tracks SET cover_url = ? WHERE id = ?")
        .bind(cover_url)
        .bind(track_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Increment a track's play count, returning the new value.
pub async fn increment_play_count(pool: &SqlitePool, track_id: i64) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "UPDATE tracks SET play_count = play_count + 1 WHERE id = ? RETURNING play_count",
    )
    .bind(track_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_new_track, temp_db};

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db_url = format!("sqlite:{}", db_path.display());

        let pool = init_db(&db_url).await.expect("Failed to init db");
        assert!(db_path.exists());

        let tracks = get_all_tracks(&pool).await.expect("Failed to query tracks");
        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_find_by_path() {
        let (pool, _dir) = temp_db().await;

        let new = mock_new_track("artist/song.mp3");
        let id = insert_track(&pool, &new).await.unwrap();
        assert!(id > 0);

        let found = find_track_by_path(&pool, "artist/song.mp3")
            .await
            .unwrap()
            .expect("track should exist");
        assert_eq!(found.id, id);
        assert_eq!(found.title, new.title);
        assert_eq!(found.play_count, 0);
        assert!(found.cover_url.is_none());

        let missing = find_track_by_path(&pool, "nope.mp3").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_path_rejected() {
        let (pool, _dir) = temp_db().await;

        let new = mock_new_track("song.mp3");
        insert_track(&pool, &new).await.unwrap();
        let second = insert_track(&pool, &new).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_update_cover_url() {
        let (pool, _dir) = temp_db().await;

        let id = insert_track(&pool, &mock_new_track("song.mp3"))
            .await
            .unwrap();
        update_cover_url(&pool, id, "/covers/123_song.mp3.jpg")
            .await
            .unwrap();

        let track = get_track_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(
            track.cover_url.as_deref(),
            Some("/covers/123_song.mp3.jpg")
        );
    }

    #[tokio::test]
    async fn test_increment_play_count() {
        let (pool, _dir) = temp_db().await;

        let id = insert_track(&pool, &mock_new_track("song.mp3"))
            .await
            .unwrap();
        assert_eq!(increment_play_count(&pool, id).await.unwrap(), 1);
        assert_eq!(increment_play_count(&pool, id).await.unwrap(), 2);
    }
}
