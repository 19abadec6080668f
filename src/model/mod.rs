//! Core data models for the music library.
//!
//! The [`Track`] record maps one audio file under the library root to its
//! metadata and (once reconciled) a cover reference. File path is the
//! natural key: a path already represented by a track is never re-ingested.

use sqlx::FromRow;

/// A track (audio file) in the music library.
#[derive(Debug, Clone, FromRow)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// File path relative to the library root (unique identifier)
    pub file_path: String,
    /// Track title (from tags or filename)
    pub title: String,
    /// Artist name (or "Unknown Artist")
    pub artist: String,
    /// Album name, if tagged
    pub album: Option<String>,
    /// Duration in seconds, from the container's audio properties
    pub duration: Option<i64>,
    /// File extension, lowercase (mp3, flac, ...)
    pub file_format: String,
    /// File size in bytes
    pub file_size: i64,
    /// Reference to the track's cover artifact (`<prefix>/<filename>`)
    pub cover_url: Option<String>,
    /// Play counter, monotonic non-decreasing
    pub play_count: i64,
}

/// A track record as produced by the scanner, before it has a database ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub file_path: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration: Option<i64>,
    pub file_format: String,
    pub file_size: i64,
}

/// Sentinel used when tags carry no artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
