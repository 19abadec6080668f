//! Library scanner: walks the audio library root and ingests new tracks.
//!
//! Traversal is depth-bounded and recognizes files purely by extension
//! allow-list (case-insensitive). Re-scans are idempotent: a file path
//! already represented by a track record is skipped. A failure reading
//! one file's tags falls back to filename-derived metadata; it never
//! aborts the pass.

use futures::stream::Stream;
use std::path::{Path, PathBuf};
use std::pin::pin;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::error::Result;
use crate::model::{NewTrack, UNKNOWN_ARTIST};
use crate::tags;

/// Recognized audio container extensions (lowercase).
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "wav", "ogg"];

/// Whether a path carries a recognized audio extension (case-insensitive).
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Scans the given root directory for audio files, bounded by `max_depth`.
///
/// Returns a Stream of PathBufs. The traversal runs on a blocking task so
/// the filesystem walk never stalls the async runtime.
pub fn scan_files(root: PathBuf, max_depth: usize) -> impl Stream<Item = PathBuf> {
    let (tx, rx) = mpsc::channel(100);

    tokio::task::spawn_blocking(move || {
        for entry in WalkDir::new(root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_audio_file(entry.path()) {
                // If the receiver is dropped, blocking_send errors and we
                // stop scanning.
                if tx.blocking_send(entry.path().to_path_buf()).is_err() {
                    break;
                }
            }
        }
    });

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|path| (path, rx))
    })
}

/// Outcome counters for one scanner pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// New track records created
    pub added: usize,
    /// Files already represented by a track record
    pub skipped: usize,
    /// Files that could not be ingested (logged individually)
    pub errors: usize,
}

/// Run one scanner pass: ingest every unseen audio file under `root`.
///
/// A missing root is created empty and yields an empty summary. Per-file
/// failures (unreadable metadata, store write errors) are counted and
/// logged; the pass continues with the remaining files.
pub async fn scan_library(
    pool: &sqlx::SqlitePool,
    root: &Path,
    max_depth: usize,
) -> Result<ScanSummary> {
    if !root.exists() {
        info!("Creating music directory: {:?}", root);
        std::fs::create_dir_all(root)?;
        return Ok(ScanSummary::default());
    }

    let mut summary = ScanSummary::default();
    let mut stream = pin!(scan_files(root.to_path_buf(), max_depth));

    use futures::StreamExt;
    while let Some(path) = stream.next().await {
        let rel = match path.strip_prefix(root) {
            Ok(p) => p.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        };

        match db::find_track_by_path(pool, &rel).await {
            Ok(Some(_)) => {
                summary.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error looking up {}: {}", rel, e);
                summary.errors += 1;
                continue;
            }
        }

        let track = read_track(&path, &rel);
        match db::insert_track(pool, &track).await {
            Ok(_) => {
                info!("Added track: {} - {}", track.artist, track.title);
                summary.added += 1;
            }
            Err(e) => {
                error!("Error saving track {}: {}", rel, e);
                summary.errors += 1;
            }
        }
    }

    info!(
        "Music scan complete. Added: {}, Skipped: {}, Errors: {}",
        summary.added, summary.skipped, summary.errors
    );
    Ok(summary)
}

/// Build a track record for one file, falling back to filename-derived
/// metadata when the tag container is absent or unreadable.
fn read_track(path: &Path, rel: &str) -> NewTrack {
    let file_format = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let file_size = std::fs::metadata(path).map(|m| m.len() as i64).unwrap_or(0);

    let tags = match tags::read_tags(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("Could not read metadata for {}, using filename: {}", rel, e);
            tags::TrackTags::default()
        }
    };

    NewTrack {
        file_path: rel.to_string(),
        title: tags.title.unwrap_or_else(|| file_stem(path)),
        artist: tags.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        album: tags.album,
        duration: tags.duration,
        file_format,
        file_size,
    }
}

/// File name with the extension stripped, for use as a fallback title.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}
