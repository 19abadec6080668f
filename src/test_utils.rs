//! Test utilities and fixtures for streamlet tests.
//!
//! Provides a temp database helper, mock track factories, and audio/image
//! fixture generators shared by the scanner, tags, and cover tests.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::model::NewTrack;

/// Creates a temporary database for testing.
///
/// The database lives in a temporary directory that is cleaned up when the
/// returned `TempDir` is dropped. Migrations are run automatically. Keep the
/// TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a mock NewTrack with sensible defaults for the given path.
///
/// Customize with struct update syntax:
///
/// ```ignore
/// let track = NewTrack { title: "Custom".to_string(), ..mock_new_track("a.mp3") };
/// ```
pub fn mock_new_track(file_path: &str) -> NewTrack {
    NewTrack {
        file_path: file_path.to_string(),
        title: "Test Track".to_string(),
        artist: "Test Artist".to_string(),
        album: Some("Test Album".to_string()),
        duration: Some(180),
        file_format: "mp3".to_string(),
        file_size: 1024,
    }
}

/// Writes a minimal valid PCM WAV file (1 channel, 44.1 kHz, 16-bit silence).
///
/// Small enough to be cheap, real enough for lofty to probe and tag.
pub fn write_wav_file(path: &Path) {
    let sample_count: u32 = 4410; // 0.1s of silence
    let data_len = sample_count * 2;

    let mut buf: Vec<u8> = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&44100u32.to_le_bytes()); // sample rate
    buf.extend_from_slice(&(44100u32 * 2).to_le_bytes()); // byte rate
    buf.extend_from_slice(&2u16.to_le_bytes()); // block align
    buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(buf.len() + data_len as usize, 0);

    std::fs::write(path, buf).expect("Failed to write wav fixture");
}

/// Embeds a small PNG as the front cover of an existing audio file.
///
/// Returns the PNG bytes that were embedded.
pub fn write_embedded_artwork(path: &Path) -> Vec<u8> {
    use lofty::config::WriteOptions;
    use lofty::picture::{MimeType, Picture, PictureType};
    use lofty::tag::{Tag, TagExt, TagType};

    let png = png_image(16, 16, [60, 180, 90]);

    let mut tag = Tag::new(TagType::Id3v2);
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::Png),
        None,
        png.clone(),
    ));
    tag.save_to_path(path, WriteOptions::default())
        .expect("Failed to embed artwork");

    png
}

/// Encodes a solid-color PNG of the given dimensions.
pub fn png_image(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode png fixture");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;

        let tracks = crate::db::get_all_tracks(&pool).await.unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_wav_fixture_is_probeable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.wav");
        write_wav_file(&path);

        let tags = crate::tags::read_tags(&path);
        assert!(tags.is_ok());
    }

    #[test]
    fn test_png_fixture_decodes() {
        let bytes = png_image(8, 4, [255, 0, 0]);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));
    }
}
