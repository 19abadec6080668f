//! Audio file tag reading.
//!
//! Uses the lofty crate for format-independent metadata access across
//! MP3, FLAC, OGG, M4A, and WAV containers. Everything here is
//! best-effort: an absent tag, an absent field, or a corrupt container
//! degrades to "field absent" rather than an error the scanner would
//! have to unwind.

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use std::path::Path;

use crate::error::{Error, Result};

/// Best-effort metadata read from a file's tag container.
///
/// Every field is optional; the scanner supplies filename-derived
/// fallbacks. Duration comes from the container's audio properties,
/// not from free-text tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<i64>,
}

/// Read tag metadata from an audio file.
///
/// Returns an error only when the container itself cannot be opened or
/// parsed; a parsable file with no tag yields a [`TrackTags`] with all
/// text fields `None` and the duration from the audio header.
pub fn read_tags(path: &Path) -> Result<TrackTags> {
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, e.to_string()))?
        .read()
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    // Get the primary tag, or fall back to the first available tag
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

    let title = tag
        .and_then(|t| t.title().map(|s| s.to_string()))
        .and_then(non_empty);
    let artist = tag
        .and_then(|t| t.artist().map(|s| s.to_string()))
        .and_then(non_empty);
    let album = tag
        .and_then(|t| t.album().map(|s| s.to_string()))
        .and_then(non_empty);

    let duration = tagged_file.properties().duration().as_secs() as i64;

    Ok(TrackTags {
        title,
        artist,
        album,
        duration: Some(duration),
    })
}

/// Extract the first embedded artwork image's raw bytes.
///
/// Prefers the front cover picture, falls back to the first picture.
/// Returns `None` when the file is missing, the container can't be
/// parsed, no picture frame exists, or the picture data is empty -
/// none of those are errors to the caller.
pub fn extract_embedded_artwork(path: &Path) -> Option<Vec<u8>> {
    let tagged_file = Probe::open(path).ok()?.read().ok()?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())?;

    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == lofty::picture::PictureType::CoverFront)
        .or_else(|| pictures.first())?;

    if picture.data().is_empty() {
        return None;
    }

    Some(picture.data().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_embedded_artwork, write_wav_file};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write");

        let result = read_tags(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_read_non_existent_file_returns_error() {
        let result = read_tags(Path::new("non_existent_file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_untagged_wav_has_no_text_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_wav_file(&path);

        let tags = read_tags(&path).expect("wav should parse");
        assert!(tags.title.is_none());
        assert!(tags.artist.is_none());
        assert!(tags.album.is_none());
        assert!(tags.duration.is_some());
    }

    #[test]
    fn test_extract_from_nonexistent_file() {
        assert!(extract_embedded_artwork(Path::new("nonexistent.mp3")).is_none());
    }

    #[test]
    fn test_extract_from_non_audio_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Not an audio file").expect("Failed to write");

        assert!(extract_embedded_artwork(file.path()).is_none());
    }

    #[test]
    fn test_extract_from_untagged_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_wav_file(&path);

        assert!(extract_embedded_artwork(&path).is_none());
    }

    #[test]
    fn test_extract_embedded_artwork_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.wav");
        write_wav_file(&path);

        let art = write_embedded_artwork(&path);
        let extracted = extract_embedded_artwork(&path).expect("artwork should be present");
        assert_eq!(extracted, art);
    }
}
