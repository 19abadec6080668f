//! Cover reconciliation pass.
//!
//! Guarantees every track record ends with a cover reference by applying
//! an ordered list of strategies, first success wins:
//!
//! 1. Reuse an existing artifact found by sanitized-token substring match
//! 2. Extract artwork embedded in the audio file's tags
//! 3. Download artwork from the external catalog lookup
//! 4. Synthesize a gradient placeholder (always succeeds)
//!
//! Failures are caught at the per-track boundary: one bad file never
//! halts the batch. The pass returns aggregate counters instead of
//! mutating shared state, so per-track work stays independent.

use std::path::PathBuf;

use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use super::compose;
use super::{cover_file_name, find_existing_cover, sanitize_file_path};
use crate::config::Config;
use crate::db;
use crate::error::{Error, Result, ResultExt};
use crate::lookup::ArtworkClient;
use crate::model::Track;
use crate::tags;

/// Fallback strategies in strict priority order.
const STRATEGIES: [Strategy; 3] = [Strategy::Embedded, Strategy::Lookup, Strategy::Gradient];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Artwork embedded in the file's own tag container
    Embedded,
    /// External catalog lookup by artist + title
    Lookup,
    /// Procedural gradient placeholder
    Gradient,
}

/// How one track's cover was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Existing,
    Embedded,
    Downloaded,
    Generated,
}

/// Aggregate counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Tracks considered
    pub total: usize,
    /// Pre-existing artifacts reused
    pub existing: usize,
    /// Covers extracted from embedded tags
    pub embedded: usize,
    /// Covers downloaded from the external lookup
    pub downloaded: usize,
    /// Gradient placeholders generated
    pub generated: usize,
    /// Tracks that failed to resolve (logged individually)
    pub errors: usize,
}

/// Runs cover reconciliation over all known tracks.
pub struct CoverResolver {
    pool: SqlitePool,
    music_dir: PathBuf,
    covers_dir: PathBuf,
    url_prefix: String,
    target_size: u32,
    client: Option<ArtworkClient>,
}

impl CoverResolver {
    /// Build a resolver from the application config.
    ///
    /// The lookup client is only constructed when lookup is enabled;
    /// without it, strategy 3 is skipped entirely.
    pub fn new(pool: SqlitePool, config: &Config) -> Result<Self> {
        let client = if config.lookup.enabled {
            Some(ArtworkClient::new(&config.lookup)?)
        } else {
            None
        };

        Ok(Self {
            pool,
            music_dir: config.library.root.clone(),
            covers_dir: config.covers.dir.clone(),
            url_prefix: config.covers.url_prefix.trim_end_matches('/').to_string(),
            target_size: config.covers.size,
            client,
        })
    }

    /// Run one reconciliation pass over every known track.
    ///
    /// Idempotent: a second pass over an unchanged track set reuses the
    /// artifacts the first pass created and writes nothing new. Only a
    /// failure to create the covers directory aborts the pass.
    pub async fn reconcile_all(&self) -> Result<ReconcileSummary> {
        std::fs::create_dir_all(&self.covers_dir)
            .with_context(format!("creating covers directory {:?}", self.covers_dir))?;

        let tracks = db::get_all_tracks(&self.pool).await?;
        info!("Reconciling covers for {} tracks", tracks.len());

        let mut summary = ReconcileSummary {
            total: tracks.len(),
            ..Default::default()
        };

        for track in &tracks {
            match self.resolve_track(track).await {
                Ok(Outcome::Existing) => summary.existing += 1,
                Ok(Outcome::Embedded) => {
                    info!("Extracted embedded artwork for track: {}", track.file_path);
                    summary.embedded += 1;
                }
                Ok(Outcome::Downloaded) => {
                    info!(
                        "Downloaded artwork for track: {} - {}",
                        track.artist, track.title
                    );
                    summary.downloaded += 1;
                }
                Ok(Outcome::Generated) => {
                    info!("Generated gradient cover for track: {}", track.file_path);
                    summary.generated += 1;
                }
                Err(e) => {
                    error!(
                        "Error processing cover for track {}: {}",
                        track.file_path, e
                    );
                    summary.errors += 1;
                }
            }
        }

        info!(
            "Cover reconciliation complete. Existing: {}, Embedded: {}, Downloaded: {}, Generated: {}, Errors: {}",
            summary.existing, summary.embedded, summary.downloaded, summary.generated, summary.errors
        );
        Ok(summary)
    }

    /// Resolve a single track's cover, applying the strategy chain.
    async fn resolve_track(&self, track: &Track) -> Result<Outcome> {
        let token = sanitize_file_path(&track.file_path);

        // Step 1: reuse an existing artifact, repairing a stale reference
        // only when the stored URL actually differs.
        if let Some(existing) = find_existing_cover(&self.covers_dir, &token)? {
            let expected = format!("{}/{}", self.url_prefix, existing);
            if track.cover_url.as_deref() != Some(expected.as_str()) {
                db::update_cover_url(&self.pool, track.id, &expected).await?;
                debug!("Updated cover URL for track {} (existing cover)", track.file_path);
            }
            return Ok(Outcome::Existing);
        }

        let file_name = cover_file_name(&token);
        for strategy in STRATEGIES {
            let Some(bytes) = self.compose_via(strategy, track).await else {
                continue;
            };

            let path = self.covers_dir.join(&file_name);
            std::fs::write(&path, &bytes)?;

            let url = format!("{}/{}", self.url_prefix, file_name);
            db::update_cover_url(&self.pool, track.id, &url).await?;

            return Ok(match strategy {
                Strategy::Embedded => Outcome::Embedded,
                Strategy::Lookup => Outcome::Downloaded,
                Strategy::Gradient => Outcome::Generated,
            });
        }

        // The gradient strategy only fails on an encode error, so this is
        // effectively unreachable; surface it as a per-track error anyway.
        Err(Error::invalid_format(format!(
            "no strategy produced a cover for {}",
            track.file_path
        )))
    }

    /// Produce composed cover bytes via one strategy, or `None` to fall
    /// through to the next. Decode failures degrade to `None` so corrupt
    /// artwork triggers the fallback instead of failing the track.
    async fn compose_via(&self, strategy: Strategy, track: &Track) -> Option<Vec<u8>> {
        match strategy {
            Strategy::Embedded => {
                let audio_path = self.music_dir.join(&track.file_path);
                let raw = tags::extract_embedded_artwork(&audio_path)?;
                self.compose_raw(&raw, track)
            }
            Strategy::Lookup => {
                let client = self.client.as_ref()?;
                let raw = client.find_artwork(&track.artist, &track.title).await?;
                self.compose_raw(&raw, track)
            }
            Strategy::Gradient => {
                match compose::gradient_cover(
                    &track.title,
                    &track.artist,
                    self.target_size,
                    &mut rand::rng(),
                ) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        warn!("Gradient synthesis failed for {}: {}", track.file_path, e);
                        None
                    }
                }
            }
        }
    }

    fn compose_raw(&self, raw: &[u8], track: &Track) -> Option<Vec<u8>> {
        match compose::resize_letterbox(raw, self.target_size) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Discarding undecodable artwork for {}: {}", track.file_path, e);
                None
            }
        }
    }
}
