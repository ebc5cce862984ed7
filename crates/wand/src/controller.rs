//! Click handling: turns a geographic click into at most one running
//! extraction and reports the outcome to the caller.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
    time::Instant,
};

use strum::{Display, IntoStaticStr};
use tracing::{debug, error, info, warn};
use crate::{
    config::WandConfig,
    error::{Result, WandError},
    pipeline::BoundaryExtractor,
    polygon::build_polygon,
    projection::TileProjection,
    traits::TileSource,
    types::{GeoPoint, PixelOffset, Polygon, TileIndex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum WandState {
    Idle,
    Busy,
}

/// Why a click did not start an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum IgnoreReason {
    Disabled,
    Busy,
}

/// A successful extraction with the tile it was traced on
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub polygon: Polygon,
    pub tile: TileIndex,
    pub seed: PixelOffset,
}

#[derive(Debug)]
pub enum ClickOutcome {
    Extracted(Extraction),
    /// The pipeline ran but found no enclosed region
    NoRegionFound,
    /// The pipeline failed, e.g. the tile could not be fetched
    Failed(WandError),
    Ignored(IgnoreReason),
}

/// Holds the Busy state for one extraction; dropping it returns to Idle on
/// every exit path, unwinding included.
struct BusyGuard<'a> {
    state: &'a Mutex<WandState>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(state: &'a Mutex<WandState>) -> Option<Self> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        match *current {
            WandState::Busy => None,
            WandState::Idle => {
                *current = WandState::Busy;
                Some(Self { state })
            }
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = WandState::Idle;
    }
}

/// Single-click region extractor bound to a tile source.
///
/// Starts disabled. While an extraction runs, further clicks are dropped,
/// not queued.
pub struct MagicWand<S> {
    source: S,
    extractor: BoundaryExtractor,
    projection: TileProjection,
    zoom: u8,
    state: Mutex<WandState>,
    enabled: AtomicBool,
}

impl<S: TileSource> MagicWand<S> {
    pub fn new(source: S, extractor: BoundaryExtractor, projection: TileProjection, zoom: u8) -> Self {
        Self {
            source,
            extractor,
            projection,
            zoom,
            state: Mutex::new(WandState::Idle),
            enabled: AtomicBool::new(false),
        }
    }

    pub fn from_config(source: S, config: &WandConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            source,
            BoundaryExtractor::from_config(&config.extractor),
            TileProjection::new(config.tile_size),
            config.zoom,
        ))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn extractor(&self) -> &BoundaryExtractor {
        &self.extractor
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn state(&self) -> WandState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enable or disable click handling; a running extraction is unaffected
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        info!(enabled, "Magic wand toggled");
    }

    /// Flip the enabled flag and return the new value
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::SeqCst);
        info!(enabled, "Magic wand toggled");
        enabled
    }

    /// Handle one click at `point`
    pub async fn on_click(&self, point: GeoPoint) -> ClickOutcome {
        if !self.is_enabled() {
            debug!(lat = point.lat, lon = point.lon, "Wand disabled, click ignored");
            return ClickOutcome::Ignored(IgnoreReason::Disabled);
        }

        let Some(_busy) = BusyGuard::acquire(&self.state) else {
            debug!(lat = point.lat, lon = point.lon, "Extraction in progress, click dropped");
            return ClickOutcome::Ignored(IgnoreReason::Busy);
        };

        let started = Instant::now();
        let outcome = match self.extract_at(point).await {
            Ok(Some(extraction)) => {
                info!(points = extraction.polygon.len(), "Polygon extracted");
                ClickOutcome::Extracted(extraction)
            }
            Ok(None) => {
                info!("No closed region found");
                ClickOutcome::NoRegionFound
            }
            Err(err @ (WandError::InvalidSeed { .. } | WandError::InvalidTile { .. })) => {
                warn!(error = %err, "Click does not map onto a usable tile pixel");
                ClickOutcome::NoRegionFound
            }
            Err(err) => {
                error!(error = %err, "Extraction failed");
                ClickOutcome::Failed(err)
            }
        };

        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Click handled");
        outcome
    }

    async fn extract_at(&self, point: GeoPoint) -> Result<Option<Extraction>> {
        let (tile, seed) = self.projection.locate(point, self.zoom)?;
        info!(
            zoom = tile.zoom,
            tile_x = tile.x,
            tile_y = tile.y,
            offset_x = seed.x,
            offset_y = seed.y,
            "Click located"
        );

        let image = self.source.fetch_tile(tile).await?;
        let Some(contour) = self.extractor.extract_region(&image, seed)? else {
            return Ok(None);
        };

        Ok(build_polygon(&contour, tile, &self.projection)
            .map(|polygon| Extraction { polygon, tile, seed }))
    }
}
