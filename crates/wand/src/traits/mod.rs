use std::future::Future;

use image::GrayImage;
use crate::{error::Result, types::{RasterImage, TileIndex}};

/// Trait for boundary wall detection algorithms
pub trait WallDetector: Send + Sync {
    /// Produce a binary map (0 = open, nonzero = wall) the size of `gray`
    fn detect_walls(&self, gray: &GrayImage) -> GrayImage;
}

/// Trait for raster tile providers
pub trait TileSource: Send + Sync {
    /// Fetch and decode a single tile. One attempt; failures are returned to
    /// the caller.
    fn fetch_tile(&self, tile: TileIndex) -> impl Future<Output = Result<RasterImage>> + Send;
}
