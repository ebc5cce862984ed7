pub mod builder;

use image::GenericImageView;
use tracing::debug;
use crate::{
    algorithms::{
        build_mask, crop_filled, external_contours, flood_fill, select_region, to_grayscale,
        ChainApproximation, Connectivity, Dilation,
    },
    config::ExtractorConfig,
    error::{Result, WandError},
    traits::WallDetector,
    types::{Contour, PixelOffset, RasterImage},
};

/// Grows the region around a seed pixel up to the boundary lines of a tile
/// and traces its outline.
///
/// Every intermediate buffer (grayscale, walls, mask, filled region) lives
/// only for the duration of one [`BoundaryExtractor::extract_region`] call.
pub struct BoundaryExtractor {
    wall_detector: Box<dyn WallDetector>,
    dilation: Dilation,
    connectivity: Connectivity,
    chain_approximation: ChainApproximation,
}

impl BoundaryExtractor {
    /// Create a new extractor builder
    pub fn builder() -> builder::ExtractorBuilder {
        builder::ExtractorBuilder::new()
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        builder::ExtractorBuilder::from_config(config).build()
    }

    pub fn new(
        wall_detector: Box<dyn WallDetector>,
        dilation: Dilation,
        connectivity: Connectivity,
        chain_approximation: ChainApproximation,
    ) -> Self {
        Self {
            wall_detector,
            dilation,
            connectivity,
            chain_approximation,
        }
    }

    /// Outline of the region enclosing `seed`.
    ///
    /// `Ok(None)` means the fill produced no usable region (seed on a wall or
    /// a degenerate outline). A seed outside the image is rejected with
    /// [`WandError::InvalidSeed`].
    pub fn extract_region(&self, image: &RasterImage, seed: PixelOffset) -> Result<Option<Contour>> {
        let (width, height) = image.dimensions();
        if seed.x >= width || seed.y >= height {
            return Err(WandError::InvalidSeed { x: seed.x, y: seed.y, width, height });
        }

        // Step 1: Walls from the grayscale tile, thickened to close small gaps
        let gray = to_grayscale(image);
        let walls = self.dilation.apply(&self.wall_detector.detect_walls(&gray));

        // Step 2: Mask-only flood fill from the seed
        let mut mask = build_mask(&walls);
        let filled = flood_fill(&mut mask, (seed.x + 1, seed.y + 1), self.connectivity);
        if filled == 0 {
            debug!(x = seed.x, y = seed.y, "Seed sits on a wall, nothing filled");
            return Ok(None);
        }

        // Step 3: Trace the filled region
        let region = crop_filled(&mask);
        let contours = external_contours(&region, self.chain_approximation);
        debug!(filled, contours = contours.len(), "Region filled");

        let contour = select_region(contours, seed);
        if contour.is_none() {
            debug!("No valid contour encloses the seed");
        }
        Ok(contour)
    }

    /// Get information about the extractor configuration
    pub fn info(&self) -> String {
        format!(
            "Boundary extractor: {k}x{k} dilation x{}, {}-connected fill, {} chain",
            self.dilation.iterations,
            self.connectivity,
            self.chain_approximation,
            k = self.dilation.kernel_size,
        )
    }
}

impl Default for BoundaryExtractor {
    fn default() -> Self {
        builder::ExtractorBuilder::new().build()
    }
}
