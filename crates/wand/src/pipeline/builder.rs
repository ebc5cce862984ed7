use crate::{
    algorithms::{
        CannyWallDetector, ChainApproximation, Connectivity, Dilation, ThresholdWallDetector,
    },
    config::{ExtractorConfig, WallDetection},
    pipeline::BoundaryExtractor,
    traits::WallDetector,
};

/// Builder for boundary extractors with a fluent API
pub struct ExtractorBuilder {
    wall_detector: Option<Box<dyn WallDetector>>,
    dilation: Dilation,
    connectivity: Connectivity,
    chain_approximation: ChainApproximation,
}

impl ExtractorBuilder {
    /// Create a new builder with the default tunables
    pub fn new() -> Self {
        Self {
            wall_detector: None,
            dilation: Dilation::default(),
            connectivity: Connectivity::default(),
            chain_approximation: ChainApproximation::default(),
        }
    }

    /// Seed a builder from configuration values
    pub fn from_config(config: &ExtractorConfig) -> Self {
        let builder = match config.walls {
            WallDetection::Canny { low, high } => Self::new().with_canny(low, high),
            WallDetection::Threshold { threshold } => Self::new().with_threshold_walls(threshold),
        };

        builder
            .with_dilation(config.dilation_kernel, config.dilation_iterations)
            .with_connectivity(config.connectivity)
            .with_chain_approximation(config.chain_approximation)
    }

    /// Set the wall detector (replaces any existing one)
    pub fn set_wall_detector<W>(mut self, detector: W) -> Self
    where
        W: WallDetector + 'static,
    {
        self.wall_detector = Some(Box::new(detector));
        self
    }

    /// Detect walls with Canny hysteresis thresholds, in either order
    pub fn with_canny(self, low_threshold: f32, high_threshold: f32) -> Self {
        self.set_wall_detector(CannyWallDetector::new(low_threshold, high_threshold))
    }

    /// Treat dark pixels as walls directly
    pub fn with_threshold_walls(self, threshold: u8) -> Self {
        self.set_wall_detector(ThresholdWallDetector { threshold })
    }

    pub fn with_dilation(mut self, kernel_size: u8, iterations: u8) -> Self {
        self.dilation = Dilation { kernel_size, iterations };
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_chain_approximation(mut self, approximation: ChainApproximation) -> Self {
        self.chain_approximation = approximation;
        self
    }

    /// Build the extractor, defaulting to Canny walls if none was set
    pub fn build(self) -> BoundaryExtractor {
        let wall_detector = self.wall_detector
            .unwrap_or_else(|| Box::new(CannyWallDetector::default()));

        BoundaryExtractor::new(
            wall_detector,
            self.dilation,
            self.connectivity,
            self.chain_approximation,
        )
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
