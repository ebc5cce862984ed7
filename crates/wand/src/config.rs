use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

use crate::{
    algorithms::{ChainApproximation, Connectivity},
    error::{Result, WandError},
    io::tiles::UrlTemplate,
    projection::DEFAULT_TILE_SIZE,
};

/// Highest analysis zoom accepted; keeps pixel coordinates well inside f64
/// integer precision
pub const MAX_ZOOM: u8 = 30;

/// Tile endpoint of the reference deployment (WMTS rows before columns)
pub const DEFAULT_TILE_URL: &str =
    "https://maptiles.591.com.tw/S_Maps/wmts/DMAPS/default/GoogleMapsCompatible/{z}/{y}/{x}";

/// Top-level tunables for a click-to-polygon run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WandConfig {
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub tile_url: String,
    /// Tile edge length in pixels
    #[schemars(range(min = 1))]
    pub tile_size: u32,
    /// Analysis zoom, independent of any display zoom
    #[schemars(range(max = 30))]
    pub zoom: u8,
    pub extractor: ExtractorConfig,
    pub fetch: FetchConfig,
}

impl Default for WandConfig {
    fn default() -> Self {
        Self {
            tile_url: DEFAULT_TILE_URL.to_string(),
            tile_size: DEFAULT_TILE_SIZE,
            zoom: 20,
            extractor: ExtractorConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl WandConfig {
    /// Get the JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(WandConfig)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(WandError::InvalidConfig("tile_size must be positive".to_string()));
        }
        if self.zoom > MAX_ZOOM {
            return Err(WandError::InvalidConfig(format!(
                "zoom {} exceeds the maximum of {MAX_ZOOM}",
                self.zoom
            )));
        }
        UrlTemplate::parse(&self.tile_url)?;
        self.extractor.validate()?;
        self.fetch.validate()
    }
}

/// How boundary walls are found in the grayscale tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum WallDetection {
    /// Canny edge detection with hysteresis thresholds
    Canny {
        low: f32,
        high: f32,
    },
    /// Pixels darker than `threshold` are walls
    Threshold {
        threshold: u8,
    },
}

impl Default for WallDetection {
    fn default() -> Self {
        Self::Canny { low: 50.0, high: 150.0 }
    }
}

/// Boundary extraction tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractorConfig {
    pub walls: WallDetection,
    /// Edge length of the square dilation element; must be odd
    #[schemars(range(min = 1, max = 15))]
    pub dilation_kernel: u8,
    /// Dilation passes; 0 disables gap closing
    pub dilation_iterations: u8,
    pub connectivity: Connectivity,
    pub chain_approximation: ChainApproximation,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            walls: WallDetection::default(),
            dilation_kernel: 3,
            dilation_iterations: 1,
            connectivity: Connectivity::Four,
            chain_approximation: ChainApproximation::Simple,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<()> {
        if let WallDetection::Canny { low, high } = self.walls {
            if !(low >= 0.0 && low <= high) {
                return Err(WandError::InvalidConfig(format!(
                    "canny thresholds must satisfy 0 <= low <= high, got {low}/{high}"
                )));
            }
        }
        if self.dilation_kernel == 0 || self.dilation_kernel % 2 == 0 {
            return Err(WandError::InvalidConfig(format!(
                "dilation_kernel must be odd, got {}",
                self.dilation_kernel
            )));
        }
        let radius = u32::from(self.dilation_kernel / 2) * u32::from(self.dilation_iterations);
        if radius > u32::from(u8::MAX) {
            return Err(WandError::InvalidConfig(format!(
                "dilation reach of {radius} pixels is too large"
            )));
        }
        Ok(())
    }
}

/// Tile request options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sent as `Referer`; some tile servers refuse requests without it
    pub referer: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: "Mozilla/5.0".to_string(),
            referer: Some("https://land.591.com.tw/".to_string()),
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(WandError::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
