use std::time::Duration;

use image::GenericImageView;
use reqwest::{
    header::{HeaderMap, HeaderValue, REFERER},
    Client, ClientBuilder,
};
use tracing::{debug, warn};
use crate::{
    config::{FetchConfig, WandConfig},
    error::{Result, WandError},
    traits::TileSource,
    types::{RasterImage, TileIndex},
};

/// Tile address template with `{z}`, `{x}` and `{y}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let missing: Vec<&str> = ["{z}", "{x}", "{y}"]
            .into_iter()
            .filter(|placeholder| !template.contains(placeholder))
            .collect();

        if !missing.is_empty() {
            return Err(WandError::InvalidConfig(format!(
                "tile url template `{template}` lacks {}",
                missing.join(", ")
            )));
        }

        Ok(Self { template: template.to_string() })
    }

    /// Substitute the tile coordinates
    pub fn format(&self, tile: TileIndex) -> String {
        self.template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

fn unavailable(url: &str, reason: impl ToString) -> WandError {
    WandError::TileUnavailable {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Decode a PNG/JPEG tile body
pub fn decode_tile(url: &str, bytes: &[u8]) -> Result<RasterImage> {
    image::load_from_memory(bytes).map_err(|e| unavailable(url, e))
}

/// Tile source downloading from an HTTP(S) endpoint
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: Client,
    template: UrlTemplate,
    tile_size: u32,
}

impl HttpTileSource {
    pub fn new(template: UrlTemplate, tile_size: u32, fetch: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = &fetch.referer {
            let value = HeaderValue::from_str(referer)
                .map_err(|e| WandError::InvalidConfig(format!("invalid referer `{referer}`: {e}")))?;
            headers.insert(REFERER, value);
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, template, tile_size })
    }

    pub fn from_config(config: &WandConfig) -> Result<Self> {
        let template = UrlTemplate::parse(&config.tile_url)?;
        Self::new(template, config.tile_size, &config.fetch)
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }
}

impl TileSource for HttpTileSource {
    async fn fetch_tile(&self, tile: TileIndex) -> Result<RasterImage> {
        let url = self.template.format(tile);
        debug!(%url, "Fetching tile");

        let response = self.client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| unavailable(&url, e))?;

        let body = response.bytes().await.map_err(|e| unavailable(&url, e))?;
        let image = decode_tile(&url, &body)?;

        let (width, height) = image.dimensions();
        if width != self.tile_size || height != self.tile_size {
            warn!(%url, width, height, expected = self.tile_size, "Tile has unexpected dimensions");
        }

        Ok(image)
    }
}

/// Serves one decoded image for every tile request
#[derive(Debug, Clone)]
pub struct InMemoryTileSource {
    image: RasterImage,
}

impl InMemoryTileSource {
    pub fn new(image: RasterImage) -> Self {
        Self { image }
    }

    /// Load the image from a local PNG/JPEG file
    pub fn from_path(path: &str) -> Result<Self> {
        let image = image::open(path).map_err(|e| unavailable(path, e))?;
        Ok(Self { image })
    }
}

impl TileSource for InMemoryTileSource {
    async fn fetch_tile(&self, _tile: TileIndex) -> Result<RasterImage> {
        Ok(self.image.clone())
    }
}
