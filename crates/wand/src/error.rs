use thiserror::Error;

#[derive(Error, Debug)]
pub enum WandError {
    #[error("Tile unavailable at {url}: {reason}")]
    TileUnavailable { url: String, reason: String },

    #[error("Seed ({x}, {y}) lies outside the {width}x{height} image")]
    InvalidSeed { x: u32, y: u32, width: u32, height: u32 },

    #[error("Tile {x}/{y} does not exist at zoom {zoom}")]
    InvalidTile { zoom: u8, x: i64, y: i64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WandError>;
