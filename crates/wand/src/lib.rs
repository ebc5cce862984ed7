//! # Magic Wand Parcel Extraction
//!
//! Single-click region extraction for cadastral raster tiles. A click on the
//! map is projected into the analysis zoom, the tile under it is fetched, the
//! parcel around the clicked pixel is flood filled up to the boundary lines,
//! and its outline is traced and reprojected into a geographic polygon.
//!
//! ## Core Features
//!
//! - **Web-Mercator maths**: geographic points to tile index and pixel offset and back
//! - **Boundary extraction**: Canny (or threshold) walls, gap-closing dilation,
//!   mask-only flood fill and external contour tracing
//! - **Click controller**: Idle/Busy gating so only one extraction runs at a time
//! - **GeoJSON Support**: Export extracted parcels to standard GeoJSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wand::{ClickOutcome, GeoPoint, HttpTileSource, MagicWand, WandConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WandConfig::default();
//! let wand = MagicWand::from_config(HttpTileSource::from_config(&config)?, &config)?;
//! wand.set_enabled(true);
//!
//! match wand.on_click(GeoPoint::new(25.0330, 121.5654)).await {
//!     ClickOutcome::Extracted(extraction) => extraction.save_geojson("parcel.geojson")?,
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Extractor
//!
//! ```rust,no_run
//! use wand::{BoundaryExtractor, Connectivity, PixelOffset};
//!
//! let extractor = BoundaryExtractor::builder()
//!     .with_canny(40.0, 120.0)
//!     .with_dilation(3, 2)
//!     .with_connectivity(Connectivity::Four)
//!     .build();
//!
//! let tile = image::open("tile.png")?;
//! if let Some(contour) = extractor.extract_region(&tile, PixelOffset::new(128, 128))? {
//!     println!("{} boundary points", contour.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod config;
pub mod projection;
pub mod algorithms;
pub mod pipeline;
pub mod polygon;
pub mod io;
pub mod controller;

// Re-exports for convenience
pub use error::{WandError, Result};
pub use types::*;
pub use traits::*;
pub use config::{ExtractorConfig, FetchConfig, WallDetection, WandConfig};
pub use projection::TileProjection;
pub use algorithms::*;
pub use pipeline::{BoundaryExtractor, builder::ExtractorBuilder};
pub use polygon::build_polygon;
pub use io::{decode_tile, HttpTileSource, InMemoryTileSource, UrlTemplate};
pub use controller::{ClickOutcome, Extraction, IgnoreReason, MagicWand, WandState};
