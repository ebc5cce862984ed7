use clap::{Parser, Subcommand};
use cli::resolve_config;
use color_eyre::eyre::{eyre, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

use wand::{
    build_polygon, BoundaryExtractor, ClickOutcome, Extraction, GeoPoint, HttpTileSource,
    InMemoryTileSource, MagicWand, PixelOffset, TileIndex, TileProjection, TileSource, WandConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the parcel under a geographic point from the remote tile server
    Click {
        /// Latitude of the click in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the click in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Path to a TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the tile URL template
        #[arg(long)]
        tile_url: Option<String>,
        /// Override the analysis zoom
        #[arg(long)]
        zoom: Option<u8>,
        /// Where to write the GeoJSON result
        #[arg(short, long, default_value = "parcel.geojson")]
        output: PathBuf,
    },
    /// Extract a parcel from a tile image on disk
    Local {
        /// Path to the PNG/JPEG tile
        #[arg(short, long)]
        image: PathBuf,
        /// Tile column at the analysis zoom
        #[arg(long)]
        tile_x: u32,
        /// Tile row at the analysis zoom
        #[arg(long)]
        tile_y: u32,
        /// Seed pixel column inside the tile
        #[arg(long)]
        offset_x: u32,
        /// Seed pixel row inside the tile
        #[arg(long)]
        offset_y: u32,
        /// Override the analysis zoom
        #[arg(long)]
        zoom: Option<u8>,
        /// Path to a TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Where to write the GeoJSON result
        #[arg(short, long, default_value = "parcel.geojson")]
        output: PathBuf,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Click { lat, lon, config, tile_url, zoom, output } => {
            let config = load_with_overrides(config.as_deref(), tile_url, zoom)?;
            click(GeoPoint::new(lat, lon), &config, &output).await
        }
        Commands::Local { image, tile_x, tile_y, offset_x, offset_y, zoom, config, output } => {
            let config = load_with_overrides(config.as_deref(), None, zoom)?;
            let tile = TileIndex::new(config.zoom, tile_x, tile_y)?;
            local(&image, tile, PixelOffset::new(offset_x, offset_y), &config, &output).await
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&WandConfig::schema())?);
            Ok(())
        }
    }
}

fn load_with_overrides(
    path: Option<&Path>,
    tile_url: Option<String>,
    zoom: Option<u8>,
) -> Result<WandConfig> {
    let mut config = resolve_config(path)?;
    if let Some(tile_url) = tile_url {
        config.tile_url = tile_url;
    }
    if let Some(zoom) = zoom {
        config.zoom = zoom;
    }
    config.validate()?;
    Ok(config)
}

async fn click(point: GeoPoint, config: &WandConfig, output: &Path) -> Result<()> {
    info!("Extracting parcel at ({}, {}) with zoom {}", point.lat, point.lon, config.zoom);
    info!("Tile source: {}", config.tile_url);

    let wand = MagicWand::from_config(HttpTileSource::from_config(config)?, config)?;
    wand.set_enabled(true);

    match wand.on_click(point).await {
        ClickOutcome::Extracted(extraction) => write_extraction(&extraction, output),
        ClickOutcome::NoRegionFound => {
            warn!("No enclosed region around the clicked point");
            Ok(())
        }
        ClickOutcome::Failed(e) => Err(eyre!("Extraction failed: {e}")),
        ClickOutcome::Ignored(reason) => Err(eyre!("Click ignored: {reason}")),
    }
}

async fn local(
    image: &Path,
    tile: TileIndex,
    seed: PixelOffset,
    config: &WandConfig,
    output: &Path,
) -> Result<()> {
    info!("Extracting parcel from {} at pixel ({}, {})", image.display(), seed.x, seed.y);

    let source = InMemoryTileSource::from_path(&image.to_string_lossy())?;
    let raster = source.fetch_tile(tile).await?;
    let extractor = BoundaryExtractor::from_config(&config.extractor);
    info!("Extractor: {}", extractor.info());

    let projection = TileProjection::new(config.tile_size);
    let polygon = extractor
        .extract_region(&raster, seed)?
        .and_then(|contour| build_polygon(&contour, tile, &projection));

    match polygon {
        Some(polygon) => write_extraction(&Extraction { polygon, tile, seed }, output),
        None => {
            warn!("No enclosed region around pixel ({}, {})", seed.x, seed.y);
            Ok(())
        }
    }
}

fn write_extraction(extraction: &Extraction, output: &Path) -> Result<()> {
    info!(
        "Extracted {} points covering {:.1} m² in tile {}/{}/{}",
        extraction.polygon.len(),
        extraction.polygon.geodesic_area(),
        extraction.tile.zoom,
        extraction.tile.x,
        extraction.tile.y
    );

    extraction.save_geojson(&output.to_string_lossy())?;
    info!("GeoJSON written to {}", output.display());
    Ok(())
}
