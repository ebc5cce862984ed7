pub mod geojson;
pub mod tiles;

pub use tiles::{decode_tile, HttpTileSource, InMemoryTileSource, UrlTemplate};
