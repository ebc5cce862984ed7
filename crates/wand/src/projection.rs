//! Spherical Web-Mercator maths between geographic points, global pixel
//! coordinates and tile-local offsets.

use std::f64::consts::PI;

use crate::{
    error::{Result, WandError},
    types::{GeoPoint, PixelOffset, TileIndex},
};

/// Latitude limit of the square Web-Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Default raster tile edge length in pixels
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Projection between geographic coordinates and a tile pyramid of fixed
/// tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileProjection {
    pub tile_size: u32,
}

impl Default for TileProjection {
    fn default() -> Self {
        Self { tile_size: DEFAULT_TILE_SIZE }
    }
}

impl TileProjection {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    /// World width (and height) in pixels at the given zoom
    pub fn world_size(&self, zoom: u8) -> f64 {
        f64::from(self.tile_size) * 2f64.powi(i32::from(zoom))
    }

    /// Forward projection to global pixel coordinates at `zoom`.
    ///
    /// Latitude is clamped to [`MAX_LATITUDE`]; results for points beyond it
    /// are not meaningful.
    pub fn project(&self, point: GeoPoint, zoom: u8) -> (f64, f64) {
        let world = self.world_size(zoom);
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = (point.lon + 180.0) / 360.0 * world;
        let y = (0.5 - (PI / 4.0 + lat / 2.0).tan().ln() / (2.0 * PI)) * world;
        (x, y)
    }

    /// Inverse of [`TileProjection::project`]
    pub fn unproject(&self, pixel_x: f64, pixel_y: f64, zoom: u8) -> GeoPoint {
        let world = self.world_size(zoom);

        let lon = pixel_x / world * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * pixel_y / world);
        let lat = n.sinh().atan().to_degrees();
        GeoPoint::new(lat, lon)
    }

    /// Split global pixel coordinates into tile column/row and the offset
    /// inside that tile. Offsets always fall in `[0, tile_size)`.
    pub fn to_tile(&self, pixel_x: f64, pixel_y: f64) -> (u32, u32, PixelOffset) {
        let (tile_x, offset_x) = self.split_axis(pixel_x);
        let (tile_y, offset_y) = self.split_axis(pixel_y);
        (tile_x, tile_y, PixelOffset::new(offset_x, offset_y))
    }

    fn split_axis(&self, pixel: f64) -> (u32, u32) {
        let size = f64::from(self.tile_size);
        let tile = (pixel / size).floor();
        let offset = (pixel - tile * size).floor().clamp(0.0, size - 1.0);
        // Float-to-int casts saturate; callers pass non-negative pixels
        (tile as u32, offset as u32)
    }

    /// Tile and in-tile offset under a geographic point at `zoom`.
    ///
    /// Longitudes outside [-180, 180) fall off the tile grid and yield
    /// [`WandError::InvalidTile`] on either side.
    pub fn locate(&self, point: GeoPoint, zoom: u8) -> Result<(TileIndex, PixelOffset)> {
        let (pixel_x, pixel_y) = self.project(point, zoom);
        // Clamped latitude keeps y inside the world, longitude is unbounded
        let column = (pixel_x / f64::from(self.tile_size)).floor();
        if column < 0.0 {
            return Err(WandError::InvalidTile {
                zoom,
                x: column as i64,
                y: (pixel_y / f64::from(self.tile_size)).floor().max(0.0) as i64,
            });
        }

        let (tile_x, tile_y, offset) = self.to_tile(pixel_x, pixel_y);
        let tile = TileIndex::new(zoom, tile_x, tile_y)?;
        Ok((tile, offset))
    }

    /// Geographic position of a tile-local pixel coordinate
    pub fn tile_pixel_to_geo(&self, tile: TileIndex, pixel_x: f64, pixel_y: f64) -> GeoPoint {
        let size = f64::from(self.tile_size);
        let global_x = f64::from(tile.x) * size + pixel_x;
        let global_y = f64::from(tile.y) * size + pixel_y;
        self.unproject(global_x, global_y, tile.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_project_origin_is_world_centre() {
        let projection = TileProjection::default();
        let (x, y) = projection.project(GeoPoint::new(0.0, 0.0), 0);
        assert!((x - 128.0).abs() < TOLERANCE);
        assert!((y - 128.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_project_corners() {
        let projection = TileProjection::default();
        let (x, y) = projection.project(GeoPoint::new(MAX_LATITUDE, -180.0), 1);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (x, y) = projection.project(GeoPoint::new(-MAX_LATITUDE, 180.0), 1);
        assert!((x - 512.0).abs() < 1e-6);
        assert!((y - 512.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let projection = TileProjection::default();

        for zoom in [0u8, 5, 12, 20] {
            for lat in [-85.0, -45.5, -0.001, 0.0, 23.7, 60.125, 85.0] {
                for lon in [-179.9, -90.0, 0.0, 12.3456, 121.5654, 179.9] {
                    let point = GeoPoint::new(lat, lon);
                    let (x, y) = projection.project(point, zoom);
                    let back = projection.unproject(x, y, zoom);
                    assert!(
                        (back.lat - lat).abs() < TOLERANCE && (back.lon - lon).abs() < TOLERANCE,
                        "Round trip of {point:?} at z{zoom} gave {back:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_to_tile_consistency() {
        for tile_size in [256u32, 512] {
            let projection = TileProjection::new(tile_size);
            for x in [0u32, 1, 255, 256, 257, 1023, 70_000, 268_435_455] {
                for y in [0u32, 17, 511, 512, 99_999] {
                    let (tile_x, tile_y, offset) = projection.to_tile(f64::from(x), f64::from(y));
                    assert!(offset.x < tile_size && offset.y < tile_size);
                    assert_eq!(u64::from(tile_x) * u64::from(tile_size) + u64::from(offset.x), u64::from(x));
                    assert_eq!(u64::from(tile_y) * u64::from(tile_size) + u64::from(offset.y), u64::from(y));
                }
            }
        }
    }

    #[test]
    fn test_to_tile_floors_fractional_pixels() {
        let projection = TileProjection::default();
        let (tile_x, tile_y, offset) = projection.to_tile(511.75, 256.2);
        assert_eq!((tile_x, tile_y), (1, 1));
        assert_eq!(offset, PixelOffset::new(255, 0));
    }

    #[test]
    fn test_locate_matches_project() {
        let projection = TileProjection::default();
        let point = GeoPoint::new(25.0330, 121.5654);
        let (tile, offset) = projection.locate(point, 20).expect("Point is inside the world");

        let (x, y) = projection.project(point, 20);
        assert_eq!(tile.zoom, 20);
        assert_eq!(u64::from(tile.x) * 256 + u64::from(offset.x), x.floor() as u64);
        assert_eq!(u64::from(tile.y) * 256 + u64::from(offset.y), y.floor() as u64);
    }

    #[test]
    fn test_locate_rejects_antimeridian_edge() {
        let projection = TileProjection::default();
        let result = projection.locate(GeoPoint::new(0.0, 180.0), 3);
        assert!(matches!(result, Err(WandError::InvalidTile { zoom: 3, x: 8, .. })));
    }

    #[test]
    fn test_locate_rejects_longitudes_west_of_the_world() {
        let projection = TileProjection::default();

        let result = projection.locate(GeoPoint::new(0.0, -181.0), 0);
        assert!(matches!(result, Err(WandError::InvalidTile { zoom: 0, x: -1, y: 0 })));

        let result = projection.locate(GeoPoint::new(25.0, -200.0), 20);
        assert!(matches!(result, Err(WandError::InvalidTile { zoom: 20, x, .. }) if x < 0));

        let result = projection.locate(GeoPoint::new(0.0, 181.0), 0);
        assert!(matches!(result, Err(WandError::InvalidTile { zoom: 0, x: 1, y: 0 })));
    }

    #[test]
    fn test_locate_west_edge_is_first_column() {
        let projection = TileProjection::default();
        let (tile, offset) = projection.locate(GeoPoint::new(0.0, -180.0), 4).expect("Edge is inside the world");
        assert_eq!((tile.x, offset.x), (0, 0));
    }

    #[test]
    fn test_tile_pixel_to_geo() {
        let projection = TileProjection::default();
        let tile = TileIndex::new(20, 876_543, 447_123).expect("Valid tile");
        let point = projection.tile_pixel_to_geo(tile, 10.0, 20.0);
        let expected = projection.unproject(876_543.0 * 256.0 + 10.0, 447_123.0 * 256.0 + 20.0, 20);
        assert_eq!(point, expected);
    }
}
