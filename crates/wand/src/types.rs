use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use geo_types::{Coord, LineString, Point, Polygon as GeoPolygon};
use crate::error::{Result, WandError};

/// Decoded tile raster as handed from a tile source to the extractor
pub type RasterImage = image::DynamicImage;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One tile of a slippy-map pyramid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TileIndex {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    /// Create a tile index, rejecting coordinates outside the 2^zoom grid
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self> {
        let tiles = Self::tiles_per_axis(zoom);
        if u64::from(x) >= tiles || u64::from(y) >= tiles {
            return Err(WandError::InvalidTile { zoom, x: i64::from(x), y: i64::from(y) });
        }
        Ok(Self { zoom, x, y })
    }

    /// Number of tiles along one axis at the given zoom
    pub fn tiles_per_axis(zoom: u8) -> u64 {
        1u64.checked_shl(u32::from(zoom)).unwrap_or(u64::MAX)
    }
}

/// Pixel position local to a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PixelOffset {
    pub x: u32,
    pub y: u32,
}

impl PixelOffset {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Closed ring of tile pixels in traversal order. The last point connects
/// back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<PixelOffset>,
}

impl Contour {
    pub fn new(points: Vec<PixelOffset>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A ring needs at least three distinct points to enclose anything
    pub fn is_valid(&self) -> bool {
        let mut distinct = self.points.clone();
        distinct.sort_by_key(|p| (p.y, p.x));
        distinct.dedup();
        distinct.len() >= 3
    }

    /// Convert to geo-types Polygon in pixel space
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|p| Coord { x: f64::from(p.x), y: f64::from(p.y) })
            .collect();

        GeoPolygon::new(LineString::new(coords), vec![])
    }

    /// Enclosed area in square pixels, measured through pixel centres
    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Whether the pixel lies inside the ring or on it
    pub fn contains(&self, pixel: PixelOffset) -> bool {
        use geo::Intersects;
        let point = Point::new(f64::from(pixel.x), f64::from(pixel.y));
        self.to_geo_polygon().intersects(&point)
    }

    /// Get the inclusive bounding box of the ring as (min, max)
    pub fn bounding_box(&self) -> Option<(PixelOffset, PixelOffset)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some((min, max))
    }
}

/// Geographic ring handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<GeoPoint>,
}

impl Polygon {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert to a geo-types Polygon with x = longitude, y = latitude
    pub fn to_geo_polygon(&self) -> GeoPolygon<f64> {
        let coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|p| Coord { x: p.lon, y: p.lat })
            .collect();

        GeoPolygon::new(LineString::new(coords), vec![])
    }

    /// Area on the WGS84 ellipsoid in square metres
    pub fn geodesic_area(&self) -> f64 {
        use geo::GeodesicArea;
        self.to_geo_polygon().geodesic_area_unsigned()
    }
}
