use crate::{
    projection::TileProjection,
    types::{Contour, GeoPoint, Polygon, TileIndex},
};

/// Reproject a traced contour of `tile` into a geographic ring, keeping the
/// traversal order. Rings with fewer than three points are not regions.
pub fn build_polygon(contour: &Contour, tile: TileIndex, projection: &TileProjection) -> Option<Polygon> {
    if contour.len() < 3 {
        return None;
    }

    let points: Vec<GeoPoint> = contour.points
        .iter()
        .map(|p| projection.tile_pixel_to_geo(tile, f64::from(p.x), f64::from(p.y)))
        .collect();

    Some(Polygon { points })
}
