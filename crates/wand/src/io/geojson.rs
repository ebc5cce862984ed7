use geojson::{Feature, FeatureCollection, Geometry, Value};
use crate::{
    controller::Extraction,
    error::Result,
    types::Polygon,
};

impl Polygon {
    /// Closed GeoJSON ring in `[lon, lat]` order
    pub fn to_geojson_ring(&self) -> Vec<Vec<f64>> {
        let mut ring: Vec<Vec<f64>> = self.points.iter().map(|p| vec![p.lon, p.lat]).collect();
        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                ring.push(first.clone());
            }
        }
        ring
    }

    pub fn to_geojson_geometry(&self) -> Geometry {
        Geometry::new(Value::Polygon(vec![self.to_geojson_ring()]))
    }
}

fn number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Extraction {
    pub fn to_geojson(&self) -> Feature {
        let mut properties = serde_json::Map::new();
        properties.insert("point_count".to_string(), serde_json::Value::from(self.polygon.len()));
        properties.insert("area_sqm".to_string(), number(self.polygon.geodesic_area()));
        properties.insert("zoom".to_string(), serde_json::Value::from(self.tile.zoom));
        properties.insert(
            "tile".to_string(),
            serde_json::json!({ "x": self.tile.x, "y": self.tile.y }),
        );
        properties.insert(
            "seed".to_string(),
            serde_json::json!({ "x": self.seed.x, "y": self.seed.y }),
        );

        Feature {
            bbox: None,
            geometry: Some(self.polygon.to_geojson_geometry()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let collection = FeatureCollection {
            bbox: None,
            features: vec![self.to_geojson()],
            foreign_members: None,
        };
        Ok(serde_json::to_string_pretty(&collection)?)
    }

    /// Save GeoJSON to file
    pub fn save_geojson(&self, path: &str) -> Result<()> {
        let geojson_string = self.to_geojson_string()?;
        std::fs::write(path, geojson_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoPoint, PixelOffset, TileIndex};

    fn extraction() -> Extraction {
        Extraction {
            polygon: Polygon {
                points: vec![
                    GeoPoint::new(25.0, 121.0),
                    GeoPoint::new(25.0, 121.001),
                    GeoPoint::new(24.999, 121.001),
                ],
            },
            tile: TileIndex::new(20, 876_000, 447_000).expect("Valid tile"),
            seed: PixelOffset::new(100, 100),
        }
    }

    #[test]
    fn test_ring_is_closed_lon_lat() {
        let ring = extraction().polygon.to_geojson_ring();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], vec![121.0, 25.0]);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_feature_properties() {
        let feature = extraction().to_geojson();
        let properties = feature.properties.expect("Properties are set");
        assert_eq!(properties["point_count"], 3);
        assert_eq!(properties["zoom"], 20);
        assert_eq!(properties["tile"]["x"], 876_000);
        assert!(properties["area_sqm"].as_f64().expect("Numeric area") > 0.0);
    }

    #[test]
    fn test_geojson_string_parses_back() {
        let text = extraction().to_geojson_string().expect("Serializes");
        let parsed: FeatureCollection = text.parse().expect("Valid GeoJSON");
        assert_eq!(parsed.features.len(), 1);
    }
}
