use geojson::{Feature, FeatureCollection, Geometry, Value};

use crate::{error::Result, types::AnalyzedScene};
use sketch_kit_common::{BoundingBox, Point};

fn json_number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Closed exterior ring from an element contour
fn contour_ring(contour: &[Point]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = contour.iter().map(|p| vec![p.x, p.y]).collect();
    if ring.first() != ring.last() {
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }
    }
    ring
}

/// Rectangular exterior ring from a bounding box, wound counter-clockwise
fn bbox_ring(bbox: &BoundingBox) -> Vec<Vec<f64>> {
    vec![
        vec![bbox.min_x, bbox.min_y],
        vec![bbox.max_x, bbox.min_y],
        vec![bbox.max_x, bbox.max_y],
        vec![bbox.min_x, bbox.max_y],
        vec![bbox.min_x, bbox.min_y],
    ]
}

impl AnalyzedScene {
    /// Export the scene as a GeoJSON `FeatureCollection`, one polygon
    /// feature per element. Elements with a contour export it as the
    /// exterior ring; the rest fall back to their bounding box. All
    /// coordinates are normalized canvas units.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::new();

        for element in &self.elements {
            let ring = match &element.contour {
                Some(contour) if contour.len() >= 3 => contour_ring(contour),
                _ => bbox_ring(&element.bounding_box),
            };
            let geometry = Geometry::new(Value::Polygon(vec![ring]));

            let mut properties = serde_json::Map::new();
            properties.insert(
                "name".to_string(),
                serde_json::Value::String(element.name.clone()),
            );
            properties.insert("confidence".to_string(), json_number(element.confidence));
            properties.insert(
                "source".to_string(),
                serde_json::Value::String(element.source.to_string()),
            );
            properties.insert(
                "stroke_ids".to_string(),
                serde_json::Value::Array(
                    element
                        .stroke_ids
                        .iter()
                        .map(|id| serde_json::Value::String(id.clone()))
                        .collect(),
                ),
            );
            properties.insert(
                "parent_id".to_string(),
                element
                    .parent_id
                    .as_ref()
                    .map(|id| serde_json::Value::String(id.clone()))
                    .unwrap_or(serde_json::Value::Null),
            );
            properties.insert(
                "children".to_string(),
                serde_json::Value::Array(
                    element
                        .children
                        .iter()
                        .map(|id| serde_json::Value::String(id.clone()))
                        .collect(),
                ),
            );
            properties.insert(
                "is_container".to_string(),
                serde_json::Value::Bool(element.is_container),
            );
            properties.insert(
                "is_child".to_string(),
                serde_json::Value::Bool(element.is_child),
            );

            features.push(Feature {
                bbox: None,
                geometry: Some(geometry),
                id: Some(geojson::feature::Id::String(element.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert("canvas_width".to_string(), json_number(self.canvas.width));
        foreign_members.insert("canvas_height".to_string(), json_number(self.canvas.height));
        foreign_members.insert(
            "element_count".to_string(),
            serde_json::Value::Number(serde_json::Number::from(self.elements.len())),
        );

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    /// Export to GeoJSON and serialize to a pretty JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
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
    use crate::types::{AnalyzedScene, DetectedElement, DetectionSource};
    use sketch_kit_common::{BoundingBox, CanvasSize, Point};

    fn scene() -> AnalyzedScene {
        let bbox = BoundingBox::from_corners(0.2, 0.2, 0.6, 0.6).unwrap();
        let mut boxed = DetectedElement::new("e0", "dog", 0.9, bbox, DetectionSource::Hybrid);
        boxed.contour = Some(vec![
            Point::new(0.2, 0.2),
            Point::new(0.6, 0.2),
            Point::new(0.4, 0.6),
        ]);
        let plain = DetectedElement::new(
            "e1",
            "cat",
            0.5,
            BoundingBox::from_corners(0.0, 0.0, 0.1, 0.1).unwrap(),
            DetectionSource::VisionApi,
        );
        AnalyzedScene {
            elements: vec![boxed, plain],
            canvas: CanvasSize::new(800.0, 600.0).unwrap(),
        }
    }

    #[test]
    fn test_one_feature_per_element_with_metadata() {
        let collection = scene().to_geojson().unwrap();
        assert_eq!(collection.features.len(), 2);
        let members = collection.foreign_members.unwrap();
        assert_eq!(members["canvas_width"], 800.0);
        assert_eq!(members["element_count"], 2);
    }

    #[test]
    fn test_contour_ring_is_closed() {
        let collection = scene().to_geojson().unwrap();
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                let ring = &rings[0];
                assert_eq!(ring.len(), 4);
                assert_eq!(ring.first(), ring.last());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_boxed_fallback_ring_covers_bbox() {
        let collection = scene().to_geojson().unwrap();
        let geometry = collection.features[1].geometry.as_ref().unwrap();
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 5);
                assert_eq!(rings[0][0], vec![0.0, 0.0]);
                assert_eq!(rings[0][2], vec![0.1, 0.1]);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trips_through_string() {
        let text = scene().to_geojson_string().unwrap();
        let parsed: geojson::GeoJson = text.parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("expected feature collection, got {other:?}"),
        }
    }
}
