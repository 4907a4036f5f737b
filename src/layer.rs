use geojson::{Feature, FeatureCollection, Geometry, Position, Value};
use log::warn;

use crate::classification::{get_nb_class, Classif};
use crate::config_params::{Bounds, LatLng, LayerStyle};
use crate::error::Result;

/// The field polygons, ready to be added on top of a base layer.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    pub collection: FeatureCollection,
    pub style: LayerStyle,
}

impl OverlayLayer {
    pub fn new(collection: FeatureCollection, style: LayerStyle) -> Self {
        OverlayLayer { collection, style }
    }

    pub fn features(&self) -> &[Feature] {
        &self.collection.features
    }

    /// Extent of every position of the layer, `None` if it has none.
    pub fn bounds(&self) -> Option<Bounds> {
        get_extent(&self.collection.features)
    }

    /// NDVI value of a single feature.
    pub fn ndvi_value(&self, feature: &Feature) -> Option<f64> {
        feature
            .properties
            .as_ref()
            .and_then(|prop| prop.get(&self.style.field))
            .and_then(|v| v.as_f64())
    }

    pub fn ndvi_values(&self) -> Vec<f64> {
        get_values(&self.collection.features, &self.style.field)
    }

    /// Classification of the NDVI values, `None` when no feature carries one.
    pub fn classify(&self) -> Result<Option<Classif>> {
        let values = self.ndvi_values();
        if values.is_empty() {
            return Ok(None);
        }
        let nb_class = self
            .style
            .nb_class
            .unwrap_or_else(|| get_nb_class(values.len()));
        Classif::new(nb_class, values, self.style.classification).map(Some)
    }
}

pub fn get_values(features: &[Feature], field_name: &str) -> Vec<f64> {
    let mut res = Vec::new();
    for feature in features {
        match feature
            .properties
            .as_ref()
            .and_then(|prop| prop.get(field_name))
            .and_then(|v| v.as_f64())
        {
            Some(v) => res.push(v),
            None => warn!(
                "Field {} has no numeric \"{}\" value",
                feature_label(feature),
                field_name
            ),
        }
    }
    res
}

/// The `id` property of a feature, for display.
pub fn feature_label(feature: &Feature) -> String {
    match feature.properties.as_ref().and_then(|prop| prop.get("id")) {
        Some(geojson::JsonValue::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::from("?"),
    }
}

pub fn get_extent(features: &[Feature]) -> Option<Bounds> {
    let mut extent: Option<Bounds> = None;
    for feature in features {
        if let Some(ref geom) = feature.geometry {
            extend_geometry(geom, &mut extent);
        }
    }
    extent
}

fn extend_geometry(geom: &Geometry, extent: &mut Option<Bounds>) {
    fn verif(point: &Position, extent: &mut Option<Bounds>) {
        if point.len() < 2 {
            return;
        }
        let p = LatLng::new(point[1], point[0]);
        match extent {
            Some(bounds) => bounds.extend(p),
            None => *extent = Some(Bounds::from_point(p)),
        }
    }
    match geom.value {
        Value::Point(ref point) => verif(point, extent),
        Value::MultiPoint(ref points) | Value::LineString(ref points) => {
            for point in points {
                verif(point, extent);
            }
        }
        Value::MultiLineString(ref rings) | Value::Polygon(ref rings) => {
            for ring in rings {
                for point in ring {
                    verif(point, extent);
                }
            }
        }
        Value::MultiPolygon(ref polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    for point in ring {
                        verif(point, extent);
                    }
                }
            }
        }
        Value::GeometryCollection(ref geometries) => {
            for g in geometries {
                extend_geometry(g, extent);
            }
        }
    }
}
