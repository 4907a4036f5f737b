use std::io::Read;
use std::str::FromStr;

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a surveyed field, kept exactly as received (number or string).
pub type FieldId = JsonValue;

/// One entry of the NDVI response: a field id and its GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    pub id: FieldId,
    pub value: Feature,
}

/// The pre-fetched NDVI response. Only `results` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviResponse {
    pub results: Vec<FieldResult>,
}

impl NdviResponse {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Consumes the response, moving each feature into the collection.
    pub fn into_feature_collection(self) -> FeatureCollection {
        let features = self
            .results
            .into_iter()
            .map(|field| with_field_id(field.value, field.id))
            .collect();
        collection(features)
    }
}

impl FromStr for NdviResponse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Builds a FeatureCollection with one feature per field result, in order.
///
/// Each feature is a copy of the result's `value` whose `properties.id` is
/// set to the result's `id`; the response is left untouched.
pub fn build_feature_collection(response: &NdviResponse) -> FeatureCollection {
    let features = response
        .results
        .iter()
        .map(|field| with_field_id(field.value.clone(), field.id.clone()))
        .collect();
    collection(features)
}

fn with_field_id(mut feature: Feature, id: FieldId) -> Feature {
    feature
        .properties
        .get_or_insert_with(JsonObject::new)
        .insert(String::from("id"), id);
    feature
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    debug!("Built a feature collection of {} fields", features.len());
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};
    use serde_json::json;

    fn sample() -> NdviResponse {
        serde_json::from_value(json!({
            "results": [
                {
                    "id": 12,
                    "value": {
                        "type": "Feature",
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                        },
                        "properties": { "ndvi": 0.61, "id": "stale" }
                    }
                },
                {
                    "id": "north-paddock",
                    "value": {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [3.0, 4.0] },
                        "properties": { "ndvi": 0.2 }
                    }
                }
            ],
            "status": "ok"
        }))
        .unwrap()
    }

    #[test]
    fn single_point_field() {
        let response: NdviResponse = r#"{ "results": [{ "id": 7, "value": {
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [1, 2] },
            "properties": {} } }] }"#
            .parse()
            .unwrap();
        let fc = build_feature_collection(&response);
        assert_eq!(fc.features.len(), 1);
        let feature = &fc.features[0];
        assert_eq!(
            feature.geometry,
            Some(Geometry::new(Value::Point(vec![1.0, 2.0])))
        );
        let mut expected = JsonObject::new();
        expected.insert("id".into(), json!(7));
        assert_eq!(feature.properties, Some(expected));

        let as_json = serde_json::to_value(&fc).unwrap();
        assert_eq!(as_json["type"], "FeatureCollection");
        assert_eq!(as_json["features"][0]["type"], "Feature");
        assert_eq!(as_json["features"][0]["properties"], json!({ "id": 7 }));
    }

    #[test]
    fn empty_results() {
        let response: NdviResponse = r#"{ "results": [] }"#.parse().unwrap();
        let fc = build_feature_collection(&response);
        assert!(fc.features.is_empty());
        let as_json = serde_json::to_value(&fc).unwrap();
        assert_eq!(as_json["type"], "FeatureCollection");
        assert_eq!(as_json["features"], json!([]));
    }

    #[test]
    fn ids_follow_results_order() {
        let response = sample();
        let fc = build_feature_collection(&response);
        assert_eq!(fc.features.len(), response.results.len());
        for (feature, field) in fc.features.iter().zip(&response.results) {
            let props = feature.properties.as_ref().unwrap();
            assert_eq!(props["id"], field.id);
            assert_eq!(feature.geometry, field.value.geometry);
        }
        // other properties survive
        assert_eq!(fc.features[0].properties.as_ref().unwrap()["ndvi"], json!(0.61));
    }

    #[test]
    fn input_is_not_mutated() {
        let response = sample();
        let before = response.clone();
        let _ = build_feature_collection(&response);
        assert_eq!(response, before);
        assert_eq!(
            response.results[0].value.properties.as_ref().unwrap()["id"],
            json!("stale")
        );
    }

    #[test]
    fn building_is_idempotent() {
        let response = sample();
        assert_eq!(
            build_feature_collection(&response),
            build_feature_collection(&response)
        );
        assert_eq!(
            response.clone().into_feature_collection(),
            build_feature_collection(&response)
        );
    }

    #[test]
    fn missing_property_bag_is_created() {
        let response: NdviResponse = serde_json::from_value(json!({
            "results": [{ "id": 1, "value": {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
                "properties": null
            }}]
        }))
        .unwrap();
        let fc = build_feature_collection(&response);
        assert_eq!(fc.features[0].properties.as_ref().unwrap()["id"], json!(1));
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = r#"{ "results": [{ "id": 1 }] }"#.parse::<NdviResponse>().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(r#"{ "fields": [] }"#.parse::<NdviResponse>().is_err());
    }
}
