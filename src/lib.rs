//! Render agricultural fields colored by NDVI on a satellite base map.
//!
//! An NDVI response is turned into a GeoJSON FeatureCollection
//! ([`collection::build_feature_collection`]), wrapped into an
//! [`layer::OverlayLayer`] and handed to a [`presenter::MapWidget`] by
//! [`presenter::setup_map`]. [`svg_map::SvgMap`] is the widget shipped with
//! the crate.

#[macro_use]
mod macros;

pub mod classification;
pub mod collection;
pub mod config_params;
pub mod error;
pub mod layer;
pub mod presenter;
pub mod projection;
pub mod svg_map;

pub use collection::{build_feature_collection, FieldResult, NdviResponse};
pub use config_params::{Bounds, LatLng, LayerStyle, MapConfig};
pub use error::{Error, Result};
pub use layer::OverlayLayer;
pub use presenter::{setup_map, tile_url, MapWidget, PresenterOptions};
pub use svg_map::SvgMap;
