//! Puts the field overlay on a satellite base map.
//!
//! The map widget is passed in as a [`MapWidget`], so the same sequence of
//! calls drives the SVG renderer and any other implementation.

use log::{debug, info, warn};

use crate::config_params::{Bounds, LatLng, MapConfig, MAPBOX_SATELLITE};
use crate::error::Result;
use crate::layer::OverlayLayer;

/// Operations a map widget has to offer to display the fields.
pub trait MapWidget {
    /// Creates the map view inside the container named `container`.
    fn create_view(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<()>;
    /// Adds a tiled base layer; `url_template` uses `{z}`, `{x}` and `{y}`.
    fn add_tile_layer(&mut self, url_template: &str) -> Result<()>;
    fn add_overlay(&mut self, overlay: &OverlayLayer) -> Result<()>;
    /// Sets the viewport so that `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: Bounds) -> Result<()>;
    fn set_view(&mut self, center: LatLng, zoom: u8) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresenterOptions {
    pub container: String,
    pub basemap_url: String,
    /// Viewport used when the overlay has nothing to fit.
    pub default_center: LatLng,
    pub default_zoom: u8,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        PresenterOptions {
            container: String::from("map"),
            basemap_url: String::from(MAPBOX_SATELLITE),
            default_center: LatLng::default(),
            default_zoom: 2,
        }
    }
}

impl From<&MapConfig> for PresenterOptions {
    fn from(config: &MapConfig) -> Self {
        PresenterOptions {
            container: config.container.clone(),
            basemap_url: config.basemap.clone(),
            default_center: config.default_center,
            default_zoom: config.default_zoom,
        }
    }
}

/// Base layer url carrying the access token as a query parameter.
pub fn tile_url(basemap_url: &str, access_token: &str) -> String {
    let sep = if basemap_url.contains('?') { '&' } else { '?' };
    format!("{}{}access_token={}", basemap_url, sep, access_token)
}

/// Creates the view, adds the base layer then the overlay, and zooms to the overlay.
pub fn setup_map<W: MapWidget + ?Sized>(
    widget: &mut W,
    overlay: &OverlayLayer,
    access_token: &str,
    options: &PresenterOptions,
) -> Result<()> {
    // Temporary view, replaced once the overlay bounds are known.
    widget.create_view(&options.container, LatLng::new(0.0, 0.0), 0)?;
    debug!("Created map view in container \"{}\"", options.container);

    widget.add_tile_layer(&tile_url(&options.basemap_url, access_token))?;
    widget.add_overlay(overlay)?;
    debug!("Added overlay of {} fields", overlay.features().len());

    match overlay.bounds() {
        Some(bounds) => {
            info!(
                "Fitting view to [{}, {}] - [{}, {}]",
                bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
            );
            widget.fit_bounds(bounds)
        }
        None => {
            warn!("Overlay has no geometry to fit, using the default view");
            widget.set_view(options.default_center, options.default_zoom)
        }
    }
}
