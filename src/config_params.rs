use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::classification::Classification;
use crate::error::{Error, Result};

pub const MAPBOX_SATELLITE: &str = "http://api.tiles.mapbox.com/v4/mapbox.satellite/{z}/{x}/{y}.png";

/// A geographic position, in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// Rectangular geographic extent, built up point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn from_point(point: LatLng) -> Self {
        Bounds {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }
}

/// How the field polygons are drawn.
#[derive(Debug, Clone)]
pub struct LayerStyle {
    pub field: String,
    pub classification: Classification,
    pub nb_class: Option<u32>,
    pub fill_opacity: String,
    pub stroke: String,
    pub stroke_opacity: String,
    pub stroke_width: String,
    pub radius: String,
    pub no_data: String,
}

impl LayerStyle {
    pub fn from_config(c: &toml::Table) -> Result<Self> {
        let classification = match c.get("classification").and_then(|v| v.as_str()) {
            Some(name) => name
                .parse::<Classification>()
                .map_err(|e| Error::Config(e.to_string()))?,
            None => Classification::Quantiles,
        };
        let nb_class = match c.get("nb_class") {
            Some(_) => Some(expect_integer!(c.get("nb_class"), "style.nb_class")),
            None => None,
        };
        Ok(LayerStyle {
            field: string_or_default!(c.get("field"), "ndvi"),
            classification,
            nb_class,
            fill_opacity: string_or_default!(c.get("fill-opacity"), "0.8"),
            stroke: string_or_default!(c.get("stroke"), "black"),
            stroke_opacity: string_or_default!(c.get("stroke-opacity"), "1"),
            stroke_width: string_or_default!(c.get("stroke-width"), "0.7"),
            radius: string_or_default!(c.get("radius"), "4"),
            no_data: string_or_default!(c.get("no-data"), "#cccccc"),
        })
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        LayerStyle {
            field: String::from("ndvi"),
            classification: Classification::Quantiles,
            nb_class: None,
            fill_opacity: String::from("0.8"),
            stroke: String::from("black"),
            stroke_opacity: String::from("1"),
            stroke_width: String::from("0.7"),
            radius: String::from("4"),
            no_data: String::from("#cccccc"),
        }
    }
}

/// A text element (title or source) placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub content: String,
    pub x: i32,
    pub y: i32,
    pub anchor: &'static str,
    pub font_size: String,
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub container: String,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    pub basemap: String,
    pub access_token: Option<String>,
    pub max_zoom: u8,
    pub default_center: LatLng,
    pub default_zoom: u8,
    pub background: Option<String>,
    pub style: LayerStyle,
    pub title: Option<TextBlock>,
    pub source: Option<TextBlock>,
}

impl MapConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        raw.parse()
    }

    fn from_table(config: &toml::Table) -> Result<Self> {
        let map = match config.get("map").and_then(|v| v.as_table()) {
            Some(map) => map,
            None => return Err(Error::Config("missing [map] section".into())),
        };
        let width = expect_integer!(map.get("width"), "map.width");
        let height = expect_integer!(map.get("height"), "map.height");
        if width == 0 || height == 0 {
            return Err(Error::Config("map dimensions must be non-zero".into()));
        }
        let output = PathBuf::from(expect_str!(map.get("output"), "map.output"));
        let max_zoom = match map.get("max_zoom") {
            Some(_) => expect_integer!(map.get("max_zoom"), "map.max_zoom").min(24) as u8,
            None => 18,
        };
        let default_zoom = match map.get("default_zoom") {
            Some(_) => expect_integer!(map.get("default_zoom"), "map.default_zoom").min(max_zoom as u32) as u8,
            None => 2,
        };
        let default_center = match map.get("default_center").and_then(|v| v.as_array()) {
            Some(pos) if pos.len() == 2 => LatLng::new(
                expect_float!(pos.get(0), "map.default_center"),
                expect_float!(pos.get(1), "map.default_center"),
            ),
            Some(_) => {
                return Err(Error::Config(
                    "map.default_center must be a [lat, lng] pair".into(),
                ))
            }
            None => LatLng::default(),
        };
        let style = match config.get("style").and_then(|v| v.as_table()) {
            Some(table) => LayerStyle::from_config(table)?,
            None => LayerStyle::default(),
        };
        let title = match config.get("title").and_then(|v| v.as_table()) {
            Some(table) => Some(title_block(table)?),
            None => None,
        };
        let source = match config.get("source").and_then(|v| v.as_table()) {
            Some(table) => Some(source_block(table, width, height)?),
            None => None,
        };
        Ok(MapConfig {
            container: string_or_default!(map.get("container"), "map"),
            width,
            height,
            output,
            basemap: string_or_default!(map.get("basemap"), MAPBOX_SATELLITE),
            access_token: map
                .get("access_token")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            max_zoom,
            default_center,
            default_zoom,
            background: map
                .get("background")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            style,
            title,
            source,
        })
    }
}

impl FromStr for MapConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let table = s.parse::<toml::Table>()?;
        MapConfig::from_table(&table)
    }
}

fn title_block(options: &toml::Table) -> Result<TextBlock> {
    let content = expect_str!(options.get("content"), "title.content");
    let position = match options.get("position").and_then(|v| v.as_array()) {
        Some(pos) if pos.len() == 2 => pos,
        _ => return Err(Error::Config("title.position must be an [x, y] pair".into())),
    };
    Ok(TextBlock {
        content,
        x: expect_integer!(position.get(0), "title.position") as i32,
        y: expect_integer!(position.get(1), "title.position") as i32,
        anchor: "middle",
        font_size: string_or_default!(options.get("font-size"), "22"),
    })
}

fn source_block(options: &toml::Table, width: u32, height: u32) -> Result<TextBlock> {
    let content = expect_str!(options.get("content"), "source.content");
    // x, y and text-anchor
    let (x, y, anchor) = match options.get("position") {
        Some(toml::Value::Array(pos)) if pos.len() == 2 => (
            expect_integer!(pos.get(0), "source.position") as i32,
            expect_integer!(pos.get(1), "source.position") as i32,
            "middle",
        ),
        Some(toml::Value::String(horiz_pos)) => {
            let bottom = (height - height / 25) as i32;
            match horiz_pos.as_str() {
                "right" => ((width - width / 25) as i32, bottom, "end"),
                "center" => ((width / 2) as i32, bottom, "middle"),
                _ => ((width / 25) as i32, bottom, "start"),
            }
        }
        _ => (
            (width - width / 15) as i32,
            (height - height / 15) as i32,
            "end",
        ),
    };
    Ok(TextBlock {
        content,
        x,
        y,
        anchor,
        font_size: string_or_default!(options.get("font-size"), "14"),
    })
}
