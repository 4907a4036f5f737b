use std::path::Path as FsPath;

use geojson::{Feature, Geometry, Position, Value};
use log::{debug, warn};
use quick_xml::escape::escape;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Image, Path, Rectangle as Rect, Text, Title};
use svg::node::Text as NodeText;
use svg::Document;

use crate::classification::{ndvi_ramp, Classif};
use crate::config_params::{Bounds, LatLng, LayerStyle, MapConfig, TextBlock};
use crate::error::{Error, Result};
use crate::layer::{feature_label, OverlayLayer};
use crate::presenter::MapWidget;
use crate::projection::{self, fill_template, fit_center, fit_zoom, tile_range, TILE_SIZE};

#[derive(Debug, Clone, PartialEq)]
struct View {
    container: String,
    center: LatLng,
    zoom: u8,
}

/// A map widget drawing its view into an SVG document.
///
/// Base layer tiles are referenced by url through `<image>` elements,
/// the overlay is drawn as paths colored by NDVI class.
#[derive(Debug, Clone)]
pub struct SvgMap {
    width: u32,
    height: u32,
    max_zoom: u8,
    background: Option<String>,
    title: Option<TextBlock>,
    source: Option<TextBlock>,
    view: Option<View>,
    tile_layers: Vec<String>,
    overlays: Vec<OverlayLayer>,
}

impl SvgMap {
    pub fn new(width: u32, height: u32) -> Self {
        SvgMap {
            width,
            height,
            max_zoom: 18,
            background: None,
            title: None,
            source: None,
            view: None,
            tile_layers: Vec::new(),
            overlays: Vec::new(),
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        let mut map = SvgMap::new(config.width, config.height).with_max_zoom(config.max_zoom);
        map.background = config.background.clone();
        map.title = config.title.clone();
        map.source = config.source.clone();
        map
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn center(&self) -> Option<LatLng> {
        self.view.as_ref().map(|v| v.center)
    }

    pub fn zoom(&self) -> Option<u8> {
        self.view.as_ref().map(|v| v.zoom)
    }

    pub fn tile_layers(&self) -> &[String] {
        &self.tile_layers
    }

    fn view_mut(&mut self) -> Result<&mut View> {
        self.view.as_mut().ok_or(Error::NoView)
    }

    fn to_px(&self, view: &View, point: &Position) -> (f32, f32) {
        let (x, y) = projection::to_viewport(
            LatLng::new(point[1], point[0]),
            view.center,
            view.zoom,
            self.width,
            self.height,
        );
        (x as f32, y as f32)
    }

    pub fn render(&self) -> Result<Document> {
        let view = self.view.as_ref().ok_or(Error::NoView)?;
        let mut document = Document::new()
            .set("x", "0")
            .set("y", "0")
            .set("width", format!("{}", self.width))
            .set("height", format!("{}", self.height))
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));

        if let Some(ref bg_color) = self.background {
            document = document.add(
                Rect::new()
                    .set("fill", xml(bg_color))
                    .set("width", "100%")
                    .set("height", "100%"),
            );
        }

        if !self.tile_layers.is_empty() {
            let tiles = tile_range(view.center, view.zoom, self.width, self.height);
            let mut basemap = Group::new().set("id", "basemap");
            for template in &self.tile_layers {
                for tile in &tiles {
                    basemap = basemap.add(
                        Image::new()
                            .set("href", xml(&fill_template(template, tile.z, tile.x, tile.y)))
                            .set("x", tile.left)
                            .set("y", tile.top)
                            .set("width", TILE_SIZE)
                            .set("height", TILE_SIZE),
                    );
                }
            }
            document = document.add(basemap);
        }

        let mut fields = Group::new().set("id", xml(&view.container));
        for overlay in &self.overlays {
            let classif = overlay.classify()?;
            let ramp = classif.as_ref().map(|c| ndvi_ramp(c.nb_class() as u32));
            for feature in overlay.features() {
                let value = overlay.ndvi_value(feature);
                let fill = match (value, &classif, ramp) {
                    (Some(v), Some(c), Some(ramp)) => fill_color(v, c, ramp, &overlay.style),
                    _ => overlay.style.no_data.clone(),
                };
                if let Some(group) = self.draw_feature(view, feature, value, &fill, &overlay.style) {
                    fields = fields.add(group);
                }
            }
        }
        document = document.add(fields);

        for (id, block) in [("title", &self.title), ("source", &self.source)] {
            if let Some(block) = block {
                document = document.add(
                    Text::new()
                        .set("id", id)
                        .set("font-size", xml(&block.font_size))
                        .set("x", block.x)
                        .set("y", block.y)
                        .set("text-anchor", block.anchor)
                        .add(NodeText::new(xml(&block.content))),
                );
            }
        }
        Ok(document)
    }

    pub fn save<P: AsRef<FsPath>>(&self, path: P) -> Result<()> {
        let document = self.render()?;
        svg::save(path, &document)?;
        Ok(())
    }

    fn draw_feature(
        &self,
        view: &View,
        feature: &Feature,
        value: Option<f64>,
        fill: &str,
        style: &LayerStyle,
    ) -> Option<Group> {
        let label = feature_label(feature);
        let geom = match feature.geometry {
            Some(ref geom) => geom,
            None => {
                warn!("Field {} has no geometry, skipping it", label);
                return None;
            }
        };
        let annotation = match value {
            Some(v) => format!("Field {}: NDVI {:.3}", label, v),
            None => format!("Field {}: no NDVI value", label),
        };
        let group = Group::new()
            .set("class", "field")
            .set("data-id", xml(&label))
            .add(Title::new().add(NodeText::new(xml(&annotation))));
        Some(self.draw_geometry(view, geom, fill, style, group))
    }

    fn draw_geometry(&self, view: &View, geom: &Geometry, fill: &str, style: &LayerStyle, mut group: Group) -> Group {
        match geom.value {
            Value::Point(ref point) => group = group.add(self.draw_point(view, point, fill, style)),
            Value::MultiPoint(ref points) => {
                for point in points {
                    group = group.add(self.draw_point(view, point, fill, style));
                }
            }
            Value::LineString(ref positions) => {
                let data = self.draw_path(view, std::slice::from_ref(positions), false);
                group = group.add(stroked(Path::new().set("fill", "none"), style).set("d", data));
            }
            Value::MultiLineString(ref lines) => {
                let data = self.draw_path(view, lines, false);
                group = group.add(stroked(Path::new().set("fill", "none"), style).set("d", data));
            }
            Value::Polygon(ref rings) => {
                group = group.add(self.filled_path(self.draw_path(view, rings, true), fill, style));
            }
            Value::MultiPolygon(ref polys) => {
                let rings: Vec<Vec<Position>> = polys.iter().flat_map(|p| p.iter().cloned()).collect();
                group = group.add(self.filled_path(self.draw_path(view, &rings, true), fill, style));
            }
            Value::GeometryCollection(ref geometries) => {
                for g in geometries {
                    group = self.draw_geometry(view, g, fill, style, group);
                }
            }
        }
        group
    }

    fn filled_path(&self, data: Data, fill: &str, style: &LayerStyle) -> Path {
        stroked(Path::new(), style)
            .set("fill", xml(fill))
            .set("fill-opacity", xml(&style.fill_opacity))
            .set("fill-rule", "evenodd")
            .set("d", data)
    }

    fn draw_point(&self, view: &View, point: &Position, fill: &str, style: &LayerStyle) -> Circle {
        let (cx, cy) = self.to_px(view, point);
        Circle::new()
            .set("cx", cx)
            .set("cy", cy)
            .set("r", xml(&style.radius))
            .set("fill", xml(fill))
    }

    fn draw_path(&self, view: &View, rings: &[Vec<Position>], close: bool) -> Data {
        let mut data = Data::new();
        for ring in rings {
            let mut iter = ring.iter();
            let first = match iter.next() {
                Some(first) => first,
                None => continue,
            };
            data = data.move_to(self.to_px(view, first));
            for point in iter {
                data = data.line_to(self.to_px(view, point));
            }
            if close {
                data = data.close();
            }
        }
        data
    }
}

fn stroked(path: Path, style: &LayerStyle) -> Path {
    path.set("stroke", xml(&style.stroke))
        .set("stroke-width", xml(&style.stroke_width))
        .set("stroke-opacity", xml(&style.stroke_opacity))
}

// The svg crate writes attribute values and text nodes as given.
fn xml(raw: &str) -> String {
    escape(raw).into_owned()
}

fn fill_color(value: f64, classif: &Classif, ramp: &[&str], style: &LayerStyle) -> String {
    match classif.get_class_index(value) {
        Some(idx) => ramp[idx.min(ramp.len() - 1)].to_string(),
        None => style.no_data.clone(),
    }
}

impl MapWidget for SvgMap {
    fn create_view(&mut self, container: &str, center: LatLng, zoom: u8) -> Result<()> {
        if container.is_empty() {
            return Err(Error::MissingContainer);
        }
        if self.view.is_some() {
            return Err(Error::ViewExists);
        }
        self.view = Some(View {
            container: container.to_string(),
            center,
            zoom: zoom.min(self.max_zoom),
        });
        Ok(())
    }

    fn add_tile_layer(&mut self, url_template: &str) -> Result<()> {
        self.view_mut()?;
        self.tile_layers.push(url_template.to_string());
        Ok(())
    }

    fn add_overlay(&mut self, overlay: &OverlayLayer) -> Result<()> {
        self.view_mut()?;
        self.overlays.push(overlay.clone());
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Bounds) -> Result<()> {
        let zoom = fit_zoom(&bounds, self.width, self.height, self.max_zoom);
        let view = self.view_mut()?;
        view.center = fit_center(&bounds);
        view.zoom = zoom;
        debug!("View set to zoom {} around {:?}", view.zoom, view.center);
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) -> Result<()> {
        let max_zoom = self.max_zoom;
        let view = self.view_mut()?;
        view.center = center;
        view.zoom = zoom.min(max_zoom);
        Ok(())
    }
}
