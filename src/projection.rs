//! Spherical Web Mercator, as used by slippy-map tile servers.
//!
//! Projected coordinates are normalized to `[0, 1]`: `x` grows eastward from
//! the antimeridian, `y` grows southward from the top of the world.

use std::f64::consts::PI;

use crate::config_params::{Bounds, LatLng};

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

pub fn project(point: LatLng) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

pub fn unproject(x: f64, y: f64) -> LatLng {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    LatLng { lat, lng }
}

/// Size of the whole world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Position of `point` in pixels, relative to the top-left corner of a
/// `width`x`height` viewport centered on `center`.
pub fn to_viewport(point: LatLng, center: LatLng, zoom: u8, width: u32, height: u32) -> (f64, f64) {
    let scale = world_size(zoom);
    let (px, py) = project(point);
    let (cx, cy) = project(center);
    (
        (px - cx) * scale + width as f64 / 2.0,
        (py - cy) * scale + height as f64 / 2.0,
    )
}

/// A tile to draw, with the pixel offset of its top-left corner in the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub z: u8,
    pub x: u32,
    pub y: u32,
    pub left: f64,
    pub top: f64,
}

/// Tiles covering a `width`x`height` viewport centered on `center`.
pub fn tile_range(center: LatLng, zoom: u8, width: u32, height: u32) -> Vec<TilePlacement> {
    let scale = world_size(zoom);
    let n_tiles = 1i64 << zoom;
    let (cx, cy) = project(center);
    let origin_x = cx * scale - width as f64 / 2.0;
    let origin_y = cy * scale - height as f64 / 2.0;
    let first_x = (origin_x / TILE_SIZE).floor() as i64;
    let last_x = ((origin_x + width as f64) / TILE_SIZE).ceil() as i64 - 1;
    let first_y = ((origin_y / TILE_SIZE).floor() as i64).max(0);
    let last_y = (((origin_y + height as f64) / TILE_SIZE).ceil() as i64 - 1).min(n_tiles - 1);

    let mut tiles = Vec::new();
    for ty in first_y..=last_y {
        for tx in first_x..=last_x {
            // wrap around the antimeridian
            let wrapped = tx.rem_euclid(n_tiles);
            tiles.push(TilePlacement {
                z: zoom,
                x: wrapped as u32,
                y: ty as u32,
                left: tx as f64 * TILE_SIZE - origin_x,
                top: ty as f64 * TILE_SIZE - origin_y,
            });
        }
    }
    tiles
}

/// Greatest zoom level in `0..=max_zoom` at which `bounds` fits in the viewport.
pub fn fit_zoom(bounds: &Bounds, width: u32, height: u32, max_zoom: u8) -> u8 {
    let (x0, y0) = project(LatLng::new(bounds.north_east.lat, bounds.south_west.lng));
    let (x1, y1) = project(LatLng::new(bounds.south_west.lat, bounds.north_east.lng));
    let span_x = (x1 - x0).abs();
    let span_y = (y1 - y0).abs();
    let mut zoom = max_zoom;
    while zoom > 0 {
        let scale = world_size(zoom);
        if span_x * scale <= width as f64 && span_y * scale <= height as f64 {
            break;
        }
        zoom -= 1;
    }
    zoom
}

/// Center of `bounds` in projected space, so that fitted bounds are centered on screen.
pub fn fit_center(bounds: &Bounds) -> LatLng {
    let (x0, y0) = project(bounds.south_west);
    let (x1, y1) = project(bounds.north_east);
    unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0)
}

/// Fills a `{z}/{x}/{y}` url template.
pub fn fill_template(template: &str, z: u8, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn project_known_points() {
        let (x, y) = project(LatLng::new(0.0, 0.0));
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.5, epsilon = 1e-12);
        let (x, y) = project(LatLng::new(MAX_LATITUDE, -180.0));
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let p = LatLng::new(-33.87, 151.21);
        let (x, y) = project(p);
        let back = unproject(x, y);
        assert_abs_diff_eq!(back.lat, p.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(back.lng, p.lng, epsilon = 1e-9);
    }

    #[test]
    fn world_at_zoom_zero_is_one_tile() {
        let tiles = tile_range(LatLng::new(0.0, 0.0), 0, 256, 256);
        assert_eq!(tiles.len(), 1);
        assert_eq!((tiles[0].z, tiles[0].x, tiles[0].y), (0, 0, 0));
        assert_abs_diff_eq!(tiles[0].left, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tiles[0].top, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tiles_cover_viewport() {
        let tiles = tile_range(LatLng::new(0.0, 0.0), 2, 512, 512);
        // centered on the corner shared by tiles (1,1) (2,1) (1,2) (2,2)
        assert_eq!(tiles.len(), 4);
        let coords: Vec<(u32, u32)> = tiles.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(coords, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn fit_zoom_for_a_point_is_max_zoom() {
        let bounds = Bounds::from_point(LatLng::new(2.0, 1.0));
        assert_eq!(fit_zoom(&bounds, 800, 600, 18), 18);
    }

    #[test]
    fn fit_zoom_whole_world_is_zero() {
        let mut bounds = Bounds::from_point(LatLng::new(-80.0, -170.0));
        bounds.extend(LatLng::new(80.0, 170.0));
        assert_eq!(fit_zoom(&bounds, 256, 256, 18), 0);
    }

    #[test]
    fn fit_zoom_is_monotone() {
        let center = LatLng::new(45.0, 5.0);
        let mut last = u8::MAX;
        for i in 1..10 {
            let d = 0.001 * (1 << i) as f64;
            let mut bounds = Bounds::from_point(LatLng::new(center.lat - d, center.lng - d));
            bounds.extend(LatLng::new(center.lat + d, center.lng + d));
            let z = fit_zoom(&bounds, 800, 600, 18);
            assert!(z <= last);
            last = z;
        }
    }

    #[test]
    fn fitted_bounds_stay_in_viewport() {
        let mut bounds = Bounds::from_point(LatLng::new(48.80, 2.25));
        bounds.extend(LatLng::new(48.90, 2.42));
        let zoom = fit_zoom(&bounds, 800, 600, 18);
        let center = fit_center(&bounds);
        for corner in [bounds.south_west, bounds.north_east] {
            let (x, y) = to_viewport(corner, center, zoom, 800, 600);
            assert!((0.0..=800.0).contains(&x));
            assert!((0.0..=600.0).contains(&y));
        }
    }

    #[test]
    fn template() {
        assert_eq!(
            fill_template("http://t/{z}/{x}/{y}.png?access_token=abc", 3, 4, 5),
            "http://t/3/4/5.png?access_token=abc"
        );
    }
}
