//! Geographic coordinates ⇄ points on the unit sphere.
//!
//! The two offsets shift the projection so it lines up with the seam and
//! poles of the globe texture used by the renderer. They are applied in
//! single precision, as the renderer does.

use serde::Serialize;

use crate::data::GeoCoordinate;

pub const LAT_OFFSET: f32 = -0.2;
pub const LON_OFFSET: f32 = 2.8;

/// Spacing of the anomaly grid, in degrees.
pub const GRID_STEP: i32 = 4;
/// Outermost grid latitude (half a step inside the pole).
pub const MAX_LATITUDE: i32 = 88;
/// Outermost grid longitude (half a step inside the antimeridian).
pub const MAX_LONGITUDE: i32 = 178;

/// Radius at which surface cells are drawn, just above the globe.
pub const SURFACE_LIFT: f64 = 1.01;

/// A point in the renderer's 3D space. Y points south.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(self, factor: f64) -> Self {
        Point3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// Project a latitude/longitude in degrees onto the unit sphere.
pub fn geo_to_point(latitude: f32, longitude: f32) -> Point3 {
    let lat = f64::from(latitude + LAT_OFFSET).to_radians();
    let lon = f64::from(longitude + LON_OFFSET).to_radians();
    Point3::new(-lon.sin() * lat.cos(), -lat.sin(), lon.cos() * lat.cos())
}

pub fn coordinate_to_point(coordinate: &GeoCoordinate) -> Point3 {
    geo_to_point(coordinate.latitude() as f32, coordinate.longitude() as f32)
}

/// Map a point on (or near) the sphere back to the grid cell under it.
///
/// Not an exact inverse of [`geo_to_point`]: the result is snapped onto the
/// nearest 4° grid line and clamped to the grid's extremes.
pub fn point_to_geo(point: &Point3) -> GeoCoordinate {
    let length = point.length();
    let point = if length.is_normal() {
        point.scale(1.0 / length)
    } else {
        *point
    };

    let polar = (-point.y).clamp(-1.0, 1.0).acos().to_degrees();
    let latitude = 90.0 - (f64::from(LAT_OFFSET) + polar);

    let mut longitude = -(f64::from(LON_OFFSET) + point.x.atan2(point.z).to_degrees());
    if longitude < -180.0 {
        longitude += 360.0;
    } else if longitude > 180.0 {
        longitude -= 360.0;
    }

    GeoCoordinate::new(
        snap_to_grid(latitude, 0.0).clamp(-MAX_LATITUDE, MAX_LATITUDE),
        snap_to_grid(longitude, 2.0).clamp(-MAX_LONGITUDE, MAX_LONGITUDE),
    )
}

/// Move `raw` degrees onto the nearest grid line, where grid lines satisfy
/// `(line + phase) % GRID_STEP == 0`. An exact two-degree tie goes up.
fn snap_to_grid(raw: f64, phase: f64) -> i32 {
    let step = f64::from(GRID_STEP);
    (((raw + phase) / step + 0.5).floor() * step - phase) as i32
}

/// Corners of a `size`-degree cell centred on a coordinate, lifted to
/// [`SURFACE_LIFT`]: top-right, bottom-right, bottom-left, top-left.
pub fn cell_corners(latitude: f32, longitude: f32, size: f32) -> [Point3; 4] {
    let half = size / 2.0;
    [
        (latitude + half, longitude + half),
        (latitude - half, longitude + half),
        (latitude - half, longitude - half),
        (latitude + half, longitude - half),
    ]
    .map(|(lat, lon)| geo_to_point(lat, lon).scale(SURFACE_LIFT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> impl Iterator<Item = (i32, i32)> {
        (-MAX_LATITUDE..=MAX_LATITUDE)
            .step_by(GRID_STEP as usize)
            .flat_map(|lat| {
                (-MAX_LONGITUDE..=MAX_LONGITUDE)
                    .step_by(GRID_STEP as usize)
                    .map(move |lon| (lat, lon))
            })
    }

    #[test]
    fn offset_origin_faces_positive_z() {
        let p = geo_to_point(0.2, -2.8);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn north_is_negative_y() {
        let p = geo_to_point(90.2, 0.0);
        assert!((p.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn projected_points_are_unit_length() {
        for (lat, lon) in grid() {
            let p = geo_to_point(lat as f32, lon as f32);
            assert!((p.length() - 1.0).abs() < 1e-9, "({lat}, {lon}) -> {p:?}");
        }
        let p = geo_to_point(-33.5, 151.25);
        assert!((p.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn grid_coordinates_round_trip() {
        for (lat, lon) in grid() {
            let c = GeoCoordinate::new(lat, lon);
            assert_eq!(point_to_geo(&coordinate_to_point(&c)), c);
        }
    }

    #[test]
    fn off_grid_points_snap_to_nearest_cell() {
        assert_eq!(
            point_to_geo(&Point3::new(0.0, 0.0, 1.0)),
            GeoCoordinate::new(0, -2)
        );
        assert_eq!(
            point_to_geo(&geo_to_point(41.3, 9.6)),
            GeoCoordinate::new(40, 10)
        );
    }

    #[test]
    fn poles_clamp_to_outer_rows() {
        assert_eq!(point_to_geo(&Point3::new(0.0, -1.0, 0.0)).latitude(), MAX_LATITUDE);
        assert_eq!(point_to_geo(&Point3::new(0.0, 1.0, 0.0)).latitude(), -MAX_LATITUDE);
    }

    #[test]
    fn scaled_points_map_to_the_same_cell() {
        let p = geo_to_point(-12.0, 70.0);
        assert_eq!(point_to_geo(&p.scale(SURFACE_LIFT)), point_to_geo(&p));
    }

    #[test]
    fn snapping_rules() {
        assert_eq!(snap_to_grid(8.0, 0.0), 8);
        assert_eq!(snap_to_grid(9.0, 0.0), 8);
        assert_eq!(snap_to_grid(7.0, 0.0), 8);
        assert_eq!(snap_to_grid(10.0, 0.0), 12);
        assert_eq!(snap_to_grid(-9.0, 0.0), -8);
        assert_eq!(snap_to_grid(-10.0, 0.0), -8);
        assert_eq!(snap_to_grid(-177.0, 2.0), -178);
        assert_eq!(snap_to_grid(-175.0, 2.0), -174);
        assert_eq!(snap_to_grid(-176.0, 2.0), -174);
    }

    #[test]
    fn snapping_uses_unrounded_degrees() {
        // Just short of the two-degree tie: still the nearer line below.
        assert_eq!(snap_to_grid(41.7, 0.0), 40);
        assert_eq!(snap_to_grid(11.7, 2.0), 10);
        assert_eq!(snap_to_grid(-41.7, 0.0), -40);
        assert_eq!(
            point_to_geo(&geo_to_point(41.7, 11.7)),
            GeoCoordinate::new(40, 10)
        );
        assert_eq!(
            point_to_geo(&geo_to_point(-45.9, -12.3)),
            GeoCoordinate::new(-44, -14)
        );
    }

    #[test]
    fn cell_corners_surround_centre() {
        let corners = cell_corners(0.0, 2.0, 4.0);
        for corner in corners {
            assert!((corner.length() - SURFACE_LIFT).abs() < 1e-9);
        }
        // top edge lies north of the bottom edge
        assert!(corners[0].y < corners[1].y);
        assert!(corners[3].y < corners[2].y);

        let sum = corners
            .iter()
            .fold(Point3::new(0.0, 0.0, 0.0), |acc, c| {
                Point3::new(acc.x + c.x, acc.y + c.y, acc.z + c.z)
            });
        assert_eq!(point_to_geo(&sum), GeoCoordinate::new(0, 2));
    }
}
