//! Grid snapping.
//!
//! Snapping is applied when a coordinate is stored, never at render time,
//! so stored coordinates are already on the grid whenever snapping is on.

use kurbo::Point;

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 40.0;

/// Round a value to the nearest multiple of `grid_size`.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    let snapped = (value / grid_size).round() * grid_size;
    // Avoid storing -0.0
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// Snap a coordinate to the default grid when `enabled`.
pub fn snap_coord(value: f64, enabled: bool) -> f64 {
    if enabled {
        snap_value(value, GRID_SIZE)
    } else {
        value
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Snap a point to the default grid when `enabled`.
pub fn snap_point(point: Point, enabled: bool) -> Point {
    if enabled {
        snap_to_grid(point, GRID_SIZE)
    } else {
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Point::new(55.0, 19.0), GRID_SIZE);
        assert!((snapped.x - 40.0).abs() < f64::EPSILON);
        assert!(snapped.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_round_up() {
        assert!((snap_value(61.0, GRID_SIZE) - 80.0).abs() < f64::EPSILON);
        assert!((snap_value(-61.0, GRID_SIZE) + 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_disabled_is_identity() {
        assert!((snap_coord(13.37, false) - 13.37).abs() < f64::EPSILON);
        assert_eq!(snap_point(Point::new(1.5, 2.5), false), Point::new(1.5, 2.5));
    }

    #[test]
    fn test_snap_never_negative_zero() {
        let v = snap_value(-3.0, GRID_SIZE);
        assert!(v.is_sign_positive());
    }
}
