//! Great-circle distances on WGS84 coordinates

use delivery_common::Coordinate;
use geo::{Distance, Haversine, Point};

/// Great-circle distance in metres
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let p1 = Point::new(a.lon, a.lat);
    let p2 = Point::new(b.lon, b.lat);
    Haversine::distance(p1, p2)
}

/// Length of a polyline in metres
pub fn polyline_length(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}
