//! Great-circle distance helpers shared by the spatial tree.

use crate::spatial::SplitAxis;

/// Earth radius in meters for haversine distance calculations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters, haversine formula.
///
/// Coordinates are degrees. Computed in double precision even though
/// records store single-precision coordinates; the public contract only
/// promises meter-scale accuracy at radius boundaries.
#[inline]
pub fn haversine_distance(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f64 {
    let lat1 = f64::from(lat1);
    let lat2 = f64::from(lat2);
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (f64::from(lon2) - f64::from(lon1)).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Haversine distance from a query point to its projection onto a k-d
/// splitting plane.
///
/// For a latitude split at `value` the projection is `(value, qlon)`;
/// for a longitude split it is `(qlat, value)`. The projected point is
/// not the true closest point on a meridian at high latitudes, but the
/// returned distance is always a lower bound on the distance to any
/// point beyond the plane, so pruning with it never drops results.
#[inline]
pub fn plane_distance(qlat: f32, qlon: f32, axis: SplitAxis, value: f32) -> f64 {
    match axis {
        SplitAxis::Lat => haversine_distance(qlat, qlon, value, qlon),
        SplitAxis::Lon => haversine_distance(qlat, qlon, qlat, value),
    }
}
