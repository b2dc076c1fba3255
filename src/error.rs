//! Error types for geotempo operations.

use thiserror::Error;

/// Result type alias using [`GeotempoError`].
pub type Result<T> = std::result::Result<T, GeotempoError>;

/// Errors produced by the validating insertion path.
///
/// The core query surface is infallible by contract: lookups on unknown
/// ids return `None` and queries that match nothing return empty vectors.
/// Only [`try_insert`](crate::PointIndex::try_insert) rejects input.
#[derive(Debug, Error, PartialEq)]
pub enum GeotempoError {
    /// Latitude outside [-90.0, 90.0] degrees or non-finite.
    #[error("latitude out of range [-90.0, 90.0]: {0}")]
    InvalidLatitude(f32),

    /// Longitude outside [-180.0, 180.0] degrees or non-finite.
    #[error("longitude out of range [-180.0, 180.0]: {0}")]
    InvalidLongitude(f32),

    /// Timestamp is NaN or infinite.
    #[error("timestamp must be finite, got: {0}")]
    InvalidTimestamp(f64),
}
