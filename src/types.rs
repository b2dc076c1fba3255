//! Public value types: records and statistics snapshots.

use serde::{Deserialize, Serialize};

/// A single geo-referenced observation.
///
/// Records are immutable once inserted. Coordinates are stored in
/// single precision degrees; the timestamp is an opaque `f64` the engine
/// only ever compares with `<=`, so callers may use seconds since epoch,
/// milliseconds, or any other monotone unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Latitude in degrees, expected in [-90, 90].
    pub lat: f32,
    /// Longitude in degrees, expected in [-180, 180].
    pub lon: f32,
    /// Timestamp in a caller-chosen unit.
    pub t: f64,
    /// Assigned identifier. 0 means unassigned; real ids start at 1.
    pub id: u64,
}

impl Record {
    /// Create a record with an unassigned id.
    pub fn new(lat: f32, lon: f32, t: f64) -> Self {
        Self { lat, lon, t, id: 0 }
    }
}

/// Snapshot of the engine's internal structure sizes and envelope.
///
/// `spatial_nodes` always equals `total_records` while the identity
/// invariant holds; it is reported separately so a metrics sink can
/// alert on divergence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexStats {
    /// Rows in the record table.
    pub total_records: usize,
    /// Nodes in the spatial k-d tree.
    pub spatial_nodes: usize,
    /// Entries in the temporal index.
    pub temporal_entries: usize,
    /// Smallest timestamp ever inserted, `f64::INFINITY` when empty.
    pub min_time: f64,
    /// Largest timestamp ever inserted, `f64::NEG_INFINITY` when empty.
    pub max_time: f64,
    /// Whether `build` has run since the last mutation.
    pub is_built: bool,
}

/// Counters collected by the instrumented spatial traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialQueryStats {
    /// Tree nodes visited.
    pub nodes_visited: usize,
    /// Haversine point-distance evaluations.
    pub distance_checks: usize,
    /// Subtrees rejected by the bounding-box prune (reserved, stays 0).
    pub bbox_prunes: usize,
    /// Subtrees rejected by the splitting-plane distance prune.
    pub distance_prunes: usize,
}

impl SpatialQueryStats {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Counters for one instrumented combined query.
///
/// The spatial fields are copied verbatim from the inner
/// [`SpatialQueryStats`]; the time-filter fields are counted by the
/// coordinator while it checks candidates against the record table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Tree nodes visited by the spatial phase.
    pub spatial_nodes_visited: usize,
    /// Haversine point-distance evaluations in the spatial phase.
    pub spatial_distance_checks: usize,
    /// Subtrees rejected by the bounding-box prune (reserved, stays 0).
    pub spatial_bbox_prunes: usize,
    /// Subtrees rejected by the splitting-plane distance prune.
    pub spatial_distance_prunes: usize,
    /// Spatial candidates rejected by the time filter.
    pub records_filtered_by_time: usize,
    /// Spatial candidates that passed the time filter.
    pub records_passed_time_filter: usize,
    /// Final result size.
    pub result_count: usize,
}

impl QueryStats {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_starts_unassigned() {
        let r = Record::new(40.7128, -74.0060, 1000.0);
        assert_eq!(r.id, 0);
        assert_eq!(r.lat, 40.7128);
        assert_eq!(r.lon, -74.0060);
        assert_eq!(r.t, 1000.0);
    }

    #[test]
    fn stats_reset() {
        let mut stats = QueryStats {
            spatial_nodes_visited: 7,
            result_count: 3,
            ..Default::default()
        };
        stats.reset();
        assert_eq!(stats, QueryStats::default());
    }
}
