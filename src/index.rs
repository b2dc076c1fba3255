//! The engine: record table, spatial tree, and temporal index behind
//! one insertion path and one query surface.

use crate::error::{GeotempoError, Result};
use crate::geo::haversine_distance;
use crate::spatial::SpatialIndex;
use crate::store::RecordStore;
use crate::temporal::TemporalIndex;
use crate::types::{IndexStats, QueryStats, Record, SpatialQueryStats};
use bytes::Bytes;
use rustc_hash::FxHashMap;

/// Oversampling factor for k-NN under a time filter: fetch `3k` spatial
/// neighbors before filtering. Part of the query contract; changing it
/// changes observable results.
const KNN_TIME_OVERSAMPLE: usize = 3;

/// In-memory spatio-temporal point index.
///
/// Ingests (latitude, longitude, timestamp) observations and answers
/// radius, bounding-box, and k-nearest-neighbor queries, each optionally
/// filtered to a closed time range. Inserted records are immutable and
/// identified by dense `u64` ids starting at 1.
///
/// # Thread safety
///
/// The engine does no internal locking. Queries take `&self` and any
/// number may run concurrently against a quiescent engine; every
/// mutation takes `&mut self` and must be serialized against all
/// readers by the caller. The borrow checker enforces exactly this
/// contract in safe code.
///
/// # Examples
///
/// ```
/// use geotempo::PointIndex;
///
/// let mut index = PointIndex::new();
/// let a = index.insert(0.0, 0.0, 1.0);
/// let b = index.insert(0.0, 1.0, 2.0);
/// let c = index.insert(1.0, 0.0, 3.0);
/// index.insert(1.0, 1.0, 4.0);
///
/// // One degree is ~111 km, so a 120 km disc catches three corners.
/// let mut near = index.query_radius(0.0, 0.0, 120.0);
/// near.sort_unstable();
/// assert_eq!(near, vec![a, b, c]);
///
/// // The same disc restricted to t in [2, 3].
/// let mut timed = index.query_radius_time(0.0, 0.0, 120.0, 2.0, 3.0);
/// timed.sort_unstable();
/// assert_eq!(timed, vec![b, c]);
/// ```
#[derive(Debug, Default)]
pub struct PointIndex {
    store: RecordStore,
    spatial: SpatialIndex,
    temporal: TemporalIndex,
    payloads: FxHashMap<u64, Bytes>,
    is_built: bool,
}

impl PointIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- insertion ----

    /// Insert one observation and return its assigned id.
    ///
    /// Coordinates are not validated; out-of-range values produce
    /// well-defined but meaningless great-circle distances. Use
    /// [`try_insert`](Self::try_insert) to validate.
    pub fn insert(&mut self, lat: f32, lon: f32, t: f64) -> u64 {
        let id = self.store.add(lat, lon, t);
        self.spatial.insert(lat, lon, id);
        self.temporal.insert(t, id);
        self.is_built = false;
        id
    }

    /// Insert after validating domain ranges.
    ///
    /// Requires `lat` in [-90, 90], `lon` in [-180, 180], and a finite
    /// timestamp. Nothing is inserted on rejection.
    pub fn try_insert(&mut self, lat: f32, lon: f32, t: f64) -> Result<u64> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            log::warn!("rejecting insert: latitude {lat}");
            return Err(GeotempoError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            log::warn!("rejecting insert: longitude {lon}");
            return Err(GeotempoError::InvalidLongitude(lon));
        }
        if !t.is_finite() {
            log::warn!("rejecting insert: timestamp {t}");
            return Err(GeotempoError::InvalidTimestamp(t));
        }
        Ok(self.insert(lat, lon, t))
    }

    /// Insert one observation with an opaque payload attached.
    ///
    /// The payload is not indexed and never affects query results; it
    /// rides along for retrieval via [`get_payload`](Self::get_payload).
    pub fn insert_with_payload(
        &mut self,
        lat: f32,
        lon: f32,
        t: f64,
        payload: impl Into<Bytes>,
    ) -> u64 {
        let id = self.insert(lat, lon, t);
        self.payloads.insert(id, payload.into());
        id
    }

    /// Insert a batch of observations, returning ids parallel to the
    /// input slice.
    pub fn bulk_insert(&mut self, records: &[(f32, f32, f64)]) -> Vec<u64> {
        let mut ids = Vec::with_capacity(records.len());
        for &(lat, lon, t) in records {
            ids.push(self.insert(lat, lon, t));
        }
        log::debug!("bulk inserted {} records", records.len());
        ids
    }

    /// Reserved build hook.
    ///
    /// Currently only marks the index as built for diagnostics; a later
    /// version may rebalance here. Any subsequent insert clears the
    /// flag.
    pub fn build(&mut self) {
        self.is_built = true;
        log::debug!("build marker set over {} records", self.store.len());
    }

    // ---- spatial-only queries ----

    /// Ids of all records within `radius_km` great-circle kilometers of
    /// the center, in tree traversal order.
    pub fn query_radius(&self, center_lat: f32, center_lon: f32, radius_km: f64) -> Vec<u64> {
        self.spatial.radius_query(center_lat, center_lon, radius_km)
    }

    /// Ids of all records inside the closed box
    /// `[lat_min, lat_max] x [lon_min, lon_max]`.
    ///
    /// No antimeridian wrap; a box crossing 180 degrees needs two
    /// queries. A reversed box matches nothing.
    pub fn query_box(&self, lat_min: f32, lon_min: f32, lat_max: f32, lon_max: f32) -> Vec<u64> {
        self.spatial.box_query(lat_min, lon_min, lat_max, lon_max)
    }

    /// Ids of the `k` records nearest to the query point. Returns fewer
    /// than `k` only when the index holds fewer records.
    pub fn query_knn(&self, lat: f32, lon: f32, k: usize) -> Vec<u64> {
        self.spatial.knn_query(lat, lon, k)
    }

    // ---- combined spatial + temporal queries ----

    /// Radius query restricted to records with `t_start <= t <= t_end`.
    ///
    /// A range that misses the temporal envelope returns empty without
    /// touching the spatial tree.
    pub fn query_radius_time(
        &self,
        center_lat: f32,
        center_lon: f32,
        radius_km: f64,
        t_start: f64,
        t_end: f64,
    ) -> Vec<u64> {
        if !self.temporal.overlaps(t_start, t_end) {
            return Vec::new();
        }
        let spatial_ids = self.spatial.radius_query(center_lat, center_lon, radius_km);
        self.filter_by_time(&spatial_ids, t_start, t_end)
    }

    /// Box query restricted to records with `t_start <= t <= t_end`.
    pub fn query_box_time(
        &self,
        lat_min: f32,
        lon_min: f32,
        lat_max: f32,
        lon_max: f32,
        t_start: f64,
        t_end: f64,
    ) -> Vec<u64> {
        if !self.temporal.overlaps(t_start, t_end) {
            return Vec::new();
        }
        let spatial_ids = self.spatial.box_query(lat_min, lon_min, lat_max, lon_max);
        self.filter_by_time(&spatial_ids, t_start, t_end)
    }

    /// Up to `k` nearest records whose timestamps fall in
    /// `[t_start, t_end]`.
    ///
    /// Fetches `min(3k, size)` spatial neighbors, filters them by time,
    /// and truncates to `k`. Best-effort: a time filter that is
    /// selective inside that candidate window yields fewer than `k`
    /// survivors even when more exist farther out.
    pub fn query_knn_time(
        &self,
        lat: f32,
        lon: f32,
        k: usize,
        t_start: f64,
        t_end: f64,
    ) -> Vec<u64> {
        if !self.temporal.overlaps(t_start, t_end) {
            return Vec::new();
        }

        let fetch_k = k.saturating_mul(KNN_TIME_OVERSAMPLE).min(self.store.len());
        if fetch_k == 0 {
            return Vec::new();
        }

        let mut spatial_ids = self.spatial.knn_query(lat, lon, fetch_k);
        // Nearest-first inside the oversampled window, so truncation
        // keeps the closest survivors.
        spatial_ids.sort_by(|&a, &b| {
            self.distance_to(a, lat, lon)
                .total_cmp(&self.distance_to(b, lat, lon))
                .then(a.cmp(&b))
        });

        let mut survivors = self.filter_by_time(&spatial_ids, t_start, t_end);
        survivors.truncate(k);
        survivors
    }

    fn distance_to(&self, id: u64, lat: f32, lon: f32) -> f64 {
        self.store
            .get_ref(id)
            .map(|r| haversine_distance(lat, lon, r.lat, r.lon))
            .unwrap_or(f64::INFINITY)
    }

    /// [`query_radius_time`](Self::query_radius_time) with traversal and
    /// filter counters.
    ///
    /// The returned stats start from zero for each call; spatial
    /// counters are copied verbatim from the tree's traversal.
    pub fn query_radius_time_instrumented(
        &self,
        center_lat: f32,
        center_lon: f32,
        radius_km: f64,
        t_start: f64,
        t_end: f64,
    ) -> (Vec<u64>, QueryStats) {
        let mut stats = QueryStats::default();

        if !self.temporal.overlaps(t_start, t_end) {
            return (Vec::new(), stats);
        }

        let mut spatial_stats = SpatialQueryStats::default();
        let spatial_ids = self.spatial.radius_query_instrumented(
            center_lat,
            center_lon,
            radius_km,
            &mut spatial_stats,
        );

        stats.spatial_nodes_visited = spatial_stats.nodes_visited;
        stats.spatial_distance_checks = spatial_stats.distance_checks;
        stats.spatial_bbox_prunes = spatial_stats.bbox_prunes;
        stats.spatial_distance_prunes = spatial_stats.distance_prunes;

        let mut results = Vec::with_capacity(spatial_ids.len());
        for &id in &spatial_ids {
            let Some(record) = self.store.get_ref(id) else {
                continue;
            };
            if record.t >= t_start && record.t <= t_end {
                results.push(id);
                stats.records_passed_time_filter += 1;
            } else {
                stats.records_filtered_by_time += 1;
            }
        }
        stats.result_count = results.len();

        (results, stats)
    }

    // ---- data access ----

    /// Copy out the record with the given id, or `None` if it was never
    /// assigned.
    pub fn get_record(&self, id: u64) -> Option<Record> {
        self.store.get(id)
    }

    /// Borrow the payload attached to the given id, if any.
    pub fn get_payload(&self, id: u64) -> Option<&Bytes> {
        self.payloads.get(&id)
    }

    /// Number of records in the index.
    pub fn size(&self) -> usize {
        self.store.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drop all records, payloads, and index entries; the next insert
    /// is assigned id 1 again.
    pub fn clear(&mut self) {
        log::debug!("clearing {} records", self.store.len());
        self.store.clear();
        self.spatial.clear();
        self.temporal.clear();
        self.payloads.clear();
        self.is_built = false;
    }

    /// Snapshot of structure sizes, the temporal envelope, and the
    /// build marker.
    pub fn index_stats(&self) -> IndexStats {
        let (min_time, max_time) = self.temporal.envelope();
        IndexStats {
            total_records: self.store.len(),
            spatial_nodes: self.spatial.len(),
            temporal_entries: self.temporal.len(),
            min_time,
            max_time,
            is_built: self.is_built,
        }
    }

    /// Retain the ids whose record timestamps fall in the closed range,
    /// preserving input order.
    fn filter_by_time(&self, spatial_ids: &[u64], t_start: f64, t_end: f64) -> Vec<u64> {
        spatial_ids
            .iter()
            .copied()
            .filter(|&id| {
                self.store
                    .get_ref(id)
                    .is_some_and(|record| record.t >= t_start && record.t <= t_end)
            })
            .collect()
    }
}
