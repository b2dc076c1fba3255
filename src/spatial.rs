//! 2-D k-d tree over (latitude, longitude) with great-circle pruning.
//!
//! The tree is built incrementally: each insert descends by coordinate
//! comparison on the node's split axis (latitude at even depths,
//! longitude at odd depths, ties to the right) and re-derives subtree
//! bounding boxes on the way back up. There is no rebalancing; insertion
//! order determines shape, so callers that care should pre-shuffle bulk
//! loads.
//!
//! Radius queries prune with the haversine distance from the query point
//! to its projection onto the splitting plane. That projection is a
//! lower bound on the distance to anything beyond the plane, so pruning
//! can skip work but never results. Per-node bounding boxes are
//! maintained for a future tighter prune and are not consulted by the
//! query path yet.

use crate::geo::{haversine_distance, plane_distance};
use crate::types::SpatialQueryStats;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Splitting axis of a k-d node. Latitude at even depths, longitude at
/// odd depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Split on latitude (axis 0).
    Lat,
    /// Split on longitude (axis 1).
    Lon,
}

impl SplitAxis {
    #[inline]
    fn from_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            SplitAxis::Lat
        } else {
            SplitAxis::Lon
        }
    }

    /// Pick this axis' component out of a coordinate pair.
    #[inline]
    fn component(self, lat: f32, lon: f32) -> f32 {
        match self {
            SplitAxis::Lat => lat,
            SplitAxis::Lon => lon,
        }
    }
}

/// Axis-aligned bounds of a subtree, node point included.
#[derive(Debug, Clone, Copy)]
struct SubtreeBounds {
    min_lat: f32,
    max_lat: f32,
    min_lon: f32,
    max_lon: f32,
}

impl SubtreeBounds {
    fn of_point(lat: f32, lon: f32) -> Self {
        Self {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        }
    }

    fn merge(&mut self, other: &SubtreeBounds) {
        self.min_lat = self.min_lat.min(other.min_lat);
        self.max_lat = self.max_lat.max(other.max_lat);
        self.min_lon = self.min_lon.min(other.min_lon);
        self.max_lon = self.max_lon.max(other.max_lon);
    }

    #[cfg(test)]
    fn contains(&self, lat: f32, lon: f32) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[derive(Debug)]
struct KdNode {
    lat: f32,
    lon: f32,
    id: u64,
    axis: SplitAxis,
    bounds: SubtreeBounds,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

impl KdNode {
    fn new(lat: f32, lon: f32, id: u64, axis: SplitAxis) -> Self {
        Self {
            lat,
            lon,
            id,
            axis,
            bounds: SubtreeBounds::of_point(lat, lon),
            left: None,
            right: None,
        }
    }

    /// The coordinate this node splits on.
    #[inline]
    fn split_value(&self) -> f32 {
        self.axis.component(self.lat, self.lon)
    }

    /// Re-derive bounds from the node's own point plus child bounds.
    fn update_bounds(&mut self) {
        let mut bounds = SubtreeBounds::of_point(self.lat, self.lon);
        if let Some(left) = &self.left {
            bounds.merge(&left.bounds);
        }
        if let Some(right) = &self.right {
            bounds.merge(&right.bounds);
        }
        self.bounds = bounds;
    }
}

/// K-NN heap entry, ordered so the worst (farthest) candidate is on top.
#[derive(Debug, PartialEq, Eq)]
struct KnnCandidate {
    dist: OrderedFloat<f64>,
    id: u64,
}

impl Ord for KnnCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .cmp(&other.dist)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for KnnCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Incremental 2-D k-d tree answering radius, box, and k-NN queries in
/// identifier space.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    root: Option<Box<KdNode>>,
    size: usize,
}

impl SpatialIndex {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point. Equal split values descend right.
    pub fn insert(&mut self, lat: f32, lon: f32, id: u64) {
        Self::insert_recursive(&mut self.root, lat, lon, id, 0);
        self.size += 1;
    }

    fn insert_recursive(slot: &mut Option<Box<KdNode>>, lat: f32, lon: f32, id: u64, depth: usize) {
        match slot {
            None => {
                *slot = Some(Box::new(KdNode::new(
                    lat,
                    lon,
                    id,
                    SplitAxis::from_depth(depth),
                )));
            }
            Some(node) => {
                if node.axis.component(lat, lon) < node.split_value() {
                    Self::insert_recursive(&mut node.left, lat, lon, id, depth + 1);
                } else {
                    Self::insert_recursive(&mut node.right, lat, lon, id, depth + 1);
                }
                node.update_bounds();
            }
        }
    }

    /// Ids of all points within `radius_km` great-circle kilometers of
    /// the center, in traversal order (not sorted by distance).
    pub fn radius_query(&self, center_lat: f32, center_lon: f32, radius_km: f64) -> Vec<u64> {
        let mut stats = SpatialQueryStats::default();
        self.radius_query_instrumented(center_lat, center_lon, radius_km, &mut stats)
    }

    /// [`radius_query`](Self::radius_query) with traversal counters.
    ///
    /// Semantically identical to the plain variant; increments the
    /// counters without resetting them first.
    pub fn radius_query_instrumented(
        &self,
        center_lat: f32,
        center_lon: f32,
        radius_km: f64,
        stats: &mut SpatialQueryStats,
    ) -> Vec<u64> {
        let radius_m = radius_km * 1000.0;
        let mut results = Vec::new();
        Self::radius_recursive(
            self.root.as_deref(),
            center_lat,
            center_lon,
            radius_m,
            &mut results,
            stats,
        );
        results
    }

    fn radius_recursive(
        node: Option<&KdNode>,
        center_lat: f32,
        center_lon: f32,
        radius_m: f64,
        results: &mut Vec<u64>,
        stats: &mut SpatialQueryStats,
    ) {
        let Some(node) = node else { return };
        stats.nodes_visited += 1;

        stats.distance_checks += 1;
        if haversine_distance(center_lat, center_lon, node.lat, node.lon) <= radius_m {
            results.push(node.id);
        }

        let query_value = node.axis.component(center_lat, center_lon);
        let (near, far) = if query_value < node.split_value() {
            (node.left.as_deref(), node.right.as_deref())
        } else {
            (node.right.as_deref(), node.left.as_deref())
        };

        Self::radius_recursive(near, center_lat, center_lon, radius_m, results, stats);

        let to_plane = plane_distance(center_lat, center_lon, node.axis, node.split_value());
        if to_plane <= radius_m {
            Self::radius_recursive(far, center_lat, center_lon, radius_m, results, stats);
        } else if far.is_some() {
            stats.distance_prunes += 1;
        }
    }

    /// Ids of all points inside the closed box
    /// `[lat_min, lat_max] x [lon_min, lon_max]`.
    ///
    /// No antimeridian wrap: a box crossing 180 degrees must be issued
    /// as two queries. A reversed box matches nothing.
    pub fn box_query(&self, lat_min: f32, lon_min: f32, lat_max: f32, lon_max: f32) -> Vec<u64> {
        let mut results = Vec::new();
        Self::box_recursive(
            self.root.as_deref(),
            lat_min,
            lon_min,
            lat_max,
            lon_max,
            &mut results,
        );
        results
    }

    fn box_recursive(
        node: Option<&KdNode>,
        lat_min: f32,
        lon_min: f32,
        lat_max: f32,
        lon_max: f32,
        results: &mut Vec<u64>,
    ) {
        let Some(node) = node else { return };

        if node.lat >= lat_min && node.lat <= lat_max && node.lon >= lon_min && node.lon <= lon_max
        {
            results.push(node.id);
        }

        let (low, high) = match node.axis {
            SplitAxis::Lat => (lat_min, lat_max),
            SplitAxis::Lon => (lon_min, lon_max),
        };
        let split = node.split_value();

        if low <= split {
            Self::box_recursive(
                node.left.as_deref(),
                lat_min,
                lon_min,
                lat_max,
                lon_max,
                results,
            );
        }
        if high >= split {
            Self::box_recursive(
                node.right.as_deref(),
                lat_min,
                lon_min,
                lat_max,
                lon_max,
                results,
            );
        }
    }

    /// Ids of the `k` nearest points to the query by great-circle
    /// distance.
    ///
    /// Returns all points when the tree holds fewer than `k`. Result
    /// order is heap order, deliberately unspecified; ties at the k-th
    /// position are broken by traversal order.
    pub fn knn_query(&self, lat: f32, lon: f32, k: usize) -> Vec<u64> {
        if k == 0 {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k.min(self.size) + 1);
        Self::knn_recursive(self.root.as_deref(), lat, lon, k, &mut heap);
        heap.into_iter().map(|c| c.id).collect()
    }

    fn knn_recursive(
        node: Option<&KdNode>,
        lat: f32,
        lon: f32,
        k: usize,
        heap: &mut BinaryHeap<KnnCandidate>,
    ) {
        let Some(node) = node else { return };

        let dist = haversine_distance(lat, lon, node.lat, node.lon);
        if heap.len() < k {
            heap.push(KnnCandidate {
                dist: OrderedFloat(dist),
                id: node.id,
            });
        } else if let Some(worst) = heap.peek() {
            if dist < worst.dist.0 {
                heap.pop();
                heap.push(KnnCandidate {
                    dist: OrderedFloat(dist),
                    id: node.id,
                });
            }
        }

        let query_value = node.axis.component(lat, lon);
        let (near, far) = if query_value < node.split_value() {
            (node.left.as_deref(), node.right.as_deref())
        } else {
            (node.right.as_deref(), node.left.as_deref())
        };

        Self::knn_recursive(near, lat, lon, k, heap);

        let explore_far = heap.len() < k
            || plane_distance(lat, lon, node.axis, node.split_value())
                < heap.peek().map(|c| c.dist.0).unwrap_or(f64::INFINITY);
        if explore_far {
            Self::knn_recursive(far, lat, lon, k, heap);
        }
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }
}
