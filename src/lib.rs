//! Embedded in-memory spatio-temporal point index.
//!
//! Ingest geo-referenced observations (latitude, longitude, timestamp)
//! and answer combined spatial + temporal queries: great-circle radius,
//! axis-aligned bounding box, and k-nearest-neighbors, each optionally
//! restricted to a closed time range. Spatial search runs on an
//! incremental 2-D k-d tree; timestamps live in an ordered multi-map
//! with a tracked min/max envelope for cheap empty-result rejection.
//!
//! ```rust
//! use geotempo::PointIndex;
//!
//! let mut index = PointIndex::new();
//! index.insert(40.7128, -74.0060, 1000.0); // id 1
//! index.insert(40.7589, -73.9851, 2000.0); // id 2
//!
//! let hits = index.query_radius_time(40.7128, -74.0060, 10.0, 500.0, 1500.0);
//! assert_eq!(hits, vec![1]);
//!
//! let record = index.get_record(1).unwrap();
//! assert_eq!(record.t, 1000.0);
//! ```
//!
//! The engine is single-threaded by design: queries take `&self`,
//! mutations take `&mut self`, and the caller owns any cross-thread
//! serialization.

pub mod error;
pub mod geo;
pub mod index;
pub mod spatial;
pub mod store;
pub mod temporal;
pub mod types;

pub use error::{GeotempoError, Result};
pub use index::PointIndex;
pub use spatial::{SpatialIndex, SplitAxis};
pub use store::RecordStore;
pub use temporal::TemporalIndex;
pub use types::{IndexStats, QueryStats, Record, SpatialQueryStats};

pub use geo::{EARTH_RADIUS_METERS, haversine_distance};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{GeotempoError, PointIndex, Result};

    pub use crate::{IndexStats, QueryStats, Record};

    pub use crate::haversine_distance;
}
