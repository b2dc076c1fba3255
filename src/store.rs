//! Canonical record storage with dense identifier allocation.

use crate::types::Record;
use rustc_hash::FxHashMap;

/// Owns every inserted record and hands out identifiers.
///
/// Records live in one contiguous, append-only vector; all other engine
/// components hold only ids and come back here for coordinates and
/// timestamps. Ids are assigned densely from 1 (0 is reserved as
/// "unassigned") and never reused within an engine lifetime; `clear`
/// resets the allocator.
///
/// Since records are never removed individually, vector indices are
/// stable. Borrows from [`get_ref`](RecordStore::get_ref) are only valid
/// until the next mutation; the `&mut self` receiver on
/// [`add`](RecordStore::add) makes holding one across an insert a
/// compile error.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    id_to_index: FxHashMap<u64, usize>,
    next_id: u64,
}

impl RecordStore {
    /// Create an empty store. The first assigned id is 1.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            id_to_index: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Append a record and return its freshly assigned id.
    ///
    /// No domain validation happens here; the caller owns it.
    pub fn add(&mut self, lat: f32, lon: f32, t: f64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.id_to_index.insert(id, self.records.len());
        self.records.push(Record { lat, lon, t, id });
        id
    }

    /// Copy out the record with the given id.
    pub fn get(&self, id: u64) -> Option<Record> {
        self.get_ref(id).copied()
    }

    /// Borrow the record with the given id.
    ///
    /// Used by the time filter to avoid copying per candidate. Do not
    /// hold the borrow across an insertion.
    pub fn get_ref(&self, id: u64) -> Option<&Record> {
        self.id_to_index.get(&id).map(|&idx| &self.records[idx])
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records and reset the id allocator to 1.
    pub fn clear(&mut self) {
        self.records.clear();
        self.id_to_index.clear();
        self.next_id = 1;
    }
}
