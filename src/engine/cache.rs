use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::model::{Room, SectionSpan};
use crate::observability::{CACHE_HITS_TOTAL, CACHE_INVALIDATIONS_TOTAL, CACHE_MISSES_TOTAL};

/// Cache key for the simple room-listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    AllRooms,
    AvailableRooms,
    ByBuilding(String),
    ByMinCapacity(u32),
}

/// Cache key for `find_free_rooms`: the exact argument tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct FreeRoomsKey {
    pub date: NaiveDate,
    pub span: SectionSpan,
    pub min_capacity: Option<u32>,
}

/// Read-through cache over availability search and room listings.
///
/// Invalidation is deliberately coarse: any mutation to a room or an
/// occupancy clears every entry in both spaces. There is no per-key
/// dependency tracking and no expiry; a missing key on lookup means the
/// caller recomputes synchronously and stores the result.
///
/// Each `invalidate_all` also advances an epoch. Readers capture the epoch
/// before computing, stores tag the entry with it, and lookups only serve
/// entries tagged with the current epoch. A recompute that raced a mutation
/// therefore lands as a dead entry instead of resurrecting pre-mutation
/// state.
pub(super) struct AvailabilityCache {
    free_rooms: DashMap<FreeRoomsKey, (u64, Vec<Room>)>,
    listings: DashMap<ListingKey, (u64, Vec<Room>)>,
    epoch: AtomicU64,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self {
            free_rooms: DashMap::new(),
            listings: DashMap::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Current invalidation epoch. Capture before computing a value that
    /// will be stored.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn get_free_rooms(&self, key: &FreeRoomsKey) -> Option<Vec<Room>> {
        let current = self.epoch();
        let hit = self
            .free_rooms
            .get(key)
            .filter(|e| e.value().0 == current)
            .map(|e| e.value().1.clone());
        record(hit.is_some());
        hit
    }

    pub fn store_free_rooms(&self, epoch: u64, key: FreeRoomsKey, rooms: Vec<Room>) {
        if self.epoch() == epoch {
            self.free_rooms.insert(key, (epoch, rooms));
        }
    }

    pub fn get_listing(&self, key: &ListingKey) -> Option<Vec<Room>> {
        let current = self.epoch();
        let hit = self
            .listings
            .get(key)
            .filter(|e| e.value().0 == current)
            .map(|e| e.value().1.clone());
        record(hit.is_some());
        hit
    }

    pub fn store_listing(&self, epoch: u64, key: ListingKey, rooms: Vec<Room>) {
        if self.epoch() == epoch {
            self.listings.insert(key, (epoch, rooms));
        }
    }

    /// Evict broadly, recompute lazily.
    pub fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.free_rooms.clear();
        self.listings.clear();
        metrics::counter!(CACHE_INVALIDATIONS_TOTAL).increment(1);
        tracing::debug!("availability cache invalidated");
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.free_rooms.len() + self.listings.len()
    }
}

fn record(hit: bool) {
    if hit {
        metrics::counter!(CACHE_HITS_TOTAL).increment(1);
    } else {
        metrics::counter!(CACHE_MISSES_TOTAL).increment(1);
    }
}
