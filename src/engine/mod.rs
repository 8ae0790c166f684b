mod availability;
mod cache;
mod conflict;
mod error;
mod mutations;
mod queries;
mod requests;

pub use cache::ListingKey;
pub use error::EngineError;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::model::*;
use cache::AvailabilityCache;

pub type SharedRoomState = Arc<RwLock<RoomState>>;

/// The booking conflict engine. Each room's calendar lives behind its own
/// `RwLock`; the write lock is the mutual-exclusion region that serializes
/// conflict-check-then-commit for that room, so two concurrent approvals of
/// overlapping requests can never both succeed.
pub struct Engine {
    rooms: DashMap<RoomId, SharedRoomState>,
    requests: DashMap<RequestId, BookingRequest>,
    /// Reverse lookup: occupancy id → room id.
    occupancy_to_room: DashMap<OccupancyId, RoomId>,
    cache: AvailabilityCache,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            requests: DashMap::new(),
            occupancy_to_room: DashMap::new(),
            cache: AvailabilityCache::new(),
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub(super) fn get_room_state(&self, id: &RoomId) -> Option<SharedRoomState> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    /// Whether `id` is still registered. `delete_room` removes the map
    /// entry first, so a resolved `RoomState` may be detached by the time
    /// its write lock is acquired; every committing path re-checks this
    /// under the lock before writing.
    pub(super) fn room_live(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub(super) fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|e| *e.key()).collect()
    }

    pub(super) fn insert_room_state(&self, id: RoomId, state: RoomState) {
        self.rooms.insert(id, Arc::new(RwLock::new(state)));
    }

    pub(super) fn remove_room_state(&self, id: &RoomId) -> Option<(RoomId, SharedRoomState)> {
        self.rooms.remove(id)
    }

    pub(super) fn room_for_occupancy(&self, id: &OccupancyId) -> Option<RoomId> {
        self.occupancy_to_room.get(id).map(|e| *e.value())
    }

    pub(super) fn map_occupancy(&self, id: OccupancyId, room_id: RoomId) {
        self.occupancy_to_room.insert(id, room_id);
    }

    pub(super) fn unmap_occupancy(&self, id: &OccupancyId) {
        self.occupancy_to_room.remove(id);
    }

    pub(super) fn insert_request(&self, request: BookingRequest) {
        self.requests.insert(request.id, request);
    }

    pub(super) fn get_request_snapshot(&self, id: &RequestId) -> Option<BookingRequest> {
        self.requests.get(id).map(|e| e.value().clone())
    }

    /// Exclusive handle on one request for a status transition. Never held
    /// across an await point.
    pub(super) fn request_entry(
        &self,
        id: &RequestId,
    ) -> Option<dashmap::mapref::one::RefMut<'_, RequestId, BookingRequest>> {
        self.requests.get_mut(id)
    }

    pub(super) fn collect_requests(
        &self,
        keep: impl Fn(&BookingRequest) -> bool,
    ) -> Vec<BookingRequest> {
        self.requests
            .iter()
            .filter(|e| keep(e.value()))
            .map(|e| e.value().clone())
            .collect()
    }

    /// Lookup occupancy → room, then acquire the room's write lock.
    pub(super) async fn resolve_occupancy_write(
        &self,
        id: &OccupancyId,
    ) -> Result<(RoomId, tokio::sync::OwnedRwLockWriteGuard<RoomState>), EngineError> {
        let room_id = self
            .room_for_occupancy(id)
            .ok_or(EngineError::NotFound(*id))?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.write_owned().await;
        Ok((room_id, guard))
    }

    /// Drop every cached availability/listing result. Fired by every
    /// mutation to a room or an occupancy; readers recompute lazily.
    pub(super) fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
