use chrono::NaiveDate;

use crate::limits::MAX_NAME_LEN;
use crate::model::*;

use super::cache::ListingKey;
use super::conflict::validate_span;
use super::{Engine, EngineError};

impl Engine {
    // ── Room lookups and cached listings ─────────────────────

    pub async fn get_room(&self, id: RoomId) -> Result<Room, EngineError> {
        let rs = self
            .get_room_state(&id)
            .ok_or(EngineError::NotFound(id))?;
        let guard = rs.read().await;
        Ok(guard.room.clone())
    }

    pub async fn list_rooms(&self) -> Vec<Room> {
        self.cached_listing(ListingKey::AllRooms, |_| true).await
    }

    pub async fn list_available_rooms(&self) -> Vec<Room> {
        self.cached_listing(ListingKey::AvailableRooms, |r| {
            r.status == RoomStatus::Available
        })
        .await
    }

    pub async fn list_rooms_by_building(&self, building: &str) -> Result<Vec<Room>, EngineError> {
        if building.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("building name too long"));
        }
        let key = ListingKey::ByBuilding(building.to_owned());
        Ok(self.cached_listing(key, |r| r.building == building).await)
    }

    pub async fn list_rooms_by_min_capacity(&self, min_capacity: u32) -> Vec<Room> {
        self.cached_listing(ListingKey::ByMinCapacity(min_capacity), |r| {
            r.capacity >= min_capacity
        })
        .await
    }

    async fn cached_listing(&self, key: ListingKey, keep: impl Fn(&Room) -> bool) -> Vec<Room> {
        let epoch = self.cache().epoch();
        if let Some(hit) = self.cache().get_listing(&key) {
            return hit;
        }
        let rooms = self.collect_rooms(keep).await;
        self.cache().store_listing(epoch, key, rooms.clone());
        rooms
    }

    /// Snapshot of every room matching `keep`, in room-id order.
    async fn collect_rooms(&self, keep: impl Fn(&Room) -> bool) -> Vec<Room> {
        let mut out = Vec::new();
        for id in self.room_ids() {
            if let Some(rs) = self.get_room_state(&id) {
                let guard = rs.read().await;
                if keep(&guard.room) {
                    out.push(guard.room.clone());
                }
            }
        }
        out.sort_by_key(|r| r.id);
        out
    }

    // ── Occupancy projections ────────────────────────────────

    pub async fn get_occupancy(&self, id: OccupancyId) -> Result<Occupancy, EngineError> {
        let room_id = self
            .room_for_occupancy(&id)
            .ok_or(EngineError::NotFound(id))?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.read().await;
        guard
            .get_occupancy(id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// One room's schedule for one day, sorted by start section. An
    /// unknown room yields an empty schedule.
    pub async fn list_occupancies(&self, room_id: RoomId, date: NaiveDate) -> Vec<Occupancy> {
        let Some(rs) = self.get_room_state(&room_id) else {
            return Vec::new();
        };
        let guard = rs.read().await;
        guard.day_schedule(date).cloned().collect()
    }

    /// Every occupancy on `date` overlapping `span`, across all rooms:
    /// the vectorized form of the conflict predicate.
    pub async fn list_occupancies_on(
        &self,
        date: NaiveDate,
        span: SectionSpan,
    ) -> Result<Vec<Occupancy>, EngineError> {
        validate_span(&span)?;
        let mut out = Vec::new();
        for id in self.room_ids() {
            if let Some(rs) = self.get_room_state(&id) {
                let guard = rs.read().await;
                out.extend(guard.occupancies_on(date, span).cloned());
            }
        }
        out.sort_by_key(|o| (o.room_id, o.span.start_section));
        Ok(out)
    }

    // ── Request lookup ───────────────────────────────────────

    pub fn get_request(&self, id: RequestId) -> Result<BookingRequest, EngineError> {
        self.get_request_snapshot(&id)
            .ok_or(EngineError::NotFound(id))
    }
}
