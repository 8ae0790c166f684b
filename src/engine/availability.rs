use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::*;

use super::cache::FreeRoomsKey;
use super::conflict::validate_span;
use super::{Engine, EngineError};

impl Engine {
    /// Rooms with zero overlapping occupancy for the full `(date, span)`
    /// window: status Available, capacity >= `min_capacity` when given.
    /// A room with a conflict anywhere inside the window is excluded
    /// entirely. Results are in room-id order (the candidate fetch order).
    ///
    /// Served through the availability cache; a miss recomputes and stores.
    pub async fn find_free_rooms(
        &self,
        date: NaiveDate,
        span: SectionSpan,
        min_capacity: Option<u32>,
    ) -> Result<Vec<Room>, EngineError> {
        validate_span(&span)?;

        let key = FreeRoomsKey {
            date,
            span,
            min_capacity,
        };
        let epoch = self.cache().epoch();
        if let Some(hit) = self.cache().get_free_rooms(&key) {
            return Ok(hit);
        }

        let free = self.compute_free_rooms(date, span, min_capacity).await;
        self.cache().store_free_rooms(epoch, key, free.clone());
        Ok(free)
    }

    async fn compute_free_rooms(
        &self,
        date: NaiveDate,
        span: SectionSpan,
        min_capacity: Option<u32>,
    ) -> Vec<Room> {
        // One pass per room: note whether it is occupied anywhere in the
        // window, and whether it qualifies as a candidate.
        let mut occupied: HashSet<RoomId> = HashSet::new();
        let mut candidates: Vec<Room> = Vec::new();

        for id in self.room_ids() {
            let Some(rs) = self.get_room_state(&id) else {
                continue; // deleted between snapshot and lock
            };
            let guard = rs.read().await;
            if guard.occupancies_on(date, span).next().is_some() {
                occupied.insert(id);
            }
            let room = &guard.room;
            if room.status == RoomStatus::Available
                && min_capacity.is_none_or(|min| room.capacity >= min)
            {
                candidates.push(room.clone());
            }
        }

        candidates.sort_by_key(|r| r.id);
        candidates.retain(|r| !occupied.contains(&r.id));
        candidates
    }
}
