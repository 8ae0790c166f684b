use tracing::info;
use ulid::Ulid;

use crate::auth::Caller;
use crate::limits::*;
use crate::model::*;

use super::conflict::{check_no_conflict, validate_span};
use super::{Engine, EngineError};

fn validate_name(s: &str, what: &'static str) -> Result<(), EngineError> {
    if s.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded(what));
    }
    Ok(())
}

fn validate_opt_name(s: &Option<String>, what: &'static str) -> Result<(), EngineError> {
    match s {
        Some(s) => validate_name(s, what),
        None => Ok(()),
    }
}

impl Engine {
    // ── Room administration ──────────────────────────────────

    pub async fn create_room(
        &self,
        caller: &Caller,
        room: NewRoom,
    ) -> Result<Room, EngineError> {
        caller.require_admin("create room")?;
        validate_name(&room.building, "building name too long")?;
        validate_name(&room.room_number, "room number too long")?;

        let room = Room {
            id: Ulid::new(),
            building: room.building,
            room_number: room.room_number,
            capacity: room.capacity,
            has_projector: room.has_projector,
            has_computer: room.has_computer,
            status: room.status.unwrap_or(RoomStatus::Available),
        };
        self.insert_room_state(room.id, RoomState::new(room.clone()));
        self.invalidate_cache();
        info!(room = %room.display_name(), id = %room.id, "room created");
        Ok(room)
    }

    pub async fn update_room(
        &self,
        caller: &Caller,
        id: RoomId,
        update: RoomUpdate,
    ) -> Result<Room, EngineError> {
        caller.require_admin("update room")?;
        validate_name(&update.building, "building name too long")?;
        validate_name(&update.room_number, "room number too long")?;

        let rs = self
            .get_room_state(&id)
            .ok_or(EngineError::NotFound(id))?;
        let mut guard = rs.write().await;
        if !self.room_live(&id) {
            return Err(EngineError::NotFound(id));
        }
        guard.room.building = update.building;
        guard.room.room_number = update.room_number;
        guard.room.capacity = update.capacity;
        guard.room.has_projector = update.has_projector;
        guard.room.has_computer = update.has_computer;
        guard.room.status = update.status;
        let room = guard.room.clone();
        drop(guard);

        self.invalidate_cache();
        info!(id = %id, "room updated");
        Ok(room)
    }

    pub async fn delete_room(&self, caller: &Caller, id: RoomId) -> Result<(), EngineError> {
        caller.require_admin("delete room")?;
        let (_, rs) = self
            .remove_room_state(&id)
            .ok_or(EngineError::NotFound(id))?;
        // Sole owner after removal; clean the occupancy index.
        let guard = rs.read().await;
        for occ in &guard.occupancies {
            self.unmap_occupancy(&occ.id);
        }
        drop(guard);

        self.invalidate_cache();
        info!(id = %id, "room deleted");
        Ok(())
    }

    // ── Direct occupancy administration ──────────────────────
    //
    // The administrative counterpart of the approval workflow: schedule
    // entries written here are conflict-gated exactly like approvals.

    pub async fn create_occupancy(
        &self,
        caller: &Caller,
        new: NewOccupancy,
    ) -> Result<Occupancy, EngineError> {
        caller.require_admin("create occupancy")?;
        validate_span(&new.span)?;
        validate_opt_name(&new.course_name, "course name too long")?;
        validate_opt_name(&new.teacher_name, "teacher name too long")?;
        if new.reason.as_ref().is_some_and(|r| r.len() > MAX_REASON_LEN) {
            return Err(EngineError::LimitExceeded("reason too long"));
        }

        let rs = self
            .get_room_state(&new.room_id)
            .ok_or(EngineError::NotFound(new.room_id))?;
        let mut guard = rs.write().await;
        if !self.room_live(&new.room_id) {
            return Err(EngineError::NotFound(new.room_id));
        }
        check_no_conflict(&guard, new.date, &new.span, None)?;

        let occ = Occupancy::new(
            new.room_id,
            new.date,
            new.span,
            new.course_name,
            new.teacher_name,
            new.reason,
        );
        guard.insert_occupancy(occ.clone());
        // Index registration stays under the lock so a reader that sees
        // the occupancy can always resolve it by id.
        self.map_occupancy(occ.id, occ.room_id);
        drop(guard);

        self.invalidate_cache();
        info!(id = %occ.id, room = %occ.room_id, date = %occ.date, "occupancy created");
        Ok(occ)
    }

    /// Rewrite an occupancy in place, re-running the conflict check with
    /// the record itself excluded. May move the entry to another room, in
    /// which case both room locks are taken in id order.
    pub async fn update_occupancy(
        &self,
        caller: &Caller,
        id: OccupancyId,
        update: NewOccupancy,
    ) -> Result<Occupancy, EngineError> {
        caller.require_admin("update occupancy")?;
        validate_span(&update.span)?;
        validate_opt_name(&update.course_name, "course name too long")?;
        validate_opt_name(&update.teacher_name, "teacher name too long")?;
        if update.reason.as_ref().is_some_and(|r| r.len() > MAX_REASON_LEN) {
            return Err(EngineError::LimitExceeded("reason too long"));
        }

        let current_room = self
            .room_for_occupancy(&id)
            .ok_or(EngineError::NotFound(id))?;
        let occ = Occupancy {
            id,
            room_id: update.room_id,
            date: update.date,
            week_day: week_day_of(update.date),
            span: update.span,
            course_name: update.course_name,
            teacher_name: update.teacher_name,
            reason: update.reason,
        };

        if update.room_id == current_room {
            let rs = self
                .get_room_state(&current_room)
                .ok_or(EngineError::NotFound(current_room))?;
            let mut guard = rs.write().await;
            if !self.room_live(&current_room) {
                return Err(EngineError::NotFound(current_room));
            }
            if guard.get_occupancy(id).is_none() {
                return Err(EngineError::NotFound(id));
            }
            check_no_conflict(&guard, update.date, &update.span, Some(id))?;
            guard.remove_occupancy(id);
            guard.insert_occupancy(occ.clone());
        } else {
            let src = self
                .get_room_state(&current_room)
                .ok_or(EngineError::NotFound(current_room))?;
            let dst = self
                .get_room_state(&update.room_id)
                .ok_or(EngineError::NotFound(update.room_id))?;
            // Lock both rooms in id order to prevent deadlocks.
            let (mut src_guard, mut dst_guard) = if current_room < update.room_id {
                let s = src.write_owned().await;
                let d = dst.write_owned().await;
                (s, d)
            } else {
                let d = dst.write_owned().await;
                let s = src.write_owned().await;
                (s, d)
            };
            if !self.room_live(&current_room) {
                return Err(EngineError::NotFound(current_room));
            }
            if !self.room_live(&update.room_id) {
                return Err(EngineError::NotFound(update.room_id));
            }
            if src_guard.get_occupancy(id).is_none() {
                return Err(EngineError::NotFound(id));
            }
            check_no_conflict(&dst_guard, update.date, &update.span, Some(id))?;
            src_guard.remove_occupancy(id);
            dst_guard.insert_occupancy(occ.clone());
            self.map_occupancy(id, update.room_id);
        }

        self.invalidate_cache();
        info!(id = %id, room = %occ.room_id, date = %occ.date, "occupancy updated");
        Ok(occ)
    }

    pub async fn delete_occupancy(
        &self,
        caller: &Caller,
        id: OccupancyId,
    ) -> Result<(), EngineError> {
        caller.require_admin("delete occupancy")?;
        let (room_id, mut guard) = self.resolve_occupancy_write(&id).await?;
        if !self.room_live(&room_id) {
            return Err(EngineError::NotFound(id));
        }
        guard
            .remove_occupancy(id)
            .ok_or(EngineError::NotFound(id))?;
        self.unmap_occupancy(&id);
        drop(guard);

        self.invalidate_cache();
        info!(id = %id, room = %room_id, "occupancy deleted");
        Ok(())
    }
}
