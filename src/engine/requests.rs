use chrono::Utc;
use tracing::info;
use ulid::Ulid;

use crate::auth::Caller;
use crate::limits::*;
use crate::model::*;
use crate::observability::{APPROVALS_TOTAL, REJECTIONS_TOTAL, REQUESTS_SUBMITTED_TOTAL};

use super::conflict::{check_no_conflict, validate_span};
use super::{Engine, EngineError};

impl Engine {
    // ── Booking request workflow ─────────────────────────────

    /// File a booking request. Deliberately NOT conflict-checked: competing
    /// PENDING requests for the same window may coexist, and conflict is
    /// resolved at approval time (first approved wins).
    pub async fn submit_request(
        &self,
        caller: &Caller,
        submit: SubmitRequest,
    ) -> Result<BookingRequest, EngineError> {
        validate_span(&submit.span)?;
        if submit.reason.len() > MAX_REASON_LEN {
            return Err(EngineError::LimitExceeded("reason too long"));
        }
        if submit.applicant_name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("applicant name too long"));
        }
        if self.get_room_state(&submit.room_id).is_none() {
            return Err(EngineError::NotFound(submit.room_id));
        }

        let now = Utc::now();
        let request = BookingRequest {
            id: Ulid::new(),
            user_id: caller.user_id,
            applicant_name: submit.applicant_name,
            room_id: submit.room_id,
            date: submit.date,
            span: submit.span,
            reason: submit.reason,
            course_name: submit.course_name,
            teacher_name: submit.teacher_name,
            status: RequestStatus::Pending,
            create_time: now,
            update_time: now,
        };
        self.insert_request(request.clone());

        metrics::counter!(REQUESTS_SUBMITTED_TOTAL).increment(1);
        info!(id = %request.id, room = %request.room_id, date = %request.date, "request submitted");
        Ok(request)
    }

    /// Approve a PENDING request: conflict-check the target window and, if
    /// clear, materialize the schedule entry and flip the request status as
    /// one unit under the room's write lock. On `Conflict` the request
    /// stays PENDING; the operator rejects or redirects it manually.
    pub async fn approve_request(
        &self,
        caller: &Caller,
        id: RequestId,
    ) -> Result<Occupancy, EngineError> {
        caller.require_admin("approve request")?;

        let snapshot = self
            .get_request_snapshot(&id)
            .ok_or(EngineError::NotFound(id))?;
        if snapshot.status != RequestStatus::Pending {
            return Err(EngineError::InvalidState {
                expected: RequestStatus::Pending,
                actual: snapshot.status,
            });
        }

        let rs = self
            .get_room_state(&snapshot.room_id)
            .ok_or(EngineError::NotFound(snapshot.room_id))?;
        let mut room_guard = rs.write().await;
        // A concurrent delete_room may have detached this calendar while
        // we waited on the lock.
        if !self.room_live(&snapshot.room_id) {
            return Err(EngineError::NotFound(snapshot.room_id));
        }

        // Re-enter the request under exclusive map access: a concurrent
        // reject may have won between the snapshot and the room lock.
        let mut request = self
            .request_entry(&id)
            .ok_or(EngineError::NotFound(id))?;
        if request.status != RequestStatus::Pending {
            return Err(EngineError::InvalidState {
                expected: RequestStatus::Pending,
                actual: request.status,
            });
        }

        check_no_conflict(&room_guard, request.date, &request.span, None)?;

        // No fallible step between the two writes: occupancy insert and
        // status flip commit together or not at all.
        let occ = Occupancy::new(
            request.room_id,
            request.date,
            request.span,
            request.course_name.clone(),
            request.teacher_name.clone(),
            Some(request.reason.clone()),
        );
        room_guard.insert_occupancy(occ.clone());
        self.map_occupancy(occ.id, occ.room_id);
        request.status = RequestStatus::Approved;
        request.update_time = Utc::now();
        drop(request);
        drop(room_guard);

        self.invalidate_cache();
        metrics::counter!(APPROVALS_TOTAL).increment(1);
        info!(request = %id, occupancy = %occ.id, room = %occ.room_id, "request approved");
        Ok(occ)
    }

    /// Reject a PENDING request. Terminal; repeating the call fails with
    /// `InvalidState`, never a silent success.
    pub async fn reject_request(&self, caller: &Caller, id: RequestId) -> Result<(), EngineError> {
        caller.require_admin("reject request")?;

        let mut request = self
            .request_entry(&id)
            .ok_or(EngineError::NotFound(id))?;
        if request.status != RequestStatus::Pending {
            return Err(EngineError::InvalidState {
                expected: RequestStatus::Pending,
                actual: request.status,
            });
        }
        request.status = RequestStatus::Rejected;
        request.update_time = Utc::now();
        drop(request);

        metrics::counter!(REJECTIONS_TOTAL).increment(1);
        info!(request = %id, "request rejected");
        Ok(())
    }

    // ── Request listings ─────────────────────────────────────

    /// Requests filed by `user_id`, newest first.
    pub fn list_my_requests(&self, user_id: UserId) -> Vec<BookingRequest> {
        let mut out = self.collect_requests(|r| r.user_id == user_id);
        out.sort_by(|a, b| b.create_time.cmp(&a.create_time).then(b.id.cmp(&a.id)));
        out
    }

    /// All PENDING requests, oldest first (FIFO review order).
    pub fn list_pending_requests(&self) -> Vec<BookingRequest> {
        let mut out = self.collect_requests(|r| r.status == RequestStatus::Pending);
        out.sort_by(|a, b| a.create_time.cmp(&b.create_time).then(a.id.cmp(&b.id)));
        out
    }
}
