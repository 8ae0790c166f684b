use chrono::NaiveDate;

use crate::limits::*;
use crate::model::*;

use super::{Engine, EngineError};

pub(crate) fn validate_span(span: &SectionSpan) -> Result<(), EngineError> {
    if span.start_section < 1 {
        return Err(EngineError::InvalidArgument("start_section must be >= 1"));
    }
    if span.start_section > span.end_section {
        return Err(EngineError::InvalidArgument(
            "start_section must not exceed end_section",
        ));
    }
    if span.end_section > MAX_SECTIONS_PER_DAY {
        return Err(EngineError::LimitExceeded("section index beyond day range"));
    }
    Ok(())
}

/// First occupancy on the room's calendar that overlaps `(date, span)`,
/// after dropping `exclude` (the update path excludes the record being
/// rewritten). Pure scan over state the caller has locked.
pub(crate) fn first_conflict(
    rs: &RoomState,
    date: NaiveDate,
    span: &SectionSpan,
    exclude: Option<OccupancyId>,
) -> Option<OccupancyId> {
    rs.occupancies_on(date, *span)
        .map(|o| o.id)
        .find(|id| exclude != Some(*id))
}

pub(crate) fn check_no_conflict(
    rs: &RoomState,
    date: NaiveDate,
    span: &SectionSpan,
    exclude: Option<OccupancyId>,
) -> Result<(), EngineError> {
    match first_conflict(rs, date, span, exclude) {
        Some(id) => {
            metrics::counter!(crate::observability::CONFLICTS_DETECTED_TOTAL).increment(1);
            Err(EngineError::Conflict(id))
        }
        None => Ok(()),
    }
}

impl Engine {
    /// Read-only conflict probe: does any occupancy for `(room_id, date)`
    /// overlap `span`? `exclude` drops one record before evaluating.
    /// "No conflict" is the success path, never an error.
    pub async fn has_conflict(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        span: SectionSpan,
        exclude: Option<OccupancyId>,
    ) -> Result<bool, EngineError> {
        validate_span(&span)?;
        let rs = self
            .get_room_state(&room_id)
            .ok_or(EngineError::NotFound(room_id))?;
        let guard = rs.read().await;
        Ok(first_conflict(&guard, date, &span, exclude).is_some())
    }
}
