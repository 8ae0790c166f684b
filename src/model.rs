use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub type RoomId = Ulid;
pub type OccupancyId = Ulid;
pub type RequestId = Ulid;
pub type UserId = Ulid;

/// Inclusive section range `[start_section, end_section]` within one day.
/// Sections are 1-based discrete scheduling units (class periods).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionSpan {
    pub start_section: u32,
    pub end_section: u32,
}

impl SectionSpan {
    /// Plain constructor; ordering and range checks live in the engine's
    /// validation so a degenerate span is reportable, not a panic.
    pub fn new(start_section: u32, end_section: u32) -> Self {
        Self {
            start_section,
            end_section,
        }
    }

    /// Inclusive-boundary overlap: a range ending where another begins
    /// shares that section, so `[1,2]` and `[2,3]` DO overlap.
    pub fn overlaps(&self, other: &SectionSpan) -> bool {
        self.start_section <= other.end_section && other.start_section <= self.end_section
    }

    pub fn section_count(&self) -> u32 {
        self.end_section - self.start_section + 1
    }

    pub fn contains_section(&self, section: u32) -> bool {
        self.start_section <= section && section <= self.end_section
    }
}

/// `1 = Monday … 7 = Sunday`, derived from the calendar date.
pub fn week_day_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    /// Participates in availability search.
    Available,
    /// Out of service; never returned as free.
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub building: String,
    pub room_number: String,
    pub capacity: u32,
    pub has_projector: bool,
    pub has_computer: bool,
    pub status: RoomStatus,
}

impl Room {
    /// Human-readable label, e.g. `"A-101"`.
    pub fn display_name(&self) -> String {
        format!("{}-{}", self.building, self.room_number)
    }
}

/// A committed, conflict-free reservation of one room for one date and
/// section range. The course/teacher/reason fields are display-only
/// denormalizations and never enter conflict logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub id: OccupancyId,
    pub room_id: RoomId,
    pub date: NaiveDate,
    /// Derived from `date`: 1 = Monday … 7 = Sunday.
    pub week_day: u8,
    pub span: SectionSpan,
    pub course_name: Option<String>,
    pub teacher_name: Option<String>,
    pub reason: Option<String>,
}

impl Occupancy {
    pub fn new(
        room_id: RoomId,
        date: NaiveDate,
        span: SectionSpan,
        course_name: Option<String>,
        teacher_name: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Ulid::new(),
            room_id,
            date,
            week_day: week_day_of(date),
            span,
            course_name,
            teacher_name,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "PENDING"),
            RequestStatus::Approved => write!(f, "APPROVED"),
            RequestStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A user-submitted, not-yet-committed reservation proposal. Transitions
/// only `Pending → Approved` and `Pending → Rejected`; both are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub applicant_name: String,
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub span: SectionSpan,
    pub reason: String,
    pub course_name: Option<String>,
    pub teacher_name: Option<String>,
    pub status: RequestStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

// ── Operation parameter types ────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub building: String,
    pub room_number: String,
    pub capacity: u32,
    pub has_projector: bool,
    pub has_computer: bool,
    /// Defaults to `Available` when not supplied.
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Clone)]
pub struct RoomUpdate {
    pub building: String,
    pub room_number: String,
    pub capacity: u32,
    pub has_projector: bool,
    pub has_computer: bool,
    pub status: RoomStatus,
}

#[derive(Debug, Clone)]
pub struct NewOccupancy {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub span: SectionSpan,
    pub course_name: Option<String>,
    pub teacher_name: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub room_id: RoomId,
    pub date: NaiveDate,
    pub span: SectionSpan,
    pub reason: String,
    pub applicant_name: String,
    pub course_name: Option<String>,
    pub teacher_name: Option<String>,
}

// ── Per-room calendar state ──────────────────────────────────────

/// One room plus every occupancy booked against it, sorted by
/// `(date, start_section)`. Lives behind the engine's per-room lock.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub room: Room,
    pub occupancies: Vec<Occupancy>,
}

impl RoomState {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            occupancies: Vec::new(),
        }
    }

    /// Insert maintaining sort order by (date, start_section).
    pub fn insert_occupancy(&mut self, occ: Occupancy) {
        let key = (occ.date, occ.span.start_section);
        let pos = self
            .occupancies
            .binary_search_by_key(&key, |o| (o.date, o.span.start_section))
            .unwrap_or_else(|e| e);
        self.occupancies.insert(pos, occ);
    }

    pub fn remove_occupancy(&mut self, id: OccupancyId) -> Option<Occupancy> {
        let pos = self.occupancies.iter().position(|o| o.id == id)?;
        Some(self.occupancies.remove(pos))
    }

    pub fn get_occupancy(&self, id: OccupancyId) -> Option<&Occupancy> {
        self.occupancies.iter().find(|o| o.id == id)
    }

    /// Occupancies on `date` whose section range overlaps `span`.
    pub fn occupancies_on(
        &self,
        date: NaiveDate,
        span: SectionSpan,
    ) -> impl Iterator<Item = &Occupancy> {
        self.occupancies
            .iter()
            .filter(move |o| o.date == date && o.span.overlaps(&span))
    }

    /// Full schedule for one day, already sorted by start section.
    pub fn day_schedule(&self, date: NaiveDate) -> impl Iterator<Item = &Occupancy> {
        self.occupancies.iter().filter(move |o| o.date == date)
    }
}
