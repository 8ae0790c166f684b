//! Booking conflict engine for shared classrooms on a section-based
//! calendar: interval conflict checking, free-room search, an approval
//! workflow that atomically converts a pending request into a schedule
//! entry, and a broad-invalidate read-through cache over the read paths.
//!
//! The engine guarantees that for any room and date, approved occupancies
//! never overlap. Identity resolution, HTTP handling, and durable storage
//! are the embedding application's concern.

pub mod auth;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;

pub use auth::{Caller, Role};
pub use engine::{Engine, EngineError, ListingKey};
