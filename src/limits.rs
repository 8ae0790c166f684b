//! Hard bounds on caller-supplied input, checked before any state access.

/// Highest valid section index within one calendar day. Sections are 1-based.
pub const MAX_SECTIONS_PER_DAY: u32 = 16;

/// Max length for building names, room numbers, course and teacher names.
pub const MAX_NAME_LEN: usize = 128;

/// Max length for request justification / occupancy reason text.
pub const MAX_REASON_LEN: usize = 512;
