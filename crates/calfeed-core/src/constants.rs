/// Hours added on both sides of the visible window so that zone-shifted
/// all-day events and events just outside the nominal range survive the
/// overlap filter.
pub const DEFAULT_BUFFER_HOURS: u32 = 12;

/// Upper bound accepted for `window.buffer_hours`.
pub const MAX_BUFFER_HOURS: u32 = 7 * 24;

pub const DEFAULT_DAYS_BEFORE: u32 = 1;
pub const DEFAULT_DAYS_AHEAD: u32 = 7;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u32 = 30;

pub const USER_AGENT: &str = const_str::concat!("calfeed/", env!("CARGO_PKG_VERSION"));
