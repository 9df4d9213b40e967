//! Time zone handling and recurrence expansion.

mod recurrence;
mod timezone;
mod windows_zones;

pub use recurrence::{FeedAccumulator, occurrences};
pub use timezone::{
    AnchorZone, ConversionError, TimeZoneResolver, local_wall_clock_to_utc, normalize_zone, to_utc,
};
pub use windows_zones::strip_offset_prefix;
