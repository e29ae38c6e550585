//! Domain types for activity journey planning.
//!
//! This module contains the validated connection model and the timezone-aware
//! time primitives everything else builds on. Types enforce their invariants
//! at construction time, so code that receives them can trust their validity.

mod connection;
mod error;
mod leg;
mod time;

pub use connection::{Connection, ConnectionId, Direction};
pub use error::DomainError;
pub use leg::{Alert, Leg, LegKind, Vehicle};
pub use time::{
    CivilDate, LocalTimeOfDay, TIME_OF_DAY_UNAVAILABLE, TimeError, UTC_INSTANT_FALLBACK,
    UTC_TIME_OF_DAY_FALLBACK, add_minutes, anchor, config_time_to_local_time_of_day,
    earlier_of, earlier_of_same_day, later_of, later_of_same_day, local_time_of_day,
    local_time_to_utc_instant, local_time_to_utc_time_of_day, parse_instant,
    utc_instant_to_local_time_of_day, zoned_local,
};
