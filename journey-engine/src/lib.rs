//! Timezone-aware journey time and compatibility engine.
//!
//! Given candidate public-transport connections to and from an activity,
//! lets a user pick a compatible pair and derives how long they get to
//! spend at the activity.

pub mod api;
pub mod domain;
pub mod engine;
pub mod format;
pub mod normalize;
pub mod search_file;
