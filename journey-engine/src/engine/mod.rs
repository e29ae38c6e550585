//! Connection compatibility and activity-window computation.
//!
//! [`CompatibilityEngine`] owns the normalized candidates of one search and
//! the user's selection on each side. Every selection change re-derives the
//! compatibility flags, the activity window and its duration warning.

mod compat;
mod config;
mod recommend;
mod snapshot;
mod state;

pub use compat::{CompatibilityEngine, SelectionError};
pub use config::{ActivityConfig, ActivityDates, ConfigError};
pub use recommend::resolve_recommended;
pub use snapshot::{CandidateView, EngineSnapshot, LegView};
pub use state::{
    ActivityTimes, CandidateStatus, DurationWarning, Fit, SelectionPhase, SelectionState, Stay,
    WarningKind,
};
