//! Human-readable durations.
//!
//! Minute counts are rendered as "H:MMh" or "M min" tokens, with the unit
//! suffixes supplied by an injected [`Translate`] implementation.

mod duration;
mod translate;

pub use duration::{
    DurationResult, format_minutes, format_stay, instant_difference, local_duration_result,
    parse_minutes,
};
pub use translate::{EnglishUnits, Translate, TranslationKey, Translations};
