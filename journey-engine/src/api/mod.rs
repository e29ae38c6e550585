//! Routing API ingestion.
//!
//! Connections arrive pre-computed as JSON. Times are ISO 8601 instants; an
//! offset other than `Z` is accepted and normalized to UTC.

mod convert;
mod types;

pub use convert::{ConversionError, convert_connection, convert_connections};
pub use types::{ConnectionsResponse, RawAlert, RawConnection, RawLeg};
