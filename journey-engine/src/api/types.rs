//! Routing API response DTOs.
//!
//! These types map directly to the JSON the routing API returns. Fields the
//! API omits for some connections are `Option`; conversion into domain types
//! happens in [`super::convert`].

use serde::Deserialize;

/// Candidate connections for one search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsResponse {
    /// Connections to the activity.
    #[serde(default)]
    pub to: Vec<RawConnection>,

    /// Connections home from the activity.
    #[serde(default)]
    pub from: Vec<RawConnection>,

    /// Id of the connection the API recommends to the activity.
    pub recommended_to: Option<String>,

    /// Id of the connection the API recommends home.
    pub recommended_from: Option<String>,
}

/// One connection as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnection {
    pub id: String,

    #[serde(default)]
    pub legs: Vec<RawLeg>,

    /// Departure of the whole connection (ISO 8601). Defaults to the first
    /// leg's departure.
    pub start: Option<String>,

    /// Arrival of the whole connection (ISO 8601). Defaults to the last
    /// leg's arrival.
    pub end: Option<String>,

    /// Number of changes. Derived from the rides when absent.
    pub transfers: Option<u32>,

    /// Whether timing is fixed only by the activity bounds.
    #[serde(default)]
    pub anytime: bool,
}

/// One leg as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLeg {
    /// Leg type, e.g. "WALK", "TRANSFER" or "RIDE".
    #[serde(rename = "type")]
    pub kind: String,

    /// Departure time (ISO 8601, UTC).
    pub departure: String,

    /// Arrival time (ISO 8601, UTC).
    pub arrival: String,

    /// Line name shown to passengers.
    pub line: Option<String>,

    /// Transport mode, e.g. "BUS".
    pub mode: Option<String>,

    /// Headsign.
    pub direction: Option<String>,

    /// Name of the place the leg starts at.
    pub from_name: Option<String>,

    /// Name of the place the leg ends at.
    pub to_name: Option<String>,

    #[serde(default)]
    pub alerts: Vec<RawAlert>,
}

/// A service alert as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAlert {
    pub summary: String,
    pub description: Option<String>,
}
