//! Recommended connection lookup.
//!
//! The routing API names its recommended connection by id. Positions are not
//! stable: normalization and conversion may drop connections or legs, so the
//! id is resolved against the final list.

use crate::domain::{Connection, ConnectionId};

/// Position of the recommended connection in a normalized list.
///
/// Falls back to the first connection when the id is missing or unknown.
/// An empty list has no recommendation.
///
/// # Examples
///
/// ```
/// use journey_engine::domain::{Connection, ConnectionId, Leg, LegKind};
/// use journey_engine::engine::resolve_recommended;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let dep = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
/// let make = |id: &str| {
///     let leg = Leg::new(LegKind::Ride, dep, dep + Duration::minutes(30)).unwrap();
///     Connection::new(ConnectionId::new(id), vec![leg], 0, false).unwrap()
/// };
/// let list = vec![make("a"), make("b")];
///
/// assert_eq!(resolve_recommended(&list, Some(&ConnectionId::new("b"))), Some(1));
/// assert_eq!(resolve_recommended(&list, Some(&ConnectionId::new("zz"))), Some(0));
/// assert_eq!(resolve_recommended(&[], Some(&ConnectionId::new("b"))), None);
/// ```
pub fn resolve_recommended(connections: &[Connection], id: Option<&ConnectionId>) -> Option<usize> {
    if connections.is_empty() {
        return None;
    }
    let position = id.and_then(|id| connections.iter().position(|c| c.id() == id));
    Some(position.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, LegKind};
    use chrono::{Duration, TimeZone, Utc};

    fn make(id: &str) -> Connection {
        let dep = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let leg = Leg::new(LegKind::Ride, dep, dep + Duration::minutes(30)).unwrap();
        Connection::new(ConnectionId::new(id), vec![leg], 0, false).unwrap()
    }

    #[test]
    fn found_by_id() {
        let list = vec![make("a"), make("b"), make("c")];
        assert_eq!(
            resolve_recommended(&list, Some(&ConnectionId::new("c"))),
            Some(2)
        );
    }

    #[test]
    fn missing_id_defaults_to_first() {
        let list = vec![make("a"), make("b")];
        assert_eq!(resolve_recommended(&list, None), Some(0));
        assert_eq!(
            resolve_recommended(&list, Some(&ConnectionId::new("gone"))),
            Some(0)
        );
    }

    #[test]
    fn empty_list_has_no_recommendation() {
        assert_eq!(resolve_recommended(&[], None), None);
    }
}
