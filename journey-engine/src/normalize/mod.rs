//! Post-processing of connections received from the routing API.
//!
//! Each connection is normalized exactly once, before any selection logic
//! sees it:
//!
//! 1. Anytime connections get a concrete window derived from the configured
//!    activity bounds.
//! 2. A short walk at the activity end of a connection is dropped, moving the
//!    connection's arrival (or departure) to the stop.
//!
//! The connection's `normalized` flag guards against a second pass.

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::domain::{Connection, Direction, Leg, TimeError, anchor};
use crate::engine::{ActivityConfig, ActivityDates};

/// Walks at or below this length at the activity end are dropped.
pub const NEGLIGIBLE_WALK_MINUTES: i64 = 5;

/// What normalization changed on a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOutcome {
    pub trimmed_walk: bool,
    pub synthesized_window: bool,
}

/// Applies the normalization rules for one search.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionNormalizer<'a> {
    config: &'a ActivityConfig,
    dates: ActivityDates,
}

impl<'a> ConnectionNormalizer<'a> {
    pub fn new(config: &'a ActivityConfig, dates: ActivityDates) -> Self {
        Self { config, dates }
    }

    /// The calendar day anytime connections in `direction` are anchored to.
    pub fn activity_date(&self, direction: Direction) -> NaiveDate {
        match direction {
            Direction::ToActivity => self.dates.start,
            Direction::FromActivity => self.dates.end_date(self.config.multiday),
        }
    }

    /// Normalize one connection in place.
    ///
    /// Does nothing if the connection was already normalized.
    pub fn normalize(&self, connection: &mut Connection, direction: Direction) -> NormalizeOutcome {
        if connection.is_normalized() {
            return NormalizeOutcome::default();
        }

        let synthesized_window = match synthesize_anytime(
            connection,
            direction,
            self.config,
            self.activity_date(direction),
        ) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(
                    connection = %connection.id(),
                    %direction,
                    error = %e,
                    "Cannot anchor anytime connection, keeping API window"
                );
                false
            }
        };
        let trimmed_walk = trim_terminal_walk(connection, direction);
        connection.mark_normalized();

        NormalizeOutcome {
            trimmed_walk,
            synthesized_window,
        }
    }

    /// Normalize a whole candidate list.
    pub fn normalize_all(
        &self,
        mut connections: Vec<Connection>,
        direction: Direction,
    ) -> Vec<Connection> {
        let mut trimmed = 0;
        let mut synthesized = 0;

        for connection in &mut connections {
            let outcome = self.normalize(connection, direction);
            trimmed += usize::from(outcome.trimmed_walk);
            synthesized += usize::from(outcome.synthesized_window);
        }

        debug!(
            %direction,
            connections = connections.len(),
            trimmed,
            synthesized,
            "Normalized connections"
        );

        connections
    }
}

fn is_negligible_walk(leg: &Leg) -> bool {
    leg.is_walk() && leg.duration() <= Duration::minutes(NEGLIGIBLE_WALK_MINUTES)
}

/// Drop a negligible walk at the activity end of a connection.
///
/// For a connection to the activity this is the last leg, and the connection
/// then ends when that walk would have started. For a connection from the
/// activity it is the first leg, and the connection then starts when that
/// walk would have ended. Connections with a single leg are left alone.
///
/// This applies the rule unconditionally; [`ConnectionNormalizer::normalize`]
/// is the guarded entry point.
///
/// Returns true if a leg was dropped.
pub fn trim_terminal_walk(connection: &mut Connection, direction: Direction) -> bool {
    if connection.leg_count() <= 1 {
        return false;
    }

    let (start, end) = (connection.start(), connection.end());
    match direction {
        Direction::ToActivity => {
            if !connection.legs().last().is_some_and(is_negligible_walk) {
                return false;
            }
            let Some(dropped) = connection.legs_mut().pop() else {
                return false;
            };
            connection.set_window(start, dropped.departure().max(start));
        }
        Direction::FromActivity => {
            if !connection.legs().first().is_some_and(is_negligible_walk) {
                return false;
            }
            let dropped = connection.legs_mut().remove(0);
            connection.set_window(dropped.arrival().min(end), end);
        }
    }

    debug!(
        connection = %connection.id(),
        %direction,
        "Dropped negligible walk at activity end"
    );
    true
}

/// Give an anytime connection a concrete window.
///
/// A connection to the activity arrives at the latest start time; one from
/// the activity leaves at the earliest end time. The walk keeps its length
/// and its legs move with the window.
///
/// Returns `Ok(false)` for scheduled connections.
pub fn synthesize_anytime(
    connection: &mut Connection,
    direction: Direction,
    config: &ActivityConfig,
    activity_date: NaiveDate,
) -> Result<bool, TimeError> {
    if !connection.is_anytime() {
        return Ok(false);
    }
    let (Some(first), Some(last)) = (connection.legs().first(), connection.legs().last()) else {
        return Ok(false);
    };
    let walk_length = last.arrival().signed_duration_since(first.departure());
    let first_departure = first.departure();

    let (start, end) = match direction {
        Direction::ToActivity => {
            let end = anchor(&config.latest_start_time, activity_date.into(), config.timezone)?
                .with_timezone(&Utc);
            (end - walk_length, end)
        }
        Direction::FromActivity => {
            let start = anchor(&config.earliest_end_time, activity_date.into(), config.timezone)?
                .with_timezone(&Utc);
            (start, start + walk_length)
        }
    };

    let shift = start.signed_duration_since(first_departure);
    for leg in connection.legs_mut() {
        let (departure, arrival) = (leg.departure() + shift, leg.arrival() + shift);
        leg.retime(departure, arrival);
    }
    connection.set_window(start, end);

    debug!(
        connection = %connection.id(),
        %direction,
        start = %start,
        end = %end,
        "Synthesized anytime window"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, LegKind};
    use chrono::{DateTime, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    fn leg(kind: LegKind, from: (u32, u32), to: (u32, u32)) -> Leg {
        Leg::new(kind, at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    fn connection(legs: Vec<Leg>) -> Connection {
        Connection::new(ConnectionId::new("c"), legs, 0, false).unwrap()
    }

    fn anytime(from: (u32, u32), to: (u32, u32)) -> Connection {
        Connection::new(
            ConnectionId::new("walk"),
            vec![leg(LegKind::Walk, from, to)],
            0,
            true,
        )
        .unwrap()
    }

    fn dates() -> ActivityDates {
        ActivityDates::single(chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn trims_short_final_walk_to_activity() {
        let mut conn = connection(vec![
            leg(LegKind::Ride, (8, 0), (8, 40)),
            leg(LegKind::Walk, (8, 41), (8, 45)),
        ]);

        assert!(trim_terminal_walk(&mut conn, Direction::ToActivity));
        assert_eq!(conn.leg_count(), 1);
        assert_eq!(conn.legs()[0].kind(), LegKind::Ride);
        assert_eq!(conn.start(), at(8, 0));
        // End moves to the dropped walk's departure.
        assert_eq!(conn.end(), at(8, 41));
    }

    #[test]
    fn keeps_long_final_walk() {
        let mut conn = connection(vec![
            leg(LegKind::Ride, (8, 0), (8, 40)),
            leg(LegKind::Walk, (8, 40), (8, 46)),
        ]);
        assert!(!trim_terminal_walk(&mut conn, Direction::ToActivity));
        assert_eq!(conn.leg_count(), 2);
        assert_eq!(conn.end(), at(8, 46));
    }

    #[test]
    fn five_minute_walk_is_negligible() {
        let mut conn = connection(vec![
            leg(LegKind::Ride, (8, 0), (8, 40)),
            leg(LegKind::Walk, (8, 40), (8, 45)),
        ]);
        assert!(trim_terminal_walk(&mut conn, Direction::ToActivity));
    }

    #[test]
    fn final_ride_is_never_trimmed() {
        let mut conn = connection(vec![
            leg(LegKind::Walk, (8, 0), (8, 3)),
            leg(LegKind::Ride, (8, 5), (8, 7)),
        ]);
        assert!(!trim_terminal_walk(&mut conn, Direction::ToActivity));
    }

    #[test]
    fn trims_short_first_walk_from_activity() {
        let mut conn = connection(vec![
            leg(LegKind::Walk, (17, 0), (17, 3)),
            leg(LegKind::Ride, (17, 5), (17, 50)),
        ]);

        assert!(trim_terminal_walk(&mut conn, Direction::FromActivity));
        assert_eq!(conn.leg_count(), 1);
        // Start moves to the dropped walk's arrival.
        assert_eq!(conn.start(), at(17, 3));
        assert_eq!(conn.end(), at(17, 50));
    }

    #[test]
    fn from_direction_ignores_last_leg() {
        let mut conn = connection(vec![
            leg(LegKind::Ride, (17, 5), (17, 50)),
            leg(LegKind::Walk, (17, 50), (17, 52)),
        ]);
        assert!(!trim_terminal_walk(&mut conn, Direction::FromActivity));
        assert_eq!(conn.leg_count(), 2);
    }

    #[test]
    fn single_leg_walk_untouched() {
        let mut conn = connection(vec![leg(LegKind::Walk, (8, 0), (8, 3))]);
        assert!(!trim_terminal_walk(&mut conn, Direction::ToActivity));
        assert!(!trim_terminal_walk(&mut conn, Direction::FromActivity));
        assert_eq!(conn.leg_count(), 1);
    }

    #[test]
    fn normalize_is_idempotent() {
        let config = ActivityConfig::default();
        let normalizer = ConnectionNormalizer::new(&config, dates());
        let mut conn = connection(vec![
            leg(LegKind::Ride, (8, 0), (8, 40)),
            leg(LegKind::Walk, (8, 40), (8, 43)),
            leg(LegKind::Walk, (8, 43), (8, 45)),
        ]);

        let first = normalizer.normalize(&mut conn, Direction::ToActivity);
        assert!(first.trimmed_walk);
        assert!(conn.is_normalized());
        let after_first = conn.clone();

        let second = normalizer.normalize(&mut conn, Direction::ToActivity);
        assert_eq!(second, NormalizeOutcome::default());
        assert_eq!(conn, after_first);
        assert_eq!(conn.leg_count(), 2);
    }

    #[test]
    fn anytime_to_arrives_at_latest_start() {
        // Vienna in January is UTC+1: latest start 10:00 local is 09:00Z.
        let config = ActivityConfig::default();
        let mut conn = anytime((6, 0), (6, 12));

        let changed =
            synthesize_anytime(&mut conn, Direction::ToActivity, &config, dates().start).unwrap();
        assert!(changed);
        assert_eq!(conn.end(), at(9, 0));
        assert_eq!(conn.start(), at(8, 48));
        assert_eq!(conn.legs()[0].departure(), at(8, 48));
        assert_eq!(conn.legs()[0].arrival(), at(9, 0));
    }

    #[test]
    fn anytime_from_leaves_at_earliest_end() {
        // Earliest end 16:00 local is 15:00Z.
        let config = ActivityConfig::default();
        let mut conn = anytime((6, 0), (6, 20));

        synthesize_anytime(&mut conn, Direction::FromActivity, &config, dates().start).unwrap();
        assert_eq!(conn.start(), at(15, 0));
        assert_eq!(conn.end(), at(15, 20));
        assert_eq!(conn.legs()[0].duration(), Duration::minutes(20));
    }

    #[test]
    fn scheduled_connections_keep_their_window() {
        let config = ActivityConfig::default();
        let mut conn = connection(vec![leg(LegKind::Ride, (8, 0), (8, 40))]);
        let changed =
            synthesize_anytime(&mut conn, Direction::ToActivity, &config, dates().start).unwrap();
        assert!(!changed);
        assert_eq!(conn.end(), at(8, 40));
    }

    #[test]
    fn multiday_from_anchors_on_end_date() {
        let config = ActivityConfig::default().multiday();
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let normalizer = ConnectionNormalizer::new(&config, ActivityDates::range(start, end));

        assert_eq!(normalizer.activity_date(Direction::ToActivity), start);
        assert_eq!(normalizer.activity_date(Direction::FromActivity), end);

        let mut conn = anytime((6, 0), (6, 10));
        let outcome = normalizer.normalize(&mut conn, Direction::FromActivity);
        assert!(outcome.synthesized_window);
        assert_eq!(
            conn.start(),
            Utc.with_ymd_and_hms(2024, 1, 17, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn bad_configured_time_keeps_api_window() {
        let mut config = ActivityConfig::default();
        config.latest_start_time = "late".into();
        let normalizer = ConnectionNormalizer::new(&config, dates());

        let mut conn = anytime((6, 0), (6, 12));
        let outcome = normalizer.normalize(&mut conn, Direction::ToActivity);
        assert!(!outcome.synthesized_window);
        assert!(conn.is_normalized());
        assert_eq!(conn.start(), at(6, 0));
    }

    #[test]
    fn normalize_all_processes_every_connection() {
        let config = ActivityConfig::default();
        let normalizer = ConnectionNormalizer::new(&config, dates());
        let list = vec![
            connection(vec![
                leg(LegKind::Ride, (8, 0), (8, 40)),
                leg(LegKind::Walk, (8, 40), (8, 44)),
            ]),
            anytime((6, 0), (6, 12)),
        ];

        let list = normalizer.normalize_all(list, Direction::ToActivity);
        assert!(list.iter().all(Connection::is_normalized));
        assert!(list.iter().all(Connection::is_contiguous));
        assert_eq!(list[0].end(), at(8, 40));
        assert_eq!(list[1].end(), at(9, 0));
    }
}
