//! Departure board assembly and text rendering.
//!
//! Picks the departures worth showing (matching the direction filter, with a
//! valid time, and not leaving too soon to catch) and formats each as a line
//! like `17:26 +3  in  4'  Hauptbahnhof`: real departure time, delay in
//! minutes, minutes until departure, direction.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use tracing::{info, trace};

use crate::config::BoardConfig;
use crate::departures::{
    Departure, DirectionFilter, ExtractError, ParsedTime, PlannedTime, minutes_until_in,
    plan_from_delay, seconds_to_minutes_delay, try_extract,
};
use crate::source::{DepartureSource, SourceError};

/// Departures leaving sooner than this are not worth showing.
pub const MIN_LEAD_MINUTES: i64 = 2;

/// Shown when no departure qualifies.
pub const EMPTY_BOARD_MESSAGE: &str = "No departures found";

/// Errors loading a board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The departures body could not be fetched
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The departures body could not be read
    #[error("unreadable departures response: {0}")]
    Extract(#[from] ExtractError),
}

/// One rendered departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub direction: String,
    /// Real (expected) departure time.
    pub when: ParsedTime,
    /// Timetabled departure time.
    pub planned: PlannedTime,
    pub delay_minutes: i32,
    pub minutes_until: i64,
}

impl BoardRow {
    fn new(departure: &Departure, minutes_until: i64) -> Self {
        let when = departure.when;
        Self {
            direction: departure.direction.clone(),
            when,
            planned: plan_from_delay(when.hour, when.minute, when.second, departure.delay_seconds),
            delay_minutes: seconds_to_minutes_delay(departure.delay_seconds),
            minutes_until,
        }
    }
}

impl fmt::Display for BoardRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delay = match self.delay_minutes {
            0 => String::new(),
            d if d > 0 => format!("+{d}"),
            d => d.to_string(),
        };
        write!(
            f,
            "{:02}:{:02} {:<3} in {:>2}'",
            self.when.hour, self.when.minute, delay, self.minutes_until
        )?;
        if !self.direction.is_empty() {
            write!(f, "  {}", self.direction)?;
        }
        Ok(())
    }
}

/// A rendered board: the rows to show and how many departures were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub rows: Vec<BoardRow>,
    pub extracted: usize,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str(EMPTY_BOARD_MESSAGE);
        }
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Select up to `rows` departures to show, reading times as local time.
pub fn select_rows<Tz: TimeZone>(
    departures: &[Departure],
    filter: &DirectionFilter,
    now: &DateTime<Tz>,
    rows: usize,
) -> Vec<BoardRow> {
    select_rows_in(departures, filter, &Local, now, rows)
}

/// Select up to `rows` departures to show, reading times in `zone`.
///
/// Departures are taken in feed order. A departure is skipped if its
/// direction does not match `filter`, its time is invalid, or it leaves in
/// fewer than [`MIN_LEAD_MINUTES`].
pub fn select_rows_in<Z: TimeZone, Tz: TimeZone>(
    departures: &[Departure],
    filter: &DirectionFilter,
    zone: &Z,
    now: &DateTime<Tz>,
    rows: usize,
) -> Vec<BoardRow> {
    let mut selected = Vec::with_capacity(rows.min(departures.len()));

    for departure in departures {
        if selected.len() >= rows {
            break;
        }
        if !filter.matches(&departure.direction) {
            trace!(direction = %departure.direction, "skipping: filtered out");
            continue;
        }
        if !departure.valid {
            trace!(direction = %departure.direction, "skipping: no departure time");
            continue;
        }

        let minutes = minutes_until_in(&departure.when, zone, now);
        if minutes < MIN_LEAD_MINUTES {
            trace!(direction = %departure.direction, minutes, "skipping: leaves too soon");
            continue;
        }

        selected.push(BoardRow::new(departure, minutes));
    }

    selected
}

/// Fetch, extract and select the departures for one board refresh.
pub async fn load_board<S, Tz>(
    source: &S,
    config: &BoardConfig,
    now: &DateTime<Tz>,
) -> Result<Board, BoardError>
where
    S: DepartureSource,
    Tz: TimeZone,
{
    let body = source.fetch_body().await?;
    let departures = try_extract(&body, config.max_results)?;
    let rows = select_rows(&departures, &config.direction_filter, now, config.rows);

    info!(
        extracted = departures.len(),
        shown = rows.len(),
        filter = config.direction_filter.as_str(),
        "board loaded"
    );

    Ok(Board {
        rows,
        extracted: departures.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use chrono::FixedOffset;
    use tempfile::TempDir;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn dep(direction: &str, hour: i32, minute: i32, delay_seconds: i32) -> Departure {
        Departure::new(
            direction,
            ParsedTime::new(2024, 12, 1, hour, minute, 0),
            delay_seconds,
        )
    }

    #[test]
    fn row_derives_planned_time_and_delay() {
        let row = BoardRow::new(&dep("Hauptbahnhof", 17, 26, 180), 6);
        assert_eq!(
            row.planned,
            PlannedTime {
                hour: 17,
                minute: 23,
                second: 0
            }
        );
        assert_eq!(row.delay_minutes, 3);
        assert_eq!(row.minutes_until, 6);
    }

    #[test]
    fn row_display() {
        let row = BoardRow::new(&dep("Hauptbahnhof", 17, 26, 180), 4);
        assert_eq!(row.to_string(), "17:26 +3  in  4'  Hauptbahnhof");

        let row = BoardRow::new(&dep("Marktplatz", 7, 5, 0), 12);
        assert_eq!(row.to_string(), "07:05     in 12'  Marktplatz");

        let row = BoardRow::new(&dep("", 9, 0, -120), 30);
        assert_eq!(row.to_string(), "09:00 -2  in 30'");
    }

    #[test]
    fn selects_in_order_up_to_row_limit() {
        let now = cet().with_ymd_and_hms(2024, 12, 1, 17, 0, 0).unwrap();
        let departures = [
            dep("A", 17, 10, 0),
            dep("B", 17, 20, 0),
            dep("C", 17, 30, 0),
            dep("D", 17, 40, 0),
        ];

        let rows = select_rows_in(&departures, &DirectionFilter::allow_all(), &cet(), &now, 3);
        let directions: Vec<_> = rows.iter().map(|r| r.direction.as_str()).collect();
        assert_eq!(directions, ["A", "B", "C"]);
        assert_eq!(rows[0].minutes_until, 10);
    }

    #[test]
    fn skips_filtered_invalid_and_imminent() {
        let now = cet().with_ymd_and_hms(2024, 12, 1, 17, 0, 0).unwrap();
        let departures = [
            dep("Rieselfeld", 17, 10, 0),
            Departure::new("Hauptbahnhof", ParsedTime::INVALID, 0),
            dep("Hauptbahnhof", 17, 1, 0),
            dep("Hauptbahnhof", 16, 50, 0),
            dep("Freiburg Hauptbahnhof", 17, 2, 60),
            dep("Messe", 17, 15, 0),
        ];
        let filter = DirectionFilter::new("Hauptbahnhof, Messe");

        let rows = select_rows_in(&departures, &filter, &cet(), &now, 3);
        let directions: Vec<_> = rows.iter().map(|r| r.direction.as_str()).collect();
        assert_eq!(directions, ["Freiburg Hauptbahnhof", "Messe"]);
        assert_eq!(rows[0].minutes_until, MIN_LEAD_MINUTES);
    }

    #[test]
    fn zero_rows_selects_nothing() {
        let now = cet().with_ymd_and_hms(2024, 12, 1, 17, 0, 0).unwrap();
        let rows = select_rows_in(
            &[dep("A", 17, 30, 0)],
            &DirectionFilter::allow_all(),
            &cet(),
            &now,
            0,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn board_display() {
        let board = Board {
            rows: vec![
                BoardRow::new(&dep("A", 17, 26, 180), 4),
                BoardRow::new(&dep("B", 17, 34, 0), 12),
            ],
            extracted: 5,
        };
        assert_eq!(
            board.to_string(),
            "17:26 +3  in  4'  A\n17:34     in 12'  B"
        );

        let empty = Board {
            rows: Vec::new(),
            extracted: 0,
        };
        assert_eq!(empty.to_string(), EMPTY_BOARD_MESSAGE);
    }

    #[test]
    fn bundled_sample_extracts() {
        let departures = try_extract(include_str!("../data/sample.json"), 10).unwrap();
        assert_eq!(departures.len(), 3);
        assert_eq!(departures[0].direction, "Freiburg Messe/Universität");
        assert_eq!(departures[0].delay_seconds, 180);
        assert!(!departures[2].valid);
        assert_eq!(departures[2].delay_seconds, 600);
    }

    #[tokio::test]
    async fn loads_board_from_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("8014418.json"),
            r#"{
                "departures": [
                    {"direction": "Zähringen", "when": "2024-12-01T17:21:00+01:00", "delay": 0},
                    {"direction": "Hauptbahnhof", "when": "2024-12-01T17:26:00+01:00", "delay": 180, "line": {"name": "STR 4"}},
                    {"direction": "Cancelled", "when": null, "delay": 0},
                    {"direction": "Messe", "when": "2024-12-01T17:40:00+01:00", "delay": null}
                ],
                "realtimeDataUpdatedAt": 1701445560
            }"#,
        )
        .unwrap();

        let config = BoardConfig::new("8014418").with_mock_dir(dir.path());
        let source = MockSource::new(dir.path(), &config.station_id);
        let now = Local.with_ymd_and_hms(2024, 12, 1, 17, 20, 0).unwrap();

        let board = load_board(&source, &config, &now).await.unwrap();
        assert_eq!(board.extracted, 4);
        assert_eq!(
            board.to_string(),
            "17:26 +3  in  6'  Hauptbahnhof\n17:40     in 20'  Messe"
        );
    }

    #[tokio::test]
    async fn load_board_reports_bad_body() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1.json"), r#"{"message": "Internal Server Error"}"#).unwrap();

        let config = BoardConfig::new("1");
        let source = MockSource::new(dir.path(), "1");
        let err = load_board(&source, &config, &Local::now()).await.unwrap_err();
        assert!(matches!(err, BoardError::Extract(ExtractError::MissingDepartures)));
        assert_eq!(
            err.to_string(),
            "unreadable departures response: missing `departures` array"
        );
    }

    #[tokio::test]
    async fn load_board_reports_missing_source() {
        let dir = TempDir::new().unwrap();
        let config = BoardConfig::new("missing");
        let source = MockSource::new(dir.path(), "missing");

        let err = load_board(&source, &config, &Local::now()).await.unwrap_err();
        assert!(matches!(err, BoardError::Source(SourceError::Mock { .. })));
    }
}
