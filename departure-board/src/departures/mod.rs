//! Departure feed extraction and timing.
//!
//! This is the pure core of the board: no I/O, no shared state. Callers
//! hand in a response body and get back a bounded list of departures, then
//! use the filter and delay helpers to decide what to show.
//!
//! - [`parse_timestamp`] reads `YYYY-MM-DDTHH:MM:SS[offset]` into calendar fields
//! - [`matches`] tests a direction against a comma-separated keyword list
//! - [`plan_from_delay`], [`minutes_until`] and [`seconds_to_minutes_delay`]
//!   do the clock arithmetic
//! - [`extract`] walks a `{"departures": [...]}` body, keeping at most
//!   [`MAX_DEPARTURES`] entries

mod delay;
mod extract;
mod filter;
mod time;
mod types;

pub use delay::{
    PlannedTime, minutes_until, minutes_until_in, plan_from_delay, seconds_to_minutes_delay,
};
pub use extract::{ExtractError, extract, try_extract};
pub use filter::{DirectionFilter, matches};
pub use time::{ParsedTime, parse_timestamp};
pub use types::{
    BoundedDepartures, Departure, DeparturesResult, MAX_DEPARTURES, MAX_DIRECTION_LEN,
    truncate_direction,
};
