//! Live departure board.
//!
//! Fetches a stop's departures from a transport.rest-style API, keeps the
//! first few, and renders the ones heading the right way as short text
//! rows: real time, delay, and minutes until departure.

pub mod board;
pub mod config;
pub mod departures;
pub mod source;
