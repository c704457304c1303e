//! Departure records and the fixed-capacity list that holds them.

use std::ops::Deref;

use super::time::ParsedTime;

/// Hard cap on departures kept from a single feed, whatever the caller asks for.
pub const MAX_DEPARTURES: usize = 10;

/// Size of the direction buffer; stored directions hold at most
/// `MAX_DIRECTION_LEN - 1` characters.
pub const MAX_DIRECTION_LEN: usize = 64;

/// Cut a direction label down to at most `MAX_DIRECTION_LEN - 1` characters.
///
/// Truncation happens on character boundaries, so multi-byte labels stay
/// valid UTF-8.
pub fn truncate_direction(label: &str) -> &str {
    match label.char_indices().nth(MAX_DIRECTION_LEN - 1) {
        Some((end, _)) => &label[..end],
        None => label,
    }
}

/// A single departure taken from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Destination label, possibly truncated; empty when the feed had none.
    pub direction: String,
    /// Real (expected) departure time.
    pub when: ParsedTime,
    /// Delay in seconds; positive means late. Zero when the feed had none.
    pub delay_seconds: i32,
    /// Mirrors `when.valid`.
    pub valid: bool,
}

impl Departure {
    /// Build a departure, truncating an over-long direction.
    pub fn new(direction: &str, when: ParsedTime, delay_seconds: i32) -> Self {
        Self {
            direction: truncate_direction(direction).to_owned(),
            when,
            delay_seconds,
            valid: when.valid,
        }
    }
}

impl Default for Departure {
    fn default() -> Self {
        Self::new("", ParsedTime::INVALID, 0)
    }
}

/// A list of departures that never grows past its limit.
///
/// The limit is at most [`MAX_DEPARTURES`]; requests for more are clamped.
/// Storage is reserved once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedDepartures {
    items: Vec<Departure>,
    limit: usize,
}

impl BoundedDepartures {
    /// An empty list accepting up to `min(limit, MAX_DEPARTURES)` entries.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.min(MAX_DEPARTURES);
        Self {
            items: Vec::with_capacity(limit),
            limit,
        }
    }

    /// The effective limit after clamping.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether no more entries will be accepted.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    /// Append a departure, handing it back if the list is full.
    pub fn try_push(&mut self, departure: Departure) -> Result<(), Departure> {
        if self.is_full() {
            return Err(departure);
        }
        self.items.push(departure);
        Ok(())
    }

    /// The retained departures in feed order.
    pub fn as_slice(&self) -> &[Departure] {
        &self.items
    }
}

impl Default for BoundedDepartures {
    fn default() -> Self {
        Self::with_limit(MAX_DEPARTURES)
    }
}

impl Deref for BoundedDepartures {
    type Target = [Departure];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a BoundedDepartures {
    type Item = &'a Departure;
    type IntoIter = std::slice::Iter<'a, Departure>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Outcome of extracting departures from a feed body.
///
/// `success` is false only when the body was absent, was not valid JSON, or
/// had no `departures` array. An empty array is a success with no entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeparturesResult {
    pub departures: BoundedDepartures,
    pub success: bool,
}

impl DeparturesResult {
    /// A failed extraction with no departures.
    pub fn failed() -> Self {
        Self {
            departures: BoundedDepartures::with_limit(0),
            success: false,
        }
    }

    /// Number of departures retained.
    pub fn count(&self) -> usize {
        self.departures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departure(direction: &str) -> Departure {
        Departure::new(direction, ParsedTime::new(2024, 12, 1, 17, 0, 0), 0)
    }

    #[test]
    fn limit_is_clamped_to_hard_cap() {
        assert_eq!(BoundedDepartures::with_limit(3).limit(), 3);
        assert_eq!(BoundedDepartures::with_limit(MAX_DEPARTURES).limit(), MAX_DEPARTURES);
        assert_eq!(BoundedDepartures::with_limit(1000).limit(), MAX_DEPARTURES);
        assert_eq!(BoundedDepartures::default().limit(), MAX_DEPARTURES);
    }

    #[test]
    fn push_stops_at_limit() {
        let mut list = BoundedDepartures::with_limit(2);
        assert!(list.try_push(departure("A")).is_ok());
        assert!(list.try_push(departure("B")).is_ok());
        assert!(list.is_full());

        let rejected = list.try_push(departure("C")).unwrap_err();
        assert_eq!(rejected.direction, "C");
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].direction, "B");
    }

    #[test]
    fn zero_limit_is_always_full() {
        let mut list = BoundedDepartures::with_limit(0);
        assert!(list.is_full());
        assert!(list.try_push(departure("A")).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn direction_truncated_to_buffer_size() {
        let long = "x".repeat(200);
        let d = Departure::new(&long, ParsedTime::INVALID, 0);
        assert_eq!(d.direction.chars().count(), MAX_DIRECTION_LEN - 1);

        let exact = "y".repeat(MAX_DIRECTION_LEN - 1);
        assert_eq!(truncate_direction(&exact), exact);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "ä".repeat(100);
        let cut = truncate_direction(&long);
        assert_eq!(cut.chars().count(), MAX_DIRECTION_LEN - 1);
        assert!(cut.chars().all(|c| c == 'ä'));
    }

    #[test]
    fn valid_mirrors_time() {
        assert!(departure("A").valid);
        assert!(!Departure::new("A", ParsedTime::INVALID, 60).valid);
        assert_eq!(Departure::default().direction, "");
    }

    #[test]
    fn failed_result_is_empty() {
        let result = DeparturesResult::failed();
        assert!(!result.success);
        assert_eq!(result.count(), 0);
    }
}
