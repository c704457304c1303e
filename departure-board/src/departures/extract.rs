//! Selective extraction of departures from a feed body.
//!
//! Real departure responses carry a lot more than we show: stop objects with
//! coordinates, line metadata, remarks, trip positions. The visitors here
//! read only `departures[].direction`, `departures[].when` and
//! `departures[].delay`, skipping everything else with [`IgnoredAny`], and
//! stop materialising entries once the limit is reached.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::error::Category;
use tracing::{debug, trace};

use super::time::{ParsedTime, parse_timestamp};
use super::types::{BoundedDepartures, Departure, DeparturesResult, truncate_direction};

/// Why a feed body could not be read as a departure list.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The body is not well-formed JSON
    #[error("invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// The body is not an object, or `departures` is not an array
    #[error("unexpected JSON shape: {0}")]
    Shape(#[source] serde_json::Error),

    /// The top-level object has no `departures` key
    #[error("missing `departures` array")]
    MissingDepartures,
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => ExtractError::Shape(err),
            Category::Syntax | Category::Eof | Category::Io => ExtractError::Syntax(err),
        }
    }
}

/// Extract up to `max_results` departures from a feed body.
///
/// `max_results` is clamped to [`MAX_DEPARTURES`](super::MAX_DEPARTURES).
/// A missing body, invalid JSON, or a body without a `departures` array
/// gives `success == false`; otherwise entries are taken in document order
/// and any past the limit are dropped.
///
/// # Examples
///
/// ```
/// use departure_board::departures::extract;
///
/// let body = r#"{"departures":[{"direction":"Hauptbahnhof","when":"2024-12-01T17:26:45+01:00","delay":180}]}"#;
/// let result = extract(Some(body), 10);
/// assert!(result.success);
/// assert_eq!(result.count(), 1);
/// assert_eq!(result.departures[0].delay_seconds, 180);
///
/// assert!(!extract(None, 10).success);
/// ```
pub fn extract(json_text: Option<&str>, max_results: usize) -> DeparturesResult {
    let Some(json_text) = json_text else {
        return DeparturesResult::failed();
    };

    match try_extract(json_text, max_results) {
        Ok(departures) => DeparturesResult {
            departures,
            success: true,
        },
        Err(e) => {
            debug!(error = %e, "departure extraction failed");
            DeparturesResult::failed()
        }
    }
}

/// Extract up to `max_results` departures, reporting why extraction failed.
///
/// Field-level problems never fail the call: a bad `when` only marks its
/// entry invalid, a bad `direction` or `delay` falls back to `""` or `0`.
pub fn try_extract(
    json_text: &str,
    max_results: usize,
) -> Result<BoundedDepartures, ExtractError> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    let departures = FeedSeed {
        limit: max_results,
    }
    .deserialize(&mut deserializer)?
    .ok_or(ExtractError::MissingDepartures)?;

    debug!(
        count = departures.len(),
        limit = departures.limit(),
        "extracted departures"
    );
    Ok(departures)
}

/// Top-level object keys we care about.
#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum FeedKey {
    Departures,
    #[serde(other)]
    Other,
}

/// Departure entry keys we care about.
#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum EntryKey {
    Direction,
    When,
    Delay,
    #[serde(other)]
    Other,
}

/// Reads the top-level object; `None` when it has no `departures` key.
struct FeedSeed {
    limit: usize,
}

impl<'de> DeserializeSeed<'de> for FeedSeed {
    type Value = Option<BoundedDepartures>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for FeedSeed {
    type Value = Option<BoundedDepartures>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `departures` array")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut departures = None;
        while let Some(key) = map.next_key::<FeedKey>()? {
            match key {
                FeedKey::Departures => {
                    departures = Some(map.next_value_seed(DeparturesSeed { limit: self.limit })?);
                }
                FeedKey::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(departures)
    }
}

/// Reads the `departures` array into a bounded list.
struct DeparturesSeed {
    limit: usize,
}

impl<'de> DeserializeSeed<'de> for DeparturesSeed {
    type Value = BoundedDepartures;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for DeparturesSeed {
    type Value = BoundedDepartures;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of departures")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut departures = BoundedDepartures::with_limit(self.limit);

        while !departures.is_full() {
            let Some(RawEntry(departure)) = seq.next_element::<RawEntry>()? else {
                return Ok(departures);
            };
            if departures.try_push(departure).is_err() {
                break;
            }
        }

        let mut skipped = 0usize;
        while seq.next_element::<IgnoredAny>()?.is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            trace!(skipped, "dropped departures past the limit");
        }
        Ok(departures)
    }
}

/// One array entry. Anything other than an object yields a default entry.
struct RawEntry(Departure);

impl<'de> Deserialize<'de> for RawEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer
            .deserialize_any(LenientVisitor {
                expecting: "a departure object",
                on_text: ignore_text,
            })
            .map(|field| match field {
                Field::Entry(departure) => RawEntry(departure),
                _ => RawEntry(Departure::default()),
            })
    }
}

fn ignore_text(_: &str) {}

/// A leniently read JSON value.
enum Field<T> {
    /// A string, already converted.
    Text(T),
    /// An integer that fits in `i64`.
    Integer(i64),
    /// A departure object.
    Entry(Departure),
    /// Null, a boolean, a float, an array, or an unwanted object.
    Other,
}

/// Accepts any JSON value without failing, converting strings as they are
/// read so the full text never has to be owned.
struct LenientVisitor<T> {
    expecting: &'static str,
    on_text: fn(&str) -> T,
}

impl<'de, T> Visitor<'de> for LenientVisitor<T> {
    type Value = Field<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Field::Text((self.on_text)(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Field::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(Field::Other, Field::Integer))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(Field::Other)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Field::Other)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Field::Other)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Field::Other)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Field::Other)
    }

    /// Objects are only wanted as array entries; field values that are
    /// objects are skipped.
    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut direction = String::new();
        let mut when = ParsedTime::INVALID;
        let mut delay_seconds = 0;

        while let Some(key) = map.next_key::<EntryKey>()? {
            match key {
                EntryKey::Direction => {
                    direction = match map.next_value::<Lenient<String>>()?.0 {
                        Field::Text(text) => text,
                        _ => String::new(),
                    };
                }
                EntryKey::When => {
                    when = match map.next_value::<Lenient<ParsedTime>>()?.0 {
                        Field::Text(parsed) => parsed,
                        _ => ParsedTime::INVALID,
                    };
                }
                EntryKey::Delay => {
                    delay_seconds = match map.next_value::<Lenient<i32>>()?.0 {
                        Field::Integer(v) => i32::try_from(v).unwrap_or(0),
                        _ => 0,
                    };
                }
                EntryKey::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(Field::Entry(Departure::new(&direction, when, delay_seconds)))
    }
}

/// A field value read with [`LenientVisitor`].
struct Lenient<T>(Field<T>);

/// How each field type converts its string form.
trait FromText: Sized {
    fn from_text(text: &str) -> Self;
}

impl FromText for String {
    fn from_text(text: &str) -> Self {
        truncate_direction(text).to_owned()
    }
}

impl FromText for ParsedTime {
    fn from_text(text: &str) -> Self {
        parse_timestamp(Some(text))
    }
}

impl FromText for i32 {
    /// Numeric strings are not accepted as delays.
    fn from_text(_: &str) -> Self {
        0
    }
}

impl<'de, T: FromText> Deserialize<'de> for Lenient<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let field = deserializer.deserialize_any(LenientVisitor {
            expecting: "any JSON value",
            on_text: T::from_text,
        })?;
        // A nested object is not a departure; discard what was read.
        Ok(Lenient(match field {
            Field::Entry(_) => Field::Other,
            other => other,
        }))
    }
}
