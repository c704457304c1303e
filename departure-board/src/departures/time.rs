//! Timestamp parsing for departure feeds.
//!
//! Departure APIs send times like `"2024-12-01T17:26:45+01:00"`. Only the
//! six calendar fields at the front of the string are read; the offset
//! suffix is ignored and the fields are later interpreted as local time.

/// Minimum length of a string that can hold `YYYY-MM-DDTHH:MM:SS`.
const MIN_TIMESTAMP_LEN: usize = 19;

/// Literal separators following each of the first five fields.
const SEPARATORS: [u8; 5] = [b'-', b'-', b'T', b':', b':'];

/// Calendar fields scanned from a timestamp string.
///
/// Ranges are not validated: `"2024-13-45T99:99:99"` parses with
/// `month == 13` and `hour == 99`. When `valid` is false every numeric
/// field is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParsedTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    pub valid: bool,
}

impl ParsedTime {
    /// The zeroed, invalid time.
    pub const INVALID: Self = Self {
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
        valid: false,
    };

    /// Build a valid time from its six fields.
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            valid: true,
        }
    }
}

/// Parse the leading `YYYY-MM-DDTHH:MM:SS` of a timestamp.
///
/// Returns [`ParsedTime::INVALID`] for `None`, for strings shorter than 19
/// bytes, and whenever fewer than six integers can be scanned.
///
/// # Examples
///
/// ```
/// use departure_board::departures::{ParsedTime, parse_timestamp};
///
/// let t = parse_timestamp(Some("2024-12-01T17:26:45+01:00"));
/// assert_eq!(t, ParsedTime::new(2024, 12, 1, 17, 26, 45));
///
/// assert!(!parse_timestamp(Some("2024-12-01")).valid);
/// assert!(!parse_timestamp(None).valid);
/// ```
pub fn parse_timestamp(text: Option<&str>) -> ParsedTime {
    let Some(text) = text else {
        return ParsedTime::INVALID;
    };
    if text.len() < MIN_TIMESTAMP_LEN {
        return ParsedTime::INVALID;
    }

    let mut scanner = Scanner::new(text.as_bytes());
    let mut fields = [0i32; 6];

    for (i, field) in fields.iter_mut().enumerate() {
        if i > 0 && !scanner.literal(SEPARATORS[i - 1]) {
            return ParsedTime::INVALID;
        }
        match scanner.integer() {
            Some(value) => *field = value,
            None => return ParsedTime::INVALID,
        }
    }

    let [year, month, day, hour, minute, second] = fields;
    ParsedTime::new(year, month, day, hour, minute, second)
}

/// Cursor over the timestamp bytes with scanf-style integer reading.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Consume `expected` if it is the next byte.
    fn literal(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Read an optionally signed decimal integer, skipping leading
    /// whitespace. Values that overflow `i32` saturate.
    fn integer(&mut self) -> Option<i32> {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            value = (value * 10 + i64::from(digit - b'0')).min(i64::from(i32::MAX) + 1);
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }

        let value = if negative { -value } else { value };
        Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}
