use crate::prelude::*;

use core::fmt::Display;
use core::num::ParseIntError;
use core::ops::Add;
use core::str::FromStr;
use core::time::Duration;

use chrono::{offset::Utc, DateTime, LocalResult, TimeZone};
use flex_error::{define_error, TraceError};
use serde_derive::{Deserialize, Serialize};

pub const ZERO_DURATION: Duration = Duration::from_secs(0);

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time of a host chain, as used by packet and upgrade timeouts.
///
/// Timestamps travel as `u64` nanoseconds since the Unix epoch, where 0 stands for "no
/// timestamp": a timeout that is not set never elapses.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug, Default, Deserialize, Serialize, Hash)]
pub struct Timestamp {
    time: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn from_nanoseconds(nanoseconds: u64) -> Result<Timestamp, ParseTimestampError> {
        if nanoseconds == 0 {
            return Ok(Timestamp::none());
        }

        // `u64::MAX / NANOS_PER_SEC` fits in an `i64`.
        let secs = (nanoseconds / NANOS_PER_SEC) as i64;
        let nanos = (nanoseconds % NANOS_PER_SEC) as u32;

        match Utc.timestamp_opt(secs, nanos) {
            LocalResult::Single(time) => Ok(Timestamp { time: Some(time) }),
            LocalResult::None | LocalResult::Ambiguous(_, _) => Err(
                ParseTimestampError::invalid_timestamp_conversion(secs, nanos),
            ),
        }
    }

    pub fn now() -> Timestamp {
        Timestamp {
            time: Some(Utc::now()),
        }
    }

    pub fn none() -> Self {
        Timestamp { time: None }
    }

    pub fn is_set(&self) -> bool {
        self.time.is_some()
    }

    /// Nanoseconds since the Unix epoch, 0 when not set.
    /// ```
    /// use ibc_channel::timestamp::Timestamp;
    /// let ts = Timestamp::from_nanoseconds(u64::MAX).unwrap();
    /// assert_eq!(ts.nanoseconds(), u64::MAX);
    /// assert_eq!(Timestamp::none().nanoseconds(), 0);
    /// ```
    pub fn nanoseconds(&self) -> u64 {
        self.time.map_or(0, |time| {
            // Timestamps before the epoch cannot be built through `from_nanoseconds`.
            let secs = u64::try_from(time.timestamp()).unwrap_or_default();
            secs * NANOS_PER_SEC + u64::from(time.timestamp_subsec_nanos())
        })
    }

    /// Whether both timestamps are set and this one is strictly later than `other`.
    pub fn after(&self, other: &Timestamp) -> bool {
        match (self.time, other.time) {
            (Some(this), Some(other)) => this > other,
            _ => false,
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.time {
            Some(time) => write!(f, "Timestamp({})", time.to_rfc3339()),
            None => write!(f, "Timestamp(NoTimestamp)"),
        }
    }
}

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    TimestampOverflowError {
        TimestampOverflow
            |_| { "timestamp overflow when adding a duration" }
    }
}

/// Adding to an unset timestamp leaves it unset.
impl Add<Duration> for Timestamp {
    type Output = Result<Timestamp, TimestampOverflowError>;

    fn add(self, duration: Duration) -> Self::Output {
        let time = match self.time {
            Some(time) => time,
            None => return Ok(self),
        };

        chrono::Duration::from_std(duration)
            .ok()
            .and_then(|duration| time.checked_add_signed(duration))
            .map(|time| Timestamp { time: Some(time) })
            .ok_or_else(TimestampOverflowError::timestamp_overflow)
    }
}

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    ParseTimestampError {
        ParseInt
            [ TraceError<ParseIntError> ]
            | _ | { "error parsing u64 integer from string"},

        InvalidTimestampConversion
            {
                secs: i64,
                nanos: u32,
            }
            | e | {
                format_args!("cannot build a timestamp from {0}s and {1}ns", e.secs, e.nanos)
            },
    }
}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nanoseconds = u64::from_str(s).map_err(ParseTimestampError::parse_int)?;

        Timestamp::from_nanoseconds(nanoseconds)
    }
}
