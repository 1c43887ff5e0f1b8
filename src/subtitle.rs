use crate::error::TimelineError;
use crate::parser;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// A point in time with millisecond precision.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::from_millis(0));

    pub fn from_millis(millis: u64) -> Self {
        Timestamp(Duration::from_millis(millis))
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self::from_millis(duration.as_millis() as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0.as_millis() as u64
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is later than `self`.
    pub fn saturating_sub(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let total_secs = self.0.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        let millis = self.0.subsec_millis();
        write!(
            fmt,
            "{:02}:{:02}:{:02},{:03}",
            hours, minutes, seconds, millis
        )
    }
}

impl FromStr for Timestamp {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_timestamp(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A half-open interval `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Option<Self> {
        if end > start {
            Some(TimeRange { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} --> {}", self.start, self.end)
    }
}

/// One cue as handed over by a subtitle parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(index: usize, start: Timestamp, end: Timestamp, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start,
            end,
            text: text.into(),
        }
    }

    /// `None` when the entry violates `end > start`.
    pub fn range(&self) -> Option<TimeRange> {
        TimeRange::new(self.start, self.end)
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}
