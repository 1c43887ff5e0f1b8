use crate::error::TimelineError;
use crate::subtitle::{SubtitleEntry, TimeRange, Timestamp};

use std::time::Duration;

// Absorbs float noise such as 0.9 / 0.3 = 3.0000000000000004.
const RATIO_EPSILON: f64 = 1e-9;

/// Number of splits for a cue of the given length: `ceil(duration / unit)`,
/// at least one, and never more than one per millisecond.
pub fn split_count(duration: Duration, unit_seconds: f64) -> usize {
    let millis = duration.as_millis() as u64;
    if millis == 0 {
        return 1;
    }
    let ratio = duration.as_secs_f64() / unit_seconds;
    let count = (ratio - RATIO_EPSILON).ceil().max(1.0);
    // Float-to-int casts saturate, so absurdly small units stay bounded.
    (count as u64).min(millis) as usize
}

/// Cuts an entry's span into equal-width, contiguous ranges.
///
/// The first range starts at `entry.start`, the last one ends exactly at
/// `entry.end`, and every boundary falls on a whole millisecond.
pub fn split(entry: &SubtitleEntry, unit_seconds: f64) -> Result<Vec<TimeRange>, TimelineError> {
    if !unit_seconds.is_finite() || unit_seconds <= 0.0 {
        return Err(TimelineError::InvalidConfig(format!(
            "unit seconds must be a positive number, got {}",
            unit_seconds
        )));
    }
    if entry.end <= entry.start {
        return Err(TimelineError::InvalidEntry {
            index: entry.index,
            reason: format!("ends at {} but starts at {}", entry.end, entry.start),
        });
    }

    let duration = entry.duration();
    let total_millis = duration.as_millis() as u64;
    let count = split_count(duration, unit_seconds);
    let width_secs = duration.as_secs_f64() / count as f64;

    let start_millis = entry.start.as_millis();
    let mut ranges = Vec::with_capacity(count);
    let mut prev_offset = 0u64;
    for i in 1..=count {
        let offset = if i == count {
            total_millis
        } else {
            let ideal = (width_secs * i as f64 * 1000.0).round() as u64;
            // Leave at least one millisecond for each range still to come.
            let latest = total_millis - (count - i) as u64;
            ideal.max(prev_offset + 1).min(latest)
        };
        let range = TimeRange::new(
            Timestamp::from_millis(start_millis + prev_offset),
            Timestamp::from_millis(start_millis + offset),
        );
        if let Some(range) = range {
            ranges.push(range);
        }
        prev_offset = offset;
    }

    Ok(ranges)
}
