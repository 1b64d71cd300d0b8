use crate::error::{Error, Result};
use itertools::Itertools;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

fn split_hms(total: u64) -> (u64, u64, u64) {
    (
        total / SECS_PER_HOUR,
        (total % SECS_PER_HOUR) / SECS_PER_MINUTE,
        total % SECS_PER_MINUTE,
    )
}

/// Format whole seconds as `HH:MM:SS`
pub fn format_clock(total_secs: u64) -> String {
    let (hours, minutes, seconds) = split_hms(total_secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format a live countdown value. Partial seconds round up so the display
/// only reads `00:00:00` once the timer has actually run out.
pub fn format_remaining(remaining_secs: f64) -> String {
    format_clock(remaining_secs.max(0.0).ceil() as u64)
}

/// Parse `HH:MM:SS` (or the six bare digits `HHMMSS`) into seconds.
/// Minutes and seconds must be in 00-59.
pub fn parse_clock(input: &str) -> Result<u64> {
    let invalid = || Error::InvalidDuration(input.to_string());
    let trimmed = input.trim();

    let fields: Vec<&str> = if trimmed.contains(':') {
        trimmed.split(':').collect()
    } else if trimmed.len() == 6 && trimmed.is_ascii() {
        vec![&trimmed[0..2], &trimmed[2..4], &trimmed[4..6]]
    } else {
        return Err(invalid());
    };

    if fields.len() != 3
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let hours: u64 = fields[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = fields[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = fields[2].parse().map_err(|_| invalid())?;

    if minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    hours
        .checked_mul(SECS_PER_HOUR)
        .and_then(|secs| secs.checked_add(minutes * SECS_PER_MINUTE + seconds))
        .ok_or_else(invalid)
}

/// Short human form used in exercise lists, e.g. `1h 6min 7s`
pub fn format_human(total_secs: u64) -> String {
    if total_secs == 0 {
        return "0s".to_string();
    }

    let (hours, minutes, seconds) = split_hms(total_secs);
    [(hours, "h"), (minutes, "min"), (seconds, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .join(" ")
}

pub fn format_repetitions(reps: u32) -> String {
    if reps == 1 {
        "1 time".to_string()
    } else {
        format!("{reps} times")
    }
}
