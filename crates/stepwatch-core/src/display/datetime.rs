//! Time formatting helpers.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Formats a `Timestamp` in the system time zone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0.to_zoned(TimeZone::system()).strftime(TIME_FORMAT)
        )
    }
}

/// Formats optional Unix epoch seconds like [`LocalDateTime`].
///
/// A missing value prints as `-`. Values outside the supported range print as
/// the raw number.
pub struct EpochTime(pub Option<i64>);

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(seconds) = self.0 else {
            return write!(f, "-");
        };
        match Timestamp::from_second(seconds) {
            Ok(timestamp) => write!(f, "{}", LocalDateTime(&timestamp)),
            Err(_) => write!(f, "{seconds}"),
        }
    }
}

/// Formats an optional number of seconds as `1h 02m 03s`, `2m 05s` or `7s`.
pub struct Elapsed(pub Option<i64>);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(seconds) = self.0 else {
            return write!(f, "-");
        };

        let sign = if seconds < 0 { "-" } else { "" };
        let total = seconds.unsigned_abs();
        let (hours, minutes, secs) = (total / 3600, total % 3600 / 60, total % 60);

        if hours > 0 {
            write!(f, "{sign}{hours}h {minutes:02}m {secs:02}s")
        } else if minutes > 0 {
            write!(f, "{sign}{minutes}m {secs:02}s")
        } else {
            write!(f, "{sign}{secs}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_time_formats() {
        assert_eq!(EpochTime(None).to_string(), "-");

        // Mid-November 2023 in every time zone
        let formatted = EpochTime(Some(1_700_000_000)).to_string();
        assert!(formatted.starts_with("2023-11-1"));

        assert_eq!(EpochTime(Some(i64::MAX)).to_string(), i64::MAX.to_string());
    }

    #[test]
    fn test_elapsed_formats() {
        assert_eq!(Elapsed(None).to_string(), "-");
        assert_eq!(Elapsed(Some(0)).to_string(), "0s");
        assert_eq!(Elapsed(Some(7)).to_string(), "7s");
        assert_eq!(Elapsed(Some(125)).to_string(), "2m 05s");
        assert_eq!(Elapsed(Some(3723)).to_string(), "1h 02m 03s");
        assert_eq!(Elapsed(Some(-5)).to_string(), "-5s");
    }
}
