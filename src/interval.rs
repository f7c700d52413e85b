use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ParseIntervalError {
    #[error("expected HH:MM:SS, got `{0}`")]
    InvalidFormat(String),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
    #[error("interval `{0}` exceeds 24:00:00")]
    ExceedsMaximum(String),
    #[error("interval must be longer than 00:00:00")]
    Zero,
}

/// Minimum time between two restarts of a container, in `(0, 24h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RestartInterval(Duration);

impl RestartInterval {
    pub(crate) fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for RestartInterval {
    type Err = ParseIntervalError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseIntervalError::InvalidFormat(raw.to_string());

        let fields: Vec<&str> = raw.split(':').collect();
        let [hours, minutes, seconds] = fields.as_slice() else {
            return Err(invalid());
        };
        let hours = two_digits(hours).ok_or_else(invalid)?;
        let minutes = two_digits(minutes).ok_or_else(invalid)?;
        let seconds = two_digits(seconds).ok_or_else(invalid)?;

        if hours > 24 {
            return Err(ParseIntervalError::OutOfRange {
                field: "hours",
                value: hours,
            });
        }
        if minutes >= 60 {
            return Err(ParseIntervalError::OutOfRange {
                field: "minutes",
                value: minutes,
            });
        }
        if seconds >= 60 {
            return Err(ParseIntervalError::OutOfRange {
                field: "seconds",
                value: seconds,
            });
        }

        let interval = Duration::from_secs(hours * 3600 + minutes * 60 + seconds);
        if interval.is_zero() {
            return Err(ParseIntervalError::Zero);
        }
        if interval > MAX_INTERVAL {
            return Err(ParseIntervalError::ExceedsMaximum(raw.to_string()));
        }
        Ok(Self(interval))
    }
}

fn two_digits(field: &str) -> Option<u64> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl Display for RestartInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let secs = self.0.as_secs();
        write!(
            f,
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_hours() {
        let interval: RestartInterval = "05:00:00".parse().unwrap();
        assert_eq!(interval.as_duration(), Duration::from_secs(5 * 3600));
    }

    #[test]
    fn parses_mixed_fields() {
        let interval: RestartInterval = "01:30:15".parse().unwrap();
        assert_eq!(interval.as_duration(), Duration::from_secs(5415));
        assert_eq!(interval.to_string(), "01:30:15");
    }

    #[test]
    fn accepts_upper_bound() {
        let interval: RestartInterval = "24:00:00".parse().unwrap();
        assert_eq!(interval.as_duration(), MAX_INTERVAL);
        assert_eq!(interval.to_string(), "24:00:00");
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(
            "00:00:00".parse::<RestartInterval>(),
            Err(ParseIntervalError::Zero)
        );
    }

    #[test]
    fn rejects_hours_above_24() {
        match "25:00:00".parse::<RestartInterval>().unwrap_err() {
            ParseIntervalError::OutOfRange { field, value } => {
                assert_eq!(field, "hours");
                assert_eq!(value, 25);
            }
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn rejects_past_the_ceiling() {
        assert_eq!(
            "24:00:01".parse::<RestartInterval>(),
            Err(ParseIntervalError::ExceedsMaximum("24:00:01".to_string()))
        );
        assert!("24:30:00".parse::<RestartInterval>().is_err());
    }

    #[test]
    fn rejects_minutes_and_seconds_of_sixty() {
        assert!(matches!(
            "00:60:00".parse::<RestartInterval>(),
            Err(ParseIntervalError::OutOfRange { field: "minutes", .. })
        ));
        assert!(matches!(
            "00:00:60".parse::<RestartInterval>(),
            Err(ParseIntervalError::OutOfRange { field: "seconds", .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["bad", "", "5:00:00", "05:00", "05:00:00:00", "05:0a:00", "-1:00:00", "05:00:00.5", " 05:00:00"] {
            assert_eq!(
                raw.parse::<RestartInterval>(),
                Err(ParseIntervalError::InvalidFormat(raw.to_string())),
                "{raw}"
            );
        }
    }
}
