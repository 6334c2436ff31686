use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration as StdDuration;

use crate::error::{DecodeError, DecodeErrorKind};

/// A span of time on the wire as `D.HH:MM:SS.micro`: days are optional when
/// zero, the fractional part is optional, encoding always emits both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub StdDuration);

impl Duration {
    pub fn new(inner: StdDuration) -> Self {
        Self(inner)
    }

    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Self::try_decode(text)
            .ok_or_else(|| DecodeError::new("$", DecodeErrorKind::MalformedDuration(text.to_owned())))
    }

    fn try_decode(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, ':');
        let first = parts.next()?;
        let minutes_str = parts.next()?;
        let rest = parts.next()?;

        let (days, hours_str) = match first.split_once('.') {
            Some((d, h)) => (d.parse::<u64>().ok()?, h),
            None => (0, first),
        };
        if hours_str.len() != 2 {
            return None;
        }
        let hours: u64 = hours_str.parse().ok()?;

        if minutes_str.len() != 2 {
            return None;
        }
        let minutes: u64 = minutes_str.parse().ok()?;

        let (seconds_str, micros) = match rest.split_once('.') {
            Some((s, frac)) => (s, Self::parse_fraction(frac)?),
            None => (rest, 0),
        };
        if seconds_str.len() != 2 {
            return None;
        }
        let seconds: u64 = seconds_str.parse().ok()?;

        let total_seconds = ((days * 24 + hours) * 60 + minutes) * 60 + seconds;
        Some(Self(StdDuration::from_micros(
            total_seconds * 1_000_000 + micros,
        )))
    }

    fn parse_fraction(frac: &str) -> Option<u64> {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut padded = frac.to_owned();
        padded.truncate(6);
        while padded.len() < 6 {
            padded.push('0');
        }
        padded.parse().ok()
    }

    pub fn encode(&self) -> String {
        let total_micros = self.0.as_micros() as u64;
        let micros = total_micros % 1_000_000;
        let total_seconds = total_micros / 1_000_000;
        let seconds = total_seconds % 60;
        let total_minutes = total_seconds / 60;
        let minutes = total_minutes % 60;
        let total_hours = total_minutes / 60;
        let hours = total_hours % 24;
        let days = total_hours / 24;
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Duration::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_one_second_without_days() {
        let d = Duration::decode("0.00:00:01.0").unwrap();
        assert_eq!(d.0, StdDuration::from_secs(1));
    }

    #[test]
    fn decodes_days_hours_minutes_seconds_and_micros() {
        let d = Duration::decode("3000.12:34:56.789000").unwrap();
        let expected = StdDuration::from_secs(3000 * 86400 + 12 * 3600 + 34 * 60 + 56)
            + StdDuration::from_micros(789_000);
        assert_eq!(d.0, expected);
    }

    #[test]
    fn decodes_without_fractional_part() {
        let d = Duration::decode("0.00:00:05").unwrap();
        assert_eq!(d.0, StdDuration::from_secs(5));
    }

    #[test]
    fn decodes_without_days_prefix() {
        let d = Duration::decode("00:00:01").unwrap();
        assert_eq!(d.0, StdDuration::from_secs(1));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Duration::decode("garbage").is_err());
        assert!(Duration::decode("0:00:01").is_err());
        assert!(Duration::decode("00:00:1").is_err());
    }

    #[test]
    fn encoding_always_emits_days() {
        let d = Duration::new(StdDuration::from_secs(1));
        assert_eq!(d.encode(), "0.00:00:01.000000");
    }

    #[test]
    fn round_trips_through_encode_decode() {
        let d = Duration::decode("3000.12:34:56.789000").unwrap();
        let reencoded = Duration::decode(&d.encode()).unwrap();
        assert_eq!(d, reencoded);
    }
}
