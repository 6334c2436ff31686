use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{DecodeError, DecodeErrorKind};

/// A UTC instant on the wire as ISO-8601 with microsecond precision and a
/// trailing `Z`, e.g. `2020-01-01T00:00:00.000000Z`.
///
/// Decoding also accepts the second-precision form `2020-01-01T00:00:00Z`
/// used by `getAvailability`/`readSingle` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

const MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses either the microsecond form or the bare-seconds form.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, MICROS_FORMAT) {
            return Ok(Self(naive.and_utc()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, SECONDS_FORMAT) {
            return Ok(Self(naive.and_utc()));
        }
        Err(DecodeError::new(
            "$",
            DecodeErrorKind::MalformedTimestamp(text.to_owned()),
        ))
    }

    /// Parses strictly the bare-seconds form, as required for
    /// `getAvailabilityAsync`'s `begin`/`end` parameters.
    pub fn decode_seconds(text: &str) -> Result<Self, DecodeError> {
        NaiveDateTime::parse_from_str(text, SECONDS_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| DecodeError::new("$", DecodeErrorKind::MalformedTimestamp(text.to_owned())))
    }

    pub fn encode(&self) -> String {
        self.0.format(MICROS_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_microsecond_form() {
        let ts = Timestamp::decode("2020-01-01T00:10:00.500000Z").unwrap();
        assert_eq!(ts.encode(), "2020-01-01T00:10:00.500000Z");
    }

    #[test]
    fn decodes_bare_seconds_form() {
        let ts = Timestamp::decode("2020-01-01T00:10:00Z").unwrap();
        assert_eq!(ts.encode(), "2020-01-01T00:10:00.000000Z");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Timestamp::decode("not-a-timestamp").is_err());
    }

    #[test]
    fn decode_seconds_rejects_microsecond_form() {
        assert!(Timestamp::decode_seconds("2020-01-01T00:10:00.5Z").is_err());
    }
}
