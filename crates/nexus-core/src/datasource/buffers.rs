//! `readSingleAsync` buffer sizing (§4.4's allocation policy): the data
//! buffer holds `sampleCount * elementSize` bytes, the status buffer one
//! byte per sample, both zero-initialized.

use nexus_protocol::{Representation, Timestamp};

/// `(end - begin) / samplePeriod`, truncated to an integer sample count.
pub fn sample_count(begin: Timestamp, end: Timestamp, representation: &Representation) -> u64 {
    let span_micros = (end.0 - begin.0).num_microseconds().unwrap_or(0).max(0) as u64;
    let period_micros = representation.sample_period.0.as_micros() as u64;
    if period_micros == 0 {
        0
    } else {
        span_micros / period_micros
    }
}

/// Allocates the zero-initialized `(data, status)` buffer pair for a single
/// `readSingleAsync` call.
pub fn allocate(begin: Timestamp, end: Timestamp, representation: &Representation) -> (Vec<u8>, Vec<u8>) {
    let count = sample_count(begin, end, representation) as usize;
    let data = vec![0u8; count * representation.data_type.element_size()];
    let status = vec![0u8; count];
    (data, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_protocol::{Duration, NexusDataType};
    use std::time::Duration as StdDuration;

    fn ts(secs: i64) -> Timestamp {
        Timestamp(chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    #[test]
    fn ten_minutes_of_one_second_int64_samples_is_600_elements() {
        let repr = Representation {
            data_type: NexusDataType::Int64,
            sample_period: Duration::new(StdDuration::from_secs(1)),
        };
        let begin = ts(0);
        let end = ts(600);
        assert_eq!(sample_count(begin, end, &repr), 600);

        let (data, status) = allocate(begin, end, &repr);
        assert_eq!(data.len(), 600 * 8);
        assert_eq!(status.len(), 600);
        assert!(data.iter().all(|&b| b == 0));
        assert!(status.iter().all(|&b| b == 0));
    }

    #[test]
    fn non_divisible_span_truncates_down() {
        let repr = Representation {
            data_type: NexusDataType::Float32,
            sample_period: Duration::new(StdDuration::from_secs(4)),
        };
        assert_eq!(sample_count(ts(0), ts(10), &repr), 2);
    }
}
