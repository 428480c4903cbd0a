//! Small shared helpers.

use time::OffsetDateTime;

/// Milliseconds since the Unix epoch for `t`.
///
/// Stored timestamps (token expiry, rate-limit hits) are unix milliseconds.
pub fn unix_ms(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::unix_ms;

    #[test]
    fn unix_ms_matches_epoch_seconds() {
        let t = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(unix_ms(t), 1_700_000_000_000);
    }

    #[test]
    fn unix_ms_keeps_millisecond_precision() {
        let t = OffsetDateTime::from_unix_timestamp_nanos(1_700_000_000_123_000_000).unwrap();
        assert_eq!(unix_ms(t), 1_700_000_000_123);
    }
}
