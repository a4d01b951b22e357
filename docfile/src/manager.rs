use chrono::{DateTime, TimeZone, Utc};
use core::fmt::Debug;

/// Number of 100ns intervals between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH: i128 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i128 = 10_000_000;

/// Provide OS specific methods
pub trait OSManager: Debug {
    fn current_time(&self) -> DateTime<Utc>;
}

/// Converts a time to the 64-bit tick count stored in directory records.
/// Times before 1601 are clamped to zero.
pub fn to_filetime(time: &DateTime<Utc>) -> u64 {
    let ticks = time.timestamp() as i128 * TICKS_PER_SECOND
        + (time.timestamp_subsec_nanos() / 100) as i128
        + FILETIME_UNIX_EPOCH;

    if ticks < 0 {
        return 0;
    }

    return ticks as u64;
}

/// A zero tick count means the time was never recorded.
pub fn from_filetime(filetime: u64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }

    let ticks = filetime as i128 - FILETIME_UNIX_EPOCH;
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;

    return Utc.timestamp_opt(seconds as i64, nanos as u32).single();
}

#[cfg(test)]
mod tests {
    use super::{from_filetime, to_filetime};
    use chrono::{DateTime, TimeZone, Utc};

    #[test]
    fn test_unix_epoch() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(to_filetime(&epoch), 116_444_736_000_000_000);
    }

    #[test]
    fn test_known_date() {
        let time = DateTime::parse_from_rfc2822("Wed, 18 Feb 2015 23:16:09 +0000")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(to_filetime(&time), 130_687_749_690_000_000);
        assert_eq!(from_filetime(130_687_749_690_000_000), Some(time));
    }

    #[test]
    fn test_sub_second_precision() {
        let time = Utc.timestamp_opt(1_600_000_000, 123_456_700).unwrap();
        assert_eq!(from_filetime(to_filetime(&time)), Some(time));
    }

    #[test]
    fn test_zero_is_unset() {
        assert_eq!(from_filetime(0), None);
    }

    #[test]
    fn test_before_1601() {
        let time = Utc.timestamp_opt(-12_000_000_000, 0).unwrap();
        assert_eq!(to_filetime(&time), 0);
    }
}
