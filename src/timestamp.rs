use std::cmp;
use std::fmt;
use std::time::SystemTime;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{Error, Result};

const MAX_NANOSEC: u32 = 999_999_999;

/// Seconds-since-epoch values that fit in 34 bits, the range covered by the
/// 32- and 64-bit timestamp wire forms.
const SEC_34_BIT_MASK: i64 = !0x3_ffff_ffff;

/// A raw timestamp: seconds since the UNIX epoch (possibly negative) plus a
/// sub-second nanosecond remainder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    sec: i64,
    nano: u32,
}

impl Timestamp {
    /// Create a timestamp from a raw seconds + nanoseconds value. Fails if the
    /// nanosecond count is not a sub-second remainder.
    pub fn from_utc(sec: i64, nano: u32) -> Option<Timestamp> {
        if nano > MAX_NANOSEC {
            None
        } else {
            Some(Timestamp { sec, nano })
        }
    }

    pub fn from_sec(sec: i64) -> Timestamp {
        Timestamp { sec, nano: 0 }
    }

    /// Create a timestamp from fractional seconds since the epoch. The
    /// fractional part becomes the nanosecond remainder, normalized so the
    /// remainder is always non-negative. Fails on non-finite input or input
    /// outside the representable seconds range.
    pub fn from_sec_f64(sec: f64) -> Option<Timestamp> {
        if !sec.is_finite() || sec < (i64::MIN as f64) || sec >= (i64::MAX as f64) {
            return None;
        }
        let mut whole = sec.trunc() as i64;
        let mut nano = ((sec - sec.trunc()) * 1e9) as i64;
        if nano < 0 {
            whole -= 1;
            nano += 1_000_000_000;
        }
        Timestamp::from_utc(whole, nano as u32)
    }

    /// Parse an RFC 3339 date-time string, e.g. `2023-06-01T12:00:00Z`.
    pub fn parse_rfc3339(s: &str) -> Result<Timestamp> {
        let t = OffsetDateTime::parse(s, &Rfc3339)
            .map_err(|e| Error::BadTag(format!("bad RFC 3339 timestamp \"{}\": {}", s, e)))?;
        Ok(t.into())
    }

    /// Minimum possible time that can be represented.
    pub fn min_value() -> Timestamp {
        Timestamp {
            sec: i64::MIN,
            nano: 0,
        }
    }

    /// Maximum possible time that can be represented.
    pub fn max_value() -> Timestamp {
        Timestamp {
            sec: i64::MAX,
            nano: MAX_NANOSEC,
        }
    }

    /// Return the UNIX timestamp (number of seconds since January 1, 1970
    /// 0:00:00 UTC).
    pub fn timestamp_utc(&self) -> i64 {
        self.sec
    }

    /// Returns the number of nanoseconds past the second count.
    pub fn timestamp_subsec_nanos(&self) -> u32 {
        self.nano
    }

    /// True when the seconds value has no bits set outside the low 34, the
    /// range the 32- and 64-bit wire forms can carry.
    pub(crate) fn fits_34_bits(&self) -> bool {
        self.sec & SEC_34_BIT_MASK == 0
    }

    /// Create a Timestamp based on the current system time. Can fail if the
    /// system clock is extremely wrong - the time is before the UNIX epoch.
    pub fn now() -> Option<Timestamp> {
        match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
            Ok(t) => Timestamp::from_utc(t.as_secs() as i64, t.subsec_nanos()),
            Err(_) => None,
        }
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(t: OffsetDateTime) -> Self {
        Timestamp {
            sec: t.unix_timestamp(),
            nano: t.nanosecond(),
        }
    }
}

impl cmp::Ord for Timestamp {
    fn cmp(&self, other: &Timestamp) -> cmp::Ordering {
        if self.sec == other.sec {
            self.nano.cmp(&other.nano)
        } else {
            self.sec.cmp(&other.sec)
        }
    }
}

impl cmp::PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Timestamp) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UTC: {} sec + {} ns", self.sec, self.nano)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nano_range() {
        assert!(Timestamp::from_utc(0, MAX_NANOSEC).is_some());
        assert!(Timestamp::from_utc(0, MAX_NANOSEC + 1).is_none());
    }

    #[test]
    fn range_34_bits() {
        assert!(Timestamp::from_sec(0).fits_34_bits());
        assert!(Timestamp::from_sec((1 << 34) - 1).fits_34_bits());
        assert!(!Timestamp::from_sec(1 << 34).fits_34_bits());
        assert!(!Timestamp::from_sec(-1).fits_34_bits());
    }

    #[test]
    fn fractional_seconds() {
        let t = Timestamp::from_sec_f64(1.5).unwrap();
        assert_eq!(t.timestamp_utc(), 1);
        assert_eq!(t.timestamp_subsec_nanos(), 500_000_000);

        // Negative fractions borrow a second so the remainder stays positive
        let t = Timestamp::from_sec_f64(-1.5).unwrap();
        assert_eq!(t.timestamp_utc(), -2);
        assert_eq!(t.timestamp_subsec_nanos(), 500_000_000);

        let t = Timestamp::from_sec_f64(-3.0).unwrap();
        assert_eq!(t.timestamp_utc(), -3);
        assert_eq!(t.timestamp_subsec_nanos(), 0);

        assert!(Timestamp::from_sec_f64(f64::NAN).is_none());
        assert!(Timestamp::from_sec_f64(f64::INFINITY).is_none());
        assert!(Timestamp::from_sec_f64(1e300).is_none());
    }

    #[test]
    fn rfc3339() {
        let t = Timestamp::parse_rfc3339("1970-01-01T00:00:00Z").unwrap();
        assert_eq!(t, Timestamp::from_sec(0));

        let t = Timestamp::parse_rfc3339("2023-06-01T12:30:00.25Z").unwrap();
        assert_eq!(t.timestamp_subsec_nanos(), 250_000_000);

        let err = Timestamp::parse_rfc3339("not a time").unwrap_err();
        assert!(matches!(err, Error::BadTag(_)));
    }

    #[test]
    fn ordering() {
        let a = Timestamp::from_utc(5, 0).unwrap();
        let b = Timestamp::from_utc(5, 1).unwrap();
        let c = Timestamp::from_sec(6);
        assert!(a < b && b < c);
        assert!(Timestamp::min_value() < Timestamp::max_value());
    }
}
