use crate::error::{Error, Result};
use crate::host::Payload;
use crate::timestamp::Timestamp;
use crate::value::{Array, Map, Value};

/// An explicit type-annotation wrapper.
///
/// Default dispatch cannot distinguish everything - an empty array from an
/// empty map, or a valid-UTF-8 byte string the caller wants encoded as bin.
/// Wrapping a value in a `Tag` pins down the wire representation.
///
/// `Array` and `Map` force the container wire format even for zero-length
/// containers; with `None` they degenerate to nil. `Raw` splices pre-encoded
/// bytes into the output verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    Raw(Vec<u8>),
    Array(Option<Array>),
    Map(Option<Map>),
    Str(Vec<u8>),
    Bin(Vec<u8>),
    Signed(i64),
    Unsigned(u64),
    F32(f32),
    F64(f64),
    /// Timestamp with automatic width selection.
    Time(Timestamp),
    /// Timestamp forced to the 32-bit form; nanoseconds are discarded.
    Time32(Timestamp),
    /// Timestamp forced to the 64-bit form; seconds must fit in 34 bits.
    Time64(Timestamp),
    /// Timestamp forced to the 96-bit form.
    Time96(Timestamp),
    /// Application extension: a signed type code plus an opaque payload.
    Ext(i8, Vec<u8>),
}

impl Tag {
    /// Coerce a host value into a timestamp: a number is fractional seconds
    /// since the epoch, a string is parsed as RFC 3339, and a handle already
    /// carrying a time passes through.
    pub fn coerce_time(value: &Value) -> Result<Timestamp> {
        match value {
            Value::Number(v) => Timestamp::from_sec_f64(*v)
                .ok_or_else(|| Error::BadTag(format!("number {} is out of timestamp range", v))),
            Value::String(s) => {
                let s = std::str::from_utf8(s)
                    .map_err(|_| Error::BadTag("timestamp string is not UTF-8".to_string()))?;
                Timestamp::parse_rfc3339(s)
            }
            Value::Handle(h) => match h.payload() {
                Some(Payload::Time(t)) => Ok(t),
                _ => Err(Error::BadTag(format!(
                    "cannot convert non-time {} to time",
                    h.kind()
                ))),
            },
            v => Err(Error::BadTag(format!("cannot convert {:?} to time", v))),
        }
    }

    /// Build an automatic-width timestamp tag from a coercible value.
    pub fn time_from_value(value: &Value) -> Result<Tag> {
        Tag::coerce_time(value).map(Tag::Time)
    }

    /// Build a 32-bit timestamp tag from a coercible value.
    pub fn time32_from_value(value: &Value) -> Result<Tag> {
        Tag::coerce_time(value).map(Tag::Time32)
    }

    /// Build a 64-bit timestamp tag from a coercible value.
    pub fn time64_from_value(value: &Value) -> Result<Tag> {
        Tag::coerce_time(value).map(Tag::Time64)
    }

    /// Build a 96-bit timestamp tag from a coercible value.
    pub fn time96_from_value(value: &Value) -> Result<Tag> {
        Tag::coerce_time(value).map(Tag::Time96)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Handle;

    #[test]
    fn coerce_number() {
        let t = Tag::coerce_time(&Value::Number(2.25)).unwrap();
        assert_eq!(t.timestamp_utc(), 2);
        assert_eq!(t.timestamp_subsec_nanos(), 250_000_000);
        assert!(Tag::coerce_time(&Value::Number(f64::NAN)).is_err());
    }

    #[test]
    fn coerce_string() {
        let t = Tag::coerce_time(&"1970-01-01T00:01:00Z".into()).unwrap();
        assert_eq!(t.timestamp_utc(), 60);
        assert!(matches!(
            Tag::coerce_time(&"yesterday".into()),
            Err(Error::BadTag(_))
        ));
    }

    #[test]
    fn coerce_handle() {
        let t = Timestamp::from_sec(7);
        assert_eq!(Tag::coerce_time(&t.into()).unwrap(), t);
        assert!(matches!(
            Tag::coerce_time(&Value::Handle(Handle::new(5u64))),
            Err(Error::BadTag(_))
        ));
        assert!(matches!(
            Tag::coerce_time(&Value::Bool(true)),
            Err(Error::BadTag(_))
        ));
    }
}
