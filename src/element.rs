use crate::marker::{ExtType, Marker};
use crate::timestamp::Timestamp;

/// A single wire element, ready for serialization. Strings are raw bytes
/// here: by the time an element is built, the str-versus-bin decision has
/// already been made, so no UTF-8 check is applied. Signed and unsigned
/// integers are distinct elements because they widen differently: a signed
/// value outside the fixint range takes the smallest two's-complement form
/// that fits, even when non-negative.
#[derive(Clone, Debug)]
pub enum Element<'a> {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Str(&'a [u8]),
    F32(f32),
    F64(f64),
    Bin(&'a [u8]),
    Array(usize),
    Map(usize),
    /// Timestamp with automatic width selection.
    Time(Timestamp),
    Time32(Timestamp),
    Time64(Timestamp),
    Time96(Timestamp),
    Ext(i8, &'a [u8]),
}

/// Serialize an element onto a byte vector, choosing the narrowest applicable
/// wire form. Doesn't check if Array & Map structures make sense, just writes
/// elements out. All multi-byte fields are big-endian.
pub fn serialize_elem(buf: &mut Vec<u8>, elem: Element) {
    use self::Element::*;
    match elem {
        Null => buf.push(Marker::Null.into()),
        Bool(v) => buf.push(if v { Marker::True } else { Marker::False }.into()),
        Signed(v) => {
            if (0..=127).contains(&v) {
                buf.push(Marker::PosFixInt(v as u8).into());
            } else if (-32..0).contains(&v) {
                buf.push(Marker::NegFixInt(v as i8).into());
            } else if i8::try_from(v).is_ok() {
                buf.push(Marker::Int8.into());
                buf.push(v as u8);
            } else if i16::try_from(v).is_ok() {
                buf.push(Marker::Int16.into());
                buf.extend_from_slice(&(v as i16).to_be_bytes());
            } else if i32::try_from(v).is_ok() {
                buf.push(Marker::Int32.into());
                buf.extend_from_slice(&(v as i32).to_be_bytes());
            } else {
                buf.push(Marker::Int64.into());
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Unsigned(v) => {
            if v < 128 {
                buf.push(Marker::PosFixInt(v as u8).into());
            } else if v <= u8::MAX as u64 {
                buf.push(Marker::UInt8.into());
                buf.push(v as u8);
            } else if v <= u16::MAX as u64 {
                buf.push(Marker::UInt16.into());
                buf.extend_from_slice(&(v as u16).to_be_bytes());
            } else if v <= u32::MAX as u64 {
                buf.push(Marker::UInt32.into());
                buf.extend_from_slice(&(v as u32).to_be_bytes());
            } else {
                buf.push(Marker::UInt64.into());
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Str(v) => {
            let len = v.len();
            assert!(len <= (u32::MAX as usize));
            if len <= 31 {
                buf.push(Marker::FixStr(len as u8).into());
            } else if len <= u8::MAX as usize {
                buf.push(Marker::Str8.into());
                buf.push(len as u8);
            } else if len <= u16::MAX as usize {
                buf.push(Marker::Str16.into());
                buf.extend_from_slice(&(len as u16).to_be_bytes());
            } else {
                buf.push(Marker::Str32.into());
                buf.extend_from_slice(&(len as u32).to_be_bytes());
            }
            buf.extend_from_slice(v);
        }
        F32(v) => {
            buf.push(Marker::F32.into());
            buf.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        F64(v) => {
            buf.push(Marker::F64.into());
            buf.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        Bin(v) => {
            let len = v.len();
            assert!(len <= (u32::MAX as usize));
            if len <= u8::MAX as usize {
                buf.push(Marker::Bin8.into());
                buf.push(len as u8);
            } else if len <= u16::MAX as usize {
                buf.push(Marker::Bin16.into());
                buf.extend_from_slice(&(len as u16).to_be_bytes());
            } else {
                buf.push(Marker::Bin32.into());
                buf.extend_from_slice(&(len as u32).to_be_bytes());
            }
            buf.extend_from_slice(v);
        }
        Array(len) => {
            assert!(len <= (u32::MAX as usize));
            if len <= 15 {
                buf.push(Marker::FixArray(len as u8).into());
            } else if len <= u16::MAX as usize {
                buf.push(Marker::Array16.into());
                buf.extend_from_slice(&(len as u16).to_be_bytes());
            } else {
                buf.push(Marker::Array32.into());
                buf.extend_from_slice(&(len as u32).to_be_bytes());
            }
        }
        Map(len) => {
            assert!(len <= (u32::MAX as usize));
            if len <= 15 {
                buf.push(Marker::FixMap(len as u8).into());
            } else if len <= u16::MAX as usize {
                buf.push(Marker::Map16.into());
                buf.extend_from_slice(&(len as u16).to_be_bytes());
            } else {
                buf.push(Marker::Map32.into());
                buf.extend_from_slice(&(len as u32).to_be_bytes());
            }
        }
        Time(v) => {
            // time96 when seconds exceed 34 bits, else time64 when there is a
            // nanosecond remainder, else time32.
            if !v.fits_34_bits() {
                serialize_elem(buf, Time96(v));
            } else if v.timestamp_subsec_nanos() != 0 {
                serialize_elem(buf, Time64(v));
            } else {
                serialize_elem(buf, Time32(v));
            }
        }
        Time32(v) => {
            // Seconds truncated to u32; nanoseconds silently discarded.
            buf.push(Marker::FixExt4.into());
            buf.push(ExtType::Timestamp.into_i8() as u8);
            buf.extend_from_slice(&(v.timestamp_utc() as u32).to_be_bytes());
        }
        Time64(v) => {
            // Nanoseconds in the high 30 bits, seconds in the low 34.
            let data = ((v.timestamp_subsec_nanos() as u64) << 34)
                | (v.timestamp_utc() as u64 & 0x3_ffff_ffff);
            buf.push(Marker::FixExt8.into());
            buf.push(ExtType::Timestamp.into_i8() as u8);
            buf.extend_from_slice(&data.to_be_bytes());
        }
        Time96(v) => {
            Marker::encode_ext_marker(buf, 12);
            buf.push(ExtType::Timestamp.into_i8() as u8);
            buf.extend_from_slice(&v.timestamp_subsec_nanos().to_be_bytes());
            buf.extend_from_slice(&v.timestamp_utc().to_be_bytes());
        }
        Ext(ty, v) => {
            Marker::encode_ext_marker(buf, v.len());
            buf.push(ty as u8);
            buf.extend_from_slice(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(elem: Element) -> Vec<u8> {
        let mut buf = Vec::new();
        serialize_elem(&mut buf, elem);
        buf
    }

    #[test]
    fn scalars() {
        assert_eq!(enc(Element::Null), vec![0xc0]);
        assert_eq!(enc(Element::Bool(false)), vec![0xc2]);
        assert_eq!(enc(Element::Bool(true)), vec![0xc3]);
    }

    #[test]
    fn unsigned_widths() {
        assert_eq!(enc(Element::Unsigned(0)), vec![0x00]);
        assert_eq!(enc(Element::Unsigned(127)), vec![0x7f]);
        assert_eq!(enc(Element::Unsigned(128)), vec![0xcc, 0x80]);
        assert_eq!(enc(Element::Unsigned(255)), vec![0xcc, 0xff]);
        assert_eq!(enc(Element::Unsigned(256)), vec![0xcd, 0x01, 0x00]);
        assert_eq!(enc(Element::Unsigned(65535)), vec![0xcd, 0xff, 0xff]);
        assert_eq!(
            enc(Element::Unsigned(65536)),
            vec![0xce, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            enc(Element::Unsigned(u32::MAX as u64)),
            vec![0xce, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            enc(Element::Unsigned(u32::MAX as u64 + 1)),
            vec![0xcf, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            enc(Element::Unsigned(u64::MAX)),
            vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn signed_widths() {
        assert_eq!(enc(Element::Signed(0)), vec![0x00]);
        assert_eq!(enc(Element::Signed(127)), vec![0x7f]);
        assert_eq!(enc(Element::Signed(-1)), vec![0xff]);
        assert_eq!(enc(Element::Signed(-32)), vec![0xe0]);
        assert_eq!(enc(Element::Signed(-33)), vec![0xd0, 0xdf]);
        assert_eq!(enc(Element::Signed(-128)), vec![0xd0, 0x80]);
        assert_eq!(enc(Element::Signed(-129)), vec![0xd1, 0xff, 0x7f]);
        assert_eq!(enc(Element::Signed(-32769)), vec![0xd2, 0xff, 0xff, 0x7f, 0xff]);
        assert_eq!(
            enc(Element::Signed(i32::MIN as i64 - 1)),
            vec![0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff]
        );

        // Positive values outside fixint widen signedly, not to uint forms
        assert_eq!(enc(Element::Signed(128)), vec![0xd1, 0x00, 0x80]);
        assert_eq!(enc(Element::Signed(32767)), vec![0xd1, 0x7f, 0xff]);
        assert_eq!(
            enc(Element::Signed(32768)),
            vec![0xd2, 0x00, 0x00, 0x80, 0x00]
        );
        assert_eq!(
            enc(Element::Signed(i32::MAX as i64 + 1)),
            vec![0xd3, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn floats() {
        assert_eq!(enc(Element::F32(1.5)), vec![0xca, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(
            enc(Element::F64(1.5)),
            vec![0xcb, 0x3f, 0xf8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn str_length_classes() {
        assert_eq!(enc(Element::Str(b"")), vec![0xa0]);
        assert_eq!(enc(Element::Str(b"abc")), vec![0xa3, b'a', b'b', b'c']);

        let s = vec![b'x'; 31];
        assert_eq!(enc(Element::Str(&s))[0], 0xbf);

        let s = vec![b'x'; 32];
        assert_eq!(&enc(Element::Str(&s))[..2], &[0xd9, 32]);

        let s = vec![b'x'; 256];
        assert_eq!(&enc(Element::Str(&s))[..3], &[0xda, 0x01, 0x00]);

        let s = vec![b'x'; 65536];
        assert_eq!(&enc(Element::Str(&s))[..5], &[0xdb, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn bin_length_classes() {
        assert_eq!(enc(Element::Bin(b"")), vec![0xc4, 0]);
        assert_eq!(enc(Element::Bin(&[9])), vec![0xc4, 1, 9]);

        let b = vec![0u8; 256];
        assert_eq!(&enc(Element::Bin(&b))[..3], &[0xc5, 0x01, 0x00]);

        let b = vec![0u8; 65536];
        assert_eq!(&enc(Element::Bin(&b))[..5], &[0xc6, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn container_headers() {
        assert_eq!(enc(Element::Array(0)), vec![0x90]);
        assert_eq!(enc(Element::Array(15)), vec![0x9f]);
        assert_eq!(enc(Element::Array(16)), vec![0xdc, 0x00, 0x10]);
        assert_eq!(enc(Element::Array(65535)), vec![0xdc, 0xff, 0xff]);
        assert_eq!(
            enc(Element::Array(65536)),
            vec![0xdd, 0x00, 0x01, 0x00, 0x00]
        );

        assert_eq!(enc(Element::Map(0)), vec![0x80]);
        assert_eq!(enc(Element::Map(15)), vec![0x8f]);
        assert_eq!(enc(Element::Map(16)), vec![0xde, 0x00, 0x10]);
        assert_eq!(enc(Element::Map(65536)), vec![0xdf, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn time_forms() {
        let t = Timestamp::from_sec(0x1234);
        assert_eq!(
            enc(Element::Time32(t)),
            vec![0xd6, 0xff, 0x00, 0x00, 0x12, 0x34]
        );

        let t = Timestamp::from_utc(1, 2).unwrap();
        let mut expect = vec![0xd7, 0xff];
        expect.extend_from_slice(&((2u64 << 34) | 1).to_be_bytes());
        assert_eq!(enc(Element::Time64(t)), expect);

        let t = Timestamp::from_utc(-1, 5).unwrap();
        let mut expect = vec![0xc7, 12, 0xff];
        expect.extend_from_slice(&5u32.to_be_bytes());
        expect.extend_from_slice(&(-1i64).to_be_bytes());
        assert_eq!(enc(Element::Time96(t)), expect);
    }

    #[test]
    fn time_auto_selection() {
        // Zero nanoseconds, seconds in 34 bits: 32-bit form
        assert_eq!(enc(Element::Time(Timestamp::from_sec(10))).len(), 6);
        // Nonzero nanoseconds, seconds in 34 bits: 64-bit form
        let t = Timestamp::from_utc(10, 1).unwrap();
        assert_eq!(enc(Element::Time(t)).len(), 10);
        // Seconds beyond 34 bits: 96-bit form
        assert_eq!(enc(Element::Time(Timestamp::from_sec(1 << 34))).len(), 15);
        assert_eq!(enc(Element::Time(Timestamp::from_sec(-1))).len(), 15);
    }

    #[test]
    fn time32_discards_nanoseconds() {
        let t = Timestamp::from_utc(0x1234, 999).unwrap();
        assert_eq!(
            enc(Element::Time32(t)),
            vec![0xd6, 0xff, 0x00, 0x00, 0x12, 0x34]
        );
    }

    #[test]
    fn ext_forms() {
        assert_eq!(enc(Element::Ext(5, &[0xaa])), vec![0xd4, 5, 0xaa]);
        assert_eq!(
            enc(Element::Ext(-2, &[1, 2, 3, 4])),
            vec![0xd6, 0xfe, 1, 2, 3, 4]
        );
        assert_eq!(enc(Element::Ext(1, &[7, 8, 9])), vec![0xc7, 3, 1, 7, 8, 9]);

        let payload = vec![0u8; 300];
        let out = enc(Element::Ext(1, &payload));
        assert_eq!(&out[..4], &[0xc8, 0x01, 0x2c, 1]);
        assert_eq!(out.len(), 4 + 300);
    }
}
