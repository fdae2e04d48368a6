/// MessagePack format markers. For internal use only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Marker {
    PosFixInt(u8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Null,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    F32,
    F64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
    NegFixInt(i8),
}

impl Marker {
    /// Converts a marker object into a single-byte representation.
    /// Assumes the content of the marker is already masked appropriately.
    pub fn into_u8(self) -> u8 {
        match self {
            Marker::PosFixInt(val) => val,
            Marker::FixMap(len) => 0x80 | len,
            Marker::FixArray(len) => 0x90 | len,
            Marker::FixStr(len) => 0xa0 | len,
            Marker::Null => 0xc0,
            Marker::False => 0xc2,
            Marker::True => 0xc3,
            Marker::Bin8 => 0xc4,
            Marker::Bin16 => 0xc5,
            Marker::Bin32 => 0xc6,
            Marker::Ext8 => 0xc7,
            Marker::Ext16 => 0xc8,
            Marker::Ext32 => 0xc9,
            Marker::F32 => 0xca,
            Marker::F64 => 0xcb,
            Marker::UInt8 => 0xcc,
            Marker::UInt16 => 0xcd,
            Marker::UInt32 => 0xce,
            Marker::UInt64 => 0xcf,
            Marker::Int8 => 0xd0,
            Marker::Int16 => 0xd1,
            Marker::Int32 => 0xd2,
            Marker::Int64 => 0xd3,
            Marker::FixExt1 => 0xd4,
            Marker::FixExt2 => 0xd5,
            Marker::FixExt4 => 0xd6,
            Marker::FixExt8 => 0xd7,
            Marker::FixExt16 => 0xd8,
            Marker::Str8 => 0xd9,
            Marker::Str16 => 0xda,
            Marker::Str32 => 0xdb,
            Marker::Array16 => 0xdc,
            Marker::Array32 => 0xdd,
            Marker::Map16 => 0xde,
            Marker::Map32 => 0xdf,
            Marker::NegFixInt(val) => val as u8,
        }
    }

    /// Write the ext-family marker and length prefix for a payload of `len`
    /// bytes. Lengths in the fixext set get a single marker byte; everything
    /// else gets ext8/16/32 followed by a raw big-endian length field. The
    /// format specifies a bare length here, not an integer element.
    pub fn encode_ext_marker(buf: &mut Vec<u8>, len: usize) {
        assert!(len <= u32::MAX as usize);
        match len {
            1 => buf.push(Marker::FixExt1.into()),
            2 => buf.push(Marker::FixExt2.into()),
            4 => buf.push(Marker::FixExt4.into()),
            8 => buf.push(Marker::FixExt8.into()),
            16 => buf.push(Marker::FixExt16.into()),
            _ => {
                if len <= u8::MAX as usize {
                    buf.push(Marker::Ext8.into());
                    buf.push(len as u8);
                } else if len <= u16::MAX as usize {
                    buf.push(Marker::Ext16.into());
                    buf.extend_from_slice(&(len as u16).to_be_bytes());
                } else {
                    buf.push(Marker::Ext32.into());
                    buf.extend_from_slice(&(len as u32).to_be_bytes());
                }
            }
        }
    }
}

impl From<Marker> for u8 {
    fn from(val: Marker) -> u8 {
        val.into_u8()
    }
}

/// The ext type codes this library assigns itself.
#[derive(Debug, PartialEq, Eq)]
pub enum ExtType {
    Timestamp,
}

impl ExtType {
    /// Return the assigned extension type.
    pub fn into_i8(self) -> i8 {
        match self {
            ExtType::Timestamp => -1,
        }
    }
}

impl From<ExtType> for i8 {
    fn from(val: ExtType) -> i8 {
        val.into_i8()
    }
}
