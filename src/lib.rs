//! dyn-pack serializes a dynamically-typed value tree into MessagePack bytes.
//!
//! Host applications with a duck-typed value model - tables, strings,
//! numbers, opaque native objects - build a [`Value`] tree and get back a
//! canonical, interoperable byte representation:
//!
//! - Each primitive takes the narrowest wire form that holds it. A host
//!   number that is integral encodes as an integer; one that survives a
//!   round trip through `f32` encodes as float32; everything else as
//!   float64.
//! - Strings carry raw bytes. Valid UTF-8 gets the str format, anything else
//!   falls back to bin, and a [`Tag`] can force either.
//! - Containers are shared references. The encoder refuses to visit the same
//!   container twice within one call, so cyclic or diamond-shaped structures
//!   fail instead of looping or silently duplicating.
//! - Opaque host values sit behind a [`Handle`] and may substitute another
//!   representation for themselves ([`Represent`]) or write their own bytes
//!   ([`PackMsg`]).
//!
//! ```
//! use dyn_pack::{encode, Array, Map, Value};
//!
//! let map = Map::new();
//! map.insert("name".into(), "dyn-pack".into());
//! map.insert("tags".into(), Array::from_vec(vec![1u8.into(), 2u8.into()]).into());
//! let bytes = encode(&Value::Map(map)).unwrap();
//! assert_eq!(bytes[0], 0x82);
//! ```
//!
//! Encoding is the only direction; this crate does not decode.

mod element;
mod encode;
mod error;
mod host;
mod marker;
mod tag;
mod timestamp;
mod value;

pub use self::encode::{encode, encode_with, EncodeOptions};
pub use self::error::{Error, Result};
pub use self::host::{Handle, HostValue, PackMsg, Payload, Represent};
pub use self::tag::Tag;
pub use self::timestamp::Timestamp;
pub use self::value::{Array, Map, Value};

/// Default bound on chained representation overrides resolved for a single
/// value during encoding. A value may substitute another value for itself at
/// most this many times before the encode call fails; the bound exists so a
/// self-referential override chain cannot hang the encoder.
pub const MAX_SUBSTITUTIONS: usize = 64;
