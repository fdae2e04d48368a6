use std::borrow::Cow;
use std::collections::HashSet;

use crate::element::{serialize_elem, Element};
use crate::error::{Error, Result};
use crate::host::Payload;
use crate::tag::Tag;
use crate::value::{Array, Map, Value};
use crate::MAX_SUBSTITUTIONS;

/// Settings for one encode call.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Upper bound on chained representation overrides resolved for a single
    /// value. A substitution chain longer than this aborts the encode with
    /// [`Error::SubstitutionLimit`].
    pub max_substitutions: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            max_substitutions: MAX_SUBSTITUTIONS,
        }
    }
}

/// Encode a value tree into a finished MessagePack byte sequence.
///
/// The returned bytes are the complete wire-format document; no framing is
/// added beyond the format's own markers. Encoding either succeeds in full or
/// fails with the first error met during the depth-first traversal - no
/// partial output is ever returned.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    encode_with(value, &EncodeOptions::default())
}

/// [`encode`] with explicit settings.
pub fn encode_with(value: &Value, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    Encoder::new(opts).encode_value(value, &mut buf)?;
    Ok(buf)
}

/// One top-level encode call: the value dispatcher plus the identity set that
/// guards against re-visiting a container. Dropped when the call returns.
struct Encoder<'a> {
    opts: &'a EncodeOptions,
    visited: HashSet<usize>,
}

impl<'a> Encoder<'a> {
    fn new(opts: &'a EncodeOptions) -> Self {
        Encoder {
            opts,
            visited: HashSet::new(),
        }
    }

    /// Register a container identity, failing if it was already seen during
    /// this call. Identities are never released: revisiting a container
    /// through shared substructure is as fatal as a true cycle.
    fn mark(&mut self, identity: usize) -> Result<()> {
        if !self.visited.insert(identity) {
            return Err(Error::Cycle);
        }
        Ok(())
    }

    /// Run the substitution chain until a value without a representation
    /// override remains.
    fn resolve<'v>(&self, value: &'v Value) -> Result<Cow<'v, Value>> {
        let mut current = match substitute(value) {
            None => return Ok(Cow::Borrowed(value)),
            Some(sub) => sub,
        };
        let mut subs = 1;
        loop {
            if subs > self.opts.max_substitutions {
                return Err(Error::SubstitutionLimit {
                    max: self.opts.max_substitutions,
                });
            }
            match substitute(&current) {
                Some(next) => {
                    current = next;
                    subs += 1;
                }
                None => return Ok(Cow::Owned(current)),
            }
        }
    }

    fn encode_value(&mut self, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
        match self.resolve(value)? {
            Cow::Borrowed(v) => self.dispatch(v, buf),
            Cow::Owned(v) => self.dispatch(&v, buf),
        }
    }

    /// Classify a resolved value by shape and route it to a packer.
    fn dispatch(&mut self, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::Null => serialize_elem(buf, Element::Null),
            Value::Bool(v) => serialize_elem(buf, Element::Bool(*v)),
            Value::Number(v) => serialize_elem(buf, number_elem(*v)),
            Value::String(v) => {
                // Valid UTF-8 is a string on the wire, anything else is bin
                if std::str::from_utf8(v).is_ok() {
                    serialize_elem(buf, Element::Str(v));
                } else {
                    serialize_elem(buf, Element::Bin(v));
                }
            }
            Value::Array(arr) => {
                let len = arr.len();
                if len == 0 {
                    // Without a tag, an empty array is indistinguishable from
                    // an empty map and takes the map encoding
                    self.mark(arr.identity())?;
                    serialize_elem(buf, Element::Map(0));
                } else {
                    self.encode_array(arr, len, buf)?;
                }
            }
            Value::Map(map) => self.encode_map(map, buf)?,
            Value::Tag(tag) => self.encode_tag(tag, buf)?,
            Value::Handle(handle) => {
                if let Some(packer) = handle.as_packer() {
                    packer.pack_msg(buf);
                    return Ok(());
                }
                match handle.payload() {
                    Some(Payload::Str(v)) => serialize_elem(buf, Element::Str(v)),
                    Some(Payload::Bin(v)) => serialize_elem(buf, Element::Bin(v)),
                    Some(Payload::Unsigned(v)) => serialize_elem(buf, Element::Unsigned(v)),
                    Some(Payload::Signed(v)) => serialize_elem(buf, Element::Signed(v)),
                    Some(Payload::Time(v)) => serialize_elem(buf, Element::Time(v)),
                    None => {
                        return Err(Error::Unencodable(format!(
                            "{} has no pack capability or recognized payload",
                            handle.kind()
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_tag(&mut self, tag: &Tag, buf: &mut Vec<u8>) -> Result<()> {
        match tag {
            Tag::Raw(bytes) => buf.extend_from_slice(bytes),
            // An absent container degenerates to nil, not to an empty
            // container encoding
            Tag::Array(None) | Tag::Map(None) => serialize_elem(buf, Element::Null),
            Tag::Array(Some(arr)) => self.encode_array(arr, arr.len(), buf)?,
            Tag::Map(Some(map)) => self.encode_map(map, buf)?,
            Tag::Str(v) => serialize_elem(buf, Element::Str(v)),
            Tag::Bin(v) => serialize_elem(buf, Element::Bin(v)),
            Tag::Signed(v) => serialize_elem(buf, Element::Signed(*v)),
            Tag::Unsigned(v) => serialize_elem(buf, Element::Unsigned(*v)),
            Tag::F32(v) => serialize_elem(buf, Element::F32(*v)),
            Tag::F64(v) => serialize_elem(buf, Element::F64(*v)),
            Tag::Time(v) => serialize_elem(buf, Element::Time(*v)),
            Tag::Time32(v) => serialize_elem(buf, Element::Time32(*v)),
            Tag::Time64(v) => serialize_elem(buf, Element::Time64(*v)),
            Tag::Time96(v) => serialize_elem(buf, Element::Time96(*v)),
            Tag::Ext(ty, v) => serialize_elem(buf, Element::Ext(*ty, v)),
        }
        Ok(())
    }

    fn encode_array(&mut self, arr: &Array, len: usize, buf: &mut Vec<u8>) -> Result<()> {
        self.mark(arr.identity())?;
        serialize_elem(buf, Element::Array(len));
        for i in 0..len {
            match arr.get(i) {
                Some(elem) => self.encode_value(&elem, buf)?,
                // A host hook shrank the container mid-encode; the header is
                // already out, so pad with nil to keep the document parseable
                None => serialize_elem(buf, Element::Null),
            }
        }
        Ok(())
    }

    fn encode_map(&mut self, map: &Map, buf: &mut Vec<u8>) -> Result<()> {
        self.mark(map.identity())?;
        // Entries go to a scratch buffer while being counted; the header
        // can't go out until the entry count is known
        let mut scratch = Vec::with_capacity(64);
        let mut count = 0;
        for (key, value) in map.entries() {
            count += 1;
            self.encode_value(&key, &mut scratch)?;
            self.encode_value(&value, &mut scratch)?;
        }
        serialize_elem(buf, Element::Map(count));
        buf.extend_from_slice(&scratch);
        Ok(())
    }
}

/// Invoke a value's representation override, if it has one.
fn substitute(value: &Value) -> Option<Value> {
    match value {
        Value::Handle(handle) => handle.as_represent().map(|r| r.represent()),
        _ => None,
    }
}

/// Pick the narrowest faithful wire form for a host number: the signed
/// integer forms when the value is integral and in i64 range, float32 when
/// the value survives the round trip, float64 otherwise.
fn number_elem(v: f64) -> Element<'static> {
    // The cast saturates, so the range check must come first: `i64::MAX as
    // f64` rounds up to 2^63, one past the largest encodable integer, which
    // would otherwise slip through the round-trip equality.
    if v >= (i64::MIN as f64) && v < (i64::MAX as f64) && v == ((v as i64) as f64) {
        Element::Signed(v as i64)
    } else if v == ((v as f32) as f64) {
        Element::F32(v as f32)
    } else {
        Element::F64(v)
    }
}
