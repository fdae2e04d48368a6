//! The surface between the encoder and opaque host values.
//!
//! A host embeds arbitrary native objects in its value model. The encoder
//! never inspects those objects directly; instead each one sits behind a
//! [`Handle`] and may opt into up to two capabilities:
//!
//! - [`Represent`]: substitute another value before encoding. Checked first,
//!   repeatedly, until a value without an override remains.
//! - [`PackMsg`]: append self-chosen wire bytes, bypassing the built-in
//!   packers entirely. Checked only when no override applies.
//!
//! A handle with neither capability may still encode if it exposes one of the
//! recognized [`Payload`] kinds. Anything else is an encoding error.

use std::fmt::Debug;
use std::rc::Rc;

use crate::timestamp::Timestamp;
use crate::value::Value;

/// Representation-override capability: a hook that substitutes another value
/// for this one prior to encoding. The substitute is itself subject to the
/// same check, forming a substitution chain.
pub trait Represent {
    fn represent(&self) -> Value;
}

/// Custom-pack capability: the value appends its own bytes to the output
/// buffer. The bytes are spliced in verbatim; the encoder adds no framing.
pub trait PackMsg {
    fn pack_msg(&self, buf: &mut Vec<u8>);
}

/// A host payload the encoder recognizes without either capability.
#[derive(Clone, Debug)]
pub enum Payload<'a> {
    /// Encoded with str wire format; no UTF-8 validity check is applied.
    Str(&'a [u8]),
    /// Encoded with bin wire format.
    Bin(&'a [u8]),
    Unsigned(u64),
    Signed(i64),
    /// Encoded as a timestamp with automatic width selection.
    Time(Timestamp),
}

/// An opaque host-defined value.
///
/// The capability accessors default to `None`; a host type overrides the ones
/// it supports. `kind` names the type in encoding errors.
pub trait HostValue: Debug {
    fn kind(&self) -> &'static str;

    fn as_represent(&self) -> Option<&dyn Represent> {
        None
    }

    fn as_packer(&self) -> Option<&dyn PackMsg> {
        None
    }

    fn payload(&self) -> Option<Payload<'_>> {
        None
    }
}

/// A shared reference to an opaque host value. Cloning shares identity.
#[derive(Clone, Debug)]
pub struct Handle(Rc<dyn HostValue>);

impl Handle {
    pub fn new<T: HostValue + 'static>(value: T) -> Handle {
        Handle(Rc::new(value))
    }

    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    pub fn as_represent(&self) -> Option<&dyn Represent> {
        self.0.as_represent()
    }

    pub fn as_packer(&self) -> Option<&dyn PackMsg> {
        self.0.as_packer()
    }

    pub fn payload(&self) -> Option<Payload<'_>> {
        self.0.payload()
    }

    /// True if both refer to the same underlying host value.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Handle) -> bool {
        self.ptr_eq(other)
    }
}

impl HostValue for String {
    fn kind(&self) -> &'static str {
        "string"
    }

    fn payload(&self) -> Option<Payload<'_>> {
        Some(Payload::Str(self.as_bytes()))
    }
}

impl HostValue for Vec<u8> {
    fn kind(&self) -> &'static str {
        "bytes"
    }

    fn payload(&self) -> Option<Payload<'_>> {
        Some(Payload::Bin(self.as_slice()))
    }
}

impl HostValue for u64 {
    fn kind(&self) -> &'static str {
        "unsigned"
    }

    fn payload(&self) -> Option<Payload<'_>> {
        Some(Payload::Unsigned(*self))
    }
}

impl HostValue for i64 {
    fn kind(&self) -> &'static str {
        "signed"
    }

    fn payload(&self) -> Option<Payload<'_>> {
        Some(Payload::Signed(*self))
    }
}

impl HostValue for Timestamp {
    fn kind(&self) -> &'static str {
        "time"
    }

    fn payload(&self) -> Option<Payload<'_>> {
        Some(Payload::Time(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_identity() {
        let a = Handle::new(5u64);
        let b = a.clone();
        let c = Handle::new(5u64);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn builtin_payloads() {
        assert!(matches!(
            Handle::new(String::from("hi")).payload(),
            Some(Payload::Str(b"hi"))
        ));
        assert!(matches!(
            Handle::new(vec![1u8, 2]).payload(),
            Some(Payload::Bin(&[1, 2]))
        ));
        assert!(matches!(
            Handle::new(7u64).payload(),
            Some(Payload::Unsigned(7))
        ));
        assert!(matches!(
            Handle::new(-7i64).payload(),
            Some(Payload::Signed(-7))
        ));
        assert!(matches!(
            Handle::new(Timestamp::from_sec(9)).payload(),
            Some(Payload::Time(_))
        ));
    }
}
