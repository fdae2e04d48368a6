use std::cell::RefCell;
use std::rc::Rc;

use crate::host::Handle;
use crate::tag::Tag;
use crate::timestamp::Timestamp;

/// An ordered, integer-indexed container, shared by reference.
///
/// Cloning an `Array` clones the reference, not the elements, mirroring the
/// table-reference semantics of a dynamically-typed host. Equality between
/// two `Array`s is identity equality.
#[derive(Clone, Debug, Default)]
pub struct Array {
    elems: Rc<RefCell<Vec<Value>>>,
}

impl Array {
    pub fn new() -> Array {
        Array::default()
    }

    pub fn from_vec(elems: Vec<Value>) -> Array {
        Array {
            elems: Rc::new(RefCell::new(elems)),
        }
    }

    pub fn len(&self) -> usize {
        self.elems.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.borrow().is_empty()
    }

    /// Fetch the element at `index`, cloning it out. The borrow is released
    /// before returning, so host hooks may touch this container again.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elems.borrow().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.elems.borrow_mut().push(value);
    }

    /// True if both refer to the same underlying container.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.elems, &other.elems)
    }

    /// Stable identity handle for cycle tracking, valid while the container
    /// is alive.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.elems) as *const u8 as usize
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Array) -> bool {
        self.ptr_eq(other)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Array::from_vec(iter.into_iter().collect())
    }
}

/// An unordered key-to-value container, shared by reference.
///
/// Keys may be arbitrary values. Entries keep insertion order internally, but
/// no ordering is guaranteed on the wire. Equality between two `Map`s is
/// identity equality.
#[derive(Clone, Debug, Default)]
pub struct Map {
    entries: Rc<RefCell<Vec<(Value, Value)>>>,
}

impl Map {
    pub fn new() -> Map {
        Map::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Insert a key/value pair, replacing the value of an equal existing key.
    /// Container and handle keys compare by identity; all NaN number keys
    /// count as the same key.
    pub fn insert(&self, key: Value, value: Value) {
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.iter_mut().find(|(k, _)| key_matches(k, &key)) {
            entry.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| key_matches(k, key))
            .map(|(_, v)| v.clone())
    }

    /// Snapshot all entries. The borrow is released before returning, so host
    /// hooks may touch this container again while the snapshot is walked.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.entries.borrow().clone()
    }

    /// True if both refer to the same underlying container.
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.entries) as *const u8 as usize
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Map) -> bool {
        self.ptr_eq(other)
    }
}

// NaN never compares equal to itself, so a plain equality scan would let
// repeated NaN-keyed inserts pile up duplicate entries and put a map with
// duplicate keys on the wire.
fn key_matches(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => a == b,
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// The universal input to the encoder: a closed sum over the host's runtime
/// value shapes.
///
/// `String` carries raw bytes whose UTF-8 validity is unknown a priori; the
/// encoder picks str or bin wire format accordingly. `Tag` pins down an
/// otherwise-ambiguous encoding. `Handle` carries an opaque host value which
/// may expose encoding capabilities of its own.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Vec<u8>),
    Array(Array),
    Map(Map),
    Tag(Box<Tag>),
    Handle(Handle),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Value::Tag(_))
    }

    pub fn is_handle(&self) -> bool {
        matches!(self, Value::Handle(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(v) = *self {
            Some(v)
        } else {
            None
        }
    }

    /// The string content, if this is a `String` holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(ref v) = *self {
            std::str::from_utf8(v).ok()
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Value::String(ref v) = *self {
            Some(v.as_slice())
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        if let Value::Array(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        if let Value::Map(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Number(v as f64)
    }
}

macro_rules! impl_from_number {
    ($t: ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::Number(v as f64)
            }
        }
    };
}

impl_from_number!(i8);
impl_from_number!(i16);
impl_from_number!(i32);
impl_from_number!(u8);
impl_from_number!(u16);
impl_from_number!(u32);

// 64-bit integers exceed what a host number can hold exactly, so they enter
// as opaque host integers and take the integer wire forms directly.
impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Handle(Handle::new(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        Value::Handle(Handle::new(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Value {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Value {
        Value::Map(v)
    }
}

impl From<Tag> for Value {
    fn from(v: Tag) -> Value {
        Value::Tag(Box::new(v))
    }
}

impl From<Handle> for Value {
    fn from(v: Handle) -> Value {
        Value::Handle(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Value {
        Value::Handle(Handle::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
