//! Wire representation of element and shadow-root handles.
//!
//! The W3C protocol identifies a remote element by a JSON object with a
//! single magic key. This module owns that key, the typed [`ElementRef`]
//! wrapper around it, and the conversions between the two.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Magic key identifying an element reference on the wire.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Magic key identifying a shadow-root reference on the wire.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";
/// Key used by pre-W3C remote ends. Accepted on input, never emitted.
pub(crate) const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Opaque handle to an element held by the remote end.
///
/// Serialization produces the wire object, so an `ElementRef` can be passed
/// straight into script arguments or command parameters:
///
/// ```rust
/// use rudder_codec::ElementRef;
///
/// let element = ElementRef::new("e7f1");
/// let wire = serde_json::to_value(&element).unwrap();
/// assert_eq!(wire["element-6066-11e4-a52e-4f735466cecf"], "e7f1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    id: String,
}

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The remote end's identifier for this element.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parse a wire value into a handle, accepting both the W3C and the
    /// legacy key. Returns `None` for anything that is not an element object.
    pub fn from_wire(value: &Value) -> Option<Self> {
        element_id(value).map(Self::new)
    }
}

impl Serialize for ElementRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(ELEMENT_KEY, &self.id)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ElementRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        match object_id(&map) {
            Some(id) => Ok(Self::new(id)),
            None => Err(D::Error::custom("not a wire element reference")),
        }
    }
}

impl From<ElementRef> for Value {
    fn from(element: ElementRef) -> Value {
        wire_element(&element.id)
    }
}

impl From<&ElementRef> for Value {
    fn from(element: &ElementRef) -> Value {
        wire_element(&element.id)
    }
}

/// Build the wire object for an element id.
pub fn wire_element(id: &str) -> Value {
    json!({ ELEMENT_KEY: id })
}

/// Extract the element id out of a wire value, if it is one.
pub(crate) fn element_id(value: &Value) -> Option<&str> {
    value.as_object().and_then(object_id)
}

fn object_id(map: &Map<String, Value>) -> Option<&str> {
    map.get(ELEMENT_KEY)
        .or_else(|| map.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
}

/// Normalize legacy element objects to the W3C key, recursing through
/// arrays and objects. Non-element values pass through untouched.
pub fn to_wire_value(value: &Value) -> Value {
    if let Some(id) = element_id(value) {
        return wire_element(id);
    }
    match value {
        Value::Array(items) => Value::Array(items.iter().map(to_wire_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_wire_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
