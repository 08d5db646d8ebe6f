// SPDX-License-Identifier: MIT OR Apache-2.0

use super::avro::SchemaRecord;
use super::bean::BeanObject;
use super::event_bean::EventBean;
use super::xml::XmlNode;
use crate::query_api::definition::Type;
use std::collections::HashMap;
use std::sync::Arc;

/// Backing store of a map-represented event.
pub type MapUnderlying = HashMap<String, AttributeValue>;

/// A property value.
///
/// Besides scalars a value may hold a fully typed [`EventBean`] or a raw,
/// untyped instance of one of the event representations (a nested map, a
/// positional array, a typed object, a tree node or a schema-tagged record).
/// Raw values only become events when a fragment is requested.
#[derive(Clone, Debug, Default)]
pub enum AttributeValue {
    #[default]
    Null,
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Event(Arc<EventBean>),
    Map(Arc<MapUnderlying>),
    Array(Arc<Vec<AttributeValue>>),
    Object(Arc<dyn BeanObject>),
    Node(Arc<XmlNode>),
    Record(Arc<SchemaRecord>),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Scalar type of this value; `None` for null and for event-valued data.
    pub fn get_type(&self) -> Option<Type> {
        match self {
            AttributeValue::String(_) => Some(Type::STRING),
            AttributeValue::Int(_) => Some(Type::INT),
            AttributeValue::Long(_) => Some(Type::LONG),
            AttributeValue::Float(_) => Some(Type::FLOAT),
            AttributeValue::Double(_) => Some(Type::DOUBLE),
            AttributeValue::Bool(_) => Some(Type::BOOL),
            AttributeValue::Bytes(_) => Some(Type::BYTES),
            AttributeValue::Null
            | AttributeValue::Event(_)
            | AttributeValue::Map(_)
            | AttributeValue::Array(_)
            | AttributeValue::Object(_)
            | AttributeValue::Node(_)
            | AttributeValue::Record(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Arc<EventBean>> {
        match self {
            AttributeValue::Event(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a value of this shape may be bound where `expected` is declared.
    /// Null binds everywhere; `OBJECT` accepts anything.
    pub fn is_assignable_to(&self, expected: Type) -> bool {
        if expected == Type::OBJECT || self.is_null() {
            return true;
        }
        match self.get_type() {
            Some(actual) if actual == expected => true,
            Some(actual) => actual.is_numeric() && actual.widen(expected) == Some(expected),
            None => false,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        use AttributeValue::*;
        match (self, other) {
            (Null, Null) => true,
            (String(a), String(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Event(a), Event(b)) => Arc::ptr_eq(a, b) || a == b,
            (Map(a), Map(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            // Typed objects carry no equality contract; identity only.
            (Object(a), Object(b)) => Arc::ptr_eq(a, b),
            (Node(a), Node(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Long(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<Arc<EventBean>> for AttributeValue {
    fn from(value: Arc<EventBean>) -> Self {
        AttributeValue::Event(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignable() {
        assert!(AttributeValue::Int(1).is_assignable_to(Type::LONG));
        assert!(AttributeValue::Int(1).is_assignable_to(Type::DOUBLE));
        assert!(!AttributeValue::Double(1.0).is_assignable_to(Type::INT));
        assert!(!AttributeValue::from("x").is_assignable_to(Type::INT));
        assert!(AttributeValue::Null.is_assignable_to(Type::STRING));
        assert!(AttributeValue::from("x").is_assignable_to(Type::OBJECT));
    }

    #[test]
    fn test_raw_map_equality() {
        let mut a = MapUnderlying::new();
        a.insert("k".to_string(), AttributeValue::Int(1));
        let b = a.clone();
        assert_eq!(
            AttributeValue::Map(Arc::new(a)),
            AttributeValue::Map(Arc::new(b))
        );
    }
}
