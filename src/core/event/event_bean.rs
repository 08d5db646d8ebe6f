// SPDX-License-Identifier: MIT OR Apache-2.0

use super::avro::SchemaRecord;
use super::bean::BeanObject;
use super::event_type::EventType;
use super::value::{AttributeValue, MapUnderlying};
use super::xml::XmlNode;
use crate::core::exception::PropertyAccessError;
use std::fmt;
use std::sync::Arc;

/// Closed set of physical event representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Property name to value mapping
    Map,
    /// Fixed-arity positional array
    ObjectArray,
    /// Typed object read through named accessors
    Bean,
    /// Element tree with attributes and children
    Xml,
    /// Record conforming to a declared schema
    Avro,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Representation::Map => "map",
            Representation::ObjectArray => "object-array",
            Representation::Bean => "bean",
            Representation::Xml => "xml",
            Representation::Avro => "avro",
        })
    }
}

/// Owned backing store of an event.
#[derive(Clone, Debug)]
pub enum Underlying {
    Map(Arc<MapUnderlying>),
    ObjectArray(Arc<Vec<AttributeValue>>),
    Bean(Arc<dyn BeanObject>),
    Xml(Arc<XmlNode>),
    Avro(Arc<SchemaRecord>),
}

impl Underlying {
    pub fn representation(&self) -> Representation {
        self.as_ref().representation()
    }

    pub fn as_ref(&self) -> UnderlyingRef<'_> {
        match self {
            Underlying::Map(map) => UnderlyingRef::Map(map),
            Underlying::ObjectArray(values) => UnderlyingRef::ObjectArray(values),
            Underlying::Bean(object) => UnderlyingRef::Bean(object.as_ref()),
            Underlying::Xml(node) => UnderlyingRef::Xml(node),
            Underlying::Avro(record) => UnderlyingRef::Avro(record),
        }
    }

    /// Shares the backing store of a raw property value, `None` for scalars
    /// and typed events.
    pub fn from_value(value: &AttributeValue) -> Option<Underlying> {
        match value {
            AttributeValue::Map(map) => Some(Underlying::Map(Arc::clone(map))),
            AttributeValue::Array(values) => Some(Underlying::ObjectArray(Arc::clone(values))),
            AttributeValue::Object(object) => Some(Underlying::Bean(Arc::clone(object))),
            AttributeValue::Node(node) => Some(Underlying::Xml(Arc::clone(node))),
            AttributeValue::Record(record) => Some(Underlying::Avro(Arc::clone(record))),
            _ => None,
        }
    }
}

impl PartialEq for Underlying {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Underlying::Map(a), Underlying::Map(b)) => a == b,
            (Underlying::ObjectArray(a), Underlying::ObjectArray(b)) => a == b,
            (Underlying::Bean(a), Underlying::Bean(b)) => Arc::ptr_eq(a, b),
            (Underlying::Xml(a), Underlying::Xml(b)) => a == b,
            (Underlying::Avro(a), Underlying::Avro(b)) => a == b,
            _ => false,
        }
    }
}

/// Borrowed view of a backing store, the argument of the getters' raw entry
/// points.
#[derive(Clone, Copy, Debug)]
pub enum UnderlyingRef<'a> {
    Map(&'a MapUnderlying),
    ObjectArray(&'a [AttributeValue]),
    Bean(&'a dyn BeanObject),
    Xml(&'a XmlNode),
    Avro(&'a SchemaRecord),
}

impl UnderlyingRef<'_> {
    pub fn representation(&self) -> Representation {
        match self {
            UnderlyingRef::Map(_) => Representation::Map,
            UnderlyingRef::ObjectArray(_) => Representation::ObjectArray,
            UnderlyingRef::Bean(_) => Representation::Bean,
            UnderlyingRef::Xml(_) => Representation::Xml,
            UnderlyingRef::Avro(_) => Representation::Avro,
        }
    }
}

/// An immutable event: a backing store plus the event type describing it.
///
/// The representation of the backing store always matches the event type's
/// representation; it never changes after construction.
#[derive(Clone, Debug)]
pub struct EventBean {
    event_type: Arc<EventType>,
    underlying: Underlying,
}

impl EventBean {
    pub fn new(
        event_type: Arc<EventType>,
        underlying: Underlying,
    ) -> Result<Self, PropertyAccessError> {
        if event_type.representation() != underlying.representation() {
            return Err(PropertyAccessError::UnderlyingMismatch {
                expected: event_type.representation(),
                actual: underlying.representation(),
            });
        }
        Ok(EventBean {
            event_type,
            underlying,
        })
    }

    /// Wraps a backing store already known to match `event_type`.
    pub(crate) fn wrap(event_type: Arc<EventType>, underlying: Underlying) -> Self {
        debug_assert_eq!(event_type.representation(), underlying.representation());
        EventBean {
            event_type,
            underlying,
        }
    }

    pub fn from_map(
        event_type: Arc<EventType>,
        values: MapUnderlying,
    ) -> Result<Self, PropertyAccessError> {
        Self::new(event_type, Underlying::Map(Arc::new(values)))
    }

    pub fn from_object_array(
        event_type: Arc<EventType>,
        values: Vec<AttributeValue>,
    ) -> Result<Self, PropertyAccessError> {
        Self::new(event_type, Underlying::ObjectArray(Arc::new(values)))
    }

    pub fn from_bean(
        event_type: Arc<EventType>,
        object: Arc<dyn BeanObject>,
    ) -> Result<Self, PropertyAccessError> {
        Self::new(event_type, Underlying::Bean(object))
    }

    pub fn from_xml(
        event_type: Arc<EventType>,
        node: XmlNode,
    ) -> Result<Self, PropertyAccessError> {
        Self::new(event_type, Underlying::Xml(Arc::new(node)))
    }

    pub fn from_record(
        event_type: Arc<EventType>,
        record: SchemaRecord,
    ) -> Result<Self, PropertyAccessError> {
        Self::new(event_type, Underlying::Avro(Arc::new(record)))
    }

    pub fn event_type(&self) -> &Arc<EventType> {
        &self.event_type
    }

    pub fn underlying(&self) -> &Underlying {
        &self.underlying
    }

    pub fn underlying_ref(&self) -> UnderlyingRef<'_> {
        self.underlying.as_ref()
    }

    pub fn representation(&self) -> Representation {
        self.underlying.representation()
    }
}

impl PartialEq for EventBean {
    fn eq(&self, other: &Self) -> bool {
        self.event_type.name() == other.event_type.name() && self.underlying == other.underlying
    }
}
