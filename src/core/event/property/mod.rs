// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled property getters.
//!
//! Every concrete getter is built for exactly one representation and
//! implements [`EventPropertyGetter`], whose entry points take a borrowed view
//! of the backing store. The three capabilities callers use are separate
//! traits ([`PropertyValueGetter`], [`PropertyExistsGetter`],
//! [`FragmentGetter`]) implemented once for all getters on top of those raw
//! entry points, so calling code never branches on the representation.

pub mod factory;
pub mod nested;

pub use factory::{build_getter, simple_getter, CompiledProperty, EventTypeResolver};
pub use nested::NestedEntryPropertyGetter;

use super::event_bean::{EventBean, Representation, Underlying, UnderlyingRef};
use super::event_type::EventType;
use super::value::AttributeValue;
use crate::core::exception::PropertyAccessError;
use std::fmt::Debug;
use std::sync::Arc;

/// Raw, representation specific entry points of a getter.
///
/// Implementations are stateless and reentrant. Given a backing store of a
/// representation other than [`representation`](Self::representation) they
/// read as absent.
pub trait EventPropertyGetter: Debug + Send + Sync {
    fn representation(&self) -> Representation;

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue;

    fn is_underlying_exists(&self, underlying: UnderlyingRef<'_>) -> bool {
        !self.get_underlying(underlying).is_null()
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>>;
}

pub trait PropertyValueGetter {
    /// Fails only when the event's representation is not the one the getter
    /// was compiled for; absent values are `Null`.
    fn get(&self, event: &EventBean) -> Result<AttributeValue, PropertyAccessError>;
}

pub trait PropertyExistsGetter {
    fn is_exists_property(&self, event: &EventBean) -> bool;
}

pub trait FragmentGetter {
    fn get_fragment(&self, event: &EventBean) -> Option<Arc<EventBean>>;
}

impl<G: EventPropertyGetter + ?Sized> PropertyValueGetter for G {
    fn get(&self, event: &EventBean) -> Result<AttributeValue, PropertyAccessError> {
        if event.representation() != self.representation() {
            return Err(PropertyAccessError::UnderlyingMismatch {
                expected: self.representation(),
                actual: event.representation(),
            });
        }
        Ok(self.get_underlying(event.underlying_ref()))
    }
}

impl<G: EventPropertyGetter + ?Sized> PropertyExistsGetter for G {
    fn is_exists_property(&self, event: &EventBean) -> bool {
        event.representation() == self.representation()
            && self.is_underlying_exists(event.underlying_ref())
    }
}

impl<G: EventPropertyGetter + ?Sized> FragmentGetter for G {
    fn get_fragment(&self, event: &EventBean) -> Option<Arc<EventBean>> {
        if event.representation() != self.representation() {
            return None;
        }
        self.get_underlying_fragment(event.underlying_ref())
    }
}

/// Classification of an intermediate value during nested navigation.
#[derive(Debug)]
pub enum NestedValue<'a> {
    /// Already a typed event
    Event(&'a Arc<EventBean>),
    /// Raw value of the representation the inner getter reads
    Underlying(UnderlyingRef<'a>),
    /// Absent, null or of any other shape
    Absent,
}

impl<'a> NestedValue<'a> {
    pub fn classify(value: &'a AttributeValue, expected: Representation) -> NestedValue<'a> {
        match (value, expected) {
            (AttributeValue::Event(event), _) => NestedValue::Event(event),
            (AttributeValue::Map(map), Representation::Map) => {
                NestedValue::Underlying(UnderlyingRef::Map(map))
            }
            (AttributeValue::Array(values), Representation::ObjectArray) => {
                NestedValue::Underlying(UnderlyingRef::ObjectArray(values))
            }
            (AttributeValue::Object(object), Representation::Bean) => {
                NestedValue::Underlying(UnderlyingRef::Bean(object.as_ref()))
            }
            (AttributeValue::Node(node), Representation::Xml) => {
                NestedValue::Underlying(UnderlyingRef::Xml(node))
            }
            (AttributeValue::Record(record), Representation::Avro) => {
                NestedValue::Underlying(UnderlyingRef::Avro(record))
            }
            _ => NestedValue::Absent,
        }
    }
}

/// Turns a property value into a fragment event: typed events are returned
/// as they are, raw values of the fragment type's representation are wrapped
/// in a new event of that type.
pub fn value_to_fragment(
    value: &AttributeValue,
    fragment_type: Option<&Arc<EventType>>,
) -> Option<Arc<EventBean>> {
    if let AttributeValue::Event(event) = value {
        return Some(Arc::clone(event));
    }
    let fragment_type = fragment_type?;
    let underlying = Underlying::from_value(value)?;
    if underlying.representation() != fragment_type.representation() {
        return None;
    }
    Some(Arc::new(EventBean::wrap(Arc::clone(fragment_type), underlying)))
}
