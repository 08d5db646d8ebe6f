// SPDX-License-Identifier: MIT OR Apache-2.0

use super::event_bean::{EventBean, Representation, UnderlyingRef};
use super::event_type::EventType;
use super::property::{value_to_fragment, EventPropertyGetter};
use super::value::AttributeValue;
use crate::core::exception::ValidationError;
use std::sync::Arc;

/// Reads one position of an object-array-backed event.
#[derive(Debug)]
pub struct ObjectArrayEventPropertyGetter {
    index: usize,
    fragment_type: Option<Arc<EventType>>,
}

impl ObjectArrayEventPropertyGetter {
    pub fn new(index: usize, fragment_type: Option<Arc<EventType>>) -> Self {
        ObjectArrayEventPropertyGetter {
            index,
            fragment_type,
        }
    }

    /// Builds a getter for `index` of `event_type`, rejecting types that are
    /// not positional and indexes past the type's arity.
    pub fn for_type(event_type: &EventType, index: usize) -> Result<Self, ValidationError> {
        let property = event_type.properties().get(index);
        match (event_type.representation(), property) {
            (Representation::ObjectArray, Some(_)) => Ok(Self::new(index, None)),
            (Representation::ObjectArray, None) => Err(ValidationError::invalid_property(
                event_type.name(),
                format!("[{index}]"),
                format!(
                    "index {index} is out of range, the type declares {} properties",
                    event_type.properties().len()
                ),
            )),
            (other, _) => Err(ValidationError::invalid_property(
                event_type.name(),
                format!("[{index}]"),
                format!("positional access requires an object-array type, not {other}"),
            )),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn slot<'a>(&self, underlying: UnderlyingRef<'a>) -> Option<&'a AttributeValue> {
        match underlying {
            UnderlyingRef::ObjectArray(values) => values.get(self.index),
            _ => None,
        }
    }
}

impl EventPropertyGetter for ObjectArrayEventPropertyGetter {
    fn representation(&self) -> Representation {
        Representation::ObjectArray
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        self.slot(underlying).cloned().unwrap_or_default()
    }

    fn is_underlying_exists(&self, underlying: UnderlyingRef<'_>) -> bool {
        self.slot(underlying).is_some_and(|v| !v.is_null())
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        value_to_fragment(self.slot(underlying)?, self.fragment_type.as_ref())
    }
}
