// SPDX-License-Identifier: MIT OR Apache-2.0

use super::event_bean::{EventBean, Representation, UnderlyingRef};
use super::event_type::EventType;
use super::property::{value_to_fragment, EventPropertyGetter};
use super::value::AttributeValue;
use std::sync::Arc;

/// Reads one key of a map-backed event.
#[derive(Debug)]
pub struct MapEventPropertyGetter {
    name: String,
    fragment_type: Option<Arc<EventType>>,
}

impl MapEventPropertyGetter {
    pub fn new(name: impl Into<String>, fragment_type: Option<Arc<EventType>>) -> Self {
        MapEventPropertyGetter {
            name: name.into(),
            fragment_type,
        }
    }

    fn entry<'a>(&self, underlying: UnderlyingRef<'a>) -> Option<&'a AttributeValue> {
        match underlying {
            UnderlyingRef::Map(map) => map.get(&self.name),
            _ => None,
        }
    }
}

impl EventPropertyGetter for MapEventPropertyGetter {
    fn representation(&self) -> Representation {
        Representation::Map
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        self.entry(underlying).cloned().unwrap_or_default()
    }

    fn is_underlying_exists(&self, underlying: UnderlyingRef<'_>) -> bool {
        self.entry(underlying).is_some_and(|v| !v.is_null())
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        value_to_fragment(self.entry(underlying)?, self.fragment_type.as_ref())
    }
}
