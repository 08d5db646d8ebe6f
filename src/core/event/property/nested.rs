// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    EventPropertyGetter, FragmentGetter, NestedValue, PropertyExistsGetter, PropertyValueGetter,
};
use crate::core::event::event_bean::{EventBean, Representation, Underlying, UnderlyingRef};
use crate::core::event::event_type::EventType;
use crate::core::event::value::AttributeValue;
use std::sync::Arc;

/// Getter for `outer.inner`: navigates to the intermediate value with the
/// outer getter, then reads it with the inner getter.
///
/// The inner getter is compiled against `fragment_type`, the statically known
/// type of the intermediate value. Since the nested getter is a getter itself,
/// longer paths nest recursively.
#[derive(Debug)]
pub struct NestedEntryPropertyGetter {
    outer: Arc<dyn EventPropertyGetter>,
    inner: Arc<dyn EventPropertyGetter>,
    fragment_type: Arc<EventType>,
}

impl NestedEntryPropertyGetter {
    pub fn new(
        outer: Arc<dyn EventPropertyGetter>,
        inner: Arc<dyn EventPropertyGetter>,
        fragment_type: Arc<EventType>,
    ) -> Self {
        debug_assert_eq!(inner.representation(), fragment_type.representation());
        NestedEntryPropertyGetter {
            outer,
            inner,
            fragment_type,
        }
    }

    pub fn fragment_type(&self) -> &Arc<EventType> {
        &self.fragment_type
    }
}

impl EventPropertyGetter for NestedEntryPropertyGetter {
    fn representation(&self) -> Representation {
        self.outer.representation()
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        let value = self.outer.get_underlying(underlying);
        match NestedValue::classify(&value, self.inner.representation()) {
            NestedValue::Event(event) => self.inner.get(event).unwrap_or_default(),
            NestedValue::Underlying(raw) => self.inner.get_underlying(raw),
            NestedValue::Absent => AttributeValue::Null,
        }
    }

    fn is_underlying_exists(&self, underlying: UnderlyingRef<'_>) -> bool {
        let value = self.outer.get_underlying(underlying);
        match NestedValue::classify(&value, self.inner.representation()) {
            NestedValue::Event(event) => self.inner.is_exists_property(event),
            NestedValue::Underlying(raw) => self.inner.is_underlying_exists(raw),
            NestedValue::Absent => false,
        }
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        let value = self.outer.get_underlying(underlying);
        match NestedValue::classify(&value, self.inner.representation()) {
            NestedValue::Event(event) => self.inner.get_fragment(event),
            NestedValue::Underlying(_) => {
                // fresh wrapper per call, the raw value differs per event
                let wrapped = EventBean::wrap(
                    Arc::clone(&self.fragment_type),
                    Underlying::from_value(&value)?,
                );
                self.inner.get_fragment(&wrapped)
            }
            NestedValue::Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::arr::ObjectArrayEventPropertyGetter;
    use crate::core::event::event_type::PropertyDescriptor;
    use crate::core::event::map::MapEventPropertyGetter;
    use crate::core::event::value::MapUnderlying;
    use crate::query_api::definition::Type;

    fn nested() -> (NestedEntryPropertyGetter, Arc<EventType>) {
        let inner_type = Arc::new(EventType::object_array(
            "Inner",
            vec![
                PropertyDescriptor::new("a", Type::INT),
                PropertyDescriptor::new("b", Type::STRING),
            ],
        ));
        let outer_type = Arc::new(EventType::map(
            "Outer",
            vec![PropertyDescriptor::fragment("inner", "Inner")],
        ));
        let getter = NestedEntryPropertyGetter::new(
            Arc::new(MapEventPropertyGetter::new(
                "inner",
                Some(Arc::clone(&inner_type)),
            )),
            Arc::new(ObjectArrayEventPropertyGetter::new(1, None)),
            inner_type,
        );
        (getter, outer_type)
    }

    #[test]
    fn test_raw_intermediate_read_in_place() {
        let (getter, outer_type) = nested();
        let mut values = MapUnderlying::new();
        values.insert(
            "inner".to_string(),
            AttributeValue::Array(Arc::new(vec![
                AttributeValue::Int(1),
                AttributeValue::from("x"),
            ])),
        );
        let event = EventBean::from_map(outer_type, values).unwrap();
        assert_eq!(getter.get(&event).unwrap(), AttributeValue::from("x"));
        assert!(getter.is_exists_property(&event));
    }

    #[test]
    fn test_unrecognized_intermediate_is_absent() {
        let (getter, outer_type) = nested();
        let mut values = MapUnderlying::new();
        values.insert("inner".to_string(), AttributeValue::from("not an array"));
        let event = EventBean::from_map(outer_type, values).unwrap();
        assert_eq!(getter.get(&event).unwrap(), AttributeValue::Null);
        assert!(!getter.is_exists_property(&event));
        assert!(getter.get_fragment(&event).is_none());
    }
}
