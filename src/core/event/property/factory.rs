// SPDX-License-Identifier: MIT OR Apache-2.0

//! Getter construction for property paths.
//!
//! Every malformed access is rejected here, at construction time: unknown
//! property names, intermediate segments that are not fragments and fragment
//! types that are not registered.

use super::nested::NestedEntryPropertyGetter;
use super::EventPropertyGetter;
use crate::core::event::arr::ObjectArrayEventPropertyGetter;
use crate::core::event::avro::AvroFieldGetter;
use crate::core::event::bean::BeanEventPropertyGetter;
use crate::core::event::event_bean::Representation;
use crate::core::event::event_type::{EventType, RepresentationMetadata};
use crate::core::event::map::MapEventPropertyGetter;
use crate::core::event::xml::XmlPropertyGetter;
use crate::core::exception::ValidationError;
use crate::query_api::definition::Type;
use std::sync::Arc;

/// Looks up fragment types by name while getters are built.
pub trait EventTypeResolver {
    fn resolve_event_type(&self, name: &str) -> Option<Arc<EventType>>;
}

/// A getter together with the static type information of its property.
#[derive(Clone, Debug)]
pub struct CompiledProperty {
    pub getter: Arc<dyn EventPropertyGetter>,
    pub property_type: Type,
    pub fragment_type: Option<Arc<EventType>>,
}

fn resolve_fragment(
    event_type: &EventType,
    property: &str,
    fragment_type: Option<&str>,
    types: &dyn EventTypeResolver,
) -> Result<Option<Arc<EventType>>, ValidationError> {
    let Some(name) = fragment_type else {
        return Ok(None);
    };
    types.resolve_event_type(name).map(Some).ok_or_else(|| {
        ValidationError::invalid_property(
            event_type.name(),
            property,
            format!("fragment type '{name}' is not a known event type"),
        )
    })
}

/// Builds the getter for a single, undotted property of `event_type`.
pub fn simple_getter(
    event_type: &EventType,
    property: &str,
    types: &dyn EventTypeResolver,
) -> Result<CompiledProperty, ValidationError> {
    let descriptor = event_type.property(property).ok_or_else(|| {
        ValidationError::invalid_property(event_type.name(), property, "no such property")
    })?;
    let fragment_type = resolve_fragment(
        event_type,
        property,
        descriptor.fragment_type.as_deref(),
        types,
    )?;
    if let Some(fragment) = &fragment_type {
        // child elements and nested records are read in place and can only
        // become events of their own representation
        let required = match event_type.metadata() {
            RepresentationMetadata::Xml { .. } => Some((Representation::Xml, "tree-backed")),
            RepresentationMetadata::Avro(_) => Some((Representation::Avro, "schema-tagged")),
            _ => None,
        };
        if let Some((representation, label)) = required {
            if fragment.representation() != representation {
                return Err(ValidationError::invalid_property(
                    event_type.name(),
                    property,
                    format!("fragment type '{}' is not {label}", fragment.name()),
                ));
            }
        }
    }
    let fragment = fragment_type.clone();
    let getter: Arc<dyn EventPropertyGetter> = match event_type.metadata() {
        RepresentationMetadata::Map => Arc::new(MapEventPropertyGetter::new(property, fragment)),
        RepresentationMetadata::ObjectArray => {
            let index = event_type.property_index(property).ok_or_else(|| {
                ValidationError::invalid_property(
                    event_type.name(),
                    property,
                    "property has no position in the array",
                )
            })?;
            Arc::new(ObjectArrayEventPropertyGetter::new(index, fragment))
        }
        RepresentationMetadata::Bean(bean) => {
            let accessor = bean.find(property).ok_or_else(|| {
                ValidationError::invalid_property(
                    event_type.name(),
                    property,
                    format!("class '{}' has no accessor", bean.class_name()),
                )
            })?;
            Arc::new(BeanEventPropertyGetter::new(accessor, fragment))
        }
        RepresentationMetadata::Xml { .. } => Arc::new(XmlPropertyGetter::new(
            property,
            descriptor.property_type,
            fragment,
        )),
        RepresentationMetadata::Avro(schema) => {
            let position = schema.field_position(property).ok_or_else(|| {
                ValidationError::invalid_property(
                    event_type.name(),
                    property,
                    format!("schema '{}' has no such field", schema.name),
                )
            })?;
            Arc::new(AvroFieldGetter::new(position, fragment))
        }
    };
    Ok(CompiledProperty {
        getter,
        property_type: descriptor.property_type,
        fragment_type,
    })
}

/// Builds the getter for a dotted property path, nesting one
/// [`NestedEntryPropertyGetter`] per intermediate segment.
pub fn build_getter(
    event_type: &EventType,
    path: &str,
    types: &dyn EventTypeResolver,
) -> Result<CompiledProperty, ValidationError> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    if head.is_empty() {
        return Err(ValidationError::invalid_property(
            event_type.name(),
            path,
            "empty property name",
        ));
    }
    let outer = simple_getter(event_type, head, types)?;
    let Some(rest) = rest else {
        return Ok(outer);
    };
    let fragment_type = outer.fragment_type.clone().ok_or_else(|| {
        ValidationError::invalid_property(
            event_type.name(),
            path,
            format!("'{head}' is not a fragment and cannot be navigated"),
        )
    })?;
    let inner = build_getter(&fragment_type, rest, types)?;
    let getter =
        NestedEntryPropertyGetter::new(outer.getter, inner.getter, Arc::clone(&fragment_type));
    Ok(CompiledProperty {
        getter: Arc::new(getter),
        property_type: inner.property_type,
        fragment_type: inner.fragment_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::avro::{RecordSchema, SchemaField};
    use crate::core::event::event_type::PropertyDescriptor;
    use std::collections::HashMap;

    struct Types(HashMap<String, Arc<EventType>>);

    impl EventTypeResolver for Types {
        fn resolve_event_type(&self, name: &str) -> Option<Arc<EventType>> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn test_schema_fragment_must_be_schema_tagged() {
        let address = Arc::new(RecordSchema::new(
            "Address",
            vec![SchemaField::primitive("city", Type::STRING)],
        ));
        let person = EventType::avro(Arc::new(RecordSchema::new(
            "Person",
            vec![SchemaField::record("address", Arc::clone(&address))],
        )));

        let mut types = HashMap::new();
        types.insert(
            "Address".to_string(),
            Arc::new(EventType::map(
                "Address",
                vec![PropertyDescriptor::new("city", Type::STRING)],
            )),
        );
        let err = build_getter(&person, "address.city", &Types(types)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidProperty { ref property, .. } if property == "address"));

        let mut types = HashMap::new();
        types.insert("Address".to_string(), Arc::new(EventType::avro(address)));
        assert!(build_getter(&person, "address.city", &Types(types)).is_ok());
    }
}
