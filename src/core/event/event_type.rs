// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event type metadata.
//!
//! An event type names the properties of its events and carries the
//! representation specific layout (positions, accessors, schema) that getters
//! are compiled against. Types are immutable once registered.

use super::avro::{RecordSchema, SchemaFieldType};
use super::bean::BeanDescriptor;
use super::event_bean::Representation;
use crate::query_api::definition::Type;
use std::collections::HashMap;
use std::sync::Arc;

/// A declared property of an event type.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub property_type: Type,
    /// Name of the event type the property's values are fragments of.
    pub fragment_type: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, property_type: Type) -> Self {
        PropertyDescriptor {
            name: name.into(),
            property_type,
            fragment_type: None,
        }
    }

    pub fn fragment(name: impl Into<String>, fragment_type: impl Into<String>) -> Self {
        PropertyDescriptor {
            name: name.into(),
            property_type: Type::OBJECT,
            fragment_type: Some(fragment_type.into()),
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment_type.is_some()
    }
}

#[derive(Clone, Debug)]
pub enum RepresentationMetadata {
    Map,
    ObjectArray,
    Bean(BeanDescriptor),
    Xml { root_element: String },
    Avro(Arc<RecordSchema>),
}

impl RepresentationMetadata {
    pub fn representation(&self) -> Representation {
        match self {
            RepresentationMetadata::Map => Representation::Map,
            RepresentationMetadata::ObjectArray => Representation::ObjectArray,
            RepresentationMetadata::Bean(_) => Representation::Bean,
            RepresentationMetadata::Xml { .. } => Representation::Xml,
            RepresentationMetadata::Avro(_) => Representation::Avro,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventType {
    name: String,
    metadata: RepresentationMetadata,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
}

impl EventType {
    fn with_properties(
        name: String,
        metadata: RepresentationMetadata,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        let mut index = HashMap::with_capacity(properties.len());
        for (position, property) in properties.iter().enumerate() {
            // first declaration of a name wins
            index.entry(property.name.clone()).or_insert(position);
        }
        EventType {
            name,
            metadata,
            properties,
            index,
        }
    }

    pub fn map(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self::with_properties(name.into(), RepresentationMetadata::Map, properties)
    }

    /// Positional type; property positions follow declaration order.
    pub fn object_array(name: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Self {
        Self::with_properties(name.into(), RepresentationMetadata::ObjectArray, properties)
    }

    pub fn xml(
        name: impl Into<String>,
        root_element: impl Into<String>,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        Self::with_properties(
            name.into(),
            RepresentationMetadata::Xml {
                root_element: root_element.into(),
            },
            properties,
        )
    }

    /// Schema-tagged type named after its schema. Record-typed fields become
    /// fragment properties whose type is the nested schema's name.
    pub fn avro(schema: Arc<RecordSchema>) -> Self {
        let properties = schema
            .fields
            .iter()
            .map(|field| match &field.field_type {
                SchemaFieldType::Primitive(t) => PropertyDescriptor::new(field.name.clone(), *t),
                SchemaFieldType::Record(nested) => {
                    PropertyDescriptor::fragment(field.name.clone(), nested.name.clone())
                }
            })
            .collect();
        Self::with_properties(
            schema.name.clone(),
            RepresentationMetadata::Avro(schema),
            properties,
        )
    }

    pub fn bean(name: impl Into<String>, descriptor: BeanDescriptor) -> Self {
        let properties = descriptor
            .properties()
            .iter()
            .map(|p| PropertyDescriptor {
                name: p.name.clone(),
                property_type: p.property_type,
                fragment_type: p.fragment_type.clone(),
            })
            .collect();
        Self::with_properties(
            name.into(),
            RepresentationMetadata::Bean(descriptor),
            properties,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &RepresentationMetadata {
        &self.metadata
    }

    pub fn representation(&self) -> Representation {
        self.metadata.representation()
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|i| &self.properties[*i])
    }

    /// Declaration position of `name`, which is the array index for
    /// positional types and the field position for schema-tagged types.
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn fragment_type_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .filter_map(|p| p.fragment_type.as_deref().map(|f| (p.name.as_str(), f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::avro::SchemaField;

    #[test]
    fn test_positions_follow_declaration_order() {
        let t = EventType::object_array(
            "S",
            vec![
                PropertyDescriptor::new("myInt", Type::INT),
                PropertyDescriptor::new("myString", Type::STRING),
            ],
        );
        assert_eq!(t.property_index("myString"), Some(1));
        assert_eq!(t.property_index("missing"), None);
        assert_eq!(t.representation(), Representation::ObjectArray);
    }

    #[test]
    fn test_avro_record_fields_are_fragments() {
        let inner = Arc::new(RecordSchema::new(
            "Inner",
            vec![SchemaField::primitive("id", Type::LONG)],
        ));
        let outer = Arc::new(RecordSchema::new(
            "Outer",
            vec![
                SchemaField::primitive("name", Type::STRING),
                SchemaField::record("inner", inner),
            ],
        ));
        let t = EventType::avro(outer);
        assert_eq!(t.name(), "Outer");
        let p = t.property("inner").unwrap();
        assert_eq!(p.fragment_type.as_deref(), Some("Inner"));
        assert_eq!(p.property_type, Type::OBJECT);
    }
}
