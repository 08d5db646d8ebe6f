// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-tagged records and their field getter.
//!
//! Only the shape the getters need is modeled: a named record schema with
//! primitive or nested record fields, and records holding one value per
//! field position.

use super::event_bean::{EventBean, Representation, UnderlyingRef};
use super::event_type::EventType;
use super::property::{value_to_fragment, EventPropertyGetter};
use super::value::AttributeValue;
use crate::query_api::definition::Type;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaFieldType {
    Primitive(Type),
    Record(Arc<RecordSchema>),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SchemaFieldType,
}

impl SchemaField {
    pub fn primitive(name: impl Into<String>, field_type: Type) -> Self {
        SchemaField {
            name: name.into(),
            field_type: SchemaFieldType::Primitive(field_type),
        }
    }

    pub fn record(name: impl Into<String>, schema: Arc<RecordSchema>) -> Self {
        SchemaField {
            name: name.into(),
            field_type: SchemaFieldType::Record(schema),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        RecordSchema {
            name: name.into(),
            fields,
        }
    }

    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Record schemas nested anywhere below this one, depth first.
    pub fn nested_records(&self) -> Vec<Arc<RecordSchema>> {
        let mut nested = Vec::new();
        for field in &self.fields {
            if let SchemaFieldType::Record(schema) = &field.field_type {
                nested.push(Arc::clone(schema));
                nested.extend(schema.nested_records());
            }
        }
        nested
    }
}

/// A record conforming to a [`RecordSchema`]; unset fields hold `Null`.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaRecord {
    schema: Arc<RecordSchema>,
    values: Vec<AttributeValue>,
}

impl SchemaRecord {
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = vec![AttributeValue::Null; schema.fields.len()];
        SchemaRecord { schema, values }
    }

    /// Sets a field by name; returns false when the schema has no such field.
    pub fn put(&mut self, name: &str, value: impl Into<AttributeValue>) -> bool {
        match self.schema.field_position(name) {
            Some(position) => {
                self.values[position] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.put(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.schema
            .field_position(name)
            .and_then(|p| self.values.get(p))
    }

    pub fn get_at(&self, position: usize) -> Option<&AttributeValue> {
        self.values.get(position)
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }
}

impl From<SchemaRecord> for AttributeValue {
    fn from(record: SchemaRecord) -> Self {
        AttributeValue::Record(Arc::new(record))
    }
}

/// Reads one field of a schema-tagged record by position.
#[derive(Debug)]
pub struct AvroFieldGetter {
    position: usize,
    fragment_type: Option<Arc<EventType>>,
}

impl AvroFieldGetter {
    pub fn new(position: usize, fragment_type: Option<Arc<EventType>>) -> Self {
        AvroFieldGetter {
            position,
            fragment_type,
        }
    }

    fn field<'a>(&self, underlying: UnderlyingRef<'a>) -> Option<&'a AttributeValue> {
        match underlying {
            UnderlyingRef::Avro(record) => record.get_at(self.position),
            _ => None,
        }
    }
}

impl EventPropertyGetter for AvroFieldGetter {
    fn representation(&self) -> Representation {
        Representation::Avro
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        self.field(underlying).cloned().unwrap_or_default()
    }

    fn is_underlying_exists(&self, underlying: UnderlyingRef<'_>) -> bool {
        self.field(underlying).is_some_and(|v| !v.is_null())
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        let value = self.field(underlying)?;
        value_to_fragment(value, self.fragment_type.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_json() {
        let schema: RecordSchema = serde_json::from_str(
            r#"{"name": "Outer", "fields": [
                {"name": "myInt", "type": "int"},
                {"name": "inner", "type": {"name": "Inner", "fields": [{"name": "v", "type": "string"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(schema.field_position("inner"), Some(1));
        assert_eq!(schema.nested_records()[0].name, "Inner");
    }

    #[test]
    fn test_put_unknown_field() {
        let schema = Arc::new(RecordSchema::new(
            "R",
            vec![SchemaField::primitive("a", Type::INT)],
        ));
        let mut record = SchemaRecord::new(schema);
        assert!(record.put("a", 1));
        assert!(!record.put("b", 2));
        assert_eq!(record.get("a"), Some(&AttributeValue::Int(1)));
    }
}
