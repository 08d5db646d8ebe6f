// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative compiler configuration.
//!
//! The configuration document is JSON with camel-case keys; every section is
//! optional:
//!
//! ```json
//! {
//!   "eventTypes": [
//!     {"name": "Quote", "representation": "map",
//!      "properties": [{"name": "symbol", "type": "string"},
//!                     {"name": "detail", "fragmentType": "Detail"}]},
//!     {"name": "Detail", "representation": "objectArray",
//!      "properties": [{"name": "venue", "type": "string"}]}
//!   ],
//!   "variables": [{"name": "threshold", "type": "double", "constant": false}],
//!   "tables": [{"name": "Limits", "columns": [{"name": "symbol", "type": "string"},
//!               {"name": "max", "type": "double"}], "keyColumns": ["symbol"]}],
//!   "plugInAggregationMultiFunctions": [
//!     {"functionNames": ["referenceCountedMap", "referenceCountLookup"],
//!      "factory": "refCount", "properties": {"capacity": 16}}
//!   ],
//!   "byteCode": {"attachStatementText": true}
//! }
//! ```

use crate::core::event::avro::RecordSchema;
use crate::core::event::event_type::{EventType, PropertyDescriptor};
use crate::core::exception::ConfigError;
use crate::query_api::definition::{Attribute, Type};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfiguration {
    pub event_types: Vec<EventTypeConfig>,
    pub variables: Vec<VariableConfig>,
    pub tables: Vec<TableConfig>,
    pub plug_in_aggregation_multi_functions: Vec<PlugInAggregationMultiFunction>,
    pub byte_code: ByteCodeConfig,
}

impl CompilerConfiguration {
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepresentationConfig {
    Map,
    ObjectArray,
    Bean,
    Xml,
    Avro,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeConfig {
    pub name: String,
    pub representation: RepresentationConfig,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
    /// Root element name of tree-backed types; defaults to the type name.
    #[serde(default)]
    pub root_element: Option<String>,
    /// Record schema of schema-tagged types. The type is named after the
    /// schema.
    #[serde(default)]
    pub schema: Option<Arc<RecordSchema>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfig {
    pub name: String,
    #[serde(rename = "type", default = "default_property_type")]
    pub property_type: Type,
    #[serde(default)]
    pub fragment_type: Option<String>,
}

fn default_property_type() -> Type {
    Type::OBJECT
}

impl EventTypeConfig {
    pub fn to_event_type(&self) -> Result<EventType, ConfigError> {
        let properties = || {
            self.properties
                .iter()
                .map(|p| PropertyDescriptor {
                    name: p.name.clone(),
                    property_type: if p.fragment_type.is_some() {
                        Type::OBJECT
                    } else {
                        p.property_type
                    },
                    fragment_type: p.fragment_type.clone(),
                })
                .collect::<Vec<_>>()
        };
        match self.representation {
            RepresentationConfig::Map => Ok(EventType::map(&self.name, properties())),
            RepresentationConfig::ObjectArray => {
                Ok(EventType::object_array(&self.name, properties()))
            }
            RepresentationConfig::Xml => Ok(EventType::xml(
                &self.name,
                self.root_element.as_deref().unwrap_or(&self.name),
                properties(),
            )),
            RepresentationConfig::Avro => {
                let schema = self
                    .schema
                    .clone()
                    .ok_or_else(|| ConfigError::MissingSchema(self.name.clone()))?;
                if !self.properties.is_empty() {
                    log::warn!(
                        "Ignoring declared properties of schema-tagged type '{}', the schema defines them",
                        self.name
                    );
                }
                Ok(EventType::avro(schema))
            }
            RepresentationConfig::Bean => Err(ConfigError::BeanFromConfig(self.name.clone())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: Type,
    #[serde(default)]
    pub constant: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub name: String,
    pub columns: Vec<Attribute>,
    #[serde(default)]
    pub key_columns: Vec<String>,
}

/// Maps one or more function names onto an aggregation multi-function
/// factory. Functions configured in one entry share a forge within a
/// statement.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugInAggregationMultiFunction {
    pub function_names: Vec<String>,
    pub factory: String,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl PlugInAggregationMultiFunction {
    pub fn new<I, S>(function_names: I, factory: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlugInAggregationMultiFunction {
            function_names: function_names.into_iter().map(Into::into).collect(),
            factory: factory.into(),
            properties: HashMap::new(),
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ByteCodeConfig {
    /// Copy the statement text into the compiled statement specification.
    pub attach_statement_text: bool,
}
