// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events, event types and uniform property access.

pub mod arr;
pub mod avro;
pub mod bean;
pub mod event_bean;
pub mod event_type;
pub mod event_type_registry;
pub mod map;
pub mod property;
pub mod value;
pub mod xml;

pub use arr::ObjectArrayEventPropertyGetter;
pub use avro::{AvroFieldGetter, RecordSchema, SchemaField, SchemaFieldType, SchemaRecord};
pub use bean::{BeanDescriptor, BeanEventPropertyGetter, BeanObject};
pub use event_bean::{EventBean, Representation, Underlying, UnderlyingRef};
pub use event_type::{EventType, PropertyDescriptor, RepresentationMetadata};
pub use event_type_registry::EventTypeRegistry;
pub use map::MapEventPropertyGetter;
pub use property::{
    CompiledProperty, EventPropertyGetter, FragmentGetter, NestedEntryPropertyGetter,
    PropertyExistsGetter, PropertyValueGetter,
};
pub use value::{AttributeValue, MapUnderlying};
pub use xml::{XmlNode, XmlPropertyGetter};
