// SPDX-License-Identifier: MIT OR Apache-2.0

#[path = "common/mod.rs"]
mod common;

use common::*;
use eventflux_compiler::core::config::CompilerContext;
use eventflux_compiler::core::event::{
    AttributeValue, EventBean, EventPropertyGetter, EventType, FragmentGetter, PropertyDescriptor,
    PropertyExistsGetter, PropertyValueGetter, RecordSchema, Representation, SchemaField,
    SchemaRecord, XmlNode,
};
use eventflux_compiler::core::exception::ConfigError;
use eventflux_compiler::query_api::definition::Type;
use std::collections::HashMap;
use std::sync::Arc;

fn inner_values(value: f64, tag: &str) -> AttributeValue {
    AttributeValue::Array(Arc::new(vec![
        AttributeValue::Double(value),
        AttributeValue::from(tag),
    ]))
}

fn map_with_inner(context: &CompilerContext, inner: AttributeValue) -> EventBean {
    let mut values = HashMap::new();
    values.insert("myInt".to_string(), AttributeValue::Int(1));
    values.insert("inner".to_string(), inner);
    EventBean::from_map(event_type(context, MAP_TYPE), values).unwrap()
}

#[test]
fn test_raw_intermediate_read_in_place() {
    let context = make_context();
    let event = map_with_inner(&context, inner_values(1.5, "x"));
    let property = context
        .event_types()
        .compiled_property(event.event_type(), "inner.value")
        .unwrap();

    assert_eq!(property.property_type, Type::DOUBLE);
    assert_eq!(property.getter.representation(), Representation::Map);
    assert_eq!(property.getter.get(&event).unwrap(), AttributeValue::Double(1.5));
    assert!(property.getter.is_exists_property(&event));
}

#[test]
fn test_typed_intermediate_delegates_to_event() {
    let context = make_context();
    let inner = EventBean::from_object_array(
        event_type(&context, INNER_TYPE),
        vec![AttributeValue::Double(2.5), AttributeValue::from("y")],
    )
    .unwrap();
    let event = map_with_inner(&context, AttributeValue::Event(Arc::new(inner)));
    let property = context
        .event_types()
        .compiled_property(event.event_type(), "inner.tag")
        .unwrap();
    assert_eq!(property.getter.get(&event).unwrap(), AttributeValue::from("y"));
    assert!(property.getter.is_exists_property(&event));
}

#[test]
fn test_absent_or_unrecognized_intermediate() {
    let context = make_context();
    let registry = context.event_types();
    let map_type = event_type(&context, MAP_TYPE);
    let property = registry.compiled_property(&map_type, "inner.value").unwrap();

    for inner in [
        AttributeValue::Null,
        AttributeValue::from("not an array"),
        AttributeValue::Map(Arc::new(HashMap::new())),
    ] {
        let event = map_with_inner(&context, inner);
        assert!(property.getter.get(&event).unwrap().is_null());
        assert!(!property.getter.is_exists_property(&event));
        assert!(property.getter.get_fragment(&event).is_none());
    }
}

#[test]
fn test_fragment_of_raw_value_is_wrapped() {
    let context = make_context();
    let event = map_with_inner(&context, inner_values(1.5, "x"));
    let property = context
        .event_types()
        .compiled_property(event.event_type(), "inner")
        .unwrap();
    assert_eq!(property.fragment_type.as_ref().unwrap().name(), INNER_TYPE);

    let fragment = property.getter.get_fragment(&event).unwrap();
    assert_eq!(fragment.event_type().name(), INNER_TYPE);
    assert_eq!(fragment.representation(), Representation::ObjectArray);
}

#[test]
fn test_two_level_fragment_navigation() {
    let context = make_context();
    context
        .event_types()
        .register_all(vec![
            EventType::map(
                "Outer",
                vec![
                    PropertyDescriptor::new("id", Type::STRING),
                    PropertyDescriptor::fragment("mid", "Mid"),
                ],
            ),
            EventType::map("Mid", vec![PropertyDescriptor::fragment("leaf", INNER_TYPE)]),
        ])
        .unwrap();

    let mut mid = HashMap::new();
    mid.insert("leaf".to_string(), inner_values(4.0, "deep"));
    let mut outer = HashMap::new();
    outer.insert("id".to_string(), AttributeValue::from("o1"));
    outer.insert("mid".to_string(), AttributeValue::Map(Arc::new(mid)));
    let event = EventBean::from_map(event_type(&context, "Outer"), outer).unwrap();

    let registry = context.event_types();
    let tag = registry
        .compiled_property(event.event_type(), "mid.leaf.tag")
        .unwrap();
    assert_eq!(tag.getter.get(&event).unwrap(), AttributeValue::from("deep"));

    let leaf = registry
        .compiled_property(event.event_type(), "mid.leaf")
        .unwrap();
    let fragment = leaf.getter.get_fragment(&event).unwrap();
    assert_eq!(fragment.event_type().name(), INNER_TYPE);
    let value = registry
        .compiled_property(fragment.event_type(), "value")
        .unwrap();
    assert_eq!(value.getter.get(&fragment).unwrap(), AttributeValue::Double(4.0));
}

#[test]
fn test_schema_record_nesting() {
    let context = make_context();
    let address = SchemaRecord::new(address_schema()).with("city", "Colombo");
    let event = EventBean::from_record(
        event_type(&context, AVRO_TYPE),
        SchemaRecord::new(avro_schema())
            .with("myInt", 1)
            .with("address", address),
    )
    .unwrap();
    let registry = context.event_types();

    let city = registry
        .compiled_property(event.event_type(), "address.city")
        .unwrap();
    assert_eq!(city.property_type, Type::STRING);
    assert_eq!(city.getter.get(&event).unwrap(), AttributeValue::from("Colombo"));

    let fragment = registry
        .compiled_property(event.event_type(), "address")
        .unwrap()
        .getter
        .get_fragment(&event)
        .unwrap();
    assert_eq!(fragment.event_type().name(), "Address");
}

#[test]
fn test_nested_schema_name_clash_rejected() {
    let context = CompilerContext::new();
    let registry = context.event_types();
    registry
        .register(EventType::map(
            "Address",
            vec![PropertyDescriptor::new("city", Type::STRING)],
        ))
        .unwrap();
    let person = Arc::new(RecordSchema::new(
        "Person",
        vec![SchemaField::record("address", address_schema())],
    ));

    let err = registry.register(EventType::avro(person)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::NestedSchemaConflict { ref event_type, ref schema }
            if event_type == "Person" && schema == "Address"
    ));
    assert!(!registry.contains("Person"));
}

#[test]
fn test_nested_schema_shared_between_types() {
    let context = make_context();
    let registry = context.event_types();
    let customer = Arc::new(RecordSchema::new(
        "Customer",
        vec![SchemaField::record("address", address_schema())],
    ));
    let customer_type = registry.register(EventType::avro(Arc::clone(&customer))).unwrap();

    let event = EventBean::from_record(
        Arc::clone(&customer_type),
        SchemaRecord::new(customer)
            .with("address", SchemaRecord::new(address_schema()).with("city", "Oslo")),
    )
    .unwrap();
    let city = registry
        .compiled_property(&customer_type, "address.city")
        .unwrap();
    assert_eq!(city.getter.get(&event).unwrap(), AttributeValue::from("Oslo"));
    assert!(city.getter.is_exists_property(&event));

    // same name, different fields
    let other = Arc::new(RecordSchema::new(
        "Supplier",
        vec![SchemaField::record(
            "address",
            Arc::new(RecordSchema::new(
                "Address",
                vec![SchemaField::primitive("street", Type::STRING)],
            )),
        )],
    ));
    assert!(matches!(
        registry.register(EventType::avro(other)),
        Err(ConfigError::NestedSchemaConflict { .. })
    ));
}

#[test]
fn test_xml_child_element_fragment() {
    let context = make_context();
    context
        .event_types()
        .register_all(vec![
            EventType::xml(
                "OrderXml",
                "order",
                vec![
                    PropertyDescriptor::new("id", Type::STRING),
                    PropertyDescriptor::fragment("item", "ItemXml"),
                ],
            ),
            EventType::xml(
                "ItemXml",
                "item",
                vec![PropertyDescriptor::new("qty", Type::INT)],
            ),
        ])
        .unwrap();

    let event = EventBean::from_xml(
        event_type(&context, "OrderXml"),
        XmlNode::new("order")
            .attribute("id", "o-7")
            .child(XmlNode::new("item").attribute("qty", "12")),
    )
    .unwrap();
    let registry = context.event_types();

    let qty = registry
        .compiled_property(event.event_type(), "item.qty")
        .unwrap();
    assert_eq!(qty.getter.get(&event).unwrap(), AttributeValue::Int(12));
    assert!(qty.getter.is_exists_property(&event));

    let item = registry
        .compiled_property(event.event_type(), "item")
        .unwrap()
        .getter
        .get_fragment(&event)
        .unwrap();
    assert_eq!(item.event_type().name(), "ItemXml");
}

#[test]
fn test_nested_getter_is_cached_per_path() {
    let context = make_context();
    let map_type = event_type(&context, MAP_TYPE);
    let registry = context.event_types();
    let first = registry.compiled_property(&map_type, "inner.tag").unwrap();
    let second = registry.compiled_property(&map_type, "inner.tag").unwrap();
    assert!(Arc::ptr_eq(&first.getter, &second.getter));
    assert_eq!(registry.cached_getter_count(), 1);
}
