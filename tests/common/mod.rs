// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use eventflux_compiler::core::aggregation::multifunc::{
    AggregationMultiFunctionAccessor, AggregationMultiFunctionFactory,
    AggregationMultiFunctionForge, AggregationMultiFunctionHandler, AggregationMultiFunctionState,
    AggregationMultiFunctionStateFactory, AggregationResultType, AggregationStateKey,
    DeclarationContext, EvaluationContext, ValidationContext,
};
use eventflux_compiler::core::config::{
    CompilerContext, PlugInAggregationMultiFunction, TableDefinition, VariableDefinition,
};
use eventflux_compiler::core::event::{
    AttributeValue, BeanDescriptor, BeanObject, EventBean, EventType, PropertyDescriptor,
    RecordSchema, SchemaField,
};
use eventflux_compiler::core::exception::ValidationError;
use eventflux_compiler::query_api::definition::Type;
use std::any::Any;
use std::sync::{Arc, Mutex};

pub const MAP_TYPE: &str = "MapEvent";
pub const ARRAY_TYPE: &str = "ArrayEvent";
pub const BEAN_TYPE: &str = "BeanEvent";
pub const XML_TYPE: &str = "XmlEvent";
pub const AVRO_TYPE: &str = "AvroEvent";
pub const INNER_TYPE: &str = "InnerArray";
pub const RECORDING_FACTORY: &str = "recording";

#[derive(Debug)]
pub struct SupportBean {
    pub my_int: i32,
    pub my_string: String,
}

impl BeanObject for SupportBean {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn address_schema() -> Arc<RecordSchema> {
    Arc::new(RecordSchema::new(
        "Address",
        vec![SchemaField::primitive("city", Type::STRING)],
    ))
}

pub fn avro_schema() -> Arc<RecordSchema> {
    Arc::new(RecordSchema::new(
        AVRO_TYPE,
        vec![
            SchemaField::primitive("myInt", Type::INT),
            SchemaField::primitive("myString", Type::STRING),
            SchemaField::record("address", address_schema()),
        ],
    ))
}

fn my_properties() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("myInt", Type::INT),
        PropertyDescriptor::new("myString", Type::STRING),
    ]
}

/// Context with one `myInt`/`myString` type per representation, a `threshold`
/// variable and a `Prices` table keyed by symbol.
pub fn make_context() -> CompilerContext {
    let context = CompilerContext::new();
    context
        .event_types()
        .register_all(vec![
            EventType::object_array(
                INNER_TYPE,
                vec![
                    PropertyDescriptor::new("value", Type::DOUBLE),
                    PropertyDescriptor::new("tag", Type::STRING),
                ],
            ),
            EventType::map(MAP_TYPE, {
                let mut properties = my_properties();
                properties.push(PropertyDescriptor::fragment("inner", INNER_TYPE));
                properties
            }),
            EventType::object_array(ARRAY_TYPE, my_properties()),
            EventType::xml(XML_TYPE, "event", my_properties()),
            EventType::avro(avro_schema()),
        ])
        .unwrap();
    context
        .register_bean_type(
            BEAN_TYPE,
            BeanDescriptor::of::<SupportBean>()
                .property("myInt", Type::INT, |b: &SupportBean| b.my_int.into())
                .property("myString", Type::STRING, |b: &SupportBean| {
                    b.my_string.clone().into()
                }),
        )
        .unwrap();
    context
        .register_variable(VariableDefinition::new("threshold", Type::INT))
        .unwrap();
    context
        .register_table(
            TableDefinition::new("Prices")
                .column("symbol", Type::STRING)
                .column("price", Type::DOUBLE)
                .primary_key("symbol"),
        )
        .unwrap();
    context
}

pub fn event_type(context: &CompilerContext, name: &str) -> Arc<EventType> {
    context.event_types().get(name).unwrap()
}

pub fn map_event(context: &CompilerContext, my_int: i32, my_string: &str) -> Arc<EventBean> {
    let mut values = std::collections::HashMap::new();
    values.insert("myInt".to_string(), AttributeValue::Int(my_int));
    values.insert("myString".to_string(), AttributeValue::from(my_string));
    Arc::new(EventBean::from_map(event_type(context, MAP_TYPE), values).unwrap())
}

/// Shared log of forge callbacks, one `"<phase>:<function>"` entry each.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Factory for the `rec_a`/`rec_b` family. Every forge appends to the shared
/// log; a forge rejects the function named by the `reject` property.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    pub log: CallLog,
    pub forges_created: Arc<Mutex<usize>>,
}

impl RecordingFactory {
    pub fn config() -> PlugInAggregationMultiFunction {
        PlugInAggregationMultiFunction::new(["rec_a", "rec_b"], RECORDING_FACTORY)
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl AggregationMultiFunctionFactory for RecordingFactory {
    fn name(&self) -> &'static str {
        RECORDING_FACTORY
    }

    fn create_forge(
        &self,
        config: &PlugInAggregationMultiFunction,
    ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError> {
        *self.forges_created.lock().unwrap() += 1;
        Ok(Arc::new(RecordingForge {
            log: Arc::clone(&self.log),
            reject: config
                .properties
                .get("reject")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }))
    }

    fn clone_box(&self) -> Box<dyn AggregationMultiFunctionFactory> {
        Box::new(self.clone())
    }
}

#[derive(Debug)]
pub struct RecordingForge {
    log: CallLog,
    reject: Option<String>,
}

impl AggregationMultiFunctionForge for RecordingForge {
    fn add_aggregation_function(&self, declaration: &DeclarationContext<'_>) {
        self.log
            .lock()
            .unwrap()
            .push(format!("declare:{}", declaration.function_name));
    }

    fn validate_get_handler(
        &self,
        validation: &ValidationContext<'_>,
    ) -> Result<AggregationMultiFunctionHandler, ValidationError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("validate:{}", validation.function_name));
        if self.reject.as_deref() == Some(validation.function_name) {
            return Err(validation.reject("rejected on request"));
        }
        Ok(AggregationMultiFunctionHandler::new(
            AggregationResultType::Scalar(Type::LONG),
            Arc::new(CountAccessor),
            Arc::new(CountStateFactory),
            AggregationStateKey::new(RECORDING_FACTORY, "count"),
        ))
    }
}

#[derive(Debug, Default)]
pub struct CountState {
    pub count: i64,
}

impl AggregationMultiFunctionState for CountState {
    fn apply_enter(&mut self, _events_per_stream: &[Arc<EventBean>]) {
        self.count += 1;
    }

    fn apply_leave(&mut self, _events_per_stream: &[Arc<EventBean>]) {
        self.count -= 1;
    }

    fn clear(&mut self) {
        self.count = 0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct CountStateFactory;

impl AggregationMultiFunctionStateFactory for CountStateFactory {
    fn make_state(&self) -> Box<dyn AggregationMultiFunctionState> {
        Box::new(CountState::default())
    }
}

#[derive(Debug)]
pub struct CountAccessor;

impl AggregationMultiFunctionAccessor for CountAccessor {
    fn get_value(
        &self,
        state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> AttributeValue {
        state
            .as_any()
            .downcast_ref::<CountState>()
            .map(|s| AttributeValue::Long(s.count))
            .unwrap_or_default()
    }
}

/// [`make_context`] plus the recording family registered under `config`.
pub fn make_recording_context(
    config: PlugInAggregationMultiFunction,
) -> (Arc<CompilerContext>, RecordingFactory) {
    let context = make_context();
    let factory = RecordingFactory::default();
    context.add_aggregation_multi_function_factory(
        RECORDING_FACTORY.to_string(),
        Box::new(factory.clone()),
    );
    context.add_plug_in_aggregation(config).unwrap();
    (Arc::new(context), factory)
}
