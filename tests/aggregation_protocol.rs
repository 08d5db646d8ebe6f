// SPDX-License-Identifier: MIT OR Apache-2.0

#[path = "common/mod.rs"]
mod common;

use common::*;
use eventflux_compiler::core::aggregation::multifunc::{
    AggregationKey, AggregationResultType, EvaluationContext,
};
use eventflux_compiler::core::compiler::{StatementCompiler, SymbolResolutionContext};
use eventflux_compiler::core::event::AttributeValue;
use eventflux_compiler::core::exception::{SymbolKind, ValidationError};
use eventflux_compiler::core::config::PlugInAggregationMultiFunction;
use eventflux_compiler::query_api::definition::Type;
use eventflux_compiler::query_api::expression::Expression;
use eventflux_compiler::query_api::statement::StatementRaw;
use std::sync::Arc;

fn recording_statement() -> StatementRaw {
    StatementRaw::new("recorded")
        .select(Expression::function("rec_a", vec![Expression::property("myInt")]))
        .select(Expression::function("rec_b", vec![Expression::wildcard(None)]))
        .select(Expression::function("rec_a", vec![Expression::property("myString")]))
        .from(MAP_TYPE)
}

#[test]
fn test_every_declare_precedes_every_validate() {
    let (context, factory) = make_recording_context(RecordingFactory::config());
    let compiler = StatementCompiler::new(context);
    let spec = compiler.compile(&recording_statement()).unwrap();

    assert_eq!(
        factory.entries(),
        vec![
            "declare:rec_a",
            "declare:rec_b",
            "declare:rec_a",
            "validate:rec_a",
            "validate:rec_b",
            "validate:rec_a",
        ]
    );
    assert_eq!(*factory.forges_created.lock().unwrap(), 1);
    assert_eq!(spec.plug_in_aggregations.len(), 1);
    assert_eq!(spec.aggregations.len(), 3);
    // one state shared by all call sites reporting the same state key
    assert_eq!(spec.aggregation_states.len(), 1);
    assert!(spec.aggregations.iter().all(|a| a.state_slot == 0));
    assert_eq!(
        spec.column("rec_a").unwrap().expression.value_type(),
        Type::LONG
    );
}

#[test]
fn test_visitation_order_applies_to_both_passes() {
    let (context, factory) = make_recording_context(RecordingFactory::config());
    let compiler = StatementCompiler::new(context)
        .with_visitation_order(Arc::new(|n| (0..n).rev().collect()));
    compiler.compile(&recording_statement()).unwrap();

    let entries = factory.entries();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0], "declare:rec_a");
    assert_eq!(entries[1], "declare:rec_b");
    assert_eq!(entries[4], "validate:rec_b");
    assert!(entries[..3].iter().all(|e| e.starts_with("declare:")));
    assert!(entries[3..].iter().all(|e| e.starts_with("validate:")));
}

#[test]
fn test_rejected_validation_rolls_back_registration() {
    let config =
        RecordingFactory::config().property("reject", serde_json::Value::from("rec_b"));
    let (context, factory) = make_recording_context(config);
    let compiler = StatementCompiler::new(context);
    let mut ctx = SymbolResolutionContext::new();

    let err = compiler
        .compile_with(&recording_statement(), &mut ctx)
        .unwrap_err();
    assert!(matches!(
        err.error,
        ValidationError::AggregationRejected { ref function, .. } if function == "rec_b"
    ));
    assert!(err.to_string().contains("recorded"));

    // validation started only after all declarations
    assert_eq!(
        factory.entries()[..3],
        ["declare:rec_a", "declare:rec_b", "declare:rec_a"]
    );
    let key = AggregationKey::new(RECORDING_FACTORY, ["rec_a", "rec_b"]);
    assert!(ctx.aggregation(&key).is_none());
    assert!(!ctx.has_aggregation_registry());
}

#[test]
fn test_missing_factory_is_unknown_symbol() {
    let context = make_context();
    context
        .add_plug_in_aggregation(PlugInAggregationMultiFunction::new(["mystery"], "absent"))
        .unwrap();
    let compiler = StatementCompiler::new(Arc::new(context));
    let mut ctx = SymbolResolutionContext::new();
    let err = compiler
        .compile_with(
            &StatementRaw::new("s")
                .select(Expression::function("mystery", vec![Expression::property("myInt")]))
                .from(MAP_TYPE),
            &mut ctx,
        )
        .unwrap_err();
    assert!(matches!(
        err.error,
        ValidationError::UnknownSymbol {
            kind: SymbolKind::AggregationFactory,
            ..
        }
    ));
    assert!(!ctx.has_aggregation_registry());
}

#[test]
fn test_aggregation_not_allowed_in_where_or_nested() {
    let (context, _factory) = make_recording_context(RecordingFactory::config());
    let compiler = StatementCompiler::new(context);

    let in_where = StatementRaw::new("w")
        .select(Expression::property("myInt"))
        .from(MAP_TYPE)
        .filter(Expression::compare(
            Expression::function("rec_a", vec![Expression::property("myInt")]),
            eventflux_compiler::query_api::expression::CompareOperator::GreaterThan,
            Expression::value_long(1),
        ));
    let err = compiler.compile(&in_where).unwrap_err();
    assert!(matches!(err.error, ValidationError::NotAllowed(_)));

    let nested = StatementRaw::new("n")
        .select(Expression::function(
            "rec_a",
            vec![Expression::function("rec_b", vec![Expression::wildcard(None)])],
        ))
        .from(MAP_TYPE);
    let err = compiler.compile(&nested).unwrap_err();
    assert!(matches!(err.error, ValidationError::NotAllowed(_)));
}

#[test]
fn test_collect_functions_share_stream_state() {
    let context = Arc::new(make_context());
    let compiler = StatementCompiler::new(Arc::clone(&context));
    let spec = compiler
        .compile(
            &StatementRaw::new("collect")
                .select_as(Expression::function("window", vec![Expression::wildcard(None)]), "all")
                .select_as(Expression::function("first", vec![Expression::wildcard(None)]), "head")
                .select_as(
                    Expression::function("last", vec![Expression::property("myInt")]),
                    "tail",
                )
                .from(MAP_TYPE),
        )
        .unwrap();

    assert_eq!(spec.aggregation_states.len(), 1);
    let map_type = event_type(&context, MAP_TYPE);
    let result_types: Vec<&AggregationResultType> = spec
        .aggregations
        .iter()
        .map(|a| a.handler.result_type())
        .collect();
    assert_eq!(
        result_types,
        vec![
            &AggregationResultType::EventCollection(Arc::clone(&map_type)),
            &AggregationResultType::SingleEvent(Arc::clone(&map_type)),
            &AggregationResultType::Scalar(Type::INT),
        ]
    );

    let mut state = spec.aggregation_states[0].state_factory.make_state();
    let events = [
        map_event(&context, 1, "a"),
        map_event(&context, 2, "b"),
        map_event(&context, 3, "c"),
    ];
    for event in &events {
        state.apply_enter(std::slice::from_ref(event));
    }
    let eval = EvaluationContext::new("collect");

    let window = spec.aggregations[0].handler.accessor();
    assert_eq!(
        window
            .get_enumerable_events(state.as_ref(), &[], true, &eval)
            .unwrap()
            .len(),
        3
    );
    let first = spec.aggregations[1].handler.accessor();
    assert!(Arc::ptr_eq(
        &first
            .get_enumerable_event(state.as_ref(), &[], true, &eval)
            .unwrap(),
        &events[0]
    ));
    let last = spec.aggregations[2].handler.accessor();
    assert_eq!(
        last.get_value(state.as_ref(), &[], true, &eval),
        AttributeValue::Int(3)
    );

    state.apply_leave(std::slice::from_ref(&events[0]));
    assert_eq!(
        window
            .get_enumerable_events(state.as_ref(), &[], true, &eval)
            .unwrap()
            .len(),
        2
    );
    state.clear();
    assert!(window
        .get_enumerable_events(state.as_ref(), &[], true, &eval)
        .is_none());
    assert!(last.get_value(state.as_ref(), &[], true, &eval).is_null());
}

#[test]
fn test_collect_rejects_distinct_and_values() {
    let compiler = StatementCompiler::new(Arc::new(make_context()));

    let distinct = StatementRaw::new("d")
        .select(Expression::function_distinct(
            "window",
            vec![Expression::wildcard(None)],
        ))
        .from(MAP_TYPE);
    let err = compiler.compile(&distinct).unwrap_err();
    assert!(matches!(err.error, ValidationError::AggregationRejected { .. }));

    let value = StatementRaw::new("v")
        .select(Expression::function("window", vec![Expression::value_int(1)]))
        .from(MAP_TYPE);
    let err = compiler.compile(&value).unwrap_err();
    assert!(matches!(err.error, ValidationError::AggregationRejected { .. }));
}

#[test]
fn test_window_of_property_collects_values() {
    let context = Arc::new(make_context());
    let spec = StatementCompiler::new(Arc::clone(&context))
        .compile(
            &StatementRaw::new("values")
                .select(Expression::function("window", vec![Expression::property("myString")]))
                .from(MAP_TYPE),
        )
        .unwrap();
    let aggregation = &spec.aggregations[0];
    assert_eq!(
        aggregation.handler.result_type(),
        &AggregationResultType::ScalarCollection(Type::STRING)
    );

    let mut state = spec.aggregation_states[aggregation.state_slot]
        .state_factory
        .make_state();
    state.apply_enter(&[map_event(&context, 1, "x")]);
    state.apply_enter(&[map_event(&context, 2, "y")]);
    let values = aggregation
        .handler
        .accessor()
        .get_enumerable_scalar(state.as_ref(), &[], true, &EvaluationContext::new("values"))
        .unwrap();
    assert_eq!(values, vec![AttributeValue::from("x"), AttributeValue::from("y")]);
}
