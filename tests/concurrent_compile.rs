// SPDX-License-Identifier: MIT OR Apache-2.0

#[path = "common/mod.rs"]
mod common;

use common::*;
use eventflux_compiler::core::compiler::StatementCompiler;
use eventflux_compiler::query_api::expression::Expression;
use eventflux_compiler::query_api::statement::StatementRaw;
use std::sync::Arc;

fn statement(index: usize) -> StatementRaw {
    StatementRaw::new(format!("stmt-{index}"))
        .select(Expression::property("myInt"))
        .select(Expression::property("inner.tag"))
        .select(Expression::function("rec_a", vec![Expression::property("myString")]))
        .select(Expression::function("last", vec![Expression::wildcard(None)]))
        .from(MAP_TYPE)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_statements_compile_concurrently() {
    let (context, factory) = make_recording_context(RecordingFactory::config());
    let compiler = StatementCompiler::new(Arc::clone(&context));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let compiler = compiler.clone();
            tokio::task::spawn_blocking(move || compiler.compile(&statement(i)))
        })
        .collect();

    let mut forges = Vec::new();
    for (i, handle) in handles.into_iter().enumerate() {
        let spec = handle.await.unwrap().unwrap();
        assert_eq!(spec.statement_name, format!("stmt-{i}"));
        assert_eq!(spec.plug_in_aggregations.len(), 2);
        forges.extend(spec.plug_in_aggregations.into_values());
    }

    // every statement built its own forges
    assert_eq!(*factory.forges_created.lock().unwrap(), 16);
    for (i, a) in forges.iter().enumerate() {
        for b in &forges[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
    // the getter cache holds one entry per type and path
    assert_eq!(context.event_types().cached_getter_count(), 3);
}
