// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime surface of a multi-function: the state the runtime owns and the
//! accessor reading a snapshot of it.

use crate::core::event::event_bean::EventBean;
use crate::core::event::value::AttributeValue;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Per-partition accumulator. Owned and serialized by the runtime.
pub trait AggregationMultiFunctionState: Debug + Send + Sync {
    /// Events entering, one per stream of the statement.
    fn apply_enter(&mut self, events_per_stream: &[Arc<EventBean>]);

    /// Events leaving, one per stream of the statement.
    fn apply_leave(&mut self, events_per_stream: &[Arc<EventBean>]);

    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;
}

pub trait AggregationMultiFunctionStateFactory: Debug + Send + Sync {
    fn make_state(&self) -> Box<dyn AggregationMultiFunctionState>;
}

#[derive(Clone, Debug, Default)]
pub struct EvaluationContext {
    pub statement_name: String,
    pub partition_id: u32,
}

impl EvaluationContext {
    pub fn new(statement_name: impl Into<String>) -> Self {
        EvaluationContext {
            statement_name: statement_name.into(),
            partition_id: 0,
        }
    }
}

/// Reads accumulated state; never accumulates itself.
///
/// Only the method matching the handler's
/// [`AggregationResultType`](super::AggregationResultType) is meaningful for a
/// given call site. The enumeration methods default to `None`.
pub trait AggregationMultiFunctionAccessor: Debug + Send + Sync {
    fn get_value(
        &self,
        state: &dyn AggregationMultiFunctionState,
        events_per_stream: &[Arc<EventBean>],
        is_new_data: bool,
        ctx: &EvaluationContext,
    ) -> AttributeValue;

    fn get_enumerable_events(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Vec<Arc<EventBean>>> {
        None
    }

    fn get_enumerable_event(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Arc<EventBean>> {
        None
    }

    fn get_enumerable_scalar(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Vec<AttributeValue>> {
        None
    }
}
