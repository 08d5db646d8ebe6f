// SPDX-License-Identifier: MIT OR Apache-2.0

use super::accessor::{AggregationMultiFunctionAccessor, AggregationMultiFunctionStateFactory};
use crate::core::event::event_type::EventType;
use crate::query_api::definition::Type;
use std::fmt;
use std::sync::Arc;

/// Static result shape of a call site. Tells callers which accessor method
/// yields the value.
#[derive(Clone, Debug)]
pub enum AggregationResultType {
    /// [`get_value`](AggregationMultiFunctionAccessor::get_value)
    Scalar(Type),
    /// [`get_enumerable_events`](AggregationMultiFunctionAccessor::get_enumerable_events)
    EventCollection(Arc<EventType>),
    /// [`get_enumerable_event`](AggregationMultiFunctionAccessor::get_enumerable_event)
    SingleEvent(Arc<EventType>),
    /// [`get_enumerable_scalar`](AggregationMultiFunctionAccessor::get_enumerable_scalar)
    ScalarCollection(Type),
}

impl AggregationResultType {
    /// Type of the value the call site contributes to the enclosing expression.
    pub fn value_type(&self) -> Type {
        match self {
            AggregationResultType::Scalar(t) => *t,
            _ => Type::OBJECT,
        }
    }
}

impl PartialEq for AggregationResultType {
    fn eq(&self, other: &Self) -> bool {
        use AggregationResultType::*;
        match (self, other) {
            (Scalar(a), Scalar(b)) | (ScalarCollection(a), ScalarCollection(b)) => a == b,
            (EventCollection(a), EventCollection(b)) | (SingleEvent(a), SingleEvent(b)) => {
                a.name() == b.name()
            }
            _ => false,
        }
    }
}

/// Identifies aggregation state. Call sites of one statement whose handlers
/// report equal keys read the same state slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregationStateKey {
    pub provider: String,
    pub discriminator: String,
}

impl AggregationStateKey {
    pub fn new(provider: impl Into<String>, discriminator: impl Into<String>) -> Self {
        AggregationStateKey {
            provider: provider.into(),
            discriminator: discriminator.into(),
        }
    }
}

impl fmt::Display for AggregationStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.discriminator)
    }
}

/// Validated per-call-site bundle, immutable once produced.
#[derive(Clone, Debug)]
pub struct AggregationMultiFunctionHandler {
    result_type: AggregationResultType,
    accessor: Arc<dyn AggregationMultiFunctionAccessor>,
    state_factory: Arc<dyn AggregationMultiFunctionStateFactory>,
    state_key: AggregationStateKey,
}

impl AggregationMultiFunctionHandler {
    pub fn new(
        result_type: AggregationResultType,
        accessor: Arc<dyn AggregationMultiFunctionAccessor>,
        state_factory: Arc<dyn AggregationMultiFunctionStateFactory>,
        state_key: AggregationStateKey,
    ) -> Self {
        AggregationMultiFunctionHandler {
            result_type,
            accessor,
            state_factory,
            state_key,
        }
    }

    pub fn result_type(&self) -> &AggregationResultType {
        &self.result_type
    }

    pub fn accessor(&self) -> &Arc<dyn AggregationMultiFunctionAccessor> {
        &self.accessor
    }

    pub fn state_factory(&self) -> &Arc<dyn AggregationMultiFunctionStateFactory> {
        &self.state_factory
    }

    pub fn state_key(&self) -> &AggregationStateKey {
        &self.state_key
    }
}
