// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `window`, `first` and `last` aggregations.
//!
//! All three read the events collected for one stream, so every call site
//! over the same stream shares one state slot:
//!
//! | call            | result                                  |
//! |-----------------|-----------------------------------------|
//! | `window(*)`     | the collected events                    |
//! | `window(p)`     | `p` of every collected event            |
//! | `first(*)`      | the oldest collected event              |
//! | `first(p)`      | `p` of the oldest collected event       |
//! | `last(*)`       | the newest collected event              |
//! | `last(p)`       | `p` of the newest collected event       |

use super::{
    AggregationMultiFunctionAccessor, AggregationMultiFunctionFactory,
    AggregationMultiFunctionForge, AggregationMultiFunctionHandler, AggregationMultiFunctionState,
    AggregationMultiFunctionStateFactory, AggregationParameter, AggregationResultType,
    AggregationStateKey, EvaluationContext, ValidationContext,
};
use crate::core::config::PlugInAggregationMultiFunction;
use crate::core::event::event_bean::EventBean;
use crate::core::event::property::{EventPropertyGetter, PropertyValueGetter};
use crate::core::event::value::AttributeValue;
use crate::core::exception::ValidationError;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

pub const COLLECT_FACTORY: &str = "collect";
pub const WINDOW: &str = "window";
pub const FIRST: &str = "first";
pub const LAST: &str = "last";

/// Configuration entry registering the built-in functions.
pub fn builtin_config() -> PlugInAggregationMultiFunction {
    PlugInAggregationMultiFunction::new([WINDOW, FIRST, LAST], COLLECT_FACTORY)
}

#[derive(Debug, Clone, Default)]
pub struct CollectAggregationFactory;

impl AggregationMultiFunctionFactory for CollectAggregationFactory {
    fn name(&self) -> &'static str {
        COLLECT_FACTORY
    }

    fn create_forge(
        &self,
        _config: &PlugInAggregationMultiFunction,
    ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError> {
        Ok(Arc::new(CollectForge))
    }

    fn clone_box(&self) -> Box<dyn AggregationMultiFunctionFactory> {
        Box::new(self.clone())
    }
}

#[derive(Debug)]
pub struct CollectForge;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    First,
    Last,
}

impl AggregationMultiFunctionForge for CollectForge {
    fn validate_get_handler(
        &self,
        validation: &ValidationContext<'_>,
    ) -> Result<AggregationMultiFunctionHandler, ValidationError> {
        if validation.distinct {
            return Err(validation.reject("distinct is not supported"));
        }
        let [parameter] = validation.parameter_types else {
            return Err(validation.reject(format!(
                "expects exactly one parameter but received {}",
                validation.parameter_types.len()
            )));
        };
        let stream = parameter.stream().ok_or_else(|| {
            validation.reject("the parameter must be a stream wildcard or a stream property")
        })?;

        let function = validation.function_name.to_ascii_lowercase();
        let edge = match function.as_str() {
            WINDOW => None,
            FIRST => Some(Edge::First),
            LAST => Some(Edge::Last),
            other => {
                return Err(validation.reject(format!("'{other}' is not a collect function")))
            }
        };

        let (result_type, accessor): (AggregationResultType, Arc<dyn AggregationMultiFunctionAccessor>) =
            match (parameter, edge) {
                (AggregationParameter::Stream { event_type, .. }, None) => (
                    AggregationResultType::EventCollection(Arc::clone(event_type)),
                    Arc::new(WindowEventsAccessor),
                ),
                (AggregationParameter::Stream { event_type, .. }, Some(edge)) => (
                    AggregationResultType::SingleEvent(Arc::clone(event_type)),
                    Arc::new(EdgeEventAccessor { edge }),
                ),
                (AggregationParameter::Property { property, .. }, None) => (
                    AggregationResultType::ScalarCollection(property.property_type),
                    Arc::new(WindowValuesAccessor {
                        getter: Arc::clone(&property.getter),
                    }),
                ),
                (AggregationParameter::Property { property, .. }, Some(edge)) => (
                    AggregationResultType::Scalar(property.property_type),
                    Arc::new(EdgeValueAccessor {
                        edge,
                        getter: Arc::clone(&property.getter),
                    }),
                ),
                (AggregationParameter::Value(_), _) => {
                    return Err(validation
                        .reject("the parameter must be a stream wildcard or a stream property"))
                }
            };

        Ok(AggregationMultiFunctionHandler::new(
            result_type,
            accessor,
            Arc::new(CollectStateFactory { stream }),
            AggregationStateKey::new(COLLECT_FACTORY, format!("stream-{stream}")),
        ))
    }
}

#[derive(Debug)]
pub struct CollectStateFactory {
    stream: usize,
}

impl AggregationMultiFunctionStateFactory for CollectStateFactory {
    fn make_state(&self) -> Box<dyn AggregationMultiFunctionState> {
        Box::new(CollectState {
            stream: self.stream,
            events: VecDeque::new(),
        })
    }
}

/// Events of one stream in arrival order.
#[derive(Debug)]
pub struct CollectState {
    stream: usize,
    events: VecDeque<Arc<EventBean>>,
}

impl CollectState {
    pub fn events(&self) -> &VecDeque<Arc<EventBean>> {
        &self.events
    }
}

impl AggregationMultiFunctionState for CollectState {
    fn apply_enter(&mut self, events_per_stream: &[Arc<EventBean>]) {
        if let Some(event) = events_per_stream.get(self.stream) {
            self.events.push_back(Arc::clone(event));
        }
    }

    fn apply_leave(&mut self, events_per_stream: &[Arc<EventBean>]) {
        let Some(event) = events_per_stream.get(self.stream) else {
            return;
        };
        let position = self
            .events
            .iter()
            .position(|e| Arc::ptr_eq(e, event))
            .or_else(|| self.events.iter().position(|e| e == event));
        if let Some(position) = position {
            self.events.remove(position);
        }
    }

    fn clear(&mut self) {
        self.events.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn collected(state: &dyn AggregationMultiFunctionState) -> Option<&VecDeque<Arc<EventBean>>> {
    state.as_any().downcast_ref::<CollectState>().map(|s| &s.events)
}

fn edge_event(state: &dyn AggregationMultiFunctionState, edge: Edge) -> Option<Arc<EventBean>> {
    let events = collected(state)?;
    match edge {
        Edge::First => events.front().cloned(),
        Edge::Last => events.back().cloned(),
    }
}

#[derive(Debug)]
struct WindowEventsAccessor;

impl AggregationMultiFunctionAccessor for WindowEventsAccessor {
    fn get_value(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> AttributeValue {
        AttributeValue::Null
    }

    fn get_enumerable_events(
        &self,
        state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Vec<Arc<EventBean>>> {
        let events = collected(state)?;
        if events.is_empty() {
            return None;
        }
        Some(events.iter().cloned().collect())
    }
}

#[derive(Debug)]
struct WindowValuesAccessor {
    getter: Arc<dyn EventPropertyGetter>,
}

impl AggregationMultiFunctionAccessor for WindowValuesAccessor {
    fn get_value(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> AttributeValue {
        AttributeValue::Null
    }

    fn get_enumerable_scalar(
        &self,
        state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Vec<AttributeValue>> {
        let events = collected(state)?;
        if events.is_empty() {
            return None;
        }
        Some(
            events
                .iter()
                .map(|e| self.getter.get(e).unwrap_or_default())
                .collect(),
        )
    }
}

#[derive(Debug)]
struct EdgeEventAccessor {
    edge: Edge,
}

impl AggregationMultiFunctionAccessor for EdgeEventAccessor {
    fn get_value(
        &self,
        _state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> AttributeValue {
        AttributeValue::Null
    }

    fn get_enumerable_event(
        &self,
        state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> Option<Arc<EventBean>> {
        edge_event(state, self.edge)
    }
}

#[derive(Debug)]
struct EdgeValueAccessor {
    edge: Edge,
    getter: Arc<dyn EventPropertyGetter>,
}

impl AggregationMultiFunctionAccessor for EdgeValueAccessor {
    fn get_value(
        &self,
        state: &dyn AggregationMultiFunctionState,
        _events_per_stream: &[Arc<EventBean>],
        _is_new_data: bool,
        _ctx: &EvaluationContext,
    ) -> AttributeValue {
        edge_event(state, self.edge)
            .map(|e| self.getter.get(&e).unwrap_or_default())
            .unwrap_or_default()
    }
}
