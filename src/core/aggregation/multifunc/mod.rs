// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation multi-function extension protocol.
//!
//! A multi-function is a family of aggregation functions backed by one
//! [`AggregationMultiFunctionForge`] per statement. Functions configured
//! together (see
//! [`PlugInAggregationMultiFunction`](crate::core::config::PlugInAggregationMultiFunction))
//! resolve to the same forge, so their call sites can share state.
//!
//! Each forge goes through two phases, driven by
//! [`AggregationDriver`](driver::AggregationDriver):
//!
//! 1. **Declare**: [`add_aggregation_function`](AggregationMultiFunctionForge::add_aggregation_function)
//!    once per call site, before any type information is known.
//! 2. **Validate**: [`validate_get_handler`](AggregationMultiFunctionForge::validate_get_handler)
//!    once per call site, with resolved parameter types; returns the call
//!    site's [`AggregationMultiFunctionHandler`].
//!
//! Every declare call of a statement happens before the first validate call.
//! Within a phase the call-site order is unspecified.

pub mod accessor;
pub mod collect;
pub mod driver;
pub mod handler;

pub use accessor::{
    AggregationMultiFunctionAccessor, AggregationMultiFunctionState,
    AggregationMultiFunctionStateFactory, EvaluationContext,
};
pub use driver::{AggregationCallSite, AggregationDriver, CallSiteError, DriverPhase};
pub use handler::{AggregationMultiFunctionHandler, AggregationResultType, AggregationStateKey};

use crate::core::config::PlugInAggregationMultiFunction;
use crate::core::event::event_type::EventType;
use crate::core::event::event_type_registry::EventTypeRegistry;
use crate::core::event::property::CompiledProperty;
use crate::core::exception::ValidationError;
use crate::query_api::definition::Type;
use crate::query_api::expression::Expression;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Registry key of a forge within one statement: a name plus an
/// order-insensitive signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregationKey {
    pub name: String,
    pub signature: BTreeSet<String>,
}

impl AggregationKey {
    pub fn new<I, S>(name: impl Into<String>, signature: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AggregationKey {
            name: name.into(),
            signature: signature.into_iter().map(Into::into).collect(),
        }
    }

    /// Key of the forge serving a configured function family.
    pub fn for_config(config: &PlugInAggregationMultiFunction) -> Self {
        Self::new(config.factory.clone(), config.function_names.iter().cloned())
    }
}

/// Creates forges; registered with the compiler under a factory name.
pub trait AggregationMultiFunctionFactory: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn create_forge(
        &self,
        config: &PlugInAggregationMultiFunction,
    ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError>;

    fn clone_box(&self) -> Box<dyn AggregationMultiFunctionFactory>;
}

impl Clone for Box<dyn AggregationMultiFunctionFactory> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub trait AggregationMultiFunctionForge: Debug + Send + Sync {
    /// Declaration phase, type-blind. Does nothing unless overridden.
    fn add_aggregation_function(&self, _declaration: &DeclarationContext<'_>) {}

    /// Validation phase; rejecting the call site fails the statement.
    fn validate_get_handler(
        &self,
        validation: &ValidationContext<'_>,
    ) -> Result<AggregationMultiFunctionHandler, ValidationError>;
}

/// What a forge learns about a call site before types are known.
#[derive(Debug)]
pub struct DeclarationContext<'a> {
    pub statement_name: &'a str,
    pub function_name: &'a str,
    pub distinct: bool,
    pub parameters: &'a [Expression],
    pub config: &'a PlugInAggregationMultiFunction,
}

/// A resolved aggregation parameter.
#[derive(Clone, Debug)]
pub enum AggregationParameter {
    /// `*` or `alias.*`: the events of a stream of the statement
    Stream {
        stream: usize,
        event_type: Arc<EventType>,
    },
    /// A property of a stream, with its compiled getter
    Property {
        stream: usize,
        path: String,
        property: CompiledProperty,
    },
    /// Any other expression, known by its result type only
    Value(Type),
}

impl AggregationParameter {
    pub fn value_type(&self) -> Type {
        match self {
            AggregationParameter::Stream { .. } => Type::OBJECT,
            AggregationParameter::Property { property, .. } => property.property_type,
            AggregationParameter::Value(t) => *t,
        }
    }

    pub fn stream(&self) -> Option<usize> {
        match self {
            AggregationParameter::Stream { stream, .. }
            | AggregationParameter::Property { stream, .. } => Some(*stream),
            AggregationParameter::Value(_) => None,
        }
    }
}

/// What a forge learns about a call site once types are known.
#[derive(Debug)]
pub struct ValidationContext<'a> {
    pub statement_name: &'a str,
    pub function_name: &'a str,
    pub distinct: bool,
    pub parameters: &'a [Expression],
    pub parameter_types: &'a [AggregationParameter],
    pub stream_types: &'a [Arc<EventType>],
    pub event_types: &'a EventTypeRegistry,
    pub config: &'a PlugInAggregationMultiFunction,
}

impl ValidationContext<'_> {
    pub fn reject(&self, message: impl Into<String>) -> ValidationError {
        ValidationError::rejected(self.function_name, message)
    }
}
