// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fully resolved statement, as handed to the code generator.

use super::resolved_expression::ResolvedExpression;
use crate::core::aggregation::multifunc::{
    AggregationKey, AggregationMultiFunctionForge, AggregationMultiFunctionHandler,
    AggregationMultiFunctionStateFactory, AggregationStateKey,
};
use crate::core::event::event_type::EventType;
use crate::core::event::value::AttributeValue;
use crate::core::exception::ValidationError;
use crate::core::util::ByIdentity;
use crate::query_api::expression::{SubstitutionNode, TableAccessNode};
use crate::query_api::statement::{ExpressionDeclItem, ExpressionScriptProvided};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A stream of the from-clause bound to its event type.
#[derive(Clone, Debug)]
pub struct StreamBinding {
    pub name: String,
    pub event_type: Arc<EventType>,
}

#[derive(Clone, Debug)]
pub struct SelectColumn {
    pub name: String,
    pub expression: ResolvedExpression,
}

/// A validated aggregation call site.
#[derive(Clone, Debug)]
pub struct CompiledAggregation {
    pub function_name: String,
    pub key: AggregationKey,
    pub handler: AggregationMultiFunctionHandler,
    /// Index into [`StatementSpec::aggregation_states`]
    pub state_slot: usize,
}

/// Aggregation state shared by every call site reporting `key`.
#[derive(Clone, Debug)]
pub struct AggregationStateSlot {
    pub key: AggregationStateKey,
    pub state_factory: Arc<dyn AggregationMultiFunctionStateFactory>,
}

#[derive(Debug, Default)]
pub struct StatementSpec {
    pub statement_name: String,
    pub statement_text: Option<String>,
    pub context_name: Option<String>,
    pub has_prior_expression: bool,

    pub variable_names: HashSet<String>,
    pub table_nodes: HashSet<ByIdentity<TableAccessNode>>,
    pub expression_declarations: HashMap<String, Arc<ExpressionDeclItem>>,
    pub scripts: Vec<Arc<ExpressionScriptProvided>>,
    pub substitution_nodes: Vec<Arc<SubstitutionNode>>,
    pub plug_in_aggregations: HashMap<AggregationKey, Arc<dyn AggregationMultiFunctionForge>>,

    pub streams: Vec<StreamBinding>,
    pub select: Vec<SelectColumn>,
    pub filter: Option<ResolvedExpression>,
    pub group_by: Vec<ResolvedExpression>,
    pub having: Option<ResolvedExpression>,
    pub aggregations: Vec<CompiledAggregation>,
    pub aggregation_states: Vec<AggregationStateSlot>,
    pub subqueries: Vec<StatementSpec>,
}

impl StatementSpec {
    pub fn new(statement_name: impl Into<String>) -> Self {
        StatementSpec {
            statement_name: statement_name.into(),
            ..Default::default()
        }
    }

    pub fn substitution_count(&self) -> usize {
        self.substitution_nodes.len()
    }

    fn uses_named_parameters(&self) -> bool {
        self.substitution_nodes.iter().any(|n| n.name.is_some())
    }

    fn check_type(node: &SubstitutionNode, slot: usize, value: &AttributeValue) -> Result<(), ValidationError> {
        match node.declared_type {
            Some(declared) if !value.is_assignable_to(declared) => {
                let name = node
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("?{}", slot + 1));
                Err(ValidationError::type_mismatch(
                    name,
                    format!(
                        "expected {declared} but the provided value is {}",
                        value.get_type().map(|t| t.name()).unwrap_or("not a scalar")
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Binds unnamed substitution parameters by position. The returned values
    /// are ordered by slot.
    pub fn prepare_positional(
        &self,
        values: Vec<AttributeValue>,
    ) -> Result<Vec<AttributeValue>, ValidationError> {
        if self.uses_named_parameters() {
            return Err(ValidationError::InvalidSubstitution(
                "the statement uses named parameters, bind them by name".to_string(),
            ));
        }
        if values.len() != self.substitution_nodes.len() {
            return Err(ValidationError::SubstitutionCountMismatch {
                expected: self.substitution_nodes.len(),
                provided: values.len(),
            });
        }
        for (slot, (node, value)) in self.substitution_nodes.iter().zip(&values).enumerate() {
            Self::check_type(node, slot, value)?;
        }
        Ok(values)
    }

    /// Binds named substitution parameters. A name used at several places
    /// fills every slot carrying it.
    pub fn prepare_named(
        &self,
        values: &HashMap<String, AttributeValue>,
    ) -> Result<Vec<AttributeValue>, ValidationError> {
        if !self.substitution_nodes.is_empty() && !self.uses_named_parameters() {
            return Err(ValidationError::InvalidSubstitution(
                "the statement uses unnamed parameters, bind them by position".to_string(),
            ));
        }
        let names: HashSet<&str> = self
            .substitution_nodes
            .iter()
            .filter_map(|n| n.name.as_deref())
            .collect();
        if values.len() != names.len() {
            return Err(ValidationError::SubstitutionCountMismatch {
                expected: names.len(),
                provided: values.len(),
            });
        }
        let mut bound = Vec::with_capacity(self.substitution_nodes.len());
        for (slot, node) in self.substitution_nodes.iter().enumerate() {
            let name = node.name.as_deref().unwrap_or_default();
            let value = values.get(name).ok_or_else(|| {
                ValidationError::InvalidSubstitution(format!("no value provided for '{name}'"))
            })?;
            Self::check_type(node, slot, value)?;
            bound.push(value.clone());
        }
        Ok(bound)
    }

    pub fn stream(&self, name: &str) -> Option<&StreamBinding> {
        self.streams.iter().find(|s| s.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&SelectColumn> {
        self.select.iter().find(|c| c.name == name)
    }

    pub fn table_access_count(&self) -> usize {
        self.table_nodes.len()
    }
}
