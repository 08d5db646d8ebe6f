// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-statement symbol resolution state.
//!
//! A [`SymbolResolutionContext`] is created when compilation of a statement
//! starts, passed explicitly (`&mut`) through every resolution step and folded
//! into the [`StatementSpec`] at the end. It is never shared between
//! statements and carries no locking.

use super::statement_spec::StatementSpec;
use crate::core::aggregation::multifunc::{AggregationKey, AggregationMultiFunctionForge};
use crate::core::exception::ValidationError;
use crate::core::util::ByIdentity;
use crate::query_api::expression::{SubstitutionNode, TableAccessNode};
use crate::query_api::statement::{ExpressionDeclItem, ExpressionScriptProvided};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Cloning is shallow: nodes and forges are shared.
#[derive(Clone, Debug, Default)]
pub struct SymbolResolutionContext {
    context_name: Option<String>,
    has_prior_expression: bool,
    variable_names: HashSet<String>,
    expression_declarations: HashMap<String, Arc<ExpressionDeclItem>>,
    scripts: Vec<Arc<ExpressionScriptProvided>>,
    table_nodes: HashSet<ByIdentity<TableAccessNode>>,
    substitution_nodes: Vec<Arc<SubstitutionNode>>,
    // most statements use no plug-in aggregation
    plug_in_aggregations: Option<HashMap<AggregationKey, Arc<dyn AggregationMultiFunctionForge>>>,
}

impl SymbolResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_variable_reference(&mut self, name: impl Into<String>) {
        self.variable_names.insert(name.into());
    }

    /// Idempotent under node identity: recording the same node twice keeps one
    /// entry, structurally equal nodes from different places keep one each.
    pub fn record_table_access(&mut self, node: &Arc<TableAccessNode>) {
        self.table_nodes.insert(ByIdentity::new(node));
    }

    /// Last declaration of a name wins; the replaced one is returned.
    pub fn add_declared_expression(
        &mut self,
        item: Arc<ExpressionDeclItem>,
    ) -> Option<Arc<ExpressionDeclItem>> {
        self.expression_declarations.insert(item.name.clone(), item)
    }

    pub fn add_declared_expressions<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Arc<ExpressionDeclItem>>,
    {
        for item in items {
            self.add_declared_expression(item);
        }
    }

    pub fn add_script(&mut self, script: Arc<ExpressionScriptProvided>) {
        self.scripts.push(script);
    }

    /// Appends in binding order; the position is the parameter's slot.
    pub fn add_substitution_node(&mut self, node: Arc<SubstitutionNode>) -> usize {
        self.substitution_nodes.push(node);
        self.substitution_nodes.len() - 1
    }

    /// Returns the forge registered under `key`, creating it with `factory`
    /// when absent. A failing factory leaves the registry unchanged and its
    /// error is returned as is.
    pub fn resolve_or_register_aggregation<F>(
        &mut self,
        key: AggregationKey,
        factory: F,
    ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError>
    where
        F: FnOnce() -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError>,
    {
        if let Some(existing) = self
            .plug_in_aggregations
            .as_ref()
            .and_then(|registry| registry.get(&key))
        {
            return Ok(Arc::clone(existing));
        }
        let forge = factory()?;
        log::debug!("Registered aggregation forge for {key:?}");
        self.plug_in_aggregations
            .get_or_insert_with(HashMap::new)
            .insert(key, Arc::clone(&forge));
        Ok(forge)
    }

    /// Unions the variable names and table accesses of a subquery's context
    /// into this one. Everything else stays local to its statement.
    pub fn merge(&mut self, other: &SymbolResolutionContext) {
        self.variable_names
            .extend(other.variable_names.iter().cloned());
        self.table_nodes.extend(other.table_nodes.iter().cloned());
    }

    /// Copies the variable names and table accesses into `spec`.
    pub fn attach_to(&self, spec: &mut StatementSpec) {
        spec.variable_names
            .extend(self.variable_names.iter().cloned());
        spec.table_nodes.extend(self.table_nodes.iter().cloned());
    }

    /// Attaches, then moves the statement-local parts into `spec`.
    pub fn fold_into(self, spec: &mut StatementSpec) {
        self.attach_to(spec);
        spec.context_name = self.context_name;
        spec.has_prior_expression = self.has_prior_expression;
        spec.expression_declarations = self.expression_declarations;
        spec.scripts = self.scripts;
        spec.substitution_nodes = self.substitution_nodes;
        spec.plug_in_aggregations = self.plug_in_aggregations.unwrap_or_default();
    }

    pub fn set_context_name(&mut self, context_name: Option<String>) {
        self.context_name = context_name;
    }

    pub fn context_name(&self) -> Option<&str> {
        self.context_name.as_deref()
    }

    pub fn set_has_prior_expression(&mut self, has_prior_expression: bool) {
        self.has_prior_expression = has_prior_expression;
    }

    pub fn has_prior_expression(&self) -> bool {
        self.has_prior_expression
    }

    pub fn variable_names(&self) -> &HashSet<String> {
        &self.variable_names
    }

    pub fn table_nodes(&self) -> &HashSet<ByIdentity<TableAccessNode>> {
        &self.table_nodes
    }

    pub fn expression_declaration(&self, name: &str) -> Option<&Arc<ExpressionDeclItem>> {
        self.expression_declarations.get(name)
    }

    pub fn expression_declarations(&self) -> &HashMap<String, Arc<ExpressionDeclItem>> {
        &self.expression_declarations
    }

    pub fn scripts(&self) -> &[Arc<ExpressionScriptProvided>] {
        &self.scripts
    }

    pub fn substitution_nodes(&self) -> &[Arc<SubstitutionNode>] {
        &self.substitution_nodes
    }

    pub fn aggregation(&self, key: &AggregationKey) -> Option<&Arc<dyn AggregationMultiFunctionForge>> {
        self.plug_in_aggregations.as_ref()?.get(key)
    }

    pub fn aggregation_keys(&self) -> Vec<AggregationKey> {
        self.plug_in_aggregations
            .as_ref()
            .map(|registry| registry.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the aggregation registry has been allocated.
    pub fn has_aggregation_registry(&self) -> bool {
        self.plug_in_aggregations.is_some()
    }
}
