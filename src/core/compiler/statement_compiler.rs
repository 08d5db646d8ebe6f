// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement compilation.
//!
//! [`StatementCompiler::compile`] turns a parsed [`StatementRaw`] into a
//! [`StatementSpec`] in three passes:
//!
//! 1. **Resolution**: every identifier is resolved against the statement's
//!    streams, the compile-time services and the statement's
//!    [`SymbolResolutionContext`]. Aggregation call sites register their forge
//!    and are collected, nothing is declared yet.
//! 2. **Aggregation**: the [`AggregationDriver`] declares every call site,
//!    then validates every call site.
//! 3. **Typing**: aggregation result types are filled in and operand types
//!    are checked bottom-up.
//!
//! A statement that fails keeps no side effects: the caller's context is
//! restored to what it held before compilation started.

use super::resolved_expression::{LocatedError, Position, ResolvedExpression};
use super::statement_spec::{
    AggregationStateSlot, CompiledAggregation, SelectColumn, StatementSpec, StreamBinding,
};
use super::symbol_resolution_context::SymbolResolutionContext;
use crate::core::aggregation::multifunc::{
    AggregationCallSite, AggregationDriver, AggregationKey, AggregationMultiFunctionHandler,
    AggregationParameter,
};
use crate::core::config::{CompilerContext, PlugInAggregationMultiFunction};
use crate::core::event::event_type::EventType;
use crate::core::exception::{CompileResult, StatementCompileError, SymbolKind, ValidationError};
use crate::query_api::definition::Type;
use crate::query_api::expression::{
    Expression, FunctionCallNode, PropertyNode, StreamWildcardNode, SubqueryNode,
    SubstitutionNode, TableAccessNode,
};
use crate::query_api::statement::StatementRaw;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Chooses the order in which the aggregation driver visits call sites,
/// given their count.
pub type VisitationOrder = Arc<dyn Fn(usize) -> Vec<usize> + Send + Sync>;

/// Compiles statements against shared compile-time services. Cheap to clone;
/// one compiler may compile statements from several threads.
#[derive(Clone)]
pub struct StatementCompiler {
    services: Arc<CompilerContext>,
    visitation_order: Option<VisitationOrder>,
}

impl fmt::Debug for StatementCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementCompiler")
            .field("services", &self.services)
            .field("custom_visitation_order", &self.visitation_order.is_some())
            .finish()
    }
}

impl StatementCompiler {
    pub fn new(services: Arc<CompilerContext>) -> Self {
        StatementCompiler {
            services,
            visitation_order: None,
        }
    }

    /// Overrides the call-site visitation order of both aggregation passes.
    pub fn with_visitation_order(mut self, order: VisitationOrder) -> Self {
        self.visitation_order = Some(order);
        self
    }

    pub fn services(&self) -> &Arc<CompilerContext> {
        &self.services
    }

    pub fn compile(&self, raw: &StatementRaw) -> CompileResult<StatementSpec> {
        let mut ctx = SymbolResolutionContext::new();
        self.compile_with(raw, &mut ctx)
    }

    /// Compiles `raw` in a caller-provided context. On success the context's
    /// contents are folded into the returned spec and `ctx` is left empty; on
    /// failure `ctx` is left as it was before the call.
    pub fn compile_with(
        &self,
        raw: &StatementRaw,
        ctx: &mut SymbolResolutionContext,
    ) -> CompileResult<StatementSpec> {
        let mut spec = self
            .compile_statement(raw, ctx, false)
            .map_err(|e| StatementCompileError::new(e.error, e.position, &raw.name))?;
        std::mem::take(ctx).fold_into(&mut spec);
        log::debug!(
            "Compiled statement '{}': {} stream(s), {} aggregation call site(s), {} substitution parameter(s)",
            spec.statement_name,
            spec.streams.len(),
            spec.aggregations.len(),
            spec.substitution_nodes.len()
        );
        Ok(spec)
    }

    fn compile_statement(
        &self,
        raw: &StatementRaw,
        ctx: &mut SymbolResolutionContext,
        is_subquery: bool,
    ) -> Result<StatementSpec, LocatedError> {
        let mut resolver = StatementResolver::new(self, raw, is_subquery)?;
        let snapshot = ctx.clone();
        let result = resolver.run(raw, ctx);
        if result.is_err() {
            let discarded = ctx
                .substitution_nodes()
                .len()
                .saturating_sub(snapshot.substitution_nodes().len());
            log::warn!(
                "Discarding symbols of failed statement '{}': {} substitution parameter(s), {} aggregation registration(s)",
                raw.name,
                discarded,
                resolver.registered
            );
            *ctx = snapshot;
        }
        result
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Clause {
    Select,
    Where,
    GroupBy,
    Having,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParameterStyle {
    Named,
    Unnamed,
}

fn located(error: ValidationError, position: Position) -> LocatedError {
    LocatedError::new(error, position)
}

/// State of one statement (or subquery) while it is resolved.
struct StatementResolver<'a> {
    compiler: &'a StatementCompiler,
    services: &'a CompilerContext,
    statement_name: String,
    is_subquery: bool,
    streams: Vec<StreamBinding>,
    clause: Clause,
    in_aggregation: bool,
    parameter_style: Option<ParameterStyle>,
    parameter_scopes: Vec<HashMap<String, ResolvedExpression>>,
    expanding: Vec<String>,
    driver: AggregationDriver,
    subqueries: Vec<StatementSpec>,
    registered: usize,
}

impl<'a> StatementResolver<'a> {
    fn new(
        compiler: &'a StatementCompiler,
        raw: &StatementRaw,
        is_subquery: bool,
    ) -> Result<Self, LocatedError> {
        let services = compiler.services.as_ref();
        let mut streams: Vec<StreamBinding> = Vec::with_capacity(raw.from.len());
        for stream in &raw.from {
            let position = stream.element.query_context_start_index;
            let event_type = services
                .event_types()
                .resolve(&stream.event_type)
                .map_err(|e| located(e, position))?;
            let name = stream.reference_name().to_string();
            if streams.iter().any(|s| s.name == name) {
                return Err(located(
                    ValidationError::NotAllowed(format!(
                        "stream name '{name}' is used more than once"
                    )),
                    position,
                ));
            }
            streams.push(StreamBinding { name, event_type });
        }
        Ok(StatementResolver {
            compiler,
            services,
            statement_name: raw.name.clone(),
            is_subquery,
            streams,
            clause: Clause::Select,
            in_aggregation: false,
            parameter_style: None,
            parameter_scopes: Vec::new(),
            expanding: Vec::new(),
            driver: AggregationDriver::new(),
            subqueries: Vec::new(),
            registered: 0,
        })
    }

    fn run(
        &mut self,
        raw: &StatementRaw,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<StatementSpec, LocatedError> {
        ctx.set_context_name(raw.context_name.clone());
        ctx.add_declared_expressions(raw.expression_declarations.iter().cloned());
        for script in &raw.scripts {
            ctx.add_script(Arc::clone(script));
        }

        // pass 1: resolution, in textual order
        self.clause = Clause::Select;
        let mut select = Vec::with_capacity(raw.select.len());
        for (index, item) in raw.select.iter().enumerate() {
            let expression = self.resolve(&item.expression, ctx)?;
            let name = item
                .rename
                .clone()
                .unwrap_or_else(|| column_name(&item.expression, index));
            select.push(SelectColumn { name, expression });
        }
        self.clause = Clause::Where;
        let mut filter = raw
            .filter
            .as_ref()
            .map(|e| self.resolve(e, ctx))
            .transpose()?;
        self.clause = Clause::GroupBy;
        let mut group_by = raw
            .group_by
            .iter()
            .map(|e| self.resolve(e, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        self.clause = Clause::Having;
        let mut having = raw
            .having
            .as_ref()
            .map(|e| self.resolve(e, ctx))
            .transpose()?;

        // pass 2: declare, then validate
        let handlers = self.run_aggregations()?;

        // pass 3: typing
        for column in &mut select {
            column.expression.check_types(&handlers)?;
        }
        for expression in &mut group_by {
            expression.check_types(&handlers)?;
        }
        for (clause, expression) in [("where", filter.as_mut()), ("having", having.as_mut())] {
            if let Some(expression) = expression {
                let t = expression.check_types(&handlers)?;
                if !matches!(t, Type::BOOL | Type::OBJECT) {
                    return Err(located(
                        ValidationError::type_mismatch(
                            clause,
                            format!("the {clause}-clause must be a bool expression, found {t}"),
                        ),
                        None,
                    ));
                }
            }
        }

        let (aggregations, aggregation_states) = self.assign_state_slots(handlers);

        let mut spec = StatementSpec::new(raw.name.clone());
        if self.services.attach_statement_text() {
            spec.statement_text = raw.text.clone();
        }
        spec.streams = std::mem::take(&mut self.streams);
        spec.select = select;
        spec.filter = filter;
        spec.group_by = group_by;
        spec.having = having;
        spec.aggregations = aggregations;
        spec.aggregation_states = aggregation_states;
        spec.subqueries = std::mem::take(&mut self.subqueries);
        Ok(spec)
    }

    fn run_aggregations(&mut self) -> Result<Vec<AggregationMultiFunctionHandler>, LocatedError> {
        let count = self.driver.call_sites().len();
        let order = match &self.compiler.visitation_order {
            Some(order) => order(count),
            None => self.driver.natural_order(),
        };
        self.driver
            .declare(&self.statement_name, &order)
            .map_err(|e| located(e, None))?;
        let stream_types: Vec<Arc<EventType>> =
            self.streams.iter().map(|s| Arc::clone(&s.event_type)).collect();
        self.driver
            .validate(
                &self.statement_name,
                &order,
                &stream_types,
                self.services.event_types(),
            )
            .map_err(|e| {
                let position = self
                    .driver
                    .call_sites()
                    .get(e.call_site)
                    .and_then(|site| site.node.element.query_context_start_index);
                located(e.error, position)
            })
    }

    /// Call sites whose handlers report the same state key share a slot.
    fn assign_state_slots(
        &self,
        handlers: Vec<AggregationMultiFunctionHandler>,
    ) -> (Vec<CompiledAggregation>, Vec<AggregationStateSlot>) {
        let mut slots: Vec<AggregationStateSlot> = Vec::new();
        let mut aggregations = Vec::with_capacity(handlers.len());
        for (site, handler) in self.driver.call_sites().iter().zip(handlers) {
            let state_slot = match slots.iter().position(|s| &s.key == handler.state_key()) {
                Some(slot) => slot,
                None => {
                    slots.push(AggregationStateSlot {
                        key: handler.state_key().clone(),
                        state_factory: Arc::clone(handler.state_factory()),
                    });
                    slots.len() - 1
                }
            };
            aggregations.push(CompiledAggregation {
                function_name: site.node.name.clone(),
                key: site.key.clone(),
                handler,
                state_slot,
            });
        }
        (aggregations, slots)
    }

    fn resolve(
        &mut self,
        expression: &Expression,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        match expression {
            Expression::Constant(c) => Ok(ResolvedExpression::Constant(c.value.clone())),
            Expression::Property(p) => self.resolve_property(p, ctx),
            Expression::StreamWildcard(w) => self.resolve_wildcard(w),
            Expression::TableAccess(node) => self.resolve_table_access(node, ctx),
            Expression::Substitution(node) => self.resolve_substitution(node, ctx),
            Expression::Prior(p) => {
                let position = p.element.query_context_start_index;
                match self.resolve_property(&p.property, ctx)? {
                    ResolvedExpression::Property {
                        stream, property, ..
                    } => {
                        ctx.set_has_prior_expression(true);
                        Ok(ResolvedExpression::Prior {
                            index: p.index,
                            stream,
                            property,
                        })
                    }
                    _ => Err(located(
                        ValidationError::NotAllowed(format!(
                            "prior requires a stream property, '{}' is not one",
                            p.property.path
                        )),
                        position,
                    )),
                }
            }
            Expression::Function(node) => self.resolve_function(node, ctx),
            Expression::Subquery(node) => self.resolve_subquery(node, ctx),
            Expression::Math {
                operator,
                left,
                right,
            } => Ok(ResolvedExpression::Math {
                operator: *operator,
                left: Box::new(self.resolve(left, ctx)?),
                right: Box::new(self.resolve(right, ctx)?),
                position: expression.position(),
                value_type: Type::OBJECT,
            }),
            Expression::Compare {
                operator,
                left,
                right,
            } => Ok(ResolvedExpression::Compare {
                operator: *operator,
                left: Box::new(self.resolve(left, ctx)?),
                right: Box::new(self.resolve(right, ctx)?),
                position: expression.position(),
            }),
            Expression::And(left, right) => Ok(ResolvedExpression::And(
                Box::new(self.resolve(left, ctx)?),
                Box::new(self.resolve(right, ctx)?),
            )),
            Expression::Or(left, right) => Ok(ResolvedExpression::Or(
                Box::new(self.resolve(left, ctx)?),
                Box::new(self.resolve(right, ctx)?),
            )),
            Expression::Not(inner) => Ok(ResolvedExpression::Not(Box::new(
                self.resolve(inner, ctx)?,
            ))),
        }
    }

    fn stream_index(&self, name: &str) -> Option<usize> {
        self.streams.iter().position(|s| s.name == name)
    }

    fn stream_property(
        &self,
        stream: usize,
        path: &str,
        position: Position,
    ) -> Result<ResolvedExpression, LocatedError> {
        let event_type = &self.streams[stream].event_type;
        let property = self
            .services
            .event_types()
            .compiled_property(event_type, path)
            .map_err(|e| located(e, position))?;
        Ok(ResolvedExpression::Property {
            stream,
            path: path.to_string(),
            property,
        })
    }

    fn resolve_property(
        &mut self,
        node: &PropertyNode,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        let path = node.path.as_str();

        if let Some(stream_name) = &node.stream {
            let stream = self.stream_index(stream_name).ok_or_else(|| {
                located(ValidationError::unknown(SymbolKind::Stream, stream_name), position)
            })?;
            return self.stream_property(stream, path, position);
        }

        // parameters of the declared expression being expanded shadow everything
        if let Some(bound) = self
            .parameter_scopes
            .last()
            .and_then(|scope| scope.get(path))
        {
            return Ok(bound.clone());
        }

        let head = path.split('.').next().unwrap_or(path);
        let candidates: Vec<usize> = self
            .streams
            .iter()
            .enumerate()
            .filter(|(_, s)| s.event_type.property(head).is_some())
            .map(|(i, _)| i)
            .collect();
        match candidates.as_slice() {
            [stream] => return self.stream_property(*stream, path, position),
            [_, _, ..] => {
                return Err(located(
                    ValidationError::AmbiguousProperty(path.to_string()),
                    position,
                ))
            }
            [] => {}
        }

        if let Some((alias, rest)) = path.split_once('.') {
            if let Some(stream) = self.stream_index(alias) {
                return self.stream_property(stream, rest, position);
            }
        }

        if let Some(variable) = self.services.variable(path) {
            ctx.record_variable_reference(variable.name.clone());
            return Ok(ResolvedExpression::Variable {
                name: variable.name,
                variable_type: variable.variable_type,
            });
        }

        if self.streams.len() == 1 {
            // reports what is wrong with the property on the only stream
            return self.stream_property(0, path, position);
        }
        Err(located(
            ValidationError::unknown(SymbolKind::Column, path),
            position,
        ))
    }

    fn resolve_wildcard(&self, node: &StreamWildcardNode) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        if !self.in_aggregation {
            return Err(located(
                ValidationError::NotAllowed(
                    "a stream wildcard is only valid as an aggregation function parameter"
                        .to_string(),
                ),
                position,
            ));
        }
        let stream = match &node.stream {
            Some(name) => self.stream_index(name).ok_or_else(|| {
                located(ValidationError::unknown(SymbolKind::Stream, name), position)
            })?,
            None if self.streams.len() == 1 => 0,
            None => {
                return Err(located(
                    ValidationError::NotAllowed(
                        "'*' is ambiguous with several streams, qualify it as 'alias.*'"
                            .to_string(),
                    ),
                    position,
                ))
            }
        };
        Ok(ResolvedExpression::StreamWildcard {
            stream,
            event_type: Arc::clone(&self.streams[stream].event_type),
        })
    }

    fn resolve_table_access(
        &mut self,
        node: &Arc<TableAccessNode>,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        let table = self.services.table(&node.table).ok_or_else(|| {
            located(ValidationError::unknown(SymbolKind::Table, &node.table), position)
        })?;
        if node.keys.len() != table.key_columns.len() {
            return Err(located(
                ValidationError::type_mismatch(
                    &node.table,
                    format!(
                        "the table has {} key column(s) but {} key expression(s) were given",
                        table.key_columns.len(),
                        node.keys.len()
                    ),
                ),
                position,
            ));
        }
        let mut keys = Vec::with_capacity(node.keys.len());
        for (key, column) in node.keys.iter().zip(&table.key_columns) {
            let mut resolved = self.resolve(key, ctx)?;
            // key columns were checked when the table was registered
            let column_type = table.column_type(column).unwrap_or(Type::OBJECT);
            let key_type = resolved.check_types(&[])?;
            if !key_type.is_comparable_to(column_type) {
                return Err(located(
                    ValidationError::type_mismatch(
                        format!("{}.{}", node.table, column),
                        format!("key column is {column_type} but the key expression is {key_type}"),
                    ),
                    position,
                ));
            }
            keys.push(resolved);
        }
        let value_type = match &node.column {
            Some(column) => table.column_type(column).ok_or_else(|| {
                located(
                    ValidationError::unknown(SymbolKind::Column, format!("{}.{}", node.table, column)),
                    position,
                )
            })?,
            None => Type::OBJECT,
        };
        ctx.record_table_access(node);
        Ok(ResolvedExpression::TableAccess {
            node: Arc::clone(node),
            keys,
            value_type,
        })
    }

    fn resolve_substitution(
        &mut self,
        node: &Arc<SubstitutionNode>,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        if self.is_subquery {
            return Err(located(
                ValidationError::NotAllowed(
                    "substitution parameters are not supported inside subqueries".to_string(),
                ),
                position,
            ));
        }
        let style = if node.name.is_some() {
            ParameterStyle::Named
        } else {
            ParameterStyle::Unnamed
        };
        match self.parameter_style {
            Some(existing) if existing != style => {
                return Err(located(
                    ValidationError::InvalidSubstitution(
                        "named and unnamed substitution parameters cannot be mixed".to_string(),
                    ),
                    position,
                ))
            }
            _ => self.parameter_style = Some(style),
        }
        let slot = ctx.add_substitution_node(Arc::clone(node));
        Ok(ResolvedExpression::Substitution {
            slot,
            value_type: node.declared_type.unwrap_or(Type::OBJECT),
        })
    }

    fn resolve_function(
        &mut self,
        node: &Arc<FunctionCallNode>,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        let name = node.name.as_str();

        let declared = ctx
            .expression_declaration(name)
            .cloned()
            .or_else(|| self.services.declared_expression(name));
        if let Some(declaration) = declared {
            if declaration.parameters.len() != node.parameters.len() {
                return Err(located(
                    ValidationError::type_mismatch(
                        name,
                        format!(
                            "the declared expression takes {} parameter(s) but {} were given",
                            declaration.parameters.len(),
                            node.parameters.len()
                        ),
                    ),
                    position,
                ));
            }
            if self.expanding.iter().any(|n| n == name) {
                return Err(located(
                    ValidationError::NotAllowed(format!(
                        "declared expression '{name}' refers to itself"
                    )),
                    position,
                ));
            }
            let mut scope = HashMap::with_capacity(declaration.parameters.len());
            for (parameter, argument) in declaration.parameters.iter().zip(&node.parameters) {
                scope.insert(parameter.clone(), self.resolve(argument, ctx)?);
            }
            self.parameter_scopes.push(scope);
            self.expanding.push(name.to_string());
            let body = self.resolve(&declaration.body, ctx);
            self.expanding.pop();
            self.parameter_scopes.pop();
            return Ok(ResolvedExpression::DeclaredExpression {
                name: name.to_string(),
                body: Box::new(body?),
            });
        }

        let script = ctx.scripts().iter().find(|s| s.name == name).cloned();
        if let Some(script) = script {
            let script = if script.parameter_names.len() == node.parameters.len() {
                script
            } else {
                ctx.scripts()
                    .iter()
                    .find(|s| s.name == name && s.parameter_names.len() == node.parameters.len())
                    .cloned()
                    .ok_or_else(|| {
                        located(
                            ValidationError::type_mismatch(
                                name,
                                format!(
                                    "no script '{name}' takes {} parameter(s)",
                                    node.parameters.len()
                                ),
                            ),
                            position,
                        )
                    })?
            };
            let arguments = node
                .parameters
                .iter()
                .map(|argument| self.resolve(argument, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ResolvedExpression::Script { script, arguments });
        }

        if let Some(config) = self.services.plug_in_function(name) {
            return self.resolve_aggregation(node, config, ctx);
        }

        Err(located(ValidationError::unknown(SymbolKind::Function, name), position))
    }

    fn resolve_aggregation(
        &mut self,
        node: &Arc<FunctionCallNode>,
        config: Arc<PlugInAggregationMultiFunction>,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        match self.clause {
            Clause::Where | Clause::GroupBy => {
                let clause = if self.clause == Clause::Where {
                    "where"
                } else {
                    "group-by"
                };
                return Err(located(
                    ValidationError::NotAllowed(format!(
                        "aggregation function '{}' is not allowed in the {clause}-clause",
                        node.name
                    )),
                    position,
                ));
            }
            Clause::Select | Clause::Having => {}
        }
        if self.in_aggregation {
            return Err(located(
                ValidationError::NotAllowed(format!(
                    "aggregation function '{}' cannot be nested in another aggregation",
                    node.name
                )),
                position,
            ));
        }

        let key = AggregationKey::for_config(&config);
        let newly_registered = ctx.aggregation(&key).is_none();
        let services = self.services;
        let forge = ctx
            .resolve_or_register_aggregation(key.clone(), || services.create_forge(&config))
            .map_err(|e| located(e, position))?;
        if newly_registered {
            self.registered += 1;
        }

        self.in_aggregation = true;
        let parameters = self.resolve_aggregation_parameters(node, ctx);
        self.in_aggregation = false;
        let parameters = parameters?;

        let call_site = self
            .driver
            .add_call_site(AggregationCallSite {
                node: Arc::clone(node),
                key,
                forge,
                config,
                parameters,
            })
            .map_err(|e| located(e, position))?;
        Ok(ResolvedExpression::Aggregation {
            call_site,
            position,
            result_type: None,
        })
    }

    fn resolve_aggregation_parameters(
        &mut self,
        node: &FunctionCallNode,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<Vec<AggregationParameter>, LocatedError> {
        let mut parameters = Vec::with_capacity(node.parameters.len());
        for parameter in &node.parameters {
            let parameter = match self.resolve(parameter, ctx)? {
                ResolvedExpression::StreamWildcard { stream, event_type } => {
                    AggregationParameter::Stream { stream, event_type }
                }
                ResolvedExpression::Property {
                    stream,
                    path,
                    property,
                } => AggregationParameter::Property {
                    stream,
                    path,
                    property,
                },
                mut other => AggregationParameter::Value(other.check_types(&[])?),
            };
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn resolve_subquery(
        &mut self,
        node: &Arc<SubqueryNode>,
        ctx: &mut SymbolResolutionContext,
    ) -> Result<ResolvedExpression, LocatedError> {
        let position = node.element.query_context_start_index;
        if node.statement.select.len() != 1 {
            return Err(located(
                ValidationError::NotAllowed(format!(
                    "a subquery must select exactly one column, found {}",
                    node.statement.select.len()
                )),
                position,
            ));
        }
        let mut child = SymbolResolutionContext::new();
        let mut spec = self
            .compiler
            .compile_statement(&node.statement, &mut child, true)?;
        ctx.merge(&child);
        child.fold_into(&mut spec);
        let value_type = spec.select[0].expression.value_type();
        self.subqueries.push(spec);
        Ok(ResolvedExpression::Subquery {
            index: self.subqueries.len() - 1,
            value_type,
        })
    }
}

fn column_name(expression: &Expression, index: usize) -> String {
    match expression {
        Expression::Property(p) => p.path.clone(),
        Expression::Function(f) => f.name.clone(),
        Expression::Prior(p) => format!("prior({}, {})", p.index, p.property.path),
        _ => format!("column{index}"),
    }
}
