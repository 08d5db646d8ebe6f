// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expressions after symbol resolution.
//!
//! Every identifier is bound: properties to compiled getters, variables and
//! tables to their definitions, substitution parameters to slots, aggregation
//! calls to call-site indexes. Types are settled by
//! [`ResolvedExpression::check_types`] once aggregation handlers are known.

use crate::core::aggregation::multifunc::{AggregationMultiFunctionHandler, AggregationResultType};
use crate::core::event::event_type::EventType;
use crate::core::event::property::CompiledProperty;
use crate::core::exception::ValidationError;
use crate::query_api::definition::Type;
use crate::query_api::expression::{
    CompareOperator, ConstantValue, MathOperator, TableAccessNode,
};
use crate::query_api::statement::ExpressionScriptProvided;
use std::sync::Arc;

pub type Position = Option<(i32, i32)>;

#[derive(Clone, Debug)]
pub enum ResolvedExpression {
    Constant(ConstantValue),
    Property {
        stream: usize,
        path: String,
        property: CompiledProperty,
    },
    StreamWildcard {
        stream: usize,
        event_type: Arc<EventType>,
    },
    Variable {
        name: String,
        variable_type: Type,
    },
    TableAccess {
        node: Arc<TableAccessNode>,
        keys: Vec<ResolvedExpression>,
        value_type: Type,
    },
    Substitution {
        slot: usize,
        value_type: Type,
    },
    Prior {
        index: u32,
        stream: usize,
        property: CompiledProperty,
    },
    DeclaredExpression {
        name: String,
        body: Box<ResolvedExpression>,
    },
    Script {
        script: Arc<ExpressionScriptProvided>,
        arguments: Vec<ResolvedExpression>,
    },
    Aggregation {
        call_site: usize,
        position: Position,
        result_type: Option<AggregationResultType>,
    },
    Subquery {
        index: usize,
        value_type: Type,
    },
    Math {
        operator: MathOperator,
        left: Box<ResolvedExpression>,
        right: Box<ResolvedExpression>,
        position: Position,
        value_type: Type,
    },
    Compare {
        operator: CompareOperator,
        left: Box<ResolvedExpression>,
        right: Box<ResolvedExpression>,
        position: Position,
    },
    And(Box<ResolvedExpression>, Box<ResolvedExpression>),
    Or(Box<ResolvedExpression>, Box<ResolvedExpression>),
    Not(Box<ResolvedExpression>),
}

/// A type error together with where it was found.
#[derive(Debug)]
pub struct LocatedError {
    pub error: ValidationError,
    pub position: Position,
}

impl LocatedError {
    pub fn new(error: ValidationError, position: Position) -> Self {
        LocatedError { error, position }
    }
}

fn math_type(left: Type, right: Type) -> Option<Type> {
    match (left, right) {
        (Type::OBJECT, Type::OBJECT) => Some(Type::OBJECT),
        (Type::OBJECT, other) | (other, Type::OBJECT) if other.is_numeric() => Some(other),
        (l, r) => l.widen(r),
    }
}

fn is_boolean(t: Type) -> bool {
    matches!(t, Type::BOOL | Type::OBJECT)
}

impl ResolvedExpression {
    /// Type of the value; `OBJECT` for event-valued and not yet typed nodes.
    pub fn value_type(&self) -> Type {
        match self {
            ResolvedExpression::Constant(c) => c.get_type(),
            ResolvedExpression::Property { property, .. }
            | ResolvedExpression::Prior { property, .. } => property.property_type,
            ResolvedExpression::StreamWildcard { .. } => Type::OBJECT,
            ResolvedExpression::Variable { variable_type, .. } => *variable_type,
            ResolvedExpression::TableAccess { value_type, .. }
            | ResolvedExpression::Substitution { value_type, .. }
            | ResolvedExpression::Subquery { value_type, .. }
            | ResolvedExpression::Math { value_type, .. } => *value_type,
            ResolvedExpression::DeclaredExpression { body, .. } => body.value_type(),
            ResolvedExpression::Script { script, .. } => script.return_type,
            ResolvedExpression::Aggregation { result_type, .. } => result_type
                .as_ref()
                .map(|r| r.value_type())
                .unwrap_or(Type::OBJECT),
            ResolvedExpression::Compare { .. }
            | ResolvedExpression::And(..)
            | ResolvedExpression::Or(..)
            | ResolvedExpression::Not(_) => Type::BOOL,
        }
    }

    /// Fills in aggregation result types from `handlers` and checks operand
    /// types bottom-up. Returns the type of this node.
    pub fn check_types(
        &mut self,
        handlers: &[AggregationMultiFunctionHandler],
    ) -> Result<Type, LocatedError> {
        match self {
            ResolvedExpression::Aggregation {
                call_site,
                result_type,
                ..
            } => {
                if let Some(handler) = handlers.get(*call_site) {
                    *result_type = Some(handler.result_type().clone());
                }
            }
            ResolvedExpression::TableAccess { keys, .. } => {
                for key in keys {
                    key.check_types(handlers)?;
                }
            }
            ResolvedExpression::DeclaredExpression { body, .. } => {
                body.check_types(handlers)?;
            }
            ResolvedExpression::Script { arguments, .. } => {
                for argument in arguments {
                    argument.check_types(handlers)?;
                }
            }
            ResolvedExpression::Math {
                operator,
                left,
                right,
                position,
                value_type,
            } => {
                let l = left.check_types(handlers)?;
                let r = right.check_types(handlers)?;
                *value_type = math_type(l, r).ok_or_else(|| {
                    LocatedError::new(
                        ValidationError::type_mismatch(
                            format!("{operator:?}"),
                            format!("arithmetic requires numeric operands, found {l} and {r}"),
                        ),
                        *position,
                    )
                })?;
            }
            ResolvedExpression::Compare {
                operator,
                left,
                right,
                position,
            } => {
                let l = left.check_types(handlers)?;
                let r = right.check_types(handlers)?;
                if !l.is_comparable_to(r) {
                    return Err(LocatedError::new(
                        ValidationError::type_mismatch(
                            format!("{operator:?}"),
                            format!("cannot compare {l} with {r}"),
                        ),
                        *position,
                    ));
                }
            }
            ResolvedExpression::And(left, right) | ResolvedExpression::Or(left, right) => {
                for side in [left, right] {
                    let t = side.check_types(handlers)?;
                    if !is_boolean(t) {
                        return Err(LocatedError::new(
                            ValidationError::type_mismatch(
                                "logical operator",
                                format!("operand must be bool, found {t}"),
                            ),
                            None,
                        ));
                    }
                }
            }
            ResolvedExpression::Not(inner) => {
                let t = inner.check_types(handlers)?;
                if !is_boolean(t) {
                    return Err(LocatedError::new(
                        ValidationError::type_mismatch(
                            "not",
                            format!("operand must be bool, found {t}"),
                        ),
                        None,
                    ));
                }
            }
            ResolvedExpression::Constant(_)
            | ResolvedExpression::Property { .. }
            | ResolvedExpression::StreamWildcard { .. }
            | ResolvedExpression::Variable { .. }
            | ResolvedExpression::Substitution { .. }
            | ResolvedExpression::Prior { .. }
            | ResolvedExpression::Subquery { .. } => {}
        }
        Ok(self.value_type())
    }

    /// Calls `visit` on this node and every node below it.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ResolvedExpression)) {
        visit(self);
        match self {
            ResolvedExpression::TableAccess { keys, .. } => {
                keys.iter().for_each(|k| k.walk(visit));
            }
            ResolvedExpression::DeclaredExpression { body, .. } => body.walk(visit),
            ResolvedExpression::Script { arguments, .. } => {
                arguments.iter().for_each(|a| a.walk(visit));
            }
            ResolvedExpression::Math { left, right, .. }
            | ResolvedExpression::Compare { left, right, .. }
            | ResolvedExpression::And(left, right)
            | ResolvedExpression::Or(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            ResolvedExpression::Not(inner) => inner.walk(visit),
            _ => {}
        }
    }
}
