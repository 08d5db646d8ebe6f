// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse tree handed over by the (external) statement parser.
//!
//! Nodes that the compiler tracks by identity (table access, substitution
//! parameters, function calls, subqueries) are held behind `Arc` so that the
//! same node can be recorded in several places without losing identity.

pub mod definition;
pub mod expression;
pub mod query_element;
pub mod statement;

pub use definition::{Attribute, Type};
pub use expression::{
    CompareOperator, Constant, ConstantValue, Expression, FunctionCallNode, MathOperator,
    PriorNode, PropertyNode, StreamWildcardNode, SubqueryNode, SubstitutionNode, TableAccessNode,
};
pub use query_element::QueryElement;
pub use statement::{
    ExpressionDeclItem, ExpressionScriptProvided, SelectItem, StatementRaw, StreamSpec,
};
