// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement compilation: symbol resolution, aggregation validation and the
//! resolved statement handed to code generation.

pub mod resolved_expression;
pub mod statement_compiler;
pub mod statement_spec;
pub mod symbol_resolution_context;

pub use resolved_expression::{LocatedError, Position, ResolvedExpression};
pub use statement_compiler::{StatementCompiler, VisitationOrder};
pub use statement_spec::{
    AggregationStateSlot, CompiledAggregation, SelectColumn, StatementSpec, StreamBinding,
};
pub use symbol_resolution_context::SymbolResolutionContext;
