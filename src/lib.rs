// SPDX-License-Identifier: MIT OR Apache-2.0

//! EventFlux statement compiler core.
//!
//! Three subsystems live here:
//!
//! - **Uniform property access** ([`core::event`]): compiled getters that read,
//!   test and navigate event properties regardless of whether the event is
//!   backed by a map, a positional array, a typed object, an XML-style tree or a
//!   schema-tagged record.
//! - **Compile-time symbol resolution** ([`core::compiler`]): the per-statement
//!   [`SymbolResolutionContext`](core::compiler::SymbolResolutionContext) and
//!   the [`StatementCompiler`](core::compiler::StatementCompiler) that turns a
//!   parsed statement into a resolved [`StatementSpec`](core::compiler::StatementSpec).
//! - **Aggregation multi-function extension protocol**
//!   ([`core::aggregation::multifunc`]): the declare/validate contract for
//!   pluggable aggregations and the runtime accessor surface.
//!
//! The statement parser and the code generator are external; [`query_api`]
//! holds the parse tree types the parser hands over.

pub mod core;
pub mod query_api;
