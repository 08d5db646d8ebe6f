// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiler configuration and the compile-time services built from it.

pub mod compiler_configuration;
pub mod compiler_context;

pub use compiler_configuration::{
    ByteCodeConfig, CompilerConfiguration, EventTypeConfig, PlugInAggregationMultiFunction,
    PropertyConfig, RepresentationConfig, TableConfig, VariableConfig,
};
pub use compiler_context::{CompilerContext, TableDefinition, VariableDefinition};
