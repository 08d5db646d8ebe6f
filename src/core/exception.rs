// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for statement compilation and property access

use crate::core::event::Representation;
use std::fmt;
use thiserror::Error;

/// What kind of symbol failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Table,
    Column,
    EventType,
    Stream,
    Function,
    AggregationFactory,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Table => "table",
            SymbolKind::Column => "column",
            SymbolKind::EventType => "event type",
            SymbolKind::Stream => "stream",
            SymbolKind::Function => "function",
            SymbolKind::AggregationFactory => "aggregation multi-function factory",
        })
    }
}

/// Compile-time failure; fatal to the statement being compiled.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Unknown {kind}: '{name}'")]
    UnknownSymbol { kind: SymbolKind, name: String },

    #[error("Type mismatch for '{name}': {message}")]
    TypeMismatch { name: String, message: String },

    #[error("Property '{property}' is not valid for event type '{event_type}': {message}")]
    InvalidProperty {
        event_type: String,
        property: String,
        message: String,
    },

    #[error("Property '{0}' is ambiguous, it is found in multiple streams")]
    AmbiguousProperty(String),

    #[error("Aggregation function '{function}' rejected the call: {message}")]
    AggregationRejected { function: String, message: String },

    #[error("Substitution parameter count mismatch: statement has {expected} parameter(s) but {provided} value(s) were provided")]
    SubstitutionCountMismatch { expected: usize, provided: usize },

    #[error("Invalid substitution parameter: {0}")]
    InvalidSubstitution(String),

    #[error("{0}")]
    NotAllowed(String),
}

impl ValidationError {
    pub fn unknown(kind: SymbolKind, name: impl Into<String>) -> Self {
        ValidationError::UnknownSymbol {
            kind,
            name: name.into(),
        }
    }

    pub fn type_mismatch(name: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::TypeMismatch {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_property(
        event_type: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidProperty {
            event_type: event_type.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn rejected(function: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::AggregationRejected {
            function: function.into(),
            message: message.into(),
        }
    }

    /// True for "unknown symbol" failures, false for type/shape failures.
    pub fn is_unknown_symbol(&self) -> bool {
        matches!(self, ValidationError::UnknownSymbol { .. })
    }
}

/// A [`ValidationError`] located in the statement text.
#[derive(Clone, Debug, PartialEq)]
pub struct StatementCompileError {
    pub error: ValidationError,
    pub line: Option<i32>,
    pub column: Option<i32>,
    pub statement_name: String,
}

impl StatementCompileError {
    pub fn new(error: ValidationError, position: Option<(i32, i32)>, statement: &str) -> Self {
        let (line, column) = position
            .map(|(l, c)| (Some(l), Some(c)))
            .unwrap_or((None, None));
        StatementCompileError {
            error,
            line,
            column,
            statement_name: statement.to_string(),
        }
    }
}

impl fmt::Display for StatementCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(l), Some(c)) => write!(
                f,
                "{} at line {}, column {} in statement '{}'",
                self.error, l, c, self.statement_name
            ),
            _ => write!(f, "{} in statement '{}'", self.error, self.statement_name),
        }
    }
}

impl std::error::Error for StatementCompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type CompileResult<T> = Result<T, StatementCompileError>;

/// Runtime failure of a top-level property read. Nested misses are absent
/// values, never errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PropertyAccessError {
    #[error("Getter compiled for {expected} events cannot read an event backed by {actual}")]
    UnderlyingMismatch {
        expected: Representation,
        actual: Representation,
    },
}

/// Invalid compiler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Duplicate event type: {0}")]
    DuplicateEventType(String),

    #[error("Event type '{event_type}' declares fragment '{property}' of unknown type '{fragment_type}'")]
    UnknownFragmentType {
        event_type: String,
        property: String,
        fragment_type: String,
    },

    #[error("Event type '{0}' needs a schema-tagged record schema")]
    MissingSchema(String),

    #[error("Nested record schema '{schema}' of event type '{event_type}' conflicts with a registered type of the same name")]
    NestedSchemaConflict { event_type: String, schema: String },

    #[error("Event type '{0}' uses the bean representation and must be registered with a bean descriptor")]
    BeanFromConfig(String),

    #[error("Unknown aggregation multi-function factory '{factory}' for functions {functions:?}")]
    UnknownFactory {
        factory: String,
        functions: Vec<String>,
    },

    #[error("Function name '{0}' is configured more than once")]
    DuplicateFunction(String),

    #[error("Table '{table}' declares key column '{column}' which is not one of its columns")]
    UnknownKeyColumn { table: String, column: String },

    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: SymbolKind, name: String },

    #[error("Invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}
