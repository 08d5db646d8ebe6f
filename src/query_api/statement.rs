// SPDX-License-Identifier: MIT OR Apache-2.0

use super::definition::Type;
use super::expression::Expression;
use super::query_element::QueryElement;
use std::sync::Arc;

/// `expression name(param, ...) { body }` declared in front of a statement.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionDeclItem {
    pub element: QueryElement,
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Expression,
}

impl ExpressionDeclItem {
    pub fn new(name: impl Into<String>, parameters: Vec<String>, body: Expression) -> Self {
        ExpressionDeclItem {
            element: QueryElement::default(),
            name: name.into(),
            parameters,
            body,
        }
    }
}

/// Script declared in front of a statement. The script body is opaque to the
/// compiler; only its name, arity and return type take part in resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionScriptProvided {
    pub element: QueryElement,
    pub name: String,
    pub parameter_names: Vec<String>,
    pub dialect: Option<String>,
    pub expression: String,
    pub return_type: Type,
}

impl ExpressionScriptProvided {
    pub fn new(
        name: impl Into<String>,
        parameter_names: Vec<String>,
        expression: impl Into<String>,
        return_type: Type,
    ) -> Self {
        ExpressionScriptProvided {
            element: QueryElement::default(),
            name: name.into(),
            parameter_names,
            dialect: None,
            expression: expression.into(),
            return_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectItem {
    pub expression: Expression,
    pub rename: Option<String>,
}

/// Stream in the from-clause: an event type name and an optional alias.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamSpec {
    pub element: QueryElement,
    pub event_type: String,
    pub alias: Option<String>,
}

impl StreamSpec {
    pub fn new(event_type: impl Into<String>, alias: Option<String>) -> Self {
        StreamSpec {
            element: QueryElement::default(),
            event_type: event_type.into(),
            alias,
        }
    }

    /// Name the stream is referenced by inside the statement.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.event_type)
    }
}

/// Raw statement as produced by the parser, before any resolution.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct StatementRaw {
    pub element: QueryElement,
    pub name: String,
    pub text: Option<String>,
    pub context_name: Option<String>,
    pub expression_declarations: Vec<Arc<ExpressionDeclItem>>,
    pub scripts: Vec<Arc<ExpressionScriptProvided>>,
    pub select: Vec<SelectItem>,
    pub from: Vec<StreamSpec>,
    pub filter: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
}

impl StatementRaw {
    pub fn new(name: impl Into<String>) -> Self {
        StatementRaw {
            name: name.into(),
            ..Default::default()
        }
    }

    // Builder methods

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn context(mut self, context_name: impl Into<String>) -> Self {
        self.context_name = Some(context_name.into());
        self
    }

    pub fn declare_expression(mut self, item: ExpressionDeclItem) -> Self {
        self.expression_declarations.push(Arc::new(item));
        self
    }

    pub fn declare_script(mut self, script: ExpressionScriptProvided) -> Self {
        self.scripts.push(Arc::new(script));
        self
    }

    pub fn select(mut self, expression: Expression) -> Self {
        self.select.push(SelectItem {
            expression,
            rename: None,
        });
        self
    }

    pub fn select_as(mut self, expression: Expression, rename: impl Into<String>) -> Self {
        self.select.push(SelectItem {
            expression,
            rename: Some(rename.into()),
        });
        self
    }

    pub fn from(mut self, event_type: impl Into<String>) -> Self {
        self.from.push(StreamSpec::new(event_type, None));
        self
    }

    pub fn from_as(mut self, event_type: impl Into<String>, alias: impl Into<String>) -> Self {
        self.from.push(StreamSpec::new(event_type, Some(alias.into())));
        self
    }

    pub fn filter(mut self, expression: Expression) -> Self {
        self.filter = Some(expression);
        self
    }

    pub fn group_by(mut self, expression: Expression) -> Self {
        self.group_by.push(expression);
        self
    }

    pub fn having(mut self, expression: Expression) -> Self {
        self.having = Some(expression);
        self
    }
}
