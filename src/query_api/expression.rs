// SPDX-License-Identifier: MIT OR Apache-2.0

use super::query_element::QueryElement;
use super::statement::StatementRaw;
use super::definition::Type;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Null,
}

impl ConstantValue {
    pub fn get_type(&self) -> Type {
        match self {
            ConstantValue::String(_) => Type::STRING,
            ConstantValue::Int(_) => Type::INT,
            ConstantValue::Long(_) => Type::LONG,
            ConstantValue::Float(_) => Type::FLOAT,
            ConstantValue::Double(_) => Type::DOUBLE,
            ConstantValue::Bool(_) => Type::BOOL,
            ConstantValue::Null => Type::OBJECT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    pub element: QueryElement,
    pub value: ConstantValue,
}

/// `[stream.]path` reference. Unqualified names that match no stream property
/// resolve to a variable of the same name.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyNode {
    pub element: QueryElement,
    pub stream: Option<String>,
    pub path: String,
}

/// `*` or `alias.*`, only valid as an aggregation function argument.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamWildcardNode {
    pub element: QueryElement,
    pub stream: Option<String>,
}

/// `table[key, ...].column`
#[derive(Clone, Debug, PartialEq)]
pub struct TableAccessNode {
    pub element: QueryElement,
    pub table: String,
    pub keys: Vec<Expression>,
    pub column: Option<String>,
}

/// `?`, `?:name` or `?:name:type` placeholder bound at execution preparation.
#[derive(Clone, Debug, PartialEq)]
pub struct SubstitutionNode {
    pub element: QueryElement,
    pub name: Option<String>,
    pub declared_type: Option<Type>,
}

/// `prior(index, property)`
#[derive(Clone, Debug, PartialEq)]
pub struct PriorNode {
    pub element: QueryElement,
    pub index: u32,
    pub property: PropertyNode,
}

/// `name(args)`: resolves to a declared expression, a script or an
/// aggregation function.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCallNode {
    pub element: QueryElement,
    pub name: String,
    pub distinct: bool,
    pub parameters: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubqueryNode {
    pub element: QueryElement,
    pub statement: StatementRaw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Constant(Constant),
    Property(PropertyNode),
    StreamWildcard(StreamWildcardNode),
    TableAccess(Arc<TableAccessNode>),
    Substitution(Arc<SubstitutionNode>),
    Prior(PriorNode),
    Function(Arc<FunctionCallNode>),
    Subquery(Arc<SubqueryNode>),
    Math {
        operator: MathOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Compare {
        operator: CompareOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    fn constant(value: ConstantValue) -> Self {
        Expression::Constant(Constant {
            element: QueryElement::default(),
            value,
        })
    }

    pub fn value_string(value: impl Into<String>) -> Self {
        Self::constant(ConstantValue::String(value.into()))
    }

    pub fn value_int(value: i32) -> Self {
        Self::constant(ConstantValue::Int(value))
    }

    pub fn value_long(value: i64) -> Self {
        Self::constant(ConstantValue::Long(value))
    }

    pub fn value_double(value: f64) -> Self {
        Self::constant(ConstantValue::Double(value))
    }

    pub fn value_bool(value: bool) -> Self {
        Self::constant(ConstantValue::Bool(value))
    }

    pub fn value_null() -> Self {
        Self::constant(ConstantValue::Null)
    }

    pub fn property(path: impl Into<String>) -> Self {
        Expression::Property(PropertyNode {
            element: QueryElement::default(),
            stream: None,
            path: path.into(),
        })
    }

    pub fn stream_property(stream: impl Into<String>, path: impl Into<String>) -> Self {
        Expression::Property(PropertyNode {
            element: QueryElement::default(),
            stream: Some(stream.into()),
            path: path.into(),
        })
    }

    pub fn wildcard(stream: Option<String>) -> Self {
        Expression::StreamWildcard(StreamWildcardNode {
            element: QueryElement::default(),
            stream,
        })
    }

    pub fn table_access(
        table: impl Into<String>,
        keys: Vec<Expression>,
        column: Option<String>,
    ) -> Self {
        Expression::TableAccess(Arc::new(TableAccessNode {
            element: QueryElement::default(),
            table: table.into(),
            keys,
            column,
        }))
    }

    pub fn substitution() -> Self {
        Expression::Substitution(Arc::new(SubstitutionNode {
            element: QueryElement::default(),
            name: None,
            declared_type: None,
        }))
    }

    pub fn named_substitution(name: impl Into<String>, declared_type: Option<Type>) -> Self {
        Expression::Substitution(Arc::new(SubstitutionNode {
            element: QueryElement::default(),
            name: Some(name.into()),
            declared_type,
        }))
    }

    pub fn prior(index: u32, path: impl Into<String>) -> Self {
        Expression::Prior(PriorNode {
            element: QueryElement::default(),
            index,
            property: PropertyNode {
                element: QueryElement::default(),
                stream: None,
                path: path.into(),
            },
        })
    }

    pub fn function(name: impl Into<String>, parameters: Vec<Expression>) -> Self {
        Expression::Function(Arc::new(FunctionCallNode {
            element: QueryElement::default(),
            name: name.into(),
            distinct: false,
            parameters,
        }))
    }

    pub fn function_distinct(name: impl Into<String>, parameters: Vec<Expression>) -> Self {
        Expression::Function(Arc::new(FunctionCallNode {
            element: QueryElement::default(),
            name: name.into(),
            distinct: true,
            parameters,
        }))
    }

    pub fn subquery(statement: StatementRaw) -> Self {
        Expression::Subquery(Arc::new(SubqueryNode {
            element: QueryElement::default(),
            statement,
        }))
    }

    pub fn math(operator: MathOperator, left: Expression, right: Expression) -> Self {
        Expression::Math {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(left: Expression, right: Expression) -> Self {
        Self::math(MathOperator::Add, left, right)
    }

    pub fn multiply(left: Expression, right: Expression) -> Self {
        Self::math(MathOperator::Multiply, left, right)
    }

    pub fn compare(left: Expression, operator: CompareOperator, right: Expression) -> Self {
        Expression::Compare {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expression: Expression) -> Self {
        Expression::Not(Box::new(expression))
    }

    /// Sets the source position of this node. Composite operators carry no
    /// position of their own and are returned unchanged.
    pub fn at(mut self, line: i32, column: i32) -> Self {
        let position = QueryElement::at(line, column);
        match &mut self {
            Expression::Constant(c) => c.element = position,
            Expression::Property(p) => p.element = position,
            Expression::StreamWildcard(w) => w.element = position,
            Expression::TableAccess(t) => Arc::make_mut(t).element = position,
            Expression::Substitution(s) => Arc::make_mut(s).element = position,
            Expression::Prior(p) => p.element = position,
            Expression::Function(f) => Arc::make_mut(f).element = position,
            Expression::Subquery(s) => Arc::make_mut(s).element = position,
            Expression::Math { .. }
            | Expression::Compare { .. }
            | Expression::And(..)
            | Expression::Or(..)
            | Expression::Not(_) => {}
        }
        self
    }

    /// Source position of this node, if the parser recorded one.
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            Expression::Constant(c) => c.element.query_context_start_index,
            Expression::Property(p) => p.element.query_context_start_index,
            Expression::StreamWildcard(w) => w.element.query_context_start_index,
            Expression::TableAccess(t) => t.element.query_context_start_index,
            Expression::Substitution(s) => s.element.query_context_start_index,
            Expression::Prior(p) => p.element.query_context_start_index,
            Expression::Function(f) => f.element.query_context_start_index,
            Expression::Subquery(s) => s.element.query_context_start_index,
            Expression::Math { left, .. } | Expression::Compare { left, .. } => left.position(),
            Expression::And(left, _) | Expression::Or(left, _) => left.position(),
            Expression::Not(inner) => inner.position(),
        }
    }
}
