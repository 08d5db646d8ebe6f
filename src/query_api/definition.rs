// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute types known to the compiler.
///
/// Upper-case variant names follow the engine's query API; configuration files
/// use the lower-case spelling (`"int"`, `"string"`, ...).
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    STRING,
    INT,
    LONG,
    FLOAT,
    DOUBLE,
    #[serde(alias = "boolean")]
    BOOL,
    BYTES,
    OBJECT,
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::INT | Type::LONG | Type::FLOAT | Type::DOUBLE)
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            Type::INT => Some(0),
            Type::LONG => Some(1),
            Type::FLOAT => Some(2),
            Type::DOUBLE => Some(3),
            _ => None,
        }
    }

    /// Result type of an arithmetic operation over `self` and `other`, or
    /// `None` when either side is not numeric.
    pub fn widen(&self, other: Type) -> Option<Type> {
        let (a, b) = (self.numeric_rank()?, other.numeric_rank()?);
        Some(if a >= b { *self } else { other })
    }

    /// Whether values of `self` may be compared with values of `other`.
    pub fn is_comparable_to(&self, other: Type) -> bool {
        *self == other
            || (self.is_numeric() && other.is_numeric())
            || *self == Type::OBJECT
            || other == Type::OBJECT
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::STRING => "string",
            Type::INT => "int",
            Type::LONG => "long",
            Type::FLOAT => "float",
            Type::DOUBLE => "double",
            Type::BOOL => "bool",
            Type::BYTES => "bytes",
            Type::OBJECT => "object",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named, typed attribute (table column, script parameter, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: Type,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attribute_type: Type) -> Self {
        Attribute {
            name: name.into(),
            attribute_type,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_type(&self) -> &Type {
        &self.attribute_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_numeric() {
        assert_eq!(Type::INT.widen(Type::LONG), Some(Type::LONG));
        assert_eq!(Type::DOUBLE.widen(Type::INT), Some(Type::DOUBLE));
        assert_eq!(Type::FLOAT.widen(Type::FLOAT), Some(Type::FLOAT));
        assert_eq!(Type::STRING.widen(Type::INT), None);
    }

    #[test]
    fn test_type_from_config_name() {
        let t: Type = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(t, Type::BOOL);
        let t: Type = serde_json::from_str("\"long\"").unwrap();
        assert_eq!(t, Type::LONG);
    }
}
