// SPDX-License-Identifier: MIT OR Apache-2.0

//! Element trees as events.
//!
//! A scalar property reads the attribute of that name, falling back to the
//! text of the first child element of that name. Text is converted to the
//! declared property type; text that does not parse reads as absent. A
//! fragment property navigates to the first child element of that name.

use super::event_bean::{EventBean, Representation, Underlying, UnderlyingRef};
use super::event_type::EventType;
use super::property::EventPropertyGetter;
use super::value::AttributeValue;
use crate::query_api::definition::Type;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Arc<XmlNode>>,
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        XmlNode {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn first_child(&self, name: &str) -> Option<&Arc<XmlNode>> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl From<XmlNode> for AttributeValue {
    fn from(node: XmlNode) -> Self {
        AttributeValue::Node(Arc::new(node))
    }
}

fn parse_text(text: &str, property_type: Type) -> AttributeValue {
    let text = text.trim();
    let parsed = match property_type {
        Type::STRING | Type::OBJECT => Some(AttributeValue::String(text.to_string())),
        Type::INT => text.parse().ok().map(AttributeValue::Int),
        Type::LONG => text.parse().ok().map(AttributeValue::Long),
        Type::FLOAT => text.parse().ok().map(AttributeValue::Float),
        Type::DOUBLE => text.parse().ok().map(AttributeValue::Double),
        Type::BOOL => text.parse().ok().map(AttributeValue::Bool),
        Type::BYTES => Some(AttributeValue::Bytes(text.as_bytes().to_vec())),
    };
    parsed.unwrap_or_default()
}

/// Reads a scalar property (attribute or child text) or a fragment property
/// (child element) of a tree-backed event.
#[derive(Debug)]
pub struct XmlPropertyGetter {
    name: String,
    property_type: Type,
    fragment_type: Option<Arc<EventType>>,
}

impl XmlPropertyGetter {
    pub fn new(
        name: impl Into<String>,
        property_type: Type,
        fragment_type: Option<Arc<EventType>>,
    ) -> Self {
        XmlPropertyGetter {
            name: name.into(),
            property_type,
            fragment_type,
        }
    }

    fn node<'a>(&self, underlying: UnderlyingRef<'a>) -> Option<&'a XmlNode> {
        match underlying {
            UnderlyingRef::Xml(node) => Some(node),
            _ => None,
        }
    }
}

impl EventPropertyGetter for XmlPropertyGetter {
    fn representation(&self) -> Representation {
        Representation::Xml
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        let Some(node) = self.node(underlying) else {
            return AttributeValue::Null;
        };
        if self.fragment_type.is_some() {
            return node
                .first_child(&self.name)
                .map(|child| AttributeValue::Node(Arc::clone(child)))
                .unwrap_or_default();
        }
        if let Some(value) = node.get_attribute(&self.name) {
            return parse_text(value, self.property_type);
        }
        node.first_child(&self.name)
            .and_then(|child| child.text.as_deref())
            .map(|text| parse_text(text, self.property_type))
            .unwrap_or_default()
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        let fragment_type = self.fragment_type.as_ref()?;
        let child = self.node(underlying)?.first_child(&self.name)?;
        Some(Arc::new(EventBean::wrap(
            Arc::clone(fragment_type),
            Underlying::Xml(Arc::clone(child)),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_then_child_text() {
        let node = XmlNode::new("event")
            .attribute("myInt", "3")
            .child(XmlNode::new("myString").text("abc"));
        let int_getter = XmlPropertyGetter::new("myInt", Type::INT, None);
        let string_getter = XmlPropertyGetter::new("myString", Type::STRING, None);
        assert_eq!(
            int_getter.get_underlying(UnderlyingRef::Xml(&node)),
            AttributeValue::Int(3)
        );
        assert_eq!(
            string_getter.get_underlying(UnderlyingRef::Xml(&node)),
            AttributeValue::from("abc")
        );
    }

    #[test]
    fn test_unparsable_text_is_absent() {
        let node = XmlNode::new("event").attribute("myInt", "three");
        let getter = XmlPropertyGetter::new("myInt", Type::INT, None);
        assert!(getter.get_underlying(UnderlyingRef::Xml(&node)).is_null());
        assert!(!getter.is_underlying_exists(UnderlyingRef::Xml(&node)));
    }
}
