// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed Rust objects as events.
//!
//! A bean type is described once by a [`BeanDescriptor`]: one accessor closure
//! per property, written against the concrete Rust type. Getters hold the
//! accessor and call it through `Any` downcasting, so no per-instance lookup
//! happens when events are read.

use super::event_bean::{EventBean, Representation, UnderlyingRef};
use super::event_type::EventType;
use super::property::{value_to_fragment, EventPropertyGetter};
use super::value::AttributeValue;
use crate::query_api::definition::Type;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Implemented by Rust types that back bean events.
pub trait BeanObject: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn class_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Reads one property from an object; `None` when the object is not of the
/// type the accessor was written for.
pub type BeanAccessor = Arc<dyn Fn(&dyn Any) -> Option<AttributeValue> + Send + Sync>;

#[derive(Clone)]
pub struct BeanProperty {
    pub name: String,
    pub property_type: Type,
    pub fragment_type: Option<String>,
    pub accessor: BeanAccessor,
}

impl fmt::Debug for BeanProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanProperty")
            .field("name", &self.name)
            .field("property_type", &self.property_type)
            .field("fragment_type", &self.fragment_type)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BeanDescriptor {
    class_name: String,
    properties: Vec<BeanProperty>,
}

impl BeanDescriptor {
    pub fn new(class_name: impl Into<String>) -> Self {
        BeanDescriptor {
            class_name: class_name.into(),
            properties: Vec::new(),
        }
    }

    /// Describes `T` by its Rust type name.
    pub fn of<T: BeanObject>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    pub fn property<T, F>(mut self, name: impl Into<String>, property_type: Type, read: F) -> Self
    where
        T: BeanObject,
        F: Fn(&T) -> AttributeValue + Send + Sync + 'static,
    {
        self.properties.push(BeanProperty {
            name: name.into(),
            property_type,
            fragment_type: None,
            accessor: Self::accessor(read),
        });
        self
    }

    /// A property whose values are events of `fragment_type`, either typed
    /// events or raw values of that type's representation.
    pub fn fragment_property<T, F>(
        mut self,
        name: impl Into<String>,
        fragment_type: impl Into<String>,
        read: F,
    ) -> Self
    where
        T: BeanObject,
        F: Fn(&T) -> AttributeValue + Send + Sync + 'static,
    {
        self.properties.push(BeanProperty {
            name: name.into(),
            property_type: Type::OBJECT,
            fragment_type: Some(fragment_type.into()),
            accessor: Self::accessor(read),
        });
        self
    }

    fn accessor<T, F>(read: F) -> BeanAccessor
    where
        T: BeanObject,
        F: Fn(&T) -> AttributeValue + Send + Sync + 'static,
    {
        Arc::new(move |object: &dyn Any| object.downcast_ref::<T>().map(&read))
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn properties(&self) -> &[BeanProperty] {
        &self.properties
    }

    pub fn find(&self, name: &str) -> Option<&BeanProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Calls one registered accessor of a bean type.
pub struct BeanEventPropertyGetter {
    name: String,
    accessor: BeanAccessor,
    fragment_type: Option<Arc<EventType>>,
}

impl BeanEventPropertyGetter {
    pub fn new(property: &BeanProperty, fragment_type: Option<Arc<EventType>>) -> Self {
        BeanEventPropertyGetter {
            name: property.name.clone(),
            accessor: Arc::clone(&property.accessor),
            fragment_type,
        }
    }
}

impl fmt::Debug for BeanEventPropertyGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanEventPropertyGetter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl EventPropertyGetter for BeanEventPropertyGetter {
    fn representation(&self) -> Representation {
        Representation::Bean
    }

    fn get_underlying(&self, underlying: UnderlyingRef<'_>) -> AttributeValue {
        match underlying {
            UnderlyingRef::Bean(object) => (self.accessor)(object.as_any()).unwrap_or_default(),
            _ => AttributeValue::Null,
        }
    }

    fn get_underlying_fragment(&self, underlying: UnderlyingRef<'_>) -> Option<Arc<EventBean>> {
        let value = self.get_underlying(underlying);
        value_to_fragment(&value, self.fragment_type.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Quote {
        symbol: String,
    }

    impl BeanObject for Quote {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Other;

    impl BeanObject for Other {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_accessor_downcast() {
        let descriptor = BeanDescriptor::of::<Quote>().property(
            "symbol",
            Type::STRING,
            |q: &Quote| q.symbol.clone().into(),
        );
        let getter = BeanEventPropertyGetter::new(descriptor.find("symbol").unwrap(), None);
        let quote = Quote {
            symbol: "IBM".to_string(),
        };
        assert_eq!(
            getter.get_underlying(UnderlyingRef::Bean(&quote)),
            AttributeValue::from("IBM")
        );
        // wrong class reads as absent
        assert!(!getter.is_underlying_exists(UnderlyingRef::Bean(&Other)));
    }
}
