// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compile-time services shared by every statement of a process.
//!
//! Holds the event type registry (and its getter cache), variable and table
//! definitions, globally declared expressions and the aggregation
//! multi-function factories. All of it is read concurrently by statements
//! compiling in parallel; registration takes a write lock. Locks are unwrapped
//! under the same fail-fast poisoning policy as the event type registry.

use super::compiler_configuration::{CompilerConfiguration, PlugInAggregationMultiFunction};
use crate::core::aggregation::multifunc::collect::{self, CollectAggregationFactory};
use crate::core::aggregation::multifunc::{
    AggregationMultiFunctionFactory, AggregationMultiFunctionForge,
};
use crate::core::event::bean::BeanDescriptor;
use crate::core::event::event_type::EventType;
use crate::core::event::event_type_registry::EventTypeRegistry;
use crate::core::exception::{ConfigError, SymbolKind, ValidationError};
use crate::query_api::definition::{Attribute, Type};
use crate::query_api::statement::ExpressionDeclItem;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub variable_type: Type,
    pub constant: bool,
}

impl VariableDefinition {
    pub fn new(name: impl Into<String>, variable_type: Type) -> Self {
        VariableDefinition {
            name: name.into(),
            variable_type,
            constant: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<Attribute>,
    pub key_columns: Vec<String>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        TableDefinition {
            name: name.into(),
            columns: Vec::new(),
            key_columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, column_type: Type) -> Self {
        self.columns.push(Attribute::new(name, column_type));
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.key_columns.push(name.into());
        self
    }

    pub fn column_type(&self, name: &str) -> Option<Type> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.attribute_type)
    }
}

#[derive(Debug, Default)]
pub struct CompilerContext {
    event_types: EventTypeRegistry,
    variables: RwLock<HashMap<String, VariableDefinition>>,
    tables: RwLock<HashMap<String, Arc<TableDefinition>>>,
    declared_expressions: RwLock<HashMap<String, Arc<ExpressionDeclItem>>>,
    aggregation_factories: RwLock<HashMap<String, Box<dyn AggregationMultiFunctionFactory>>>,
    plug_in_functions: RwLock<HashMap<String, Arc<PlugInAggregationMultiFunction>>>,
    attach_statement_text: bool,
}

impl CompilerContext {
    /// Empty context with the built-in `window`, `first` and `last`
    /// aggregations registered.
    pub fn new() -> Self {
        let context = CompilerContext::default();
        context.add_aggregation_multi_function_factory(
            collect::COLLECT_FACTORY.to_string(),
            Box::new(CollectAggregationFactory),
        );
        if let Err(e) = context.add_plug_in_aggregation(collect::builtin_config()) {
            log::warn!("Built-in collect aggregations not registered: {e}");
        }
        context
    }

    pub fn from_configuration(config: &CompilerConfiguration) -> Result<Self, ConfigError> {
        let mut context = Self::new();
        context.attach_statement_text = config.byte_code.attach_statement_text;

        let types = config
            .event_types
            .iter()
            .map(|t| t.to_event_type())
            .collect::<Result<Vec<_>, _>>()?;
        context.event_types.register_all(types)?;

        for v in &config.variables {
            context.register_variable(VariableDefinition {
                name: v.name.clone(),
                variable_type: v.variable_type,
                constant: v.constant,
            })?;
        }
        for t in &config.tables {
            context.register_table(TableDefinition {
                name: t.name.clone(),
                columns: t.columns.clone(),
                key_columns: t.key_columns.clone(),
            })?;
        }
        for entry in &config.plug_in_aggregation_multi_functions {
            context.add_plug_in_aggregation(entry.clone())?;
        }
        Ok(context)
    }

    pub fn event_types(&self) -> &EventTypeRegistry {
        &self.event_types
    }

    pub fn attach_statement_text(&self) -> bool {
        self.attach_statement_text
    }

    pub fn set_attach_statement_text(&mut self, attach: bool) {
        self.attach_statement_text = attach;
    }

    pub fn register_event_type(&self, event_type: EventType) -> Result<Arc<EventType>, ConfigError> {
        self.event_types.register(event_type)
    }

    pub fn register_bean_type(
        &self,
        name: impl Into<String>,
        descriptor: BeanDescriptor,
    ) -> Result<Arc<EventType>, ConfigError> {
        self.event_types.register(EventType::bean(name, descriptor))
    }

    pub fn register_variable(&self, variable: VariableDefinition) -> Result<(), ConfigError> {
        let mut variables = self.variables.write().unwrap();
        if variables.contains_key(&variable.name) {
            return Err(ConfigError::Duplicate {
                kind: SymbolKind::Variable,
                name: variable.name,
            });
        }
        log::debug!("Registered variable '{}' of type {}", variable.name, variable.variable_type);
        variables.insert(variable.name.clone(), variable);
        Ok(())
    }

    pub fn register_table(&self, table: TableDefinition) -> Result<(), ConfigError> {
        for key in &table.key_columns {
            if table.column_type(key).is_none() {
                return Err(ConfigError::UnknownKeyColumn {
                    table: table.name.clone(),
                    column: key.clone(),
                });
            }
        }
        let mut tables = self.tables.write().unwrap();
        if tables.contains_key(&table.name) {
            return Err(ConfigError::Duplicate {
                kind: SymbolKind::Table,
                name: table.name,
            });
        }
        log::debug!("Registered table '{}'", table.name);
        tables.insert(table.name.clone(), Arc::new(table));
        Ok(())
    }

    /// Declares an expression visible to every statement. Statement-local
    /// declarations of the same name take precedence.
    pub fn register_declared_expression(&self, item: ExpressionDeclItem) {
        self.declared_expressions
            .write()
            .unwrap()
            .insert(item.name.clone(), Arc::new(item));
    }

    pub fn add_aggregation_multi_function_factory(
        &self,
        name: String,
        factory: Box<dyn AggregationMultiFunctionFactory>,
    ) {
        log::debug!("Registered aggregation multi-function factory '{name}' ({})", factory.name());
        self.aggregation_factories
            .write()
            .unwrap()
            .insert(name, factory);
    }

    /// Maps the entry's function names onto its factory. The factory may be
    /// added later; [`validate`](Self::validate) reports entries whose factory
    /// never was.
    pub fn add_plug_in_aggregation(
        &self,
        entry: PlugInAggregationMultiFunction,
    ) -> Result<(), ConfigError> {
        let entry = Arc::new(entry);
        let mut functions = self.plug_in_functions.write().unwrap();
        for name in &entry.function_names {
            if functions.contains_key(name) {
                return Err(ConfigError::DuplicateFunction(name.clone()));
            }
        }
        for name in &entry.function_names {
            functions.insert(name.clone(), Arc::clone(&entry));
        }
        Ok(())
    }

    /// Checks that every configured function family has a factory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let factories = self.aggregation_factories.read().unwrap();
        let functions = self.plug_in_functions.read().unwrap();
        for entry in functions.values() {
            if !factories.contains_key(&entry.factory) {
                return Err(ConfigError::UnknownFactory {
                    factory: entry.factory.clone(),
                    functions: entry.function_names.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<VariableDefinition> {
        self.variables.read().unwrap().get(name).cloned()
    }

    pub fn table(&self, name: &str) -> Option<Arc<TableDefinition>> {
        self.tables.read().unwrap().get(name).cloned()
    }

    pub fn declared_expression(&self, name: &str) -> Option<Arc<ExpressionDeclItem>> {
        self.declared_expressions.read().unwrap().get(name).cloned()
    }

    pub fn plug_in_function(&self, name: &str) -> Option<Arc<PlugInAggregationMultiFunction>> {
        self.plug_in_functions.read().unwrap().get(name).cloned()
    }

    pub fn create_forge(
        &self,
        entry: &PlugInAggregationMultiFunction,
    ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError> {
        // factory code runs without the lock held
        let factory = self
            .aggregation_factories
            .read()
            .unwrap()
            .get(&entry.factory)
            .map(|factory| factory.clone_box())
            .ok_or_else(|| ValidationError::unknown(SymbolKind::AggregationFactory, &entry.factory))?;
        factory.create_forge(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_functions_registered() {
        let context = CompilerContext::new();
        assert!(context.plug_in_function("window").is_some());
        assert!(context.plug_in_function("last").is_some());
        assert!(context.validate().is_ok());
    }

    #[test]
    fn test_duplicate_function_name() {
        let context = CompilerContext::new();
        let err = context
            .add_plug_in_aggregation(PlugInAggregationMultiFunction::new(["first"], "other"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFunction(name) if name == "first"));
    }

    #[test]
    fn test_missing_factory_reported() {
        let context = CompilerContext::new();
        context
            .add_plug_in_aggregation(PlugInAggregationMultiFunction::new(["f", "g"], "nope"))
            .unwrap();
        assert!(matches!(
            context.validate(),
            Err(ConfigError::UnknownFactory { factory, .. }) if factory == "nope"
        ));
    }

    /// Registers a second factory from inside `create_forge`.
    #[derive(Debug, Clone, Default)]
    struct RegisteringFactory {
        context: Arc<std::sync::OnceLock<std::sync::Weak<CompilerContext>>>,
    }

    impl AggregationMultiFunctionFactory for RegisteringFactory {
        fn name(&self) -> &'static str {
            "registering"
        }

        fn create_forge(
            &self,
            config: &PlugInAggregationMultiFunction,
        ) -> Result<Arc<dyn AggregationMultiFunctionForge>, ValidationError> {
            if let Some(context) = self.context.get().and_then(|weak| weak.upgrade()) {
                context.add_aggregation_multi_function_factory(
                    "late".to_string(),
                    Box::new(CollectAggregationFactory),
                );
            }
            CollectAggregationFactory.create_forge(config)
        }

        fn clone_box(&self) -> Box<dyn AggregationMultiFunctionFactory> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_factory_may_register_factories() {
        let context = Arc::new(CompilerContext::new());
        let factory = RegisteringFactory::default();
        factory.context.set(Arc::downgrade(&context)).unwrap();
        context.add_aggregation_multi_function_factory(
            "registering".to_string(),
            Box::new(factory),
        );
        let entry = PlugInAggregationMultiFunction::new(["reg"], "registering");

        assert!(context.create_forge(&entry).is_ok());
        let late = PlugInAggregationMultiFunction::new(["lt"], "late");
        assert!(context.create_forge(&late).is_ok());
    }
}
