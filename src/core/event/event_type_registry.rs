// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide event type registry and compiled getter cache.
//!
//! ## Lock Poisoning Strategy
//!
//! All lock operations use `.unwrap()` which panics if a lock is poisoned. A
//! poisoned lock means a thread panicked while holding it; the registry is
//! then in an unknown state and compiling further statements against it
//! could produce getters for half-registered types. Failing fast is the
//! intended behavior.
//!
//! ## Getter Cache
//!
//! Getters are built on first use per `(event type, property path)` and never
//! mutated afterwards. Construction happens outside the lock; when two
//! threads build the same getter concurrently the first inserted entry wins
//! and the other one is dropped.

use super::avro::RecordSchema;
use super::event_type::{EventType, RepresentationMetadata};
use super::property::{build_getter, CompiledProperty, EventTypeResolver};
use crate::core::exception::{ConfigError, SymbolKind, ValidationError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct EventTypeRegistry {
    types: RwLock<HashMap<String, Arc<EventType>>>,
    getters: RwLock<HashMap<(String, String), CompiledProperty>>,
}

impl EventTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event_type: EventType) -> Result<Arc<EventType>, ConfigError> {
        let name = event_type.name().to_string();
        self.register_all(vec![event_type])?;
        self.get(&name)
            .ok_or(ConfigError::DuplicateEventType(name))
    }

    /// Registers a batch of types atomically. Fragment references may point at
    /// already registered types or at other types of the batch; the record
    /// schemas nested in schema-tagged types are registered as types of their
    /// own. A type of that name that already exists must carry the same
    /// schema.
    pub fn register_all(&self, batch: Vec<EventType>) -> Result<(), ConfigError> {
        let mut types = self.types.write().unwrap();

        let mut incoming: Vec<EventType> = Vec::with_capacity(batch.len());
        let mut names: HashSet<String> = HashSet::new();
        for event_type in batch {
            if types.contains_key(event_type.name()) || !names.insert(event_type.name().to_string())
            {
                return Err(ConfigError::DuplicateEventType(event_type.name().to_string()));
            }
            incoming.push(event_type);
        }

        let nested: Vec<(String, Arc<RecordSchema>)> = incoming
            .iter()
            .filter_map(|t| match t.metadata() {
                RepresentationMetadata::Avro(schema) => Some(
                    schema
                        .nested_records()
                        .into_iter()
                        .map(|nested| (t.name().to_string(), nested)),
                ),
                _ => None,
            })
            .flatten()
            .collect();
        for (owner, schema) in nested {
            let existing = types
                .get(&schema.name)
                .map(|t| t.metadata())
                .or_else(|| {
                    incoming
                        .iter()
                        .find(|t| t.name() == schema.name)
                        .map(|t| t.metadata())
                });
            match existing {
                None => {
                    log::debug!("Registering nested record schema '{}' as event type", schema.name);
                    names.insert(schema.name.clone());
                    incoming.push(EventType::avro(schema));
                }
                Some(RepresentationMetadata::Avro(registered)) if **registered == *schema => {}
                Some(_) => {
                    return Err(ConfigError::NestedSchemaConflict {
                        event_type: owner,
                        schema: schema.name.clone(),
                    })
                }
            }
        }

        for event_type in &incoming {
            for (property, fragment_type) in event_type.fragment_type_names() {
                if !types.contains_key(fragment_type) && !names.contains(fragment_type) {
                    return Err(ConfigError::UnknownFragmentType {
                        event_type: event_type.name().to_string(),
                        property: property.to_string(),
                        fragment_type: fragment_type.to_string(),
                    });
                }
            }
        }

        for event_type in incoming {
            log::debug!(
                "Registered {} event type '{}' with {} properties",
                event_type.representation(),
                event_type.name(),
                event_type.properties().len()
            );
            types.insert(event_type.name().to_string(), Arc::new(event_type));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<EventType>> {
        self.types.read().unwrap().get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<EventType>, ValidationError> {
        self.get(name)
            .ok_or_else(|| ValidationError::unknown(SymbolKind::EventType, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.read().unwrap().contains_key(name)
    }

    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Cached getter for `path` on `event_type`, built on first use.
    pub fn compiled_property(
        &self,
        event_type: &EventType,
        path: &str,
    ) -> Result<CompiledProperty, ValidationError> {
        let key = (event_type.name().to_string(), path.to_string());
        if let Some(found) = self.getters.read().unwrap().get(&key) {
            log::trace!("Getter cache hit for {}.{}", key.0, key.1);
            return Ok(found.clone());
        }

        let built = build_getter(event_type, path, self)?;
        log::debug!("Built getter for {}.{}: {:?}", key.0, key.1, built.getter);

        let mut getters = self.getters.write().unwrap();
        Ok(getters.entry(key).or_insert(built).clone())
    }

    pub fn cached_getter_count(&self) -> usize {
        self.getters.read().unwrap().len()
    }
}

impl EventTypeResolver for EventTypeRegistry {
    fn resolve_event_type(&self, name: &str) -> Option<Arc<EventType>> {
        self.get(name)
    }
}
