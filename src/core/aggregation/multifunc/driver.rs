// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-pass driver over the aggregation call sites of one statement.
//!
//! Call sites are collected while the statement is resolved. Then every call
//! site is declared, and only then is every call site validated. The order in
//! which call sites are visited within a pass is a parameter so that callers
//! (and tests) can permute it; results are always reported by call-site index.

use super::{
    AggregationKey, AggregationMultiFunctionForge, AggregationMultiFunctionHandler,
    AggregationParameter, DeclarationContext, ValidationContext,
};
use crate::core::config::PlugInAggregationMultiFunction;
use crate::core::event::event_type::EventType;
use crate::core::event::event_type_registry::EventTypeRegistry;
use crate::core::exception::ValidationError;
use crate::query_api::expression::FunctionCallNode;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    Collecting,
    Declared,
    Validated,
}

/// One aggregation function call in the statement text.
#[derive(Debug)]
pub struct AggregationCallSite {
    pub node: Arc<FunctionCallNode>,
    pub key: AggregationKey,
    pub forge: Arc<dyn AggregationMultiFunctionForge>,
    pub config: Arc<PlugInAggregationMultiFunction>,
    pub parameters: Vec<AggregationParameter>,
}

/// A validation failure and the call site that caused it.
#[derive(Debug)]
pub struct CallSiteError {
    pub call_site: usize,
    pub error: ValidationError,
}

#[derive(Debug)]
pub struct AggregationDriver {
    call_sites: Vec<AggregationCallSite>,
    phase: DriverPhase,
}

impl Default for AggregationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationDriver {
    pub fn new() -> Self {
        AggregationDriver {
            call_sites: Vec::new(),
            phase: DriverPhase::Collecting,
        }
    }

    /// Adds a call site and returns its index.
    pub fn add_call_site(&mut self, call_site: AggregationCallSite) -> Result<usize, ValidationError> {
        if self.phase != DriverPhase::Collecting {
            return Err(ValidationError::NotAllowed(
                "aggregation call sites cannot be added once declaration has started".to_string(),
            ));
        }
        self.call_sites.push(call_site);
        Ok(self.call_sites.len() - 1)
    }

    pub fn call_sites(&self) -> &[AggregationCallSite] {
        &self.call_sites
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn natural_order(&self) -> Vec<usize> {
        (0..self.call_sites.len()).collect()
    }

    fn check_order(&self, order: &[usize]) -> Result<(), ValidationError> {
        let mut seen = vec![false; self.call_sites.len()];
        for &index in order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ValidationError::NotAllowed(format!(
                        "visitation order {order:?} is not a permutation of {} call sites",
                        self.call_sites.len()
                    )))
                }
            }
        }
        if order.len() != self.call_sites.len() {
            return Err(ValidationError::NotAllowed(format!(
                "visitation order {order:?} is not a permutation of {} call sites",
                self.call_sites.len()
            )));
        }
        Ok(())
    }

    /// Declaration pass: one `add_aggregation_function` per call site.
    pub fn declare(&mut self, statement_name: &str, order: &[usize]) -> Result<(), ValidationError> {
        if self.phase != DriverPhase::Collecting {
            return Err(ValidationError::NotAllowed(
                "aggregation call sites were already declared".to_string(),
            ));
        }
        self.check_order(order)?;
        for &index in order {
            let site = &self.call_sites[index];
            site.forge.add_aggregation_function(&DeclarationContext {
                statement_name,
                function_name: &site.node.name,
                distinct: site.node.distinct,
                parameters: &site.node.parameters,
                config: &site.config,
            });
        }
        self.phase = DriverPhase::Declared;
        Ok(())
    }

    /// Validation pass: one `validate_get_handler` per call site. Handlers are
    /// returned by call-site index. The first rejection stops the pass.
    pub fn validate(
        &mut self,
        statement_name: &str,
        order: &[usize],
        stream_types: &[Arc<EventType>],
        event_types: &EventTypeRegistry,
    ) -> Result<Vec<AggregationMultiFunctionHandler>, CallSiteError> {
        if self.phase != DriverPhase::Declared {
            return Err(CallSiteError {
                call_site: 0,
                error: ValidationError::NotAllowed(
                    "every aggregation call site must be declared before validation".to_string(),
                ),
            });
        }
        self.check_order(order)
            .map_err(|error| CallSiteError { call_site: 0, error })?;

        let mut handlers: Vec<Option<AggregationMultiFunctionHandler>> =
            vec![None; self.call_sites.len()];
        for &index in order {
            let site = &self.call_sites[index];
            let handler = site
                .forge
                .validate_get_handler(&ValidationContext {
                    statement_name,
                    function_name: &site.node.name,
                    distinct: site.node.distinct,
                    parameters: &site.node.parameters,
                    parameter_types: &site.parameters,
                    stream_types,
                    event_types,
                    config: &site.config,
                })
                .map_err(|error| CallSiteError {
                    call_site: index,
                    error,
                })?;
            log::debug!(
                "Validated aggregation '{}' in statement '{}': {:?}",
                site.node.name,
                statement_name,
                handler.result_type()
            );
            handlers[index] = Some(handler);
        }
        self.phase = DriverPhase::Validated;
        Ok(handlers.into_iter().flatten().collect())
    }
}
