//! Rule Set - compiled rules bound to their destinations

use std::sync::Arc;

use contracts::{Config, ContractError, RuleConfig};
use query::Query;
use tracing::{debug, info, instrument};

use crate::destination::Destination;
use crate::registry::{Collaborators, DestinationRegistry};

/// One rule ready for evaluation
#[derive(Debug)]
pub struct CompiledRule {
    name: String,
    description: String,
    query: Query,
    destinations: Vec<Arc<Destination>>,
}

impl CompiledRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Bound destinations, in configured order
    pub fn destinations(&self) -> &[Arc<Destination>] {
        &self.destinations
    }
}

/// Ordered list of compiled rules
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Build the registry from `config.destinations`, then compile and bind
    /// `config.rules` against it
    pub fn build(config: &Config, collaborators: &Collaborators) -> Result<Self, ContractError> {
        let registry = DestinationRegistry::build(&config.destinations, collaborators)?;
        Self::compile(&config.rules, &registry)
    }

    /// Compile every rule's match expression and resolve its destination ids
    ///
    /// # Errors
    /// - empty match expression: `ConfigValidation`
    /// - expression that fails to compile: `QueryCompile`
    /// - destination id missing from the registry: `ConfigValidation`
    ///
    /// Every error names the rule and its index.
    #[instrument(name = "rule_set_compile", skip_all, fields(rules = configs.len()))]
    pub fn compile(configs: &[RuleConfig], registry: &DestinationRegistry) -> Result<Self, ContractError> {
        let mut rules = Vec::with_capacity(configs.len());

        for (idx, config) in configs.iter().enumerate() {
            if config.match_expression.trim().is_empty() {
                return Err(ContractError::config_validation(
                    format!("rule[{idx}].match_expression"),
                    format!("match_expression not defined for rule name={:?} idx={idx}", config.name),
                ));
            }

            let query = Query::compile(&config.match_expression)
                .map_err(|e| ContractError::query_compile(&config.name, idx, e.to_string()))?;

            let destinations = config
                .destinations
                .iter()
                .map(|id| {
                    registry.get(id).ok_or_else(|| {
                        ContractError::config_validation(
                            format!("rule[{idx}].destinations"),
                            format!("unknown destination {id:?} for rule name={:?} idx={idx}", config.name),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            debug!(
                rule = %config.name,
                rule_idx = idx,
                destinations = destinations.len(),
                "Compiled rule"
            );
            rules.push(CompiledRule {
                name: config.name.clone(),
                description: config.description.clone(),
                query,
                destinations,
            });
        }

        info!(rules = rules.len(), "Rule set compiled");
        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&CompiledRule> {
        self.rules.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
