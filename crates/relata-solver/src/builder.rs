//! Builder module for constructing solver components from configuration
//!
//! This module provides the wiring between configuration types and
//! the actual search machinery.

use relata_config::{HeuristicConfig, QueryConfig};
use relata_core::OccursCheck;
use tracing::debug;

use crate::heuristic::HeuristicPipeline;
use crate::termination::{
    OrTermination, SolutionCountTermination, StepCountTermination, Termination, TimeTermination,
};

/// Builder for constructing heuristic pipelines from configuration.
pub struct PipelineBuilder;

impl PipelineBuilder {
    /// Builds the planning pipeline of a query.
    ///
    /// A missing `heuristics` list selects the default pipeline; an empty
    /// one disables planning.
    pub fn build(config: &QueryConfig) -> HeuristicPipeline {
        let passes = config
            .heuristics
            .clone()
            .unwrap_or_else(HeuristicConfig::default_pipeline);

        let mut builder = HeuristicPipeline::builder();
        for pass in &passes {
            builder = match pass {
                HeuristicConfig::ChainSharedVars => builder.chain_shared_vars(),
                HeuristicConfig::Relevance => builder.relevance(),
                HeuristicConfig::Cardinality => builder.cardinality(),
                HeuristicConfig::RandomizeOrder(randomize) => {
                    let seed = randomize.seed.or_else(|| config.effective_seed());
                    if seed.is_none() {
                        debug!(event = "randomize_from_entropy");
                    }
                    builder.randomize_order(seed)
                }
            };
        }
        builder.build()
    }
}

/// Builder for constructing terminations from configuration.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// Builds the termination of a query, or `None` if it runs to exhaustion.
    pub fn build(config: &QueryConfig) -> Option<Box<dyn Termination>> {
        let termination = config.termination.as_ref()?;
        let mut any = OrTermination::default();

        if let Some(limit) = termination.solution_limit {
            any.push(Box::new(SolutionCountTermination::new(limit)));
        }
        if let Some(limit) = termination.step_limit {
            any.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = termination.time_limit() {
            any.push(Box::new(TimeTermination::new(limit)));
        }

        if any.is_empty() {
            None
        } else {
            Some(Box::new(any))
        }
    }
}

/// Occurs-check setting of a query.
pub fn occurs_check(config: &QueryConfig) -> OccursCheck {
    OccursCheck::from(config.occurs_check)
}
