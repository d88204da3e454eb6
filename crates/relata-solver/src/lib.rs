//! Relata Solver Engine
//!
//! This crate provides the search side of the relational solver:
//! - Lazy, fair streams of contexts
//! - Goals, connectives and their planning capabilities
//! - Fact relations backed by pluggable sources
//! - The cardinality constraint
//! - The heuristic pipeline that plans conjunctions
//! - Queries, terminations and run statistics
//! - Observers for monitoring
//! - Configuration wiring (builder module)

pub mod builder;
pub mod constraint;
pub mod error;
pub mod event;
pub mod goal;
pub mod heuristic;
pub mod query;
pub mod relation;
pub mod scope;
pub mod statistics;
pub mod stream;
pub mod termination;

#[cfg(test)]
mod test_utils;

pub use builder::{PipelineBuilder, TerminationBuilder};
pub use constraint::Cardinality;
pub use error::{Result, SolverError};
pub use event::{CountingObserver, LoggingObserver};
pub use goal::{
    conj, constrain, delay, disj, distinct, eq, fail, fresh, in_domain, neq, not_in, succeed,
    Conj, CtxSized, Disj, Enumerable, Goal, GoalRef, GoalVars, SizeBound, Vared,
};
pub use heuristic::{
    CardinalityPass, ChainSharedVars, HeuristicPass, HeuristicPipeline, HeuristicPipelineBuilder,
    Plan, PlannedGoal, Planner, RandomizeOrder, Relevance,
};
pub use query::{Query, QueryBuilder, Solution, Solutions};
pub use relation::{FactSource, FactTable, Pattern, Relation, RelationGoal, Row, RowIter, RowOrder};
pub use scope::SearchScope;
pub use statistics::QueryStatistics;
pub use stream::{Fault, Step, Stream};
pub use termination::{
    OrTermination, SolutionCountTermination, StepCountTermination, Termination, TimeTermination,
};
