//! Relata - A Relational Solver in Rust
//!
//! Describe what holds with goals over logic variables, then ask for every
//! binding that makes it true. Relations run forward, backward or in any
//! mix of directions.
//!
//! # Example
//!
//! ```rust
//! use relata::prelude::*;
//!
//! let parent = Relation::facts(
//!     "parent",
//!     2,
//!     vec![
//!         vec![Term::from("ada"), Term::from("bea")],
//!         vec![Term::from("bea"), Term::from("cal")],
//!     ],
//! )
//! .unwrap();
//!
//! let [grandparent, middle] = [Var::fresh(), Var::fresh()];
//! let goal = conj(vec![
//!     parent.goal(vec![grandparent.into(), middle.into()]).unwrap(),
//!     parent.goal(vec![middle.into(), Term::from("cal")]).unwrap(),
//! ]);
//!
//! let solutions = run_query(goal, [grandparent]).unwrap();
//! assert_eq!(solutions.len(), 1);
//! assert_eq!(solutions[0].get(grandparent), Some(&Term::from("ada")));
//! ```

// Data model
pub use relata_core::{
    keys, BindHook, CondenseChains, Constraint, Context, HookPayload, HookRegistry, Observer,
    OccursCheck, Term, TermSet, Var, Verdict, WalkHook,
};

// Configuration
pub use relata_config::{
    ConfigError, EnvironmentMode, HeuristicConfig, QueryConfig, RandomizeOrderConfig,
    TerminationConfig,
};

// Search
pub use relata_solver::{
    conj, constrain, delay, disj, distinct, eq, fail, fresh, in_domain, neq, not_in, succeed,
    CountingObserver, FactSource, FactTable, Goal, GoalRef, HeuristicPass, HeuristicPipeline,
    LoggingObserver, Query, QueryBuilder, QueryStatistics, Relation, Result, RowOrder, SizeBound,
    Solution, SolverError, Termination,
};

pub use relata_core as core;
pub use relata_solver as solver;

#[cfg(feature = "console")]
pub mod console;

mod solve;
pub use solve::{run_query, run_query_with, CONFIG_FILE};

pub mod prelude {
    pub use super::{conj, delay, disj, eq, fail, fresh, neq, succeed};
    pub use super::{run_query, Query, QueryConfig, Relation, Solution};
    pub use super::{GoalRef, Term, Var};
}
