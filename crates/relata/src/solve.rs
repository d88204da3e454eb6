//! One-call query entry point.

use relata_config::QueryConfig;
use relata_core::Var;
use relata_solver::{GoalRef, Query, Result, Solution};

/// File read by [`run_query`] when present in the working directory.
pub const CONFIG_FILE: &str = "relata.toml";

/// Solves `goal` and collects every solution projected onto `vars`.
///
/// Configuration comes from [`CONFIG_FILE`] if it can be loaded, otherwise
/// the defaults apply.
pub fn run_query(goal: GoalRef, vars: impl IntoIterator<Item = Var>) -> Result<Vec<Solution>> {
    let config = QueryConfig::load(CONFIG_FILE).unwrap_or_default();
    run_query_with(goal, vars, config)
}

/// Like [`run_query`] with an explicit configuration.
pub fn run_query_with(
    goal: GoalRef,
    vars: impl IntoIterator<Item = Var>,
    config: QueryConfig,
) -> Result<Vec<Solution>> {
    #[cfg(feature = "console")]
    crate::console::init();

    let query = Query::builder(goal).project(vars).config(config).build()?;
    query.solutions().collect()
}
