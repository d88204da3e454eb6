//! Goals backed by a relation.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use relata_core::{keys, Context, HookPayload, Term, TermSet, Var};
use tracing::trace;

use super::{Relation, Row, RowIter, RowOrder};
use crate::goal::{collect_vars, CtxSized, Enumerable, Goal, GoalRef, GoalVars, SizeBound, Vared};
use crate::stream::{Fault, Stream};

const ROW_EVENTS: &[&str] = &["relation", "row"];

/// `relation(args..)`: unifies `args` with each matching row.
///
/// Ground arguments narrow the rows requested from the source; the rest
/// are unified row by row. Each forced suspension scans rows until one
/// unifies or the rows run out, so rows that fail are skipped within a
/// single step.
#[derive(Debug, Clone)]
pub struct RelationGoal {
    relation: Relation,
    args: Arc<[Term]>,
    order: RowOrder,
}

impl RelationGoal {
    pub fn new(relation: Relation, args: Vec<Term>, order: RowOrder) -> Self {
        Self {
            relation,
            args: args.into(),
            order,
        }
    }

    pub fn order(&self) -> RowOrder {
        self.order
    }

    fn pattern(&self, ctx: &Context) -> Vec<Option<Term>> {
        self.args
            .iter()
            .map(|arg| {
                let value = ctx.resolve(arg);
                value.is_ground().then_some(value)
            })
            .collect()
    }
}

impl Goal for RelationGoal {
    fn apply(&self, ctx: Context) -> Stream {
        let goal = self.clone();
        Stream::suspend(move || goal.rows(ctx))
    }

    fn name(&self) -> &str {
        self.relation.name()
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        Some(self)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }

    fn as_enumerable(&self) -> Option<&dyn Enumerable> {
        Some(self)
    }
}

impl RelationGoal {
    fn rows(self, ctx: Context) -> Stream {
        let pattern = self.pattern(&ctx);
        let source = Arc::clone(self.relation.source());
        let broadcast = ctx.hooks().is_some_and(|h| h.is_observed(ROW_EVENTS));

        let (rows, shuffled_len): (RowIter, Option<usize>) = match self.order {
            RowOrder::Natural => (source.enumerate(&pattern), None),
            RowOrder::Shuffled { seed } => {
                let mut rows: Vec<Row> = source.enumerate(&pattern).collect();
                rows.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
                let len = rows.len();
                (Box::new(rows.into_iter()), Some(len))
            }
        };
        let total = match (broadcast, shuffled_len) {
            (false, _) => 0,
            (true, Some(len)) => len,
            (true, None) => source_total(source.size(&pattern)),
        };

        let name = self.relation.shared_name();
        let args = self.args;
        let answers = rows.enumerate().filter_map(move |(index, row)| {
            if row.len() != args.len() {
                return Some(Err(Fault::new(
                    format!("relation `{name}`"),
                    format!("row {index} has {} columns, expected {}", row.len(), args.len()),
                )));
            }
            let payload = HookPayload::Row {
                relation: &name,
                index,
                total,
            };
            match ctx.try_unify_all(&args, &row) {
                Err(err) => Some(Err(Fault::from(err))),
                Ok(Some(next)) => {
                    trace!(event = "row_succeeded", relation = %name, index);
                    if broadcast {
                        next.fire(keys::ROW_SUCCEEDED, &payload);
                    }
                    Some(Ok(next))
                }
                Ok(None) => {
                    trace!(event = "row_failed", relation = %name, index);
                    if broadcast {
                        ctx.fire(keys::ROW_FAILED, &payload);
                    }
                    None
                }
            }
        });
        Stream::from_results(answers)
    }
}

fn source_total(bound: SizeBound) -> usize {
    bound
        .upper()
        .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX))
}

impl Vared for RelationGoal {
    fn vars(&self) -> GoalVars {
        let mut vars = GoalVars::new();
        collect_vars(&mut vars, self.args.iter());
        vars
    }
}

impl CtxSized for RelationGoal {
    fn ctx_size(&self, ctx: &Context) -> SizeBound {
        let pattern: Vec<Option<Term>> = self.pattern(ctx);
        self.relation.source().size(&pattern)
    }
}

impl Enumerable for RelationGoal {
    fn relation(&self) -> &Relation {
        &self.relation
    }

    fn args(&self) -> &[Term] {
        &self.args
    }

    fn domain_of(&self, var: Var, ctx: &Context) -> Option<TermSet> {
        let target = Term::Var(var);
        let mut domain: Option<HashSet<Term>> = None;
        for (column, arg) in self.args.iter().enumerate() {
            if ctx.walk(arg) != target {
                continue;
            }
            let values = self.relation.source().column_values(column)?;
            domain = Some(match domain {
                None => values.iter().cloned().collect(),
                Some(acc) => acc.into_iter().filter(|v| values.contains(v)).collect(),
            });
        }
        domain.map(Arc::new)
    }

    fn with_order(&self, order: RowOrder) -> GoalRef {
        Arc::new(Self {
            order,
            ..self.clone()
        })
    }
}
