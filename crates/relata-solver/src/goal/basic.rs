//! Primitive goals.

use std::fmt;
use std::sync::Arc;

use relata_core::{
    keys, unify, Constraint, Context, Distinct, HookPayload, InDomain, Neq, NotIn, Term, TermSet,
    Var,
};

use super::{collect_vars, CtxSized, Goal, GoalRef, GoalVars, SizeBound, Vared};
use crate::stream::Stream;

/// Always holds, once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Succeed;

impl Goal for Succeed {
    fn apply(&self, ctx: Context) -> Stream {
        Stream::unit(ctx)
    }

    fn name(&self) -> &str {
        "succeed"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        Some(self)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }
}

impl Vared for Succeed {
    fn vars(&self) -> GoalVars {
        GoalVars::new()
    }
}

impl CtxSized for Succeed {
    fn ctx_size(&self, _ctx: &Context) -> SizeBound {
        SizeBound::Exact(1)
    }
}

/// Never holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fail;

impl Goal for Fail {
    fn apply(&self, _ctx: Context) -> Stream {
        Stream::Empty
    }

    fn name(&self) -> &str {
        "fail"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        Some(self)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }
}

impl Vared for Fail {
    fn vars(&self) -> GoalVars {
        GoalVars::new()
    }
}

impl CtxSized for Fail {
    fn ctx_size(&self, _ctx: &Context) -> SizeBound {
        SizeBound::Exact(0)
    }
}

/// `left = right`.
#[derive(Debug, Clone)]
pub struct Eq {
    left: Term,
    right: Term,
}

impl Eq {
    pub fn new(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Goal for Eq {
    fn apply(&self, ctx: Context) -> Stream {
        match ctx.try_unify(&self.left, &self.right) {
            Ok(Some(next)) => Stream::unit(next),
            Ok(None) => Stream::Empty,
            Err(err) => Stream::abort(err.into()),
        }
    }

    fn name(&self) -> &str {
        "eq"
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        Some(self)
    }

    fn as_ctx_sized(&self) -> Option<&dyn CtxSized> {
        Some(self)
    }
}

impl Vared for Eq {
    fn vars(&self) -> GoalVars {
        let mut vars = GoalVars::new();
        collect_vars(&mut vars, [&self.left, &self.right]);
        vars
    }
}

impl CtxSized for Eq {
    fn ctx_size(&self, ctx: &Context) -> SizeBound {
        // Plain term unification: no hooks, no propagation.
        match unify(ctx.substitution(), &self.left, &self.right) {
            Some(_) => SizeBound::AtMost(1),
            None => SizeBound::Exact(0),
        }
    }
}

type FreshBody = dyn Fn(&[Var]) -> GoalRef + Send + Sync;

/// Introduces fresh variables and runs the goal built from them.
///
/// The body runs behind a suspension, so recursive relations written with
/// `fresh` never loop eagerly.
#[derive(Clone)]
pub struct Fresh {
    count: usize,
    body: Arc<FreshBody>,
}

impl Fresh {
    pub fn new(count: usize, body: impl Fn(&[Var]) -> GoalRef + Send + Sync + 'static) -> Self {
        Self {
            count,
            body: Arc::new(body),
        }
    }
}

impl Goal for Fresh {
    fn apply(&self, ctx: Context) -> Stream {
        let vars = Var::fresh_n(self.count);
        ctx.fire(keys::VARS_FRESH, &HookPayload::Fresh(&vars));
        let body = Arc::clone(&self.body);
        Stream::suspend(move || body(vars.as_slice()).apply(ctx))
    }

    fn name(&self) -> &str {
        "fresh"
    }
}

impl fmt::Debug for Fresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fresh").field("count", &self.count).finish()
    }
}

type DelayBody = dyn Fn() -> GoalRef + Send + Sync;

/// Builds its goal only when forced. The building block of recursion.
#[derive(Clone)]
pub struct Delay {
    body: Arc<DelayBody>,
}

impl Delay {
    pub fn new(body: impl Fn() -> GoalRef + Send + Sync + 'static) -> Self {
        Self {
            body: Arc::new(body),
        }
    }
}

impl Goal for Delay {
    fn apply(&self, ctx: Context) -> Stream {
        let body = Arc::clone(&self.body);
        Stream::suspend(move || body().apply(ctx))
    }

    fn name(&self) -> &str {
        "delay"
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Delay(..)")
    }
}

/// Attaches a constraint and checks it once.
#[derive(Debug, Clone)]
pub struct Constrain {
    constraint: Arc<dyn Constraint>,
}

impl Constrain {
    pub fn new(constraint: Arc<dyn Constraint>) -> Self {
        Self { constraint }
    }

    pub fn constraint(&self) -> &Arc<dyn Constraint> {
        &self.constraint
    }
}

impl Goal for Constrain {
    fn apply(&self, ctx: Context) -> Stream {
        match ctx.constrain(Arc::clone(&self.constraint)) {
            Some(next) => Stream::unit(next),
            None => Stream::Empty,
        }
    }

    fn name(&self) -> &str {
        self.constraint.name()
    }

    fn as_vared(&self) -> Option<&dyn Vared> {
        Some(self)
    }
}

impl Vared for Constrain {
    fn vars(&self) -> GoalVars {
        self.constraint.vars().into_iter().collect()
    }
}

pub fn succeed() -> GoalRef {
    Arc::new(Succeed)
}

pub fn fail() -> GoalRef {
    Arc::new(Fail)
}

pub fn eq(left: impl Into<Term>, right: impl Into<Term>) -> GoalRef {
    Arc::new(Eq::new(left, right))
}

/// Runs `body` with `count` fresh variables.
///
/// # Example
///
/// ```
/// use relata_core::{Context, Term};
/// use relata_solver::goal::{eq, fresh, Goal};
///
/// let goal = fresh(2, |v| {
///     let pair = Term::tuple(vec![Term::from(v[0]), Term::from(v[1])]);
///     eq(pair, Term::tuple(vec![Term::from(1), Term::from(2)]))
/// });
/// assert_eq!(goal.apply(Context::new()).contexts().count(), 1);
/// ```
pub fn fresh(count: usize, body: impl Fn(&[Var]) -> GoalRef + Send + Sync + 'static) -> GoalRef {
    Arc::new(Fresh::new(count, body))
}

pub fn delay(body: impl Fn() -> GoalRef + Send + Sync + 'static) -> GoalRef {
    Arc::new(Delay::new(body))
}

pub fn constrain(constraint: Arc<dyn Constraint>) -> GoalRef {
    Arc::new(Constrain::new(constraint))
}

pub fn neq(left: impl Into<Term>, right: impl Into<Term>) -> GoalRef {
    constrain(Arc::new(Neq::new(left, right)))
}

pub fn distinct<T: Into<Term>>(items: impl IntoIterator<Item = T>) -> GoalRef {
    constrain(Arc::new(Distinct::new(items)))
}

pub fn not_in<T: Into<Term>>(subject: impl Into<Term>, members: impl IntoIterator<Item = T>) -> GoalRef {
    constrain(Arc::new(NotIn::new(subject, members)))
}

pub fn in_domain(var: Var, domain: TermSet) -> GoalRef {
    constrain(Arc::new(InDomain::new(var, domain)))
}
