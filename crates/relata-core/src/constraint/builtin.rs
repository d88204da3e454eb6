//! Built-in constraints.

use std::sync::Arc;

use crate::context::Context;
use crate::term::{Term, TermSet, Var};
use crate::unify::{unify, OccursChecked};

use super::{Constraint, Verdict};

/// Outcome of trying to make two terms equal in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Equality {
    /// They can never be equal on this branch.
    Never,
    /// They are already equal.
    Already,
    /// They would be equal under further bindings.
    Possible,
}

fn equality(ctx: &Context, a: &Term, b: &Term) -> Equality {
    let subst = ctx.substitution();
    let before = subst.len();
    let after = if ctx.occurs_check().is_enabled() {
        unify(OccursChecked(subst), a, b).map(|s| s.0.len())
    } else {
        unify(subst, a, b).map(|s| s.len())
    };
    match after {
        None => Equality::Never,
        Some(n) if n == before => Equality::Already,
        Some(_) => Equality::Possible,
    }
}

/// `left != right`, structurally.
#[derive(Debug, Clone)]
pub struct Neq {
    left: Term,
    right: Term,
}

impl Neq {
    pub fn new(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Constraint for Neq {
    fn name(&self) -> &str {
        "neq"
    }

    fn vars(&self) -> Vec<Var> {
        let mut vars = self.left.vars();
        for var in self.right.vars() {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars
    }

    fn evaluate(&self, ctx: &Context) -> Verdict {
        match equality(ctx, &self.left, &self.right) {
            Equality::Never => Verdict::Satisfied,
            Equality::Already => Verdict::Violated,
            Equality::Possible => Verdict::Pending,
        }
    }
}

/// All items pairwise different.
#[derive(Debug, Clone)]
pub struct Distinct {
    items: Vec<Term>,
}

impl Distinct {
    pub fn new<T: Into<Term>>(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[Term] {
        &self.items
    }
}

impl Constraint for Distinct {
    fn name(&self) -> &str {
        "distinct"
    }

    fn vars(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = Vec::new();
        for var in self.items.iter().flat_map(Term::vars) {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars
    }

    fn evaluate(&self, ctx: &Context) -> Verdict {
        let mut open = false;
        for (i, a) in self.items.iter().enumerate() {
            for b in &self.items[i + 1..] {
                match equality(ctx, a, b) {
                    Equality::Already => return Verdict::Violated,
                    Equality::Possible => open = true,
                    Equality::Never => {}
                }
            }
        }
        if open {
            Verdict::Pending
        } else {
            Verdict::Satisfied
        }
    }
}

/// `subject` differs from every member of a collection.
///
/// Members may be variables or values. Members that can no longer equal the
/// subject are dropped as the branch grows, so the constraint shrinks to
/// the members that still matter.
#[derive(Debug, Clone)]
pub struct NotIn {
    subject: Term,
    members: Vec<Term>,
}

impl NotIn {
    pub fn new<T: Into<Term>>(subject: impl Into<Term>, members: impl IntoIterator<Item = T>) -> Self {
        Self {
            subject: subject.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn members(&self) -> &[Term] {
        &self.members
    }

    /// Members that are ground values.
    pub fn values(&self) -> impl Iterator<Item = &Term> {
        self.members.iter().filter(|m| m.is_ground())
    }

    /// Members that still contain variables.
    pub fn open_members(&self) -> impl Iterator<Item = &Term> {
        self.members.iter().filter(|m| !m.is_ground())
    }

    /// Returns a copy excluding `extra` members as well.
    pub fn expand<T: Into<Term>>(&self, extra: impl IntoIterator<Item = T>) -> Self {
        let mut members = self.members.clone();
        for term in extra.into_iter().map(Into::into) {
            if !members.contains(&term) {
                members.push(term);
            }
        }
        Self {
            subject: self.subject.clone(),
            members,
        }
    }

    /// Returns a copy without `member`.
    pub fn contract(&self, member: &Term) -> Self {
        Self {
            subject: self.subject.clone(),
            members: self.members.iter().filter(|m| *m != member).cloned().collect(),
        }
    }

    /// Removes the ground members from a finite domain.
    pub fn domain_filter(&self, domain: &TermSet) -> TermSet {
        let filtered = domain
            .iter()
            .filter(|value| !self.values().any(|m| m == *value))
            .cloned()
            .collect();
        Arc::new(filtered)
    }
}

impl Constraint for NotIn {
    fn name(&self) -> &str {
        "not_in"
    }

    fn vars(&self) -> Vec<Var> {
        let mut vars = self.subject.vars();
        for var in self.members.iter().flat_map(Term::vars) {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars
    }

    fn evaluate(&self, ctx: &Context) -> Verdict {
        let mut remaining = Vec::with_capacity(self.members.len());
        for member in &self.members {
            match equality(ctx, &self.subject, member) {
                Equality::Already => return Verdict::Violated,
                Equality::Possible => remaining.push(member.clone()),
                Equality::Never => {}
            }
        }
        if remaining.is_empty() {
            Verdict::Satisfied
        } else if remaining.len() < self.members.len() {
            Verdict::Simplified(Arc::new(NotIn {
                subject: self.subject.clone(),
                members: remaining,
            }))
        } else {
            Verdict::Pending
        }
    }
}

/// `var` takes one of a finite set of ground values.
#[derive(Debug, Clone)]
pub struct InDomain {
    var: Var,
    domain: TermSet,
}

impl InDomain {
    pub fn new(var: Var, domain: TermSet) -> Self {
        Self { var, domain }
    }

    pub fn var(&self) -> Var {
        self.var
    }

    pub fn domain(&self) -> &TermSet {
        &self.domain
    }
}

impl Constraint for InDomain {
    fn name(&self) -> &str {
        "in_domain"
    }

    fn vars(&self) -> Vec<Var> {
        vec![self.var]
    }

    fn evaluate(&self, ctx: &Context) -> Verdict {
        let value = ctx.resolve(&Term::Var(self.var));
        if value.is_ground() {
            return if self.domain.contains(&value) {
                Verdict::Satisfied
            } else {
                Verdict::Violated
            };
        }
        if value.is_var() {
            return if self.domain.is_empty() {
                Verdict::Violated
            } else {
                Verdict::Pending
            };
        }
        // Partially bound compound: keep only the values it can still match.
        let matching: Vec<Term> = self
            .domain
            .iter()
            .filter(|candidate| equality(ctx, &value, candidate) != Equality::Never)
            .cloned()
            .collect();
        if matching.is_empty() {
            Verdict::Violated
        } else if matching.len() < self.domain.len() {
            Verdict::Simplified(Arc::new(InDomain {
                var: self.var,
                domain: Arc::new(matching.into_iter().collect()),
            }))
        } else {
            Verdict::Pending
        }
    }
}
