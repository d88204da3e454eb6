//! Property-based tests for unification using proptest.

use proptest::prelude::*;

use super::{unify, OccursChecked};
use crate::substitution::Substitution;
use crate::term::{Term, Var};

/// Term description, built into a real term against a per-case variable pool.
#[derive(Debug, Clone)]
enum TermDesc {
    Var(u8),
    Int(u8),
    Func(u8, Vec<TermDesc>),
}

fn arb_term_desc(max_depth: u32) -> BoxedStrategy<TermDesc> {
    if max_depth == 0 {
        prop_oneof![
            (0..4u8).prop_map(TermDesc::Var),
            (0..4u8).prop_map(TermDesc::Int),
        ]
        .boxed()
    } else {
        prop_oneof![
            3 => (0..4u8).prop_map(TermDesc::Var),
            3 => (0..4u8).prop_map(TermDesc::Int),
            2 => (0..2u8, proptest::collection::vec(arb_term_desc(max_depth - 1), 1..=2))
                .prop_map(|(f, args)| TermDesc::Func(f, args)),
        ]
        .boxed()
    }
}

fn build(desc: &TermDesc, pool: &[Var]) -> Term {
    match desc {
        TermDesc::Var(i) => Term::from(pool[*i as usize]),
        TermDesc::Int(i) => Term::from(i64::from(*i)),
        TermDesc::Func(f, args) => Term::compound(
            format!("f{}", f),
            args.iter().map(|a| build(a, pool)).collect(),
        ),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A successful unifier makes both sides resolve to the same term.
    #[test]
    fn prop_unifier_is_sound(a in arb_term_desc(3), b in arb_term_desc(3)) {
        let pool = Var::fresh_n(4);
        let (a, b) = (build(&a, &pool), build(&b, &pool));
        if let Some(OccursChecked(s)) = unify(OccursChecked(Substitution::new()), &a, &b) {
            prop_assert_eq!(s.resolve(&a), s.resolve(&b));
        }
    }

    /// Unification is symmetric in whether it succeeds.
    #[test]
    fn prop_unify_symmetric(a in arb_term_desc(3), b in arb_term_desc(3)) {
        let pool = Var::fresh_n(4);
        let (a, b) = (build(&a, &pool), build(&b, &pool));
        let ab = unify(OccursChecked(Substitution::new()), &a, &b).is_some();
        let ba = unify(OccursChecked(Substitution::new()), &b, &a).is_some();
        prop_assert_eq!(ab, ba);
    }

    /// Walking an already walked term changes nothing.
    #[test]
    fn prop_walk_idempotent(a in arb_term_desc(3), b in arb_term_desc(3)) {
        let pool = Var::fresh_n(4);
        let (a, b) = (build(&a, &pool), build(&b, &pool));
        if let Some(s) = unify(Substitution::new(), &a, &b) {
            for var in &pool {
                let once = s.walk_var(*var);
                prop_assert_eq!(s.walk(&once), once);
            }
        }
    }

    /// With the occurs check on, no variable resolves to a term containing itself.
    #[test]
    fn prop_no_cycles_with_occurs_check(
        pairs in proptest::collection::vec((arb_term_desc(2), arb_term_desc(2)), 1..4)
    ) {
        let pool = Var::fresh_n(4);
        let mut s = OccursChecked(Substitution::new());
        for (a, b) in &pairs {
            if let Some(next) = unify(s.clone(), &build(a, &pool), &build(b, &pool)) {
                s = next;
            }
        }
        for var in &pool {
            if s.0.is_bound(*var) {
                prop_assert!(!s.0.resolve(&Term::from(*var)).mentions(*var));
            }
        }
    }

    /// Unifying a term with itself always succeeds and binds nothing.
    #[test]
    fn prop_self_unify_is_noop(a in arb_term_desc(3)) {
        let pool = Var::fresh_n(4);
        let a = build(&a, &pool);
        let s = unify(Substitution::new(), &a, &a);
        prop_assert!(s.is_some_and(|s| s.is_empty()));
    }
}
