//! Tests for substitutions.

use super::*;

#[test]
fn test_walk_unbound_var_is_itself() {
    let x = Var::fresh();
    let s = Substitution::new();
    assert_eq!(s.walk_var(x), Term::from(x));
}

#[test]
fn test_walk_follows_chain() {
    let [x, y, z] = [Var::fresh(), Var::fresh(), Var::fresh()];
    let s = Substitution::new()
        .extend(x, Term::from(y))
        .and_then(|s| s.extend(y, Term::from(z)))
        .and_then(|s| s.extend(z, Term::from("end")))
        .unwrap();

    assert_eq!(s.walk_var(x), Term::from("end"));
    assert_eq!(s.len(), 3);
}

#[test]
fn test_walk_stops_at_compound() {
    let [x, y] = [Var::fresh(), Var::fresh()];
    let s = Substitution::new()
        .extend(x, Term::tuple(vec![Term::from(y)]))
        .and_then(|s| s.extend(y, Term::from(1)))
        .unwrap();

    assert_eq!(s.walk_var(x), Term::tuple(vec![Term::from(y)]));
    assert_eq!(s.resolve(&Term::from(x)), Term::tuple(vec![Term::from(1)]));
}

#[test]
fn test_extend_rejects_self_cycle() {
    let [x, y] = [Var::fresh(), Var::fresh()];
    let s = Substitution::new().extend(y, Term::from(x)).unwrap();

    assert!(s.extend(x, Term::from(x)).is_none());
    assert!(s.extend(x, Term::from(y)).is_none());
}

#[test]
fn test_extend_rejects_wildcard() {
    assert!(Substitution::new()
        .extend(Var::WILDCARD, Term::from(1))
        .is_none());
}

#[test]
fn test_extend_leaves_parent_untouched() {
    let x = Var::fresh();
    let parent = Substitution::new();
    let left = parent.extend(x, Term::from(1)).unwrap();
    let right = parent.extend(x, Term::from(2)).unwrap();

    assert_eq!(parent.walk_var(x), Term::from(x));
    assert_eq!(left.walk_var(x), Term::from(1));
    assert_eq!(right.walk_var(x), Term::from(2));
}

#[test]
fn test_resolve_leaves_cycle_unexpanded() {
    let x = Var::fresh();
    // x = f(x) can only be built with the occurs check disabled.
    let s = Substitution::new()
        .extend(x, Term::compound("f", vec![Term::from(x)]))
        .unwrap();

    let resolved = s.resolve(&Term::from(x));
    assert_eq!(resolved, Term::compound("f", vec![Term::from(x)]));
}

#[test]
fn test_occurs() {
    let [x, y] = [Var::fresh(), Var::fresh()];
    let s = Substitution::new()
        .extend(y, Term::compound("g", vec![Term::from(x)]))
        .unwrap();

    assert!(s.occurs(x, &Term::tuple(vec![Term::from(y)])));
    assert!(!s.occurs(y, &Term::from(x)));
}

#[test]
fn test_free_vars() {
    let [x, y, z] = [Var::fresh(), Var::fresh(), Var::fresh()];
    let s = Substitution::new().extend(x, Term::from(1)).unwrap();
    let t = Term::tuple(vec![Term::from(x), Term::from(y), Term::from(z)]);

    assert_eq!(s.free_vars(&t), vec![y, z]);
}

#[test]
fn test_condensed_chain_walks_to_same_term() {
    let [x, y, z] = [Var::fresh(), Var::fresh(), Var::fresh()];
    let s = Substitution::new()
        .extend(x, Term::from(y))
        .and_then(|s| s.extend(y, Term::from(z)))
        .and_then(|s| s.extend(z, Term::from("end")))
        .unwrap();

    let (value, chain) = s.walk_chain(&Term::from(x));
    assert_eq!(value, Term::from("end"));
    assert_eq!(chain, vec![x, y, z]);

    let condensed = s.condense(&chain, &value);
    assert_eq!(condensed.lookup(x), Some(&Term::from("end")));
    assert_eq!(condensed.lookup(y), Some(&Term::from("end")));
    for var in [x, y, z] {
        assert_eq!(condensed.walk_var(var), s.walk_var(var));
    }
    assert_eq!(s.lookup(x), Some(&Term::from(y)));
}

#[test]
fn test_walk_chain_of_unbound_var_is_empty() {
    let x = Var::fresh();
    let (value, chain) = Substitution::new().walk_chain(&Term::from(x));
    assert_eq!(value, Term::from(x));
    assert!(chain.is_empty());
}
