use std::collections::BTreeSet;

use interfacer_core::model::{tokens_implement, MethodToken};

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn subset<'a>(&mut self, universe: &'a [MethodToken], percent: u64) -> Vec<MethodToken> {
        universe.iter().filter(|_| self.next() % 100 < percent).cloned().collect()
    }
}

fn universe() -> Vec<MethodToken> {
    let types = ["int", "string", "error", "*example.com/p.T"];
    let mut tokens = Vec::new();
    for name in ["Close", "Get", "GetAll", "Put", "Reset"] {
        tokens.push(MethodToken::new(name, &[], &[]));
        for ty in types {
            tokens.push(MethodToken::new(name, &[ty.to_string()], &[]));
            tokens.push(MethodToken::new(name, &[], &[ty.to_string()]));
        }
    }
    tokens.sort();
    tokens.dedup();
    tokens
}

fn brute_force(structure: &[MethodToken], interface: &[MethodToken], excluded: &BTreeSet<MethodToken>) -> bool {
    interface.iter().filter(|t| !excluded.contains(*t)).all(|t| structure.contains(t))
}

#[test]
fn sorted_merge_agrees_with_brute_force_containment() {
    let universe = universe();
    let mut rng = Lcg(0x5eed);
    let mut positives = 0;
    for round in 0..2000 {
        let structure = rng.subset(&universe, 70);
        let interface = rng.subset(&universe, if round % 2 == 0 { 8 } else { 25 });
        let excluded: BTreeSet<MethodToken> =
            rng.subset(&interface, if round % 3 == 0 { 0 } else { 40 }).into_iter().collect();

        let expected = brute_force(&structure, &interface, &excluded);
        assert_eq!(
            tokens_implement(&structure, &interface, &excluded),
            expected,
            "round {round}: struct={structure:?} interface={interface:?} excluded={excluded:?}"
        );
        if expected {
            positives += 1;
        }
    }
    assert!(positives > 50, "generator should produce matching pairs, got {positives}");
}

#[test]
fn empty_interface_is_implemented_by_everything() {
    let universe = universe();
    assert!(tokens_implement(&[], &[], &BTreeSet::new()));
    assert!(tokens_implement(&universe, &[], &BTreeSet::new()));
}

#[test]
fn excluded_tokens_past_the_struct_end_are_skipped() {
    let a = MethodToken::new("A", &[], &[]);
    let z = MethodToken::new("Z", &[], &[]);
    let interface = vec![a.clone(), z.clone()];

    assert!(!tokens_implement(&[a.clone()], &interface, &BTreeSet::new()));
    let excluded: BTreeSet<MethodToken> = [z].into_iter().collect();
    assert!(tokens_implement(&[a], &interface, &excluded));
    assert!(!tokens_implement(&[], &interface, &excluded));
}

#[test]
fn same_name_with_different_signature_does_not_match() {
    let wanted = MethodToken::new("Get", &["string".to_string()], &["error".to_string()]);
    let provided = MethodToken::new("Get", &["int".to_string()], &["error".to_string()]);
    assert!(!tokens_implement(&[provided], &[wanted], &BTreeSet::new()));
}
