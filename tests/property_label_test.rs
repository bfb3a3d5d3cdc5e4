use proptest::prelude::*;
use serde_json::{json, Value};

use vaspflow::domain::models::{ConvergenceRetry, RunTags, CONVERGENCE_GUARD_TAG};
use vaspflow::services::{derive_label, slugify};

const ELEMENTS: [&str; 6] = ["Fe", "O", "Na", "Cl", "Li", "Mn"];

fn structure(species: &[&str]) -> Value {
    json!({
        "sites": species
            .iter()
            .map(|e| json!({ "species": [{ "element": e }] }))
            .collect::<Vec<_>>()
    })
}

fn site_list() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(ELEMENTS.to_vec()), 1..24)
}

proptest! {
    /// Property: the label ignores site order
    #[test]
    fn prop_label_is_order_invariant(
        sites in site_list(),
        seed in any::<u64>(),
        task_type in "[A-Za-z ()]{1,24}",
    ) {
        let mut shuffled = sites.clone();
        // Deterministic rotation plus reversal stands in for a shuffle.
        let len = shuffled.len();
        shuffled.rotate_left(usize::try_from(seed % len as u64).unwrap());
        shuffled.reverse();

        let original = derive_label(&structure(&sites), &task_type).unwrap();
        let reordered = derive_label(&structure(&shuffled), &task_type).unwrap();
        prop_assert_eq!(original, reordered);
    }

    /// Property: the label depends on the reduced composition only
    #[test]
    fn prop_label_uses_reduced_composition(
        sites in site_list(),
        multiple in 2usize..5,
    ) {
        let repeated: Vec<&str> = sites
            .iter()
            .copied()
            .cycle()
            .take(sites.len() * multiple)
            .collect();

        prop_assert_eq!(
            derive_label(&structure(&sites), "GGA static").unwrap(),
            derive_label(&structure(&repeated), "GGA static").unwrap()
        );
    }

    /// Property: slugs only contain the allowed character set
    #[test]
    fn prop_slug_character_set(text in ".{0,64}") {
        let slug = slugify(&text);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.()".contains(c)));
    }

    /// Property: adding the guard tag any number of times stores it once
    #[test]
    fn prop_guard_is_idempotent(
        tags in prop::collection::vec("[a-z_]{1,12}", 0..8),
        repeats in 1usize..5,
    ) {
        let mut lineage: RunTags = tags.iter().cloned().collect();
        for _ in 0..repeats {
            lineage = lineage.with_tag(CONVERGENCE_GUARD_TAG);
        }

        prop_assert_eq!(lineage.iter().filter(|t| *t == CONVERGENCE_GUARD_TAG).count(), 1);
        prop_assert!(!ConvergenceRetry::NeverAttempted.for_lineage(&lineage).can_retry());
    }
}
