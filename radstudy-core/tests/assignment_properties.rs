//! Properties of the assignment engine over sampled identifiers

use std::collections::HashSet;

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use radstudy_core::catalog::{Case, StudyCatalog};
use radstudy_core::{ConditionPolicy, derive_seed, generate_assignment, present_for};

fn random_identifier(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

#[test]
fn distinct_identifiers_mostly_get_distinct_orders() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    let identifiers: Vec<String> = (0..200).map(|_| random_identifier(&mut rng)).collect();

    let orders: HashSet<Vec<usize>> = identifiers
        .iter()
        .map(|id| generate_assignment(derive_seed(id), 10).permutation)
        .collect();

    assert!(orders.len() >= 195, "only {} distinct orders", orders.len());
}

#[test]
fn sampled_assignments_are_balanced_bijections() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(17);
    for _ in 0..100 {
        let identifier = random_identifier(&mut rng);
        let n = rng.gen_range(0..40);
        let assignment = generate_assignment(derive_seed(&identifier), n);

        let mut sorted = assignment.permutation.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "{identifier}");
        assert_eq!(assignment.guidance.iter().filter(|g| **g).count(), n / 2);
        assert_eq!(assignment, generate_assignment(derive_seed(&identifier), n));
    }
}

#[test]
fn both_conditions_occur() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(99);
    let timed = (0..200)
        .filter(|_| generate_assignment(derive_seed(&random_identifier(&mut rng)), 4).condition.is_timed())
        .count();
    assert!((60..=140).contains(&timed), "{timed} of 200 timed");
}

#[test]
fn four_case_participant_end_to_end() {
    let cases = (0..4)
        .map(|i| Case::new(format!("case {i}"), vec![]))
        .collect();
    let catalog = StudyCatalog::new(cases, Default::default(), Default::default());

    let first = present_for("u1", &catalog, &ConditionPolicy::default());
    let again = present_for("u1", &catalog, &ConditionPolicy::default());

    assert_eq!(first.seed.value(), 41_909_017);
    let guided = first.questions.iter().filter(|q| q.show_guidance).count();
    assert_eq!(guided, 2);
    let mut order: Vec<usize> = first.questions.iter().map(|q| q.case_index).collect();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert_eq!(
        (&first.order, &first.guidance_bits, first.condition),
        (&again.order, &again.guidance_bits, again.condition)
    );
}
