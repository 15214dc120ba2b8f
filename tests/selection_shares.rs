use proptest::prelude::*;
use tropism_core::orchestrator::allot_shares;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn shares_never_exceed_desired(
        desired in 1usize..500,
        proportions in prop::collection::vec(-2.0f64..10.0, 0..8),
    ) {
        let shares = allot_shares(desired, &proportions);
        prop_assert_eq!(shares.len(), proportions.len());
        prop_assert!(shares.iter().sum::<usize>() <= desired);
    }

    #[test]
    fn non_positive_proportions_contribute_nothing(
        desired in 1usize..500,
        proportions in prop::collection::vec(-2.0f64..10.0, 1..8),
    ) {
        let shares = allot_shares(desired, &proportions);
        for (share, proportion) in shares.iter().zip(&proportions) {
            if *proportion <= 0.0 {
                prop_assert_eq!(*share, 0usize);
            }
        }
    }

    #[test]
    fn single_positive_method_takes_the_whole_population(
        desired in 1usize..500,
        proportion in 0.001f64..10.0,
    ) {
        prop_assert_eq!(allot_shares(desired, &[proportion]), vec![desired]);
    }

    #[test]
    fn shortfall_is_bounded_by_flooring_losses(
        desired in 1usize..500,
        proportions in prop::collection::vec(0.001f64..10.0, 1..8),
    ) {
        let shares = allot_shares(desired, &proportions);
        let total: usize = shares.iter().sum();
        // Each positive method can lose strictly less than one individual
        // to flooring.
        prop_assert!(total + proportions.len() >= desired);
        prop_assert!(total <= desired);
    }
}

#[test]
fn worked_example_from_the_population_setup() {
    assert_eq!(allot_shares(100, &[0.5, 1.5]), vec![25, 75]);
    assert_eq!(allot_shares(15, &[1.0]), vec![15]);
    assert_eq!(allot_shares(20, &[0.7]), vec![20]);
}
