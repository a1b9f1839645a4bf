//! Property tests of set normalization and predicate synthesis over random sets.


use std::collections::BTreeSet;

use proptest::prelude::*;
use test_utils::{finished, first_mismatch};
use ucd_predicates::emit::cpp::{CppEmitter, CppOptions};
use ucd_predicates::{CodeUnit, Compiler, Config, Domain, Element, SparseSet};

const SPAN_LAST: u32 = 2047;

fn element() -> impl Strategy<Value = Element> {
    prop_oneof![
        (0..=SPAN_LAST).prop_map(Element::from),
        (0..=SPAN_LAST, 0..48u32)
            .prop_map(|(first, len)| Element::from((first, (first + len).min(SPAN_LAST)))),
    ]
}

fn elements() -> impl Strategy<Value = Vec<Element>> {
    prop::collection::vec(element(), 0..40)
}

fn config() -> impl Strategy<Value = Config> {
    (
        prop::sample::select(vec![8u32, 16, 32, 64]),
        1..6usize,
        0..4u32,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                word_size,
                compound_boolean_limit,
                depth_limit,
                bitmask_expressions,
                bitmask_tables,
                hoist_constant_children,
            )| Config {
                word_size,
                compound_boolean_limit,
                depth_limit,
                bitmask_expressions,
                bitmask_tables,
                hoist_constant_children,
            },
        )
}

fn members(elements: &[Element]) -> BTreeSet<u32> {
    elements
        .iter()
        .flat_map(|element| element.first()..=element.last())
        .collect()
}

fn render(set: &SparseSet, config: &Config) -> String {
    let predicate = Compiler::new(config.clone())
        .unwrap()
        .compile(set, Domain::new(0, SPAN_LAST))
        .unwrap();
    let options = CppOptions::default();
    CppEmitter::new(CodeUnit::CHAR32, &options).body(&predicate)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_predicates_are_total(elements in elements(), config in config()) {
        let set = finished(elements);
        let domain = Domain {
            first: 0,
            last: SPAN_LAST,
            limit: SPAN_LAST * 2,
        };
        let predicate = Compiler::new(config).unwrap().compile(&set, domain).unwrap();
        prop_assert_eq!(first_mismatch(&set, &predicate), None);
    }

    #[test]
    fn prop_finished_sets_are_normalized(elements in elements()) {
        let expected = members(&elements);
        let set = finished(elements);

        let first_pass: Vec<u32> = set.iter().collect();
        let second_pass: Vec<u32> = set.iter().collect();
        prop_assert_eq!(&first_pass, &second_pass);
        prop_assert_eq!(first_pass, expected.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(set.len(), expected.len() as u64);

        for pair in set.elements().windows(2) {
            // Sorted, and neither overlapping nor adjacent
            prop_assert!(pair[0].last() + 1 < pair[1].first());
        }
        for c in 0..=SPAN_LAST + 1 {
            prop_assert_eq!(set.contains(c), expected.contains(&c));
        }
    }

    #[test]
    fn prop_merge_order_does_not_matter(
        shuffled in elements().prop_flat_map(|elements| Just(elements).prop_shuffle()),
    ) {
        let mut sorted = shuffled.clone();
        sorted.sort_by_key(|element| (element.first(), element.last()));
        let shuffled = finished(shuffled);
        let sorted = finished(sorted);
        prop_assert_eq!(shuffled.elements(), sorted.elements());
    }

    #[test]
    fn prop_inverse_partitions_the_bounds(elements in elements(), max in SPAN_LAST..SPAN_LAST + 64) {
        let set = finished(elements);
        let inverse = set.inverse(0, max);
        for c in 0..=max {
            prop_assert!(set.contains(c) != inverse.contains(c), "{} is in both or neither", c);
        }
        prop_assert!(!inverse.contains(max + 1));
        prop_assert_eq!(set.len() + inverse.len(), u64::from(max) + 1);
    }

    #[test]
    fn prop_synthesis_is_deterministic(
        shuffled in elements().prop_flat_map(|elements| Just(elements).prop_shuffle()),
        config in config(),
    ) {
        let mut sorted = shuffled.clone();
        sorted.sort_by_key(|element| (element.first(), element.last()));

        let first = render(&finished(shuffled.clone()), &config);
        prop_assert_eq!(&first, &render(&finished(shuffled), &config));
        prop_assert_eq!(&first, &render(&finished(sorted), &config));
    }
}
