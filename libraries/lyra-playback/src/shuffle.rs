//! Shuffle order generation
//!
//! Fisher-Yates, written out so the draw sequence is explicit: for `i` from
//! `n - 1` down to 1, draw `j` uniformly from `[0, i]` and swap.

use rand::Rng;

/// Shuffle a slice in place
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Return a shuffled copy of `items`
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut order = items.to_vec();
    fisher_yates(&mut order, rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn shuffle_preserves_all_items() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = vec!["a", "b", "c", "c", "d"];

        let mut order = shuffled(&items, &mut rng);
        order.sort_unstable();

        let mut expected = items.clone();
        expected.sort_unstable();
        assert_eq!(order, expected);
    }

    #[test]
    fn shuffle_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);

        let mut empty: Vec<u8> = vec![];
        fisher_yates(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![42];
        fisher_yates(&mut single, &mut rng);
        assert_eq!(single, vec![42]);
    }

    #[test]
    fn same_seed_same_order() {
        let items: Vec<u32> = (0..20).collect();
        let a = shuffled(&items, &mut StdRng::seed_from_u64(99));
        let b = shuffled(&items, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn permutations_are_roughly_uniform() {
        // 6 permutations of 3 items, 6000 draws: each expected ~1000 (sd ~29)
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts: HashMap<Vec<u8>, usize> = HashMap::new();

        for _ in 0..6000 {
            *counts.entry(shuffled(&[1u8, 2, 3], &mut rng)).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        for (perm, count) in counts {
            assert!(
                (800..=1200).contains(&count),
                "permutation {:?} drawn {} times",
                perm,
                count
            );
        }
    }
}
