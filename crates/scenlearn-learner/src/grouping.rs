//! Greedy one-pass grouping
//!
//! The last remaining item seeds a group; every other remaining item that is
//! similar to the seed joins it, in input order. The rest stay for the next
//! round. Every item ends up in exactly one group and singleton groups are
//! kept. The result depends on the input order.

/// Partitions `items` into groups of indices, each led by its seed.
pub fn greedy_partition<T, F>(items: &[T], mut similar: F) -> Vec<Vec<usize>>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut remaining = (0..items.len()).collect::<Vec<_>>();
    let mut groups = vec![];
    while let Some(seed) = remaining.pop() {
        let mut group = vec![seed];
        remaining.retain(|&candidate| {
            let joins = similar(&items[seed], &items[candidate]);
            if joins {
                group.push(candidate);
            }
            !joins
        });
        groups.push(group);
    }
    groups
}

/// Mutable references to `items[i]` for every `i` in `indices`, in that order.
///
/// Out-of-range and repeated indices are skipped.
pub(crate) fn pick_mut<'a, T>(items: &'a mut [T], indices: &[usize]) -> Vec<&'a mut T> {
    let mut slots = items.iter_mut().map(Some).collect::<Vec<_>>();
    indices
        .iter()
        .filter_map(|&i| slots.get_mut(i)?.take())
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_empty() {
        assert!(greedy_partition::<i32, _>(&[], |_, _| true).is_empty());
    }

    #[test]
    fn test_seeds_from_the_back() {
        let groups = greedy_partition(&[1, 10, 2, 11, 3], |a, b| (a / 10) == (b / 10));
        assert_eq!(groups, vec![vec![4, 0, 2], vec![3, 1]]);
    }

    #[test]
    fn test_compares_with_seed_only() {
        // 2 is close to 3 and 3 to 4, but 2 is not close to 4
        let groups = greedy_partition(&[2, 3, 4], |a: &i32, b: &i32| (a - b).abs() <= 1);
        assert_eq!(groups, vec![vec![2, 1], vec![0]]);
    }

    #[test]
    fn test_random_partitions_are_complete() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let items = (0..rng.random_range(0..30))
                .map(|_| rng.random_range(0..6))
                .collect::<Vec<u32>>();
            let groups = greedy_partition(&items, |a, b| a.abs_diff(*b) <= 1);

            let mut seen = groups.iter().flatten().copied().collect::<Vec<_>>();
            seen.sort_unstable();
            assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
            assert!(groups.iter().all(|g| !g.is_empty()));
        }
    }

    #[test]
    fn test_pick_mut_keeps_order() {
        let mut items = [10, 20, 30, 40];
        for item in pick_mut(&mut items, &[3, 1, 1, 9]) {
            *item += 1;
        }
        assert_eq!(items, [10, 21, 30, 41]);
        let picked = pick_mut(&mut items, &[2, 0]);
        assert_eq!(picked.iter().map(|v| **v).collect::<Vec<_>>(), vec![30, 10]);
    }
}
