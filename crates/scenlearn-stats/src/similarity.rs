//! Set similarity measures

use std::collections::BTreeSet;

/// Jaccard index `|A ∩ B| / |A ∪ B|` of two sets.
///
/// Defined as `0.0` whenever the intersection is empty, which also covers
/// the case of two empty sets.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use scenlearn_stats::similarity::jaccard_index;
///
/// let a = BTreeSet::from(["x", "y", "z"]);
/// let b = BTreeSet::from(["y", "z", "w"]);
/// assert_eq!(jaccard_index(&a, &b), 0.5);
///
/// let empty = BTreeSet::<&str>::new();
/// assert_eq!(jaccard_index(&empty, &empty), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn jaccard_index<T>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64
where
    T: Ord,
{
    let shared = a.intersection(b).count();
    if shared == 0 {
        return 0.0;
    }
    shared as f64 / (a.len() + b.len() - shared) as f64
}

/// Jaccard distance `1 - jaccard_index(a, b)`.
///
/// Two sets sharing nothing are at distance `1.0`.
#[must_use]
pub fn jaccard_distance<T>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64
where
    T: Ord,
{
    1.0 - jaccard_index(a, b)
}
