//! Agglomerative clustering over a precomputed distance matrix
//!
//! Clusters start as singletons and the closest pair (by average linkage) is
//! merged repeatedly until no pair is closer than the distance threshold. The
//! number of clusters is therefore decided by the threshold, not fixed in
//! advance.
//!
//! Average linkage is maintained with the Lance-Williams update
//!
//! ```text
//! d(k, i ∪ j) = (|i| d(k, i) + |j| d(k, j)) / (|i| + |j|)
//! ```
//!
//! An optional cannot-link distance forbids merging two clusters that contain
//! any pair of members at or beyond that distance, even when their average
//! distance is below the threshold.

/// Symmetric matrix of pairwise distances with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    len: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix by evaluating `distance(i, j)` once for every `i < j`.
    pub fn from_fn<F>(len: usize, mut distance: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = vec![0.0; len * len];
        for i in 0..len {
            for j in i + 1..len {
                let d = distance(i, j);
                values[i * len + j] = d;
                values[j * len + i] = d;
            }
        }
        Self { len, values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.len + j]
    }
}

/// Average-linkage agglomerative clustering cut at a distance threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageLinkage {
    /// Clusters whose linkage distance is at or above this value are not merged.
    pub distance_threshold: f64,
    /// Clusters holding any member pair at or above this distance are not merged.
    pub cannot_link_distance: Option<f64>,
}

impl AverageLinkage {
    #[must_use]
    pub const fn new(distance_threshold: f64) -> Self {
        Self {
            distance_threshold,
            cannot_link_distance: None,
        }
    }

    #[must_use]
    pub const fn with_cannot_link_distance(mut self, distance: f64) -> Self {
        self.cannot_link_distance = Some(distance);
        self
    }

    /// Clusters the items of `distances`.
    ///
    /// Returns the clusters as lists of item indices. Members are sorted
    /// ascending and clusters are ordered by their smallest member. Ties between
    /// equally close pairs are resolved toward the lowest indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenlearn_stats::clustering::{AverageLinkage, DistanceMatrix};
    ///
    /// // a chain: 0 - 1 - 2 with 0 and 2 far apart
    /// let d = [[0.0, 0.2, 1.0], [0.2, 0.0, 0.2], [1.0, 0.2, 0.0]];
    /// let distances = DistanceMatrix::from_fn(3, |i, j| d[i][j]);
    ///
    /// let loose = AverageLinkage::new(0.7).cluster(&distances);
    /// assert_eq!(loose, vec![vec![0, 1, 2]]);
    ///
    /// let guarded = AverageLinkage::new(0.7)
    ///     .with_cannot_link_distance(1.0)
    ///     .cluster(&distances);
    /// assert_eq!(guarded, vec![vec![0, 1], vec![2]]);
    /// ```
    #[must_use]
    pub fn cluster(&self, distances: &DistanceMatrix) -> Vec<Vec<usize>> {
        let mut merger = Merger::new(self, distances);
        while let Some((i, j)) = merger.closest_pair() {
            merger.merge(i, j);
        }

        let mut clusters = merger
            .members
            .into_iter()
            .flatten()
            .map(|mut cluster| {
                cluster.sort_unstable();
                cluster
            })
            .collect::<Vec<_>>();
        clusters.sort_unstable_by_key(|cluster| cluster[0]);
        clusters
    }
}

/// Working state of one clustering run.
///
/// Cluster `i` keeps the index of its first member and is merged into by
/// larger indices. Every live cluster caches its closest mergeable cluster
/// among the larger indices, so only the clusters touched by a merge are
/// rescanned.
struct Merger {
    n: usize,
    distance_threshold: f64,
    members: Vec<Option<Vec<usize>>>,
    average: Vec<f64>,
    /// Whether two clusters hold a member pair at or beyond the cannot-link
    /// distance.
    blocked: Vec<bool>,
    nearest: Vec<Option<(f64, usize)>>,
}

impl Merger {
    fn new(linkage: &AverageLinkage, distances: &DistanceMatrix) -> Self {
        let n = distances.len();
        let blocked = distances
            .values
            .iter()
            .map(|&d| linkage.cannot_link_distance.is_some_and(|limit| d >= limit))
            .collect();
        let mut merger = Self {
            n,
            distance_threshold: linkage.distance_threshold,
            members: (0..n).map(|i| Some(vec![i])).collect(),
            average: distances.values.clone(),
            blocked,
            nearest: vec![None; n],
        };
        for a in 0..n {
            merger.nearest[a] = merger.nearest_after(a);
        }
        merger
    }

    fn mergeable(&self, a: usize, b: usize) -> Option<f64> {
        let d = self.average[a * self.n + b];
        (d < self.distance_threshold && !self.blocked[a * self.n + b]).then_some(d)
    }

    /// Closest mergeable live cluster among `a + 1..n`, lowest index on ties.
    fn nearest_after(&self, a: usize) -> Option<(f64, usize)> {
        let mut best: Option<(f64, usize)> = None;
        for b in (a + 1..self.n).filter(|&b| self.members[b].is_some()) {
            if let Some(d) = self.mergeable(a, b) {
                if best.is_none_or(|(current, _)| d < current) {
                    best = Some((d, b));
                }
            }
        }
        best
    }

    fn closest_pair(&self) -> Option<(usize, usize)> {
        let mut best: Option<(f64, usize, usize)> = None;
        for (a, nearest) in self.nearest.iter().enumerate() {
            if let Some((d, b)) = *nearest {
                if best.is_none_or(|(current, _, _)| d < current) {
                    best = Some((d, a, b));
                }
            }
        }
        best.map(|(_, a, b)| (a, b))
    }

    /// Merges cluster `j` into cluster `i`, where `i < j`.
    #[expect(clippy::cast_precision_loss)]
    fn merge(&mut self, i: usize, j: usize) {
        let n = self.n;
        let Some(absorbed) = self.members[j].take() else {
            return;
        };
        let Some(kept) = self.members[i].as_mut() else {
            return;
        };
        let (size_i, size_j) = (kept.len() as f64, absorbed.len() as f64);
        kept.extend(absorbed);
        self.nearest[j] = None;

        for k in (0..n).filter(|&k| k != i) {
            if self.members[k].is_none() {
                continue;
            }
            let merged = (size_i * self.average[i * n + k] + size_j * self.average[j * n + k])
                / (size_i + size_j);
            self.average[i * n + k] = merged;
            self.average[k * n + i] = merged;
            let blocked = self.blocked[i * n + k] || self.blocked[j * n + k];
            self.blocked[i * n + k] = blocked;
            self.blocked[k * n + i] = blocked;
        }

        self.nearest[i] = self.nearest_after(i);
        for a in (0..j).filter(|&a| a != i) {
            if self.members[a].is_none() {
                continue;
            }
            match self.nearest[a] {
                Some((_, b)) if b == i || b == j => self.nearest[a] = self.nearest_after(a),
                current if a < i => {
                    if let Some(d) = self.mergeable(a, i) {
                        if current.is_none_or(|(best, b)| (d, i) < (best, b)) {
                            self.nearest[a] = Some((d, i));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
