//! Numeric building blocks for the scenario learner.
//!
//! This crate collects the self-contained algorithms the learning pipeline is
//! assembled from. Nothing in here knows about events, people or spaces; every
//! function works on plain slices, sets and matrices.
//!
//! - **Descriptive statistics**: mean and population standard deviation
//! - **Smoothing**: simple and exponential moving averages over a series
//! - **Similarity**: Jaccard index of two sets
//! - **Change-point detection**: PELT with an RBF kernel cost
//! - **Clustering**: agglomerative clustering with average linkage
//!
//! # Modules
//!
//! - [`descriptive`]: Mean / standard deviation summaries
//! - [`smoothing`]: Moving-average filters that preserve series length
//! - [`similarity`]: Set similarity measures
//! - [`changepoint`]: Offline segmentation of a series into homogeneous pieces
//! - [`clustering`]: Threshold-cut hierarchical clustering over a distance matrix
//!
//! # Examples
//!
//! ## Summarizing values
//!
//! ```
//! use scenlearn_stats::descriptive::MeanStd;
//!
//! let summary = MeanStd::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
//! assert_eq!(summary.mean, 5.0);
//! assert_eq!(summary.std_dev, 2.0);
//! ```
//!
//! ## Segmenting a series
//!
//! ```
//! use scenlearn_stats::changepoint::Pelt;
//!
//! let mut signal = vec![0.0; 20];
//! signal.extend([10.0; 20]);
//! let pelt = Pelt { min_size: 5, jump: 5, penalty: 0.3 };
//! let breakpoints = pelt.fit_predict(&signal).unwrap();
//! assert_eq!(breakpoints, vec![20, 40]);
//! ```
//!
//! ## Clustering by distance
//!
//! ```
//! use scenlearn_stats::clustering::{AverageLinkage, DistanceMatrix};
//!
//! let points: [f64; 3] = [0.0, 0.1, 5.0];
//! let distances = DistanceMatrix::from_fn(points.len(), |i, j| (points[i] - points[j]).abs());
//! let clusters = AverageLinkage::new(0.5).cluster(&distances);
//! assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
//! ```

pub mod changepoint;
pub mod clustering;
pub mod descriptive;
pub mod similarity;
pub mod smoothing;
