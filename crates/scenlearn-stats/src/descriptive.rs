/// A `(mean, standard deviation)` pair.
///
/// The standard deviation is always the *population* standard deviation
/// (divides by `n`, not `n - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanStd {
    /// The arithmetic mean.
    pub mean: f64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl MeanStd {
    #[must_use]
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// A summary of a single known value: the value itself with zero spread.
    #[must_use]
    pub const fn exact(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// Computes the mean and population standard deviation of `values`.
    ///
    /// # Returns
    ///
    /// * `Some(MeanStd)` - if `values` yields at least one value
    /// * `None` - if `values` is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use scenlearn_stats::descriptive::MeanStd;
    /// let summary = MeanStd::from_values([1.0, 3.0]).unwrap();
    /// assert_eq!(summary.mean, 2.0);
    /// assert_eq!(summary.std_dev, 1.0);
    ///
    /// assert!(MeanStd::from_values(std::iter::empty()).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self::new(mean, variance.sqrt()))
    }

    /// Rounds both components to `digits` decimal places.
    ///
    /// ```
    /// # use scenlearn_stats::descriptive::MeanStd;
    /// let summary = MeanStd::new(12.345, 0.26).round_to(1);
    /// assert_eq!(summary, MeanStd::new(12.3, 0.3));
    /// ```
    #[must_use]
    pub fn round_to(self, digits: i32) -> Self {
        Self::new(round_to(self.mean, digits), round_to(self.std_dev, digits))
    }

    /// Rounds both components up to the next integer.
    #[must_use]
    pub fn ceil(self) -> Self {
        Self::new(self.mean.ceil(), self.std_dev.ceil())
    }
}

/// Rounds `value` to `digits` decimal places (half away from zero).
#[must_use]
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10_f64.powi(digits);
    (value * scale).round() / scale
}
