//! Asymptotic complexity classes for registered candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Big-O complexity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BigO {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(log n)")]
    Logarithmic,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n log n)")]
    Linearithmic,
    #[serde(rename = "O(n^2)")]
    Quadratic,
    #[serde(rename = "O(n^3)")]
    Cubic,
    #[serde(rename = "O(2^n)")]
    Exponential,
    #[serde(rename = "O(n!)")]
    Factorial,
}

impl BigO {
    /// Number of classes, used to normalize ranks.
    const COUNT: usize = 8;

    pub fn as_str(self) -> &'static str {
        match self {
            BigO::Constant => "O(1)",
            BigO::Logarithmic => "O(log n)",
            BigO::Linear => "O(n)",
            BigO::Linearithmic => "O(n log n)",
            BigO::Quadratic => "O(n^2)",
            BigO::Cubic => "O(n^3)",
            BigO::Exponential => "O(2^n)",
            BigO::Factorial => "O(n!)",
        }
    }

    /// Position in the growth ordering, 0 for constant.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Approximate operation count for an input of size `n`.
    pub fn operations(self, n: f64) -> f64 {
        let n = n.max(1.0);
        match self {
            BigO::Constant => 1.0,
            BigO::Logarithmic => (n + 1.0).log2(),
            BigO::Linear => n,
            BigO::Linearithmic => n * (n + 1.0).log2(),
            BigO::Quadratic => n * n,
            BigO::Cubic => n * n * n,
            BigO::Exponential => 2f64.powf(n.min(1023.0)),
            BigO::Factorial => {
                // 171! overflows f64
                if n > 170.0 {
                    f64::INFINITY
                } else {
                    (2..=n as u64).map(|k| k as f64).product()
                }
            }
        }
    }

    /// Normalized desirability as a space class: 1.0 for O(1), 0.0 for O(n!).
    pub fn space_score(self) -> f64 {
        1.0 - self.rank() as f64 / (Self::COUNT - 1) as f64
    }

    /// Estimated footprint in megabytes for `n` machine words per unit.
    pub fn estimated_megabytes(self, n: f64) -> f64 {
        self.operations(n) * std::mem::size_of::<i64>() as f64 / (1024.0 * 1024.0)
    }
}

impl fmt::Display for BigO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
