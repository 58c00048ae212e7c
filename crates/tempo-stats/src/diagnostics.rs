//! Residual diagnostics for a fitted regression.
//!
//! Covers the independence check (Durbin-Watson), residual standardization,
//! the residual histogram, and normal Q-Q coordinates. Everything here is a
//! pure function of its inputs.

use std::f64::consts::SQRT_2;

use serde::Serialize;
use statrs::function::erf::erf_inv;

use crate::ols;

/// Durbin-Watson statistic `Σ(e_t - e_{t-1})² / Σ e_t²`.
///
/// Values near 2 indicate no first-order autocorrelation, values near 0
/// strong positive autocorrelation, and values near 4 strong negative
/// autocorrelation. Returns `None` when the residual sum of squares is zero
/// (a perfect fit), where the ratio is undefined.
///
/// # Examples
///
/// ```
/// use tempo_stats::diagnostics::durbin_watson;
///
/// let dw = durbin_watson(&[1.0, -1.0, 1.0, -1.0]).unwrap();
/// assert_eq!(dw, 3.0);
/// assert_eq!(durbin_watson(&[0.0, 0.0, 0.0]), None);
/// ```
pub fn durbin_watson(residuals: &[f64]) -> Option<f64> {
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();
    if ssr == 0.0 {
        return None;
    }
    let diff: f64 = residuals
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            d * d
        })
        .sum();
    Some(diff / ssr)
}

/// Center on the mean and scale by the population standard deviation.
///
/// Returns `None` for an empty slice or when every value is the same.
///
/// # Examples
///
/// ```
/// use tempo_stats::diagnostics::standardize;
///
/// let z = standardize(&[1.0, 3.0]).unwrap();
/// assert_eq!(z, vec![-1.0, 1.0]);
/// assert!(standardize(&[2.0, 2.0]).is_none());
/// ```
pub fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}

/// Equal-width bin counts.
///
/// `edges` has `counts.len() + 1` entries. Every bin is half-open
/// `[edges[i], edges[i + 1])` except the last, which also includes its
/// right edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    /// Bin boundaries, ascending.
    pub edges: Vec<f64>,
    /// Observations per bin.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Midpoint of each bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Total number of binned observations.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Bin `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// A constant sample is spread over `[v - 0.5, v + 0.5]`; an empty sample
/// over `[0, 1]`. A bin count of zero is treated as one.
///
/// # Examples
///
/// ```
/// use tempo_stats::diagnostics::histogram;
///
/// let h = histogram(&[0.0, 1.0, 2.0, 3.0], 3);
/// assert_eq!(h.counts, vec![1, 1, 2]);
/// assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0]);
/// ```
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = hi - lo;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| {
            if i == bins {
                hi
            } else {
                lo + width * i as f64 / bins as f64
            }
        })
        .collect();

    let mut counts = vec![0u64; bins];
    for &v in values {
        let mut idx = (((v - lo) / width) * bins as f64) as usize;
        idx = idx.min(bins - 1);
        // Float rounding can land a value one bin off its edges.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

/// Least-squares line through Q-Q points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLine {
    /// Slope of ordered values on theoretical quantiles.
    pub slope: f64,
    /// Intercept of the line.
    pub intercept: f64,
    /// Correlation between the two axes.
    pub r: f64,
}

/// Coordinates of a normal probability plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QqPlot {
    /// Standard normal quantiles of the order-statistic medians.
    pub theoretical: Vec<f64>,
    /// The sample sorted ascending.
    pub ordered: Vec<f64>,
    /// Fitted line; `None` when the sample has fewer than two points.
    pub reference: Option<ReferenceLine>,
}

impl QqPlot {
    /// `(theoretical, ordered)` pairs.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.theoretical
            .iter()
            .copied()
            .zip(self.ordered.iter().copied())
            .collect()
    }
}

/// Compare a sample against the standard normal distribution.
///
/// Theoretical positions are Filliben's estimates of the uniform
/// order-statistic medians, mapped through the normal quantile function.
///
/// # Examples
///
/// ```
/// use tempo_stats::diagnostics::normal_qq;
///
/// let qq = normal_qq(&[0.3, -1.2, 0.9]);
/// assert_eq!(qq.ordered, vec![-1.2, 0.3, 0.9]);
/// assert!(qq.theoretical[0] < 0.0 && qq.theoretical[2] > 0.0);
/// ```
pub fn normal_qq(values: &[f64]) -> QqPlot {
    let mut ordered = values.to_vec();
    ordered.sort_by(f64::total_cmp);

    let theoretical: Vec<f64> = order_statistic_medians(ordered.len())
        .into_iter()
        .map(standard_normal_quantile)
        .collect();

    let reference = ols::fit(&theoretical, &ordered).ok().map(|line| {
        let r = line
            .r_squared
            .map_or(0.0, |r2| r2.max(0.0).sqrt().copysign(line.slope));
        ReferenceLine {
            slope: line.slope,
            intercept: line.intercept,
            r,
        }
    });

    QqPlot {
        theoretical,
        ordered,
        reference,
    }
}

/// Filliben's approximation of uniform order-statistic medians.
fn order_statistic_medians(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let last = 0.5f64.powf(1.0 / nf);
    let mut medians: Vec<f64> = (1..=n)
        .map(|i| (i as f64 - 0.3175) / (nf + 0.365))
        .collect();
    medians[n - 1] = last;
    medians[0] = 1.0 - last;
    medians
}

fn standard_normal_quantile(p: f64) -> f64 {
    SQRT_2 * erf_inv(2.0 * p - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Deterministic uniform noise in `[-0.5, 0.5)` (splitmix64).
    fn noise(n: usize) -> Vec<f64> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        (0..n)
            .map(|_| {
                state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
                let mut z = state;
                z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
                z ^= z >> 31;
                (z >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn durbin_watson_near_zero_for_trending_residuals() {
        let residuals: Vec<f64> = (-50..=50).map(f64::from).collect();
        let dw = durbin_watson(&residuals).unwrap();
        assert!(dw < 0.01, "dw = {dw}");
    }

    #[test]
    fn durbin_watson_near_four_for_alternating_residuals() {
        let residuals: Vec<f64> = (0..100)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let dw = durbin_watson(&residuals).unwrap();
        assert_relative_eq!(dw, 3.96, epsilon = 1e-12);
    }

    #[test]
    fn durbin_watson_near_two_for_uncorrelated_residuals() {
        let dw = durbin_watson(&noise(10_000)).unwrap();
        assert!((dw - 2.0).abs() < 0.1, "dw = {dw}");
    }

    #[test]
    fn durbin_watson_undefined_for_perfect_fit() {
        assert_eq!(durbin_watson(&[0.0, 0.0, 0.0]), None);
        assert_eq!(durbin_watson(&[]), None);
    }

    #[test]
    fn durbin_watson_on_exact_line_fit() {
        let fit = ols::fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(durbin_watson(&fit.residuals), None);
    }

    #[test]
    fn standardized_residuals_have_unit_scale() {
        let z = standardize(&[3.2, -1.0, 0.4, 2.2, -4.1, 0.9]).unwrap();
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let std = (z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn standardize_rejects_degenerate_input() {
        assert!(standardize(&[]).is_none());
        assert!(standardize(&[0.0, 0.0]).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = noise(500);
        let h = histogram(&values, 20);
        assert_eq!(h.counts.len(), 20);
        assert_eq!(h.edges.len(), 21);
        assert_eq!(h.total(), 500);
    }

    #[test]
    fn histogram_last_bin_includes_max() {
        let h = histogram(&[0.0, 0.5, 1.0], 2);
        assert_eq!(h.counts, vec![1, 2]);
    }

    #[test]
    fn histogram_of_constant_sample() {
        let h = histogram(&[0.0, 0.0, 0.0], 4);
        assert_eq!(h.edges.first(), Some(&-0.5));
        assert_eq!(h.edges.last(), Some(&0.5));
        assert_eq!(h.counts, vec![0, 0, 3, 0]);
    }

    #[test]
    fn histogram_of_empty_sample() {
        let h = histogram(&[], 5);
        assert_eq!(h.total(), 0);
        assert_eq!(h.edges.first(), Some(&0.0));
        assert_eq!(h.edges.last(), Some(&1.0));
    }

    #[test]
    fn histogram_centers() {
        let h = histogram(&[0.0, 4.0], 2);
        assert_eq!(h.centers(), vec![1.0, 3.0]);
    }

    #[test]
    fn quantile_function_matches_known_values() {
        assert_relative_eq!(standard_normal_quantile(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(standard_normal_quantile(0.975), 1.959_963_985, epsilon = 1e-6);
        assert_relative_eq!(standard_normal_quantile(0.025), -1.959_963_985, epsilon = 1e-6);
    }

    #[test]
    fn order_statistic_medians_are_symmetric() {
        let m = order_statistic_medians(7);
        for i in 0..7 {
            assert_relative_eq!(m[i] + m[6 - i], 1.0, epsilon = 1e-3);
        }
        assert!(m.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(order_statistic_medians(1), vec![0.5]);
    }

    #[test]
    fn qq_of_normal_quantiles_is_a_straight_line() {
        let sample: Vec<f64> = order_statistic_medians(25)
            .into_iter()
            .map(standard_normal_quantile)
            .rev()
            .collect();
        let qq = normal_qq(&sample);
        let line = qq.reference.unwrap();
        assert_relative_eq!(line.slope, 1.0, epsilon = 1e-9);
        assert_relative_eq!(line.intercept, 0.0, epsilon = 1e-9);
        assert_relative_eq!(line.r, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn qq_points_pair_quantiles_with_sorted_sample() {
        let qq = normal_qq(&[2.0, -1.0, 0.5, 0.0]);
        let points = qq.points();
        assert_eq!(points.len(), 4);
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1));
    }

    #[test]
    fn qq_of_single_value_has_no_line() {
        let qq = normal_qq(&[1.0]);
        assert_eq!(qq.theoretical.len(), 1);
        assert_relative_eq!(qq.theoretical[0], 0.0, epsilon = 1e-12);
        assert!(qq.reference.is_none());
    }
}
