//! Closed-form ordinary least squares for a single regressor.
//!
//! Fits `y = a + b·x` by solving the normal equations directly. There is no
//! iteration, so the only failure modes are too few points and a regressor
//! with zero variance.

use serde::Serialize;
use tempo_core::TempoError;
use tracing::debug;

/// A fitted straight line with its residuals.
///
/// # Examples
///
/// ```
/// use tempo_stats::ols::fit_trend;
///
/// let fit = fit_trend(&[1.0, 2.0, 3.0]).unwrap();
/// assert!((fit.slope - 1.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OlsFit {
    /// Intercept `a`.
    pub intercept: f64,
    /// Slope `b`.
    pub slope: f64,
    /// Model predictions `a + b·x`, one per observation.
    pub fitted: Vec<f64>,
    /// Observed minus fitted, one per observation.
    pub residuals: Vec<f64>,
    /// Number of observations.
    pub n: usize,
    /// Residual sum of squares.
    pub rss: f64,
    /// Coefficient of determination; `None` when `y` is constant.
    pub r_squared: Option<f64>,
}

impl OlsFit {
    /// Predict `y` at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y` against the period index `0..y.len()`.
///
/// # Errors
///
/// Returns [`TempoError::InsufficientData`] for fewer than two points.
pub fn fit_trend(y: &[f64]) -> Result<OlsFit, TempoError> {
    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    fit(&x, y)
}

/// Fit `y = a + b·x` by ordinary least squares.
///
/// # Errors
///
/// - [`TempoError::DimensionMismatch`] if `x` and `y` differ in length.
/// - [`TempoError::InsufficientData`] if there are fewer than two points.
/// - [`TempoError::SingularDesign`] if every `x` is the same.
pub fn fit(x: &[f64], y: &[f64]) -> Result<OlsFit, TempoError> {
    if x.len() != y.len() {
        return Err(TempoError::DimensionMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    let n = y.len();
    if n < 2 {
        return Err(TempoError::InsufficientData {
            needed: 2,
            found: n,
        });
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return Err(TempoError::SingularDesign);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let fitted: Vec<f64> = x.iter().map(|xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(yi, fi)| yi - fi).collect();
    let rss: f64 = residuals.iter().map(|e| e * e).sum();
    let r_squared = (syy > 0.0).then(|| 1.0 - rss / syy);

    debug!(n, intercept, slope, rss, "fitted OLS line");

    Ok(OlsFit {
        intercept,
        slope,
        fitted,
        residuals,
        n,
        rss,
        r_squared,
    })
}
