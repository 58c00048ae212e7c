//! Backend-independent plot descriptions.
//!
//! A [`Figure`] holds everything needed to draw one diagnostic plot. Building
//! a figure never touches the terminal or the filesystem; renderers in
//! [`crate::render`] decide how to present it.

use serde::Serialize;
use tempo_series::select::TimeBlock;
use tempo_stats::diagnostics::{Histogram, QqPlot};
use tempo_stats::ols::OlsFit;

/// What a figure draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum FigureKind {
    /// Unconnected `(x, y)` points.
    Scatter(Vec<(f64, f64)>),
    /// Bin counts.
    Bars(Histogram),
    /// Normal probability plot with its reference line.
    QuantileQuantile(QqPlot),
}

/// One diagnostic plot.
///
/// # Examples
///
/// ```
/// use tempo_report::figure::{Figure, FigureKind};
/// use tempo_series::select::TimeBlock;
///
/// let block = TimeBlock { index: 0, hour: "0h".into(), values: vec![1.0, 2.0, 3.0] };
/// let fig = Figure::linearity(&block);
/// assert_eq!(fig.x_label, "Time Periods");
/// assert!(matches!(fig.kind, FigureKind::Scatter(ref p) if p.len() == 3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    /// Plot title.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Plot contents.
    pub kind: FigureKind,
}

impl Figure {
    /// Period index against the selected values, for checking linearity.
    pub fn linearity(block: &TimeBlock) -> Self {
        Self {
            title: "Scatter Plot of Time Periods vs. Frequencies".into(),
            x_label: "Time Periods".into(),
            y_label: "Frequencies".into(),
            kind: FigureKind::Scatter(block.points()),
        }
    }

    /// Fitted values against residuals, for checking homoscedasticity.
    pub fn residuals_vs_fitted(fit: &OlsFit) -> Self {
        let points = fit
            .fitted
            .iter()
            .copied()
            .zip(fit.residuals.iter().copied())
            .collect();
        Self {
            title: "Residuals vs. Predicted Values".into(),
            x_label: "Predicted Values".into(),
            y_label: "Residuals".into(),
            kind: FigureKind::Scatter(points),
        }
    }

    /// Residual distribution, for checking normality.
    pub fn residual_histogram(histogram: &Histogram) -> Self {
        Self {
            title: "Histogram of Residuals".into(),
            x_label: "Residuals".into(),
            y_label: "Frequency".into(),
            kind: FigureKind::Bars(histogram.clone()),
        }
    }

    /// Standardized residuals against normal quantiles.
    pub fn normal_qq(qq: &QqPlot) -> Self {
        Self {
            title: "Normal Q-Q Plot".into(),
            x_label: "Theoretical Quantiles".into(),
            y_label: "Ordered Values".into(),
            kind: FigureKind::QuantileQuantile(qq.clone()),
        }
    }

    /// Padded `[min, max]` ranges for both axes.
    ///
    /// Bars report bin edges on x and `[0, max count]` on y.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        match &self.kind {
            FigureKind::Scatter(points) => (
                padded(points.iter().map(|p| p.0)),
                padded(points.iter().map(|p| p.1)),
            ),
            FigureKind::QuantileQuantile(qq) => {
                (padded(qq.theoretical.iter().copied()), padded(qq.ordered.iter().copied()))
            }
            FigureKind::Bars(h) => {
                let lo = h.edges.first().copied().unwrap_or(0.0);
                let hi = h.edges.last().copied().unwrap_or(1.0);
                let top = h.counts.iter().copied().max().unwrap_or(0).max(1);
                ([lo, hi], [0.0, top as f64])
            }
        }
    }
}

/// Min/max of `values` widened by 5% on each side, never zero-width.
fn padded(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return [0.0, 1.0];
    }
    let span = hi - lo;
    let pad = if span == 0.0 {
        lo.abs().max(1.0) * 0.5
    } else {
        span * 0.05
    };
    [lo - pad, hi + pad]
}
