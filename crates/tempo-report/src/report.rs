//! Assembling and formatting the diagnostic report for one time block.

use std::fmt;

use serde::{Serialize, Serializer};
use tempo_series::select::{select_time_block, TimeBlock};
use tempo_series::table::SeriesTable;
use tempo_stats::diagnostics::{durbin_watson, histogram, normal_qq, standardize, Histogram, QqPlot};
use tempo_stats::ols::{fit_trend, OlsFit};
use tracing::{info, warn};

use crate::figure::Figure;

/// Everything computed for one time block.
///
/// `Display` prints the single `Durbin-Watson statistic:` line. Serializes
/// to one flat object.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    /// Where the table came from.
    pub source: String,
    /// The selected hourly block.
    pub block: TimeBlock,
    /// Period labels, aligned with `block.values`.
    pub periods: Vec<String>,
    /// Trend fitted over the period index.
    pub fit: OlsFit,
    /// `None` when the residuals are all zero.
    pub durbin_watson: Option<f64>,
    /// Residual histogram.
    pub histogram: Histogram,
    /// Q-Q coordinates of the standardized residuals; `None` when the
    /// residuals have zero variance.
    pub qq: Option<QqPlot>,
}

/// Select `time_block` from `table`, fit the trend, and compute every
/// diagnostic.
///
/// # Errors
///
/// - [`TempoError::TimeBlockOutOfRange`](tempo_core::TempoError::TimeBlockOutOfRange) if the block does not exist.
/// - [`TempoError::InsufficientData`](tempo_core::TempoError::InsufficientData) if the table has fewer than two periods.
///
/// # Examples
///
/// ```
/// use tempo_report::report::analyze;
/// use tempo_series::table::{LoadOptions, SeriesTable};
///
/// let csv = "hour,A,B,C,D\n0h,1,3,2,5\n";
/// let table = SeriesTable::from_reader(csv.as_bytes(), LoadOptions::default()).unwrap();
/// let report = analyze("inline", &table, 0, 20).unwrap();
/// assert!((report.fit.slope - 1.1).abs() < 1e-12);
/// assert!(report.to_string().starts_with("Durbin-Watson statistic: "));
/// ```
pub fn analyze(
    source: &str,
    table: &SeriesTable,
    time_block: usize,
    bins: usize,
) -> tempo_core::Result<DiagnosticReport> {
    let block = select_time_block(table, time_block)?;
    let fit = fit_trend(&block.values)?;

    let durbin_watson = durbin_watson(&fit.residuals);
    let histogram = histogram(&fit.residuals, bins);
    let qq = standardize(&fit.residuals).map(|z| normal_qq(&z));
    if qq.is_none() {
        warn!("residuals have zero variance; Q-Q plot is undefined");
    }

    info!(
        time_block,
        hour = %block.hour,
        intercept = fit.intercept,
        slope = fit.slope,
        durbin_watson = ?durbin_watson,
        "diagnostics computed"
    );

    Ok(DiagnosticReport {
        source: source.to_string(),
        block,
        periods: table.periods().to_vec(),
        fit,
        durbin_watson,
        histogram,
        qq,
    })
}

impl DiagnosticReport {
    /// Linearity scatter, shown before the statistic is printed.
    pub fn linearity_figure(&self) -> Figure {
        Figure::linearity(&self.block)
    }

    /// Residual figures, shown after the statistic is printed: residuals vs.
    /// fitted, histogram, and the Q-Q plot when it is defined.
    pub fn residual_figures(&self) -> Vec<Figure> {
        let mut figures = vec![
            Figure::residuals_vs_fitted(&self.fit),
            Figure::residual_histogram(&self.histogram),
        ];
        if let Some(qq) = &self.qq {
            figures.push(Figure::normal_qq(qq));
        }
        figures
    }

    /// Pretty-printed JSON with camelCase keys.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError::Serialization`](tempo_core::TempoError::Serialization)
    /// if the report cannot be encoded.
    pub fn to_json(&self) -> tempo_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// GitHub-flavored Markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Regression Diagnostics\n\n");
        out.push_str(&format!("**Source:** `{}`\n", self.source));
        out.push_str(&format!(
            "**Time block:** {} (`{}`)\n",
            self.block.index, self.block.hour
        ));
        out.push_str(&format!("**Periods:** {}\n\n", self.periods.len()));

        out.push_str("| Term | Estimate |\n");
        out.push_str("|------|----------|\n");
        out.push_str(&format!("| Intercept | {:.6} |\n", self.fit.intercept));
        out.push_str(&format!("| Slope | {:.6} |\n", self.fit.slope));
        if let Some(r2) = self.fit.r_squared {
            out.push_str(&format!("| R² | {r2:.6} |\n"));
        }
        out.push('\n');

        out.push_str(&format!("{self}\n"));
        if self.qq.is_none() {
            out.push_str("\n_Q-Q plot omitted: residuals have zero variance._\n");
        }
        out
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlatReport<'a> {
    file: &'a str,
    time_block: usize,
    hour: &'a str,
    periods: &'a [String],
    values: &'a [f64],
    intercept: f64,
    slope: f64,
    r_squared: Option<f64>,
    durbin_watson: Option<f64>,
    residuals: &'a [f64],
    fitted: &'a [f64],
    histogram: &'a Histogram,
    qq: Option<&'a QqPlot>,
}

impl Serialize for DiagnosticReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlatReport {
            file: &self.source,
            time_block: self.block.index,
            hour: &self.block.hour,
            periods: &self.periods,
            values: &self.block.values,
            intercept: self.fit.intercept,
            slope: self.fit.slope,
            r_squared: self.fit.r_squared,
            durbin_watson: self.durbin_watson,
            residuals: &self.fit.residuals,
            fitted: &self.fit.fitted,
            histogram: &self.histogram,
            qq: self.qq.as_ref(),
        }
        .serialize(serializer)
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.durbin_watson {
            Some(dw) => write!(f, "Durbin-Watson statistic: {dw:?}"),
            None => write!(f, "Durbin-Watson statistic: undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::TempoError;
    use tempo_series::table::LoadOptions;

    fn table(csv: &str) -> SeriesTable {
        SeriesTable::from_reader(csv.as_bytes(), LoadOptions::default()).unwrap()
    }

    const COMMITS: &str = "\
hour,2023-Q1,2023-Q2,2023-Q3,2023-Q4,2024-Q1,2024-Q2
09:00,12,15,11,19,22,17
10:00,30,28,35,31,40,38
11:00,1,2,3,4,5,6
";

    #[test]
    fn analyze_selects_fits_and_diagnoses() {
        let report = analyze("commits.csv", &table(COMMITS), 1, 20).unwrap();
        assert_eq!(report.block.hour, "10:00");
        assert_eq!(report.block.values, vec![30.0, 28.0, 35.0, 31.0, 40.0, 38.0]);
        assert_eq!(report.periods.len(), 6);
        assert_eq!(report.fit.residuals.len(), 6);
        assert_eq!(report.histogram.counts.len(), 20);
        assert_eq!(report.histogram.total(), 6);
        assert!(report.durbin_watson.is_some());
        assert!(report.qq.is_some());
    }

    #[test]
    fn perfect_line_has_undefined_statistic_and_no_qq() {
        let report = analyze("commits.csv", &table(COMMITS), 2, 20).unwrap();
        assert_eq!(report.durbin_watson, None);
        assert!(report.qq.is_none());
        assert_eq!(report.to_string(), "Durbin-Watson statistic: undefined");
        assert_eq!(report.residual_figures().len(), 2);
    }

    #[test]
    fn display_prints_statistic() {
        let report = analyze("commits.csv", &table(COMMITS), 0, 20).unwrap();
        let dw = report.durbin_watson.unwrap();
        assert_eq!(report.to_string(), format!("Durbin-Watson statistic: {dw:?}"));
    }

    #[test]
    fn whole_number_statistic_keeps_decimal_point() {
        let mut report = analyze("commits.csv", &table(COMMITS), 0, 20).unwrap();
        report.durbin_watson = Some(3.0);
        assert_eq!(report.to_string(), "Durbin-Watson statistic: 3.0");
        report.durbin_watson = Some(2.0);
        assert_eq!(report.to_string(), "Durbin-Watson statistic: 2.0");
    }

    #[test]
    fn to_json_round_trips_through_serde_json() {
        let report = analyze("commits.csv", &table(COMMITS), 1, 20).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["hour"], "10:00");
        assert_eq!(json["periods"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn residual_figures_in_presentation_order() {
        let report = analyze("commits.csv", &table(COMMITS), 0, 20).unwrap();
        let titles: Vec<String> = report
            .residual_figures()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(
            titles,
            [
                "Residuals vs. Predicted Values",
                "Histogram of Residuals",
                "Normal Q-Q Plot"
            ]
        );
        assert_eq!(
            report.linearity_figure().title,
            "Scatter Plot of Time Periods vs. Frequencies"
        );
    }

    #[test]
    fn out_of_range_block_fails() {
        let err = analyze("commits.csv", &table(COMMITS), 3, 20).unwrap_err();
        assert!(matches!(
            err,
            TempoError::TimeBlockOutOfRange { index: 3, rows: 3 }
        ));
    }

    #[test]
    fn single_period_cannot_be_fitted() {
        let err = analyze("one.csv", &table("hour,A\n0h,4\n"), 0, 20).unwrap_err();
        assert!(matches!(err, TempoError::InsufficientData { found: 1, .. }));
    }

    #[test]
    fn repeated_runs_agree() {
        let t = table(COMMITS);
        let a = analyze("commits.csv", &t, 0, 20).unwrap();
        let b = analyze("commits.csv", &t, 0, 20).unwrap();
        assert_eq!(a.fit.intercept, b.fit.intercept);
        assert_eq!(a.fit.slope, b.fit.slope);
        assert_eq!(a.durbin_watson, b.durbin_watson);
    }

    #[test]
    fn markdown_has_coefficient_table() {
        let md = analyze("commits.csv", &table(COMMITS), 0, 20)
            .unwrap()
            .to_markdown();
        assert!(md.starts_with("# Regression Diagnostics"));
        assert!(md.contains("| Slope |"));
        assert!(md.contains("Durbin-Watson statistic: "));
    }

    #[test]
    fn json_is_flat_and_camel_case() {
        let report = analyze("commits.csv", &table(COMMITS), 0, 20).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["file"], "commits.csv");
        assert_eq!(json["timeBlock"], 0);
        assert_eq!(json["hour"], "09:00");
        assert_eq!(json["values"].as_array().unwrap().len(), 6);
        assert!(json["rSquared"].is_number());
        assert!(json["durbinWatson"].is_number());
        assert_eq!(json["histogram"]["counts"].as_array().unwrap().len(), 20);
        assert!(json["qq"]["theoretical"].is_array());
    }

    #[test]
    fn json_undefined_statistic_is_null() {
        let report = analyze("commits.csv", &table(COMMITS), 2, 20).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["durbinWatson"].is_null());
        assert!(json["qq"].is_null());
    }
}
