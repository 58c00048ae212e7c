//! Trend regression and residual diagnostics.
//!
//! [`ols`] fits a straight line through one value per period; the
//! [`diagnostics`] module checks the usual linear-regression assumptions on
//! the residuals: independence, constant variance, and normality.

pub mod diagnostics;
pub mod ols;
