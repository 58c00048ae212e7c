use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output format for the diagnostic report.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use tempo_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The single `Durbin-Watson statistic:` line.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// How diagnostic plots are presented.
///
/// `Auto` resolves to [`RenderMode::Terminal`] on an interactive stdout and
/// to [`RenderMode::None`] otherwise; see [`RenderMode::resolve`].
///
/// # Examples
///
/// ```
/// use tempo_core::RenderMode;
///
/// let mode: RenderMode = "tui".parse().unwrap();
/// assert_eq!(mode, RenderMode::Terminal);
/// assert_eq!(RenderMode::Auto.resolve(false), RenderMode::None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Pick based on whether stdout is a terminal.
    #[default]
    Auto,
    /// Full-screen interactive charts, one at a time.
    Terminal,
    /// Plain tables written to stderr.
    Text,
    /// Skip plotting entirely.
    None,
}

impl RenderMode {
    /// Resolve `Auto` against the terminal state; other modes pass through.
    pub fn resolve(self, is_terminal: bool) -> Self {
        match self {
            RenderMode::Auto if is_terminal => RenderMode::Terminal,
            RenderMode::Auto => RenderMode::None,
            other => other,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Auto => write!(f, "auto"),
            RenderMode::Terminal => write!(f, "terminal"),
            RenderMode::Text => write!(f, "text"),
            RenderMode::None => write!(f, "none"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(RenderMode::Auto),
            "terminal" | "tui" => Ok(RenderMode::Terminal),
            "text" => Ok(RenderMode::Text),
            "none" | "off" => Ok(RenderMode::None),
            other => Err(format!("unknown render mode: {other}")),
        }
    }
}
