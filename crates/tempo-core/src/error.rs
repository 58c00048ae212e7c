use std::path::PathBuf;

/// Errors that can occur across the tempo crates.
///
/// Each variant wraps a specific failure domain. Library crates return this
/// type directly; the binary surfaces it as a `miette` report.
///
/// # Examples
///
/// ```
/// use tempo_core::TempoError;
///
/// let err = TempoError::TimeBlockOutOfRange { index: 24, rows: 24 };
/// assert!(err.to_string().contains("24"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TempoError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(tempo::io))]
    Io(#[from] std::io::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(tempo::file_not_found), help("check the path passed as FILE"))]
    FileNotFound(PathBuf),

    /// Malformed CSV that the reader could not tokenize.
    #[error("CSV error: {0}")]
    #[diagnostic(code(tempo::csv))]
    Csv(String),

    /// A data cell that does not parse as a number.
    #[error("invalid number {value:?} at line {line}, column {column}")]
    #[diagnostic(
        code(tempo::invalid_number),
        help("every cell after the hour label must be numeric")
    )]
    InvalidNumber {
        /// 1-based line in the input file.
        line: u64,
        /// 0-based column index.
        column: usize,
        /// The offending cell text.
        value: String,
    },

    /// A data row whose width differs from the header.
    #[error("row at line {line} has {found} cells, expected {expected}")]
    #[diagnostic(
        code(tempo::ragged_row),
        help("each row needs an hour label plus one value per period")
    )]
    RaggedRow {
        /// 1-based line in the input file.
        line: u64,
        /// Cells in the header row.
        expected: usize,
        /// Cells in the offending row.
        found: usize,
    },

    /// The header has no period columns after the label placeholder.
    #[error("header row has no period columns")]
    #[diagnostic(code(tempo::no_periods))]
    NoPeriods,

    /// The requested time block is past the last recorded row.
    #[error("time block {index} is out of range ({rows} rows recorded)")]
    #[diagnostic(
        code(tempo::time_block_out_of_range),
        help("pick a time block between 0 and the number of data rows minus one")
    )]
    TimeBlockOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of data rows available.
        rows: usize,
    },

    /// Too few observations to fit a model.
    #[error("insufficient data: need at least {needed} observations, found {found}")]
    #[diagnostic(code(tempo::insufficient_data))]
    InsufficientData {
        /// Minimum observations required.
        needed: usize,
        /// Observations supplied.
        found: usize,
    },

    /// Independent and dependent variables differ in length.
    #[error("dimension mismatch: x has {x_len} elements, y has {y_len}")]
    #[diagnostic(code(tempo::dimension_mismatch))]
    DimensionMismatch {
        /// Length of the regressor.
        x_len: usize,
        /// Length of the response.
        y_len: usize,
    },

    /// The design matrix is singular (all regressor values equal).
    #[error("design matrix is singular: the regressor has zero variance")]
    #[diagnostic(code(tempo::singular_design))]
    SingularDesign,

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(tempo::config))]
    Config(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(tempo::toml))]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(tempo::serialization))]
    Serialization(#[from] serde_json::Error),

    /// A plot backend failed to draw.
    #[error("render error: {0}")]
    #[diagnostic(code(tempo::render))]
    Render(String),

    /// The user pressed Ctrl+C while a figure was shown.
    #[error("interrupted")]
    #[diagnostic(code(tempo::interrupted))]
    Interrupted,
}
