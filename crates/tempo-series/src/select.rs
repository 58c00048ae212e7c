//! Time-block selection across periods.

use serde::Serialize;
use tempo_core::TempoError;
use tracing::debug;

use crate::table::SeriesTable;

/// One hourly slice taken from every period.
///
/// `values[p]` is the value recorded for period `p` at row `index`.
///
/// # Examples
///
/// ```
/// use tempo_series::select::TimeBlock;
///
/// let block = TimeBlock {
///     index: 10,
///     hour: "10:00".into(),
///     values: vec![4.0, 6.0, 5.0],
/// };
/// assert_eq!(block.points(), vec![(0.0, 4.0), (1.0, 6.0), (2.0, 5.0)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    /// Row index of the block.
    pub index: usize,
    /// Hour label of the row.
    pub hour: String,
    /// One value per period, in period order.
    pub values: Vec<f64>,
}

impl TimeBlock {
    /// Period indices `0..P` as regressor values.
    pub fn period_indices(&self) -> Vec<f64> {
        (0..self.values.len()).map(|i| i as f64).collect()
    }

    /// `(period index, value)` pairs.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect()
    }
}

/// Pick row `index` from every period series.
///
/// # Errors
///
/// Returns [`TempoError::TimeBlockOutOfRange`] if `index` is not below the
/// table's row count. Indices never wrap or truncate.
///
/// # Examples
///
/// ```
/// use tempo_series::select::select_time_block;
/// use tempo_series::table::{LoadOptions, SeriesTable};
///
/// let csv = "hour,A,B,C\n0h,1,2,3\n1h,4,5,6\n";
/// let table = SeriesTable::from_reader(csv.as_bytes(), LoadOptions::default()).unwrap();
/// let block = select_time_block(&table, 1).unwrap();
/// assert_eq!(block.values, vec![4.0, 5.0, 6.0]);
/// assert_eq!(block.hour, "1h");
/// ```
pub fn select_time_block(table: &SeriesTable, index: usize) -> Result<TimeBlock, TempoError> {
    let rows = table.row_count();
    let out_of_range = TempoError::TimeBlockOutOfRange { index, rows };

    let hour = table.hours().get(index).ok_or(out_of_range)?.clone();
    let values = table
        .iter_series()
        .map(|series| {
            series
                .get(index)
                .copied()
                .ok_or(TempoError::TimeBlockOutOfRange { index, rows })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(index, hour = %hour, periods = values.len(), "selected time block");

    Ok(TimeBlock {
        index,
        hour,
        values,
    })
}
