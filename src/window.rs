//! Windowed statistics over a time-series table's offset columns.
//!
//! After the `date` column is removed, the numeric columns of a time-series
//! table are offsets 0, 1, 2, ... with offset 0 being "today". Every
//! statistic skips offset 0. Windows running past the last column are cut
//! short without error.

use std::ops::Range;

use polars::prelude::{Column, DataFrame};

use crate::frame::{numeric_column_names, require_column};
use crate::schema::{COL_ID, SUFFIX_MEAN_0_20, SUFFIX_MEAN_0_5, SUFFIX_STD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStat {
    /// Sample standard deviation over offsets `1..`.
    Std,
    /// Mean over offsets `1..6`.
    Mean0To5,
    /// Mean over offsets `1..21`.
    Mean0To20,
}

impl WindowStat {
    pub const ALL: [WindowStat; 3] = [
        WindowStat::Std,
        WindowStat::Mean0To5,
        WindowStat::Mean0To20,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            WindowStat::Std => SUFFIX_STD,
            WindowStat::Mean0To5 => SUFFIX_MEAN_0_5,
            WindowStat::Mean0To20 => SUFFIX_MEAN_0_20,
        }
    }

    /// Requested offsets; clamped to the available columns by [`extract`].
    pub fn offsets(self) -> Range<usize> {
        match self {
            WindowStat::Std => 1..usize::MAX,
            WindowStat::Mean0To5 => 1..6,
            WindowStat::Mean0To20 => 1..21,
        }
    }

    pub fn column_name(self, series: &str) -> String {
        format!("{series}{}", self.suffix())
    }

    fn apply(self, values: &[f64]) -> f64 {
        match self {
            WindowStat::Std => sample_std(values),
            WindowStat::Mean0To5 | WindowStat::Mean0To20 => mean(values),
        }
    }
}

/// Compute `stat` per identifier; returns `id` plus one column named
/// `<series><suffix>`. Windows with nothing to summarize give nulls.
pub fn extract(ts: &DataFrame, series: &str, stat: WindowStat) -> anyhow::Result<DataFrame> {
    let offsets = numeric_column_names(ts);
    let requested = stat.offsets();
    let window = requested.start.min(offsets.len())..requested.end.min(offsets.len());
    let columns = offsets[window]
        .iter()
        .map(|name| -> anyhow::Result<_> { Ok(require_column(ts, name)?.f64()?) })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut row: Vec<f64> = Vec::with_capacity(columns.len());
    let values: Vec<Option<f64>> = (0..ts.height())
        .map(|i| {
            row.clear();
            row.extend(columns.iter().map(|c| c.get(i).unwrap_or(f64::NAN)));
            let v = stat.apply(&row);
            (!v.is_nan()).then_some(v)
        })
        .collect();

    let ids = require_column(ts, COL_ID)?.clone();
    let derived = Column::new(stat.column_name(series).into(), values);
    Ok(DataFrame::new(vec![ids, derived])?)
}

pub fn std_dev(ts: &DataFrame, series: &str) -> anyhow::Result<DataFrame> {
    extract(ts, series, WindowStat::Std)
}

pub fn mean_0_5(ts: &DataFrame, series: &str) -> anyhow::Result<DataFrame> {
    extract(ts, series, WindowStat::Mean0To5)
}

pub fn mean_0_20(ts: &DataFrame, series: &str) -> anyhow::Result<DataFrame> {
    extract(ts, series, WindowStat::Mean0To20)
}

/// Mean of the non-missing values; NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Sample standard deviation (n - 1) of the non-missing values; NaN below two.
pub fn sample_std(values: &[f64]) -> f64 {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.len() < 2 {
        return f64::NAN;
    }
    let m = mean(&present);
    let ss: f64 = present.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (present.len() - 1) as f64).sqrt()
}
