//! Partition tables as polars data frames keyed by `id`.
//!
//! Every frame carries a string `id` column first. `date` is kept as a
//! string column; every other column is `f64` with nulls for missing cells.

use std::path::Path;

use anyhow::Context as _;
use polars::prelude::*;

use crate::schema::{COL_DATE, COL_ID};

const ROW_ORDER: &str = "__row_order";

/// Read a partition or dataset CSV.
///
/// Cells are read as strings, then every column other than `id` and `date`
/// is cast to `f64`. A non-empty cell that does not parse fails the load.
pub fn read_csv(path: &Path) -> anyhow::Result<DataFrame> {
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .with_context(|| format!("open {}", path.display()))?;

    if raw.column(COL_ID).is_err() {
        anyhow::bail!("{}: missing column: {COL_ID}", path.display());
    }

    let mut exprs = vec![col(COL_ID)];
    for name in raw.get_column_names() {
        match name.as_str() {
            COL_ID => {}
            COL_DATE => exprs.push(col(COL_DATE)),
            other => exprs.push(col(other).cast(DataType::Float64)),
        }
    }
    let typed = raw
        .clone()
        .lazy()
        .select(exprs)
        .collect()
        .with_context(|| format!("type columns of {}", path.display()))?;

    for column in typed.get_columns() {
        let name = column.name().as_str();
        if name == COL_ID || name == COL_DATE {
            continue;
        }
        if column.null_count() != raw.column(name)?.null_count() {
            anyhow::bail!("{}: column {name} is not numeric", path.display());
        }
    }
    Ok(typed)
}

/// [`read_csv`] for raw partition tables, which hold one row per identifier.
pub fn read_indexed_csv(path: &Path) -> anyhow::Result<DataFrame> {
    let df = read_csv(path)?;
    ensure_unique_ids(&df).with_context(|| format!("load {}", path.display()))?;
    Ok(df)
}

pub fn ensure_unique_ids(df: &DataFrame) -> anyhow::Result<()> {
    let unique = require_column(df, COL_ID)?
        .as_materialized_series()
        .n_unique()?;
    if unique != df.height() {
        anyhow::bail!("duplicate {COL_ID} values ({} rows, {unique} distinct)", df.height());
    }
    Ok(())
}

/// Write `df` with a header row, creating the parent directory.
pub fn write_csv(df: &DataFrame, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let mut file =
        std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df.clone())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// A frame with an empty `id` column and no rows.
pub fn empty() -> DataFrame {
    DataFrame::new(vec![Column::new(COL_ID.into(), Vec::<String>::new())]).unwrap_or_default()
}

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> anyhow::Result<&'a Column> {
    df.column(name)
        .map_err(|_| anyhow::anyhow!("missing column: {name}"))
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect()
}

/// `f64` columns in frame order; `id` and `date` never qualify.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::Float64)
        .map(|c| c.name().to_string())
        .collect()
}

/// Values of a numeric column; nulls come back as NaN.
pub fn float_values(df: &DataFrame, name: &str) -> anyhow::Result<Vec<f64>> {
    let values = require_column(df, name)?
        .f64()
        .with_context(|| format!("column {name} is not numeric"))?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Values of a string column; nulls come back empty.
pub fn string_values(df: &DataFrame, name: &str) -> anyhow::Result<Vec<String>> {
    let values = require_column(df, name)?
        .str()
        .with_context(|| format!("column {name} is not text"))?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// Inner join on `id`, keeping `left`'s row order and then `right`'s columns.
///
/// Columns other than `id` must not appear on both sides.
pub fn inner_join(left: &DataFrame, right: &DataFrame) -> anyhow::Result<DataFrame> {
    for name in right.get_column_names() {
        if name.as_str() != COL_ID && has_column(left, name.as_str()) {
            anyhow::bail!("column {name} present on both sides of join");
        }
    }

    let joined = left
        .with_row_index(ROW_ORDER.into(), None)?
        .lazy()
        .join(
            right.clone().lazy(),
            [col(COL_ID)],
            [col(COL_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    let mut ordered = joined.sort([ROW_ORDER], SortMultipleOptions::default())?;
    ordered.drop_in_place(ROW_ORDER)?;
    Ok(ordered)
}

/// Stack frames vertically, taking the union of their columns.
///
/// Columns missing from a frame are null for its rows. Identifiers may
/// repeat across frames.
pub fn concat(frames: Vec<DataFrame>) -> anyhow::Result<DataFrame> {
    if frames.is_empty() {
        return Ok(empty());
    }
    let lazy: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
    Ok(concat_lf_diagonal(lazy, UnionArgs::default())?.collect()?)
}

/// Replace missing numeric cells with `value`.
pub fn fill_missing(df: &DataFrame, value: f64) -> anyhow::Result<DataFrame> {
    let exprs: Vec<Expr> = numeric_column_names(df)
        .iter()
        .map(|n| col(n.as_str()).fill_null(lit(value)).fill_nan(lit(value)))
        .collect();
    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}

pub fn preview(df: &DataFrame, rows: usize) -> DataFrame {
    df.head(Some(rows))
}
