//! Column transforms applied to raw partition tables before merging.

use anyhow::Context as _;
use polars::prelude::*;

use crate::frame::{float_values, numeric_column_names};
use crate::regression::Regressor;
use crate::schema::COL_FLAG;

/// Min-max scale every numeric column to `[0, 1]`.
///
/// Missing cells are ignored when finding min/max. Any result that is not a
/// number (constant column, missing input) becomes 0. `id` and `date` are
/// kept as-is.
pub fn normalize(df: &DataFrame) -> anyhow::Result<DataFrame> {
    let exprs: Vec<Expr> = numeric_column_names(df)
        .iter()
        .map(|name| {
            let c = col(name.as_str());
            ((c.clone() - c.clone().min()) / (c.clone().max() - c.min()))
                .fill_nan(lit(0.0))
                .fill_null(lit(0.0))
                .alias(name.as_str())
        })
        .collect();
    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}

/// Replace every numeric column except `flag` by its residual against
/// `flag`, in place.
pub fn neutralize<R: Regressor + ?Sized>(
    df: &mut DataFrame,
    regressor: &mut R,
) -> anyhow::Result<()> {
    let flag = float_values(df, COL_FLAG)?;

    for name in numeric_column_names(df) {
        if name == COL_FLAG {
            continue;
        }
        let values = float_values(df, &name)?;
        regressor
            .fit(&flag, &values)
            .with_context(|| format!("neutralize {name} against {COL_FLAG}"))?;
        let predicted = regressor.predict(&flag)?;
        let residuals: Vec<f64> = values.iter().zip(predicted).map(|(v, p)| v - p).collect();
        df.with_column(Column::new(name.as_str().into(), residuals))?;
    }
    Ok(())
}

/// Clamp each numeric column into `mean ± 3·std` (sample std).
///
/// Missing cells stay missing. Columns with fewer than two values are left
/// unchanged.
pub fn clip_extremes(df: &DataFrame) -> anyhow::Result<DataFrame> {
    let exprs: Vec<Expr> = numeric_column_names(df)
        .iter()
        .map(|name| {
            let c = col(name.as_str());
            let spread = lit(3.0) * c.clone().std(1);
            let lo = c.clone().mean() - spread.clone();
            let hi = c.clone().mean() + spread;
            when(c.clone().lt(lo.clone()))
                .then(lo)
                .when(c.clone().gt(hi.clone()))
                .then(hi)
                .otherwise(c)
                .alias(name.as_str())
        })
        .collect();
    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}
