//! Load assembled datasets as model-ready matrices.
//!
//! Each entry point either regenerates the dataset from the raw partitions
//! (when configured) or reads the previously persisted CSV, then separates
//! feature columns from the bookkeeping columns (`id`, `date`, target).

use std::path::Path;

use anyhow::Context as _;
use nalgebra::{DMatrix, DVector};
use polars::prelude::DataFrame;
use tracing::info;

use crate::assemble::Assembler;
use crate::config::Config;
use crate::frame::{
    column_names, fill_missing, float_values, has_column, preview, read_csv, string_values,
};
use crate::schema::{
    COL_DATE, COL_ID, COL_TARGET, PREVIEW_ROWS, TEST_EXCLUDED_COLUMNS, TRAIN_EXCLUDED_COLUMNS,
};

#[derive(Debug, Clone)]
pub struct TrainValidateData {
    pub feature_names: Vec<String>,
    pub train_inputs: DMatrix<f64>,
    pub train_targets: DVector<f64>,
    /// Empty (0 x 0) when no validation split is configured.
    pub validate_inputs: DMatrix<f64>,
    pub validate_targets: DVector<f64>,
}

#[derive(Debug, Clone)]
pub struct TestData {
    pub feature_names: Vec<String>,
    pub inputs: DMatrix<f64>,
    pub ids: Vec<String>,
    pub dates: Vec<String>,
}

pub fn load_train_and_validate(cfg: &Config) -> anyhow::Result<TrainValidateData> {
    let datas = &cfg.datas;
    let (train, validate) = if datas.is_regenerate_train_and_validate_data {
        let tables = Assembler::new(cfg).generate_train_and_validate()?;
        (tables.train, datas.has_validate_split().then_some(tables.validate))
    } else {
        let train = read_persisted(&datas.generate_train_path)?;
        let validate = if datas.has_validate_split() {
            Some(read_persisted(&datas.generate_validate_path)?)
        } else {
            None
        };
        (train, validate)
    };

    if cfg.is_debug {
        info!("train head:\n{}", preview(&train, PREVIEW_ROWS));
        if let Some(v) = &validate {
            info!("validate head:\n{}", preview(v, PREVIEW_ROWS));
        }
    }

    let (feature_names, train_inputs) =
        feature_matrix(&train, &TRAIN_EXCLUDED_COLUMNS).context("train features")?;
    let train_targets = DVector::from_vec(float_values(&train, COL_TARGET)?);

    let (validate_inputs, validate_targets) = match &validate {
        Some(v) => {
            let (names, inputs) =
                feature_matrix(v, &TRAIN_EXCLUDED_COLUMNS).context("validate features")?;
            if names != feature_names {
                anyhow::bail!("validate feature columns differ from train feature columns");
            }
            (inputs, DVector::from_vec(float_values(v, COL_TARGET)?))
        }
        None => (DMatrix::zeros(0, 0), DVector::zeros(0)),
    };

    info!(
        train_rows = train_inputs.nrows(),
        validate_rows = validate_inputs.nrows(),
        features = feature_names.len(),
        "loaded train and validate data"
    );

    Ok(TrainValidateData {
        feature_names,
        train_inputs,
        train_targets,
        validate_inputs,
        validate_targets,
    })
}

pub fn load_test(cfg: &Config) -> anyhow::Result<TestData> {
    let datas = &cfg.datas;
    let test = if datas.is_regenerate_test_data {
        Assembler::new(cfg).generate_test()?
    } else {
        read_persisted(&datas.generate_test_path)?
    };

    if cfg.is_debug {
        info!("test head:\n{}", preview(&test, PREVIEW_ROWS));
    }

    let test = fill_missing(&test, 0.0)?;
    let (feature_names, inputs) =
        feature_matrix(&test, &TEST_EXCLUDED_COLUMNS).context("test features")?;
    let dates = string_values(&test, COL_DATE)?;
    let ids = string_values(&test, COL_ID)?;

    info!(
        rows = inputs.nrows(),
        features = feature_names.len(),
        "loaded test data"
    );

    Ok(TestData {
        feature_names,
        inputs,
        ids,
        dates,
    })
}

/// Every column except `excluded`, as a rows x features matrix.
///
/// Each excluded name other than `id` must be present, so a dataset
/// assembled from partitions without time-series tables fails here on
/// `date`. Missing cells come through as NaN.
pub fn feature_matrix(
    df: &DataFrame,
    excluded: &[&str],
) -> anyhow::Result<(Vec<String>, DMatrix<f64>)> {
    for name in excluded.iter().filter(|n| **n != COL_ID) {
        if !has_column(df, name) {
            anyhow::bail!("missing column: {name}");
        }
    }

    let names: Vec<String> = column_names(df)
        .into_iter()
        .filter(|n| !excluded.contains(&n.as_str()))
        .collect();
    let columns = names
        .iter()
        .map(|n| float_values(df, n))
        .collect::<anyhow::Result<Vec<Vec<f64>>>>()?;

    let inputs = DMatrix::from_fn(df.height(), names.len(), |r, c| columns[c][r]);
    Ok((names, inputs))
}

fn read_persisted(path: &Path) -> anyhow::Result<DataFrame> {
    read_csv(path).with_context(|| {
        format!(
            "load {} (enable regeneration to build it from the raw partitions)",
            path.display()
        )
    })
}
