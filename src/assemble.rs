//! Dataset assembly: merge every date partition and persist the results.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use polars::prelude::DataFrame;
use tracing::info;

use crate::config::Config;
use crate::frame::{concat, write_csv};
use crate::merge::{PartitionKind, PartitionMerger};
use crate::progress::track;
use crate::regression::{OrdinaryLeastSquares, Regressor};
use crate::schema::DEBUG_PARTITION_LIMIT;

#[derive(Debug, Clone)]
pub struct TrainValidateTables {
    pub train: DataFrame,
    pub validate: DataFrame,
    pub train_partitions: Vec<PathBuf>,
    pub validate_partitions: Vec<PathBuf>,
}

pub struct Assembler<'a, R> {
    cfg: &'a Config,
    merger: PartitionMerger<R>,
}

impl<'a> Assembler<'a, OrdinaryLeastSquares> {
    pub fn new(cfg: &'a Config) -> Self {
        Self::with_regressor(cfg, OrdinaryLeastSquares::new())
    }
}

impl<'a, R: Regressor> Assembler<'a, R> {
    pub fn with_regressor(cfg: &'a Config, regressor: R) -> Self {
        let merger =
            PartitionMerger::new(regressor).with_clip_extreme_values(cfg.datas.clip_extreme_values);
        Self { cfg, merger }
    }

    /// Merge the train root, split by date order, and write both outputs.
    pub fn generate_train_and_validate(&mut self) -> anyhow::Result<TrainValidateTables> {
        let cfg = self.cfg;
        let datas = &cfg.datas;
        let mut partitions = self.partitions(&datas.origin_train_path)?;
        let split = split_index(partitions.len(), datas.split_validate_size);
        if split == 0 && !partitions.is_empty() {
            anyhow::bail!(
                "no partitions routed to training: {} partitions at split_validate_size={}",
                partitions.len(),
                datas.split_validate_size
            );
        }
        info!(
            partitions = partitions.len(),
            train = split,
            validate = partitions.len() - split,
            "assembling train and validate data"
        );

        let mut train_parts: Vec<DataFrame> = Vec::with_capacity(split);
        let mut validate_parts: Vec<DataFrame> = Vec::with_capacity(partitions.len() - split);
        for (index, dir) in track("merge train partitions", partitions.iter().enumerate()) {
            let merged = self
                .merger
                .merge(dir, PartitionKind::Train)
                .with_context(|| format!("merge partition {}", dir.display()))?;
            if index < split {
                train_parts.push(merged);
            } else {
                validate_parts.push(merged);
            }
        }

        let train = concat(train_parts).context("concat train partitions")?;
        let validate = concat(validate_parts).context("concat validate partitions")?;

        write_csv(&train, &datas.generate_train_path)?;
        write_csv(&validate, &datas.generate_validate_path)?;
        info!(
            train_rows = train.height(),
            validate_rows = validate.height(),
            train_path = %datas.generate_train_path.display(),
            validate_path = %datas.generate_validate_path.display(),
            "wrote train and validate data"
        );

        let validate_partitions = partitions.split_off(split);
        Ok(TrainValidateTables {
            train,
            validate,
            train_partitions: partitions,
            validate_partitions,
        })
    }

    /// Merge every partition of the test root and write one output.
    pub fn generate_test(&mut self) -> anyhow::Result<DataFrame> {
        let cfg = self.cfg;
        let datas = &cfg.datas;
        let partitions = self.partitions(&datas.origin_test_path)?;
        info!(partitions = partitions.len(), "assembling test data");

        let mut parts: Vec<DataFrame> = Vec::with_capacity(partitions.len());
        for dir in track("merge test partitions", partitions.iter()) {
            let merged = self
                .merger
                .merge(dir, PartitionKind::Test)
                .with_context(|| format!("merge partition {}", dir.display()))?;
            parts.push(merged);
        }

        let test = concat(parts).context("concat test partitions")?;
        write_csv(&test, &datas.generate_test_path)?;
        info!(
            rows = test.height(),
            path = %datas.generate_test_path.display(),
            "wrote test data"
        );
        Ok(test)
    }

    fn partitions(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut partitions = list_partitions(root)?;
        if self.cfg.is_debug {
            partitions.truncate(DEBUG_PARTITION_LIMIT);
        }
        Ok(partitions)
    }
}

/// Subdirectories of `root`, sorted by name (dates sort lexicographically).
pub fn list_partitions(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let entries =
        std::fs::read_dir(root).with_context(|| format!("read dir {}", root.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read dir entry in {}", root.display()))?
            .path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Number of leading partitions routed to training:
/// `floor(count * (1 - validate_fraction))`.
pub fn split_index(count: usize, validate_fraction: f64) -> usize {
    let split = (count as f64 * (1.0 - validate_fraction)).floor();
    (split.max(0.0) as usize).min(count)
}
