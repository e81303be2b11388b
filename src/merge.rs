//! Per-date merge: one partition directory in, one wide feature table out.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::frame::{inner_join, read_indexed_csv, require_column};
use crate::regression::Regressor;
use crate::schema::{COL_DATE, COL_ID, CSV_EXTENSION, FILE_NON_TS, FILE_TARGET, TS_FILE_PREFIX};
use crate::transform::{clip_extremes, neutralize, normalize};
use crate::window::{extract, WindowStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Has `y.csv`; the target is joined in.
    Train,
    Test,
}

pub struct PartitionMerger<R> {
    regressor: R,
    clip_extreme_values: bool,
}

impl<R: Regressor> PartitionMerger<R> {
    pub fn new(regressor: R) -> Self {
        Self {
            regressor,
            clip_extreme_values: false,
        }
    }

    pub fn with_clip_extreme_values(mut self, enabled: bool) -> Self {
        self.clip_extreme_values = enabled;
        self
    }

    /// Build the merged frame for the partition at `dir`.
    ///
    /// Rows are the identifiers present in every joined table. The `date`
    /// column comes from the time-series tables, the last one (by file name)
    /// winning; a partition without time-series tables yields no `date`.
    pub fn merge(&mut self, dir: &Path, kind: PartitionKind) -> anyhow::Result<DataFrame> {
        let non_ts_path = dir.join(FILE_NON_TS);
        let mut non_ts = read_indexed_csv(&non_ts_path)?;
        let _ = non_ts.drop_in_place(COL_DATE);
        let mut non_ts = normalize(&self.prepare(non_ts)?)?;
        neutralize(&mut non_ts, &mut self.regressor)
            .with_context(|| format!("neutralize {}", non_ts_path.display()))?;

        let mut merged = match kind {
            PartitionKind::Test => non_ts,
            PartitionKind::Train => {
                let mut target = read_indexed_csv(&dir.join(FILE_TARGET))?;
                let _ = target.drop_in_place(COL_DATE);
                inner_join(&non_ts, &target)?
            }
        };

        let ts_paths = list_ts_files(dir)?;
        if ts_paths.is_empty() {
            warn!(
                partition = %dir.display(),
                "no time-series tables; merged table has no date column"
            );
        }

        for ts_path in ts_paths {
            let series = series_name(&ts_path)?;
            let mut ts = read_indexed_csv(&ts_path)?;
            let dates = ts
                .drop_in_place(COL_DATE)
                .map_err(|_| anyhow::anyhow!("missing column: {COL_DATE}"))
                .with_context(|| format!("load {}", ts_path.display()))?;
            let dates = DataFrame::new(vec![require_column(&ts, COL_ID)?.clone(), dates])?;
            let ts = normalize(&self.prepare(ts)?)?;

            for stat in WindowStat::ALL {
                let derived = extract(&ts, &series, stat)?;
                merged = inner_join(&merged, &derived).with_context(|| {
                    format!("join {} from {}", stat.column_name(&series), ts_path.display())
                })?;
            }
            let _ = merged.drop_in_place(COL_DATE);
            merged = inner_join(&merged, &dates)?;

            debug!(series = %series, rows = merged.height(), "merged time-series table");
        }

        Ok(merged)
    }

    fn prepare(&self, df: DataFrame) -> anyhow::Result<DataFrame> {
        if self.clip_extreme_values {
            clip_extremes(&df)
        } else {
            Ok(df)
        }
    }
}

/// `ts_*.csv` files in `dir`, sorted by file name.
pub fn list_ts_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("read dir entry in {}", dir.display()))?
            .path();
        let is_ts = path.is_file()
            && path.extension().is_some_and(|e| e == CSV_EXTENSION)
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TS_FILE_PREFIX));
        if is_ts {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Series name of a time-series file: its stem, e.g. `ts_price`.
fn series_name(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("bad time-series file name {}", path.display()))
}
