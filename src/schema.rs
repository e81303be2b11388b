pub const FILE_NON_TS: &str = "non_ts.csv";
pub const FILE_TARGET: &str = "y.csv";

/// Time-series tables are `ts_<name>.csv`; the series name keeps the prefix.
pub const TS_FILE_PREFIX: &str = "ts_";
pub const CSV_EXTENSION: &str = "csv";

pub const COL_ID: &str = "id";
pub const COL_DATE: &str = "date";
pub const COL_FLAG: &str = "flag";
pub const COL_TARGET: &str = "y";

pub const SUFFIX_STD: &str = "_std";
pub const SUFFIX_MEAN_0_5: &str = "_mean_0_5";
pub const SUFFIX_MEAN_0_20: &str = "_mean_0_20";

/// Partitions kept per side when `is_debug` is set.
pub const DEBUG_PARTITION_LIMIT: usize = 10;

/// Rows shown by debug table previews.
pub const PREVIEW_ROWS: usize = 5;

pub const TRAIN_EXCLUDED_COLUMNS: [&str; 3] = [COL_ID, COL_DATE, COL_TARGET];
pub const TEST_EXCLUDED_COLUMNS: [&str; 2] = [COL_DATE, COL_ID];
