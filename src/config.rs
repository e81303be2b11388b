use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Truncates partition lists and logs table previews.
    #[serde(default)]
    pub is_debug: bool,
    #[serde(default)]
    pub datas: DatasConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let cfg: Config =
            toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let v = self.datas.split_validate_size;
        if !v.is_finite() || !(0.0..1.0).contains(&v) {
            anyhow::bail!("datas.split_validate_size must be finite in [0, 1), got {v}");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatasConfig {
    /// One subdirectory per date, each with `non_ts.csv`, `y.csv`, `ts_*.csv`.
    #[serde(default = "default_origin_train_path")]
    pub origin_train_path: PathBuf,
    /// Same layout as the train root, without `y.csv`.
    #[serde(default = "default_origin_test_path")]
    pub origin_test_path: PathBuf,
    #[serde(default = "default_generate_train_path")]
    pub generate_train_path: PathBuf,
    #[serde(default = "default_generate_validate_path")]
    pub generate_validate_path: PathBuf,
    #[serde(default = "default_generate_test_path")]
    pub generate_test_path: PathBuf,
    #[serde(default)]
    pub is_regenerate_train_and_validate_data: bool,
    /// Trailing fraction of dates held out for validation. `0` disables the split.
    #[serde(default = "default_split_validate_size")]
    pub split_validate_size: f64,
    #[serde(default)]
    pub is_regenerate_test_data: bool,
    /// Clamp raw columns to mean ± 3 std before normalization.
    #[serde(default)]
    pub clip_extreme_values: bool,
}

impl DatasConfig {
    pub fn has_validate_split(&self) -> bool {
        self.split_validate_size > 0.0
    }
}

impl Default for DatasConfig {
    fn default() -> Self {
        Self {
            origin_train_path: default_origin_train_path(),
            origin_test_path: default_origin_test_path(),
            generate_train_path: default_generate_train_path(),
            generate_validate_path: default_generate_validate_path(),
            generate_test_path: default_generate_test_path(),
            is_regenerate_train_and_validate_data: false,
            split_validate_size: default_split_validate_size(),
            is_regenerate_test_data: false,
            clip_extreme_values: false,
        }
    }
}

fn default_origin_train_path() -> PathBuf {
    PathBuf::from("datas/origin/train")
}

fn default_origin_test_path() -> PathBuf {
    PathBuf::from("datas/origin/test")
}

fn default_generate_train_path() -> PathBuf {
    PathBuf::from("datas/train.csv")
}

fn default_generate_validate_path() -> PathBuf {
    PathBuf::from("datas/validate.csv")
}

fn default_generate_test_path() -> PathBuf {
    PathBuf::from("datas/test.csv")
}

fn default_split_validate_size() -> f64 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            is_debug = true

            [datas]
            origin_train_path = "raw/train"
            split_validate_size = 0.3
            is_regenerate_train_and_validate_data = true
            "#,
        )
        .unwrap();

        assert!(cfg.is_debug);
        assert_eq!(cfg.datas.origin_train_path, PathBuf::from("raw/train"));
        assert_eq!(cfg.datas.generate_test_path, PathBuf::from("datas/test.csv"));
        assert!(cfg.datas.is_regenerate_train_and_validate_data);
        assert!(!cfg.datas.is_regenerate_test_data);
        assert!(!cfg.datas.clip_extreme_values);
        assert!(cfg.datas.has_validate_split());
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_split() {
        for bad in [-0.1, 1.0, f64::NAN] {
            let mut cfg = Config::default();
            cfg.datas.split_validate_size = bad;
            assert!(cfg.validate().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn zero_split_disables_validation() {
        let mut cfg = Config::default();
        cfg.datas.split_validate_size = 0.0;
        cfg.validate().unwrap();
        assert!(!cfg.datas.has_validate_split());
    }
}
