use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsfeat::config::Config;
use tsfeat::loader;

#[derive(Parser, Debug)]
#[command(
    name = "tsfeat",
    version,
    about = "Build train/validate/test feature datasets from date partitions"
)]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Truncate partition lists and log table previews.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load (or rebuild) the train and validate datasets.
    Train {
        /// Rebuild from the raw partitions instead of reading persisted files.
        #[arg(long)]
        regenerate: bool,
    },
    /// Load (or rebuild) the test dataset.
    Test {
        #[arg(long)]
        regenerate: bool,
    },
}

/// Command-line flags only ever switch config options on.
fn apply_overrides(cfg: &mut Config, args: &Args) {
    cfg.is_debug |= args.debug;
    match args.command {
        Command::Train { regenerate } => {
            cfg.datas.is_regenerate_train_and_validate_data |= regenerate;
        }
        Command::Test { regenerate } => cfg.datas.is_regenerate_test_data |= regenerate,
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config).context("load config")?;
    apply_overrides(&mut cfg, &args);

    match args.command {
        Command::Train { .. } => {
            let data = loader::load_train_and_validate(&cfg).context("train/validate data")?;
            info!(
                features = data.feature_names.len(),
                train_rows = data.train_inputs.nrows(),
                validate_rows = data.validate_inputs.nrows(),
                "done"
            );
            println!("features={}", data.feature_names.len());
            println!("train_rows={}", data.train_inputs.nrows());
            println!("validate_rows={}", data.validate_inputs.nrows());
        }
        Command::Test { .. } => {
            let data = loader::load_test(&cfg).context("test data")?;
            info!(
                features = data.feature_names.len(),
                rows = data.inputs.nrows(),
                "done"
            );
            println!("features={}", data.feature_names.len());
            println!("test_rows={}", data.inputs.nrows());
            println!("ids={}", data.ids.len());
        }
    }
    Ok(())
}
