// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `check`, `build`, `inspect`
// and `delete`, and the shared data configuration flags.
//
// Configuration comes from an optional JSON file (--config);
// any flag given on the command line overrides the file.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::config::DataConfig;
use crate::domain::{batch::FloatPrecision, encoding::LossFunction};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate every configured split against the network geometry
    Check(ConfigArgs),

    /// Build and store padded mini-batches for a split
    Build(BuildArgs),

    /// Load a split's stored mini-batches and print their shapes
    Inspect(SplitArgs),

    /// Delete a split's stored mini-batches
    Delete(SplitArgs),
}

/// Data configuration shared by all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON file holding the data configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Source name of the training split
    #[arg(long)]
    pub train_data_name: Option<String>,

    /// Source name of the validation split
    #[arg(long)]
    pub valid_data_name: Option<String>,

    /// Source name of the test split
    #[arg(long)]
    pub test_data_name: Option<String>,

    /// Directory holding the raw split archives
    #[arg(long)]
    pub data_location: Option<PathBuf>,

    /// Directory the mini-batch archives are written to
    #[arg(long)]
    pub mini_batch_location: Option<PathBuf>,

    /// Number of samples per mini-batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Network layer widths, e.g. 39,120,62 (input first, output last)
    #[arg(long, value_delimiter = ',')]
    pub net_size: Option<Vec<usize>>,

    /// Loss function; `ctc` switches to CTC label targets
    #[arg(long, value_enum)]
    pub loss_function: Option<LossArg>,

    /// Float type of the stored tensors
    #[arg(long, value_enum)]
    pub precision: Option<PrecisionArg>,

    /// Seed for the training-split shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossArg {
    Mse,
    CrossEntropy,
    Ctc,
}

impl From<LossArg> for LossFunction {
    fn from(a: LossArg) -> Self {
        match a {
            LossArg::Mse          => LossFunction::Mse,
            LossArg::CrossEntropy => LossFunction::CrossEntropy,
            LossArg::Ctc          => LossFunction::Ctc,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionArg {
    F32,
    F64,
}

impl From<PrecisionArg> for FloatPrecision {
    fn from(a: PrecisionArg) -> Self {
        match a {
            PrecisionArg::F32 => FloatPrecision::F32,
            PrecisionArg::F64 => FloatPrecision::F64,
        }
    }
}

impl ConfigArgs {
    /// Load the config file (if any) and apply command-line overrides.
    /// The application layer never sees clap types.
    pub fn resolve(self) -> Result<DataConfig> {
        let mut cfg = match &self.config {
            Some(path) => DataConfig::from_file(path)?,
            None       => DataConfig::default(),
        };

        if let Some(v) = self.train_data_name     { cfg.train_data_name = Some(v); }
        if let Some(v) = self.valid_data_name     { cfg.valid_data_name = Some(v); }
        if let Some(v) = self.test_data_name      { cfg.test_data_name = Some(v); }
        if let Some(v) = self.data_location       { cfg.data_location = v; }
        if let Some(v) = self.mini_batch_location { cfg.mini_batch_location = v; }
        if let Some(v) = self.batch_size          { cfg.batch_size = v; }
        if let Some(v) = self.net_size            { cfg.net_size = v; }
        if let Some(v) = self.loss_function       { cfg.loss_function = v.into(); }
        if let Some(v) = self.precision           { cfg.precision = v.into(); }
        if let Some(v) = self.seed                { cfg.seed = Some(v); }

        Ok(cfg)
    }
}

/// Arguments for the `build` command
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Split to build: train, valid or test
    #[arg(long, required_unless_present = "all", conflicts_with = "all")]
    pub split: Option<String>,

    /// Build every split that has a data name configured
    #[arg(long)]
    pub all: bool,
}

/// Arguments for commands that act on one split
#[derive(Args, Debug)]
pub struct SplitArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// train, valid or test
    #[arg(long)]
    pub split: String,
}
