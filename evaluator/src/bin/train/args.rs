use board::NUM_FEATURES;
use clap::{Parser, ValueEnum};
use evaluator::config::{NetworkConfig, OptimizerConfig, HIDDEN_SIZE};
use evaluator::version::DEFAULT_VERSIONS_DIR;
use evaluator::{EvalError, ParamsAdadelta};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerKind {
    Adamw,
    Adadelta,
    Sgd,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Evaluator Trainer")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Directory holding generated CSV files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory model versions are written to.
    #[arg(long, default_value = DEFAULT_VERSIONS_DIR)]
    pub versions_dir: PathBuf,

    /// Number of positions per training batch.
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Initial learning rate for optimizer.
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    #[arg(long, value_enum, default_value_t = OptimizerKind::Adamw)]
    pub optimizer: OptimizerKind,

    /// Maximum number of training epochs.
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Learning rate decay factor per epoch.
    #[arg(long, default_value_t = 0.95)]
    pub lr_decay: f64,

    /// Epochs without improvement before early stopping.
    #[arg(long, default_value_t = 3)]
    pub patience: u64,

    /// Enables sequence training along each line with this discount.
    #[arg(long)]
    pub discount: Option<f64>,

    /// Learning rate multiplier for sequence steps.
    #[arg(long, default_value_t = 0.1)]
    pub sequence_weight: f64,

    /// Fraction of lines for validation set.
    #[arg(long, default_value_t = 0.1)]
    pub val_ratio: f64,

    /// Fraction of lines for test set.
    #[arg(long, default_value_t = 0.05)]
    pub test_ratio: f64,

    /// Hidden layer widths, comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = vec![HIDDEN_SIZE, HIDDEN_SIZE])]
    pub hidden: Vec<usize>,

    /// Seed for the data split and shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl Args {
    pub fn network_config(&self) -> Result<NetworkConfig, EvalError> {
        NetworkConfig::new(NUM_FEATURES, self.hidden.clone())
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        let lr = self.learning_rate;
        match self.optimizer {
            OptimizerKind::Adamw => OptimizerConfig::default().with_learning_rate(lr),
            OptimizerKind::Adadelta => {
                let defaults = ParamsAdadelta::default();
                OptimizerConfig::Adadelta {
                    lr,
                    rho: defaults.rho,
                    eps: defaults.eps,
                    weight_decay: defaults.weight_decay,
                }
            }
            OptimizerKind::Sgd => OptimizerConfig::Sgd { lr },
        }
    }
}
