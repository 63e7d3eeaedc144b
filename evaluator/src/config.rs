use board::NUM_FEATURES;

use crate::error::EvalError;

/// Default size of each hidden layer.
pub const HIDDEN_SIZE: usize = 256;

/// Most hidden layers a network may have (three linear layers in total).
pub const MAX_HIDDEN_LAYERS: usize = 2;

/// Network shape: `input_width -> hidden_widths.. -> 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub input_width: usize,
    pub hidden_widths: Vec<usize>,
}

impl NetworkConfig {
    pub fn new(input_width: usize, hidden_widths: Vec<usize>) -> Result<Self, EvalError> {
        let config = Self {
            input_width,
            hidden_widths,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.input_width == 0 {
            return Err(EvalError::InvalidConfig("input width must be positive".into()));
        }
        if self.hidden_widths.is_empty() || self.hidden_widths.len() > MAX_HIDDEN_LAYERS {
            return Err(EvalError::InvalidConfig(format!(
                "expected 1 to {} hidden layers, got {}",
                MAX_HIDDEN_LAYERS,
                self.hidden_widths.len()
            )));
        }
        if self.hidden_widths.contains(&0) {
            return Err(EvalError::InvalidConfig("hidden widths must be positive".into()));
        }
        Ok(())
    }

    /// Architecture signature: every layer width from input to the single output.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.hidden_widths.len() + 2);
        widths.push(self.input_width);
        widths.extend_from_slice(&self.hidden_widths);
        widths.push(1);
        widths
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_width: NUM_FEATURES,
            hidden_widths: vec![HIDDEN_SIZE, HIDDEN_SIZE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizerConfig {
    AdamW { lr: f64, weight_decay: f64 },
    Adadelta { lr: f64, rho: f64, eps: f64, weight_decay: f64 },
    Sgd { lr: f64 },
}

impl OptimizerConfig {
    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::AdamW { lr, .. } => lr,
            OptimizerConfig::Adadelta { lr, .. } => lr,
            OptimizerConfig::Sgd { lr } => lr,
        }
    }

    /// Same optimizer and hyperparameters with another learning rate.
    pub fn with_learning_rate(self, lr: f64) -> Self {
        match self {
            OptimizerConfig::AdamW { weight_decay, .. } => OptimizerConfig::AdamW { lr, weight_decay },
            OptimizerConfig::Adadelta {
                rho,
                eps,
                weight_decay,
                ..
            } => OptimizerConfig::Adadelta {
                lr,
                rho,
                eps,
                weight_decay,
            },
            OptimizerConfig::Sgd { .. } => OptimizerConfig::Sgd { lr },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::AdamW {
            lr: 0.001,
            weight_decay: 0.01,
        }
    }
}
