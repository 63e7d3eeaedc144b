use candle_core::backprop::GradStore;
use candle_core::{Result, Var};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, SGD};

use crate::config::OptimizerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamsAdadelta {
    pub lr: f64,
    pub rho: f64,
    pub eps: f64,
    pub weight_decay: f64,
}

impl Default for ParamsAdadelta {
    fn default() -> Self {
        Self {
            lr: 1.0,
            rho: 0.9,
            eps: 1e-6,
            weight_decay: 0.0,
        }
    }
}

#[derive(Debug)]
struct VarAdadelta {
    var: Var,
    square_avg: Var,
    acc_delta: Var,
}

/// Adadelta: per-parameter step sizes from running averages of squared
/// gradients and squared updates. Owns its accumulators, one pair per variable.
#[derive(Debug)]
pub struct Adadelta {
    vars: Vec<VarAdadelta>,
    params: ParamsAdadelta,
}

impl Optimizer for Adadelta {
    type Config = ParamsAdadelta;

    fn new(vars: Vec<Var>, params: ParamsAdadelta) -> Result<Self> {
        let vars = vars
            .into_iter()
            .filter(|var| var.dtype().is_float())
            .map(|var| -> Result<VarAdadelta> {
                let dtype = var.dtype();
                let shape = var.shape();
                let device = var.device();
                let square_avg = Var::zeros(shape, dtype, device)?;
                let acc_delta = Var::zeros(shape, dtype, device)?;
                Ok(VarAdadelta {
                    var,
                    square_avg,
                    acc_delta,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vars, params })
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        let ParamsAdadelta {
            lr,
            rho,
            eps,
            weight_decay,
        } = self.params;

        for var in self.vars.iter() {
            let theta = &var.var;
            let Some(g) = grads.get(theta) else {
                continue;
            };

            let g = if weight_decay != 0.0 {
                (g + (theta.as_tensor() * weight_decay)?)?
            } else {
                g.clone()
            };

            let square_avg =
                ((var.square_avg.as_tensor() * rho)? + (g.sqr()? * (1.0 - rho))?)?;
            let std = (&square_avg + eps)?.sqrt()?;
            let delta = (((var.acc_delta.as_tensor() + eps)?.sqrt()? / std)? * &g)?;
            let acc_delta =
                ((var.acc_delta.as_tensor() * rho)? + (delta.sqr()? * (1.0 - rho))?)?;

            var.square_avg.set(&square_avg)?;
            var.acc_delta.set(&acc_delta)?;
            theta.set(&(theta.as_tensor() - (delta * lr)?)?)?;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.params.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.params.lr = lr;
    }
}

/// Optimizer for one training session.
///
/// Built once from an [`OptimizerConfig`] over the evaluator's variables and
/// handed to every `train_*` call. Its moment/accumulator state lives here,
/// not on the evaluator.
pub enum SessionOptimizer {
    AdamW(AdamW),
    Adadelta(Adadelta),
    Sgd(SGD),
}

impl Optimizer for SessionOptimizer {
    type Config = OptimizerConfig;

    fn new(vars: Vec<Var>, config: OptimizerConfig) -> Result<Self> {
        let optimizer = match config {
            OptimizerConfig::AdamW { lr, weight_decay } => SessionOptimizer::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                },
            )?),
            OptimizerConfig::Adadelta {
                lr,
                rho,
                eps,
                weight_decay,
            } => SessionOptimizer::Adadelta(Adadelta::new(
                vars,
                ParamsAdadelta {
                    lr,
                    rho,
                    eps,
                    weight_decay,
                },
            )?),
            OptimizerConfig::Sgd { lr } => SessionOptimizer::Sgd(SGD::new(vars, lr)?),
        };
        Ok(optimizer)
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        match self {
            SessionOptimizer::AdamW(opt) => opt.step(grads),
            SessionOptimizer::Adadelta(opt) => opt.step(grads),
            SessionOptimizer::Sgd(opt) => opt.step(grads),
        }
    }

    fn learning_rate(&self) -> f64 {
        match self {
            SessionOptimizer::AdamW(opt) => opt.learning_rate(),
            SessionOptimizer::Adadelta(opt) => opt.learning_rate(),
            SessionOptimizer::Sgd(opt) => opt.learning_rate(),
        }
    }

    fn set_learning_rate(&mut self, lr: f64) {
        match self {
            SessionOptimizer::AdamW(opt) => opt.set_learning_rate(lr),
            SessionOptimizer::Adadelta(opt) => opt.set_learning_rate(lr),
            SessionOptimizer::Sgd(opt) => opt.set_learning_rate(lr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    // Minimises (w - 3)^2 for a single scalar weight.
    fn run<O: Optimizer>(config: O::Config, steps: usize) -> f32 {
        let w = Var::zeros((), DType::F32, &Device::Cpu).unwrap();
        let mut opt = O::new(vec![w.clone()], config).unwrap();
        for _ in 0..steps {
            let loss = (w.as_tensor() - 3.0).unwrap().sqr().unwrap();
            opt.backward_step(&loss).unwrap();
        }
        w.as_tensor().to_scalar::<f32>().unwrap()
    }

    #[test]
    fn test_adadelta_moves_towards_minimum() {
        let w = run::<Adadelta>(ParamsAdadelta::default(), 200);
        assert!(w > 0.0 && w <= 3.5, "w = {}", w);
    }

    #[test]
    fn test_session_optimizer_dispatches() {
        let w = run::<SessionOptimizer>(OptimizerConfig::Sgd { lr: 0.1 }, 100);
        assert!((w - 3.0).abs() < 1e-3, "w = {}", w);

        let mut opt = SessionOptimizer::new(
            vec![],
            OptimizerConfig::AdamW {
                lr: 0.01,
                weight_decay: 0.0,
            },
        )
        .unwrap();
        opt.set_learning_rate(0.005);
        assert_eq!(opt.learning_rate(), 0.005);
    }

    #[test]
    fn test_adadelta_state_is_per_variable() {
        let a = Var::new(&[1f32, 2.0], &Device::Cpu).unwrap();
        let b = Var::new(&[[0f32; 3]; 2], &Device::Cpu).unwrap();
        let opt = Adadelta::new(vec![a, b], ParamsAdadelta::default()).unwrap();

        assert_eq!(opt.vars.len(), 2);
        assert_eq!(opt.vars[1].square_avg.dims(), &[2, 3]);
    }
}
