use std::collections::HashMap;
use std::path::Path;
use std::sync::MutexGuard;

use board::{encode_board, Board};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{Module, Optimizer, VarBuilder, VarMap};

use crate::config::{NetworkConfig, OptimizerConfig};
use crate::error::EvalError;
use crate::loss::{discounted_sequence_loss, l1, mean_l1};
use crate::network::{CpuNetwork, LayerDescriptor, Network, ARCHITECTURE_KEY};
use crate::optimizer::SessionOptimizer;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    /// Freshly constructed with random parameters.
    Untrained,
    /// At least one gradient step taken, or parameters loaded from disk.
    Trained,
}

/// Feed-forward position evaluator.
///
/// Owns its parameters exclusively. All operations are synchronous; gradient
/// steps mutate the parameters in place, so an evaluator shared between
/// threads must sit behind a `Mutex` (or be owned by a single trainer task).
pub struct Evaluator {
    config: NetworkConfig,
    varmap: VarMap,
    network: Network,
    device: Device,
    state: EvaluatorState,
}

impl Evaluator {
    pub fn new(config: NetworkConfig, device: &Device) -> Result<Self> {
        config.validate()?;

        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let network = Network::new(&config, &vs)?;

        log::debug!("Created evaluator with widths {:?}", config.widths());

        Ok(Self {
            config,
            varmap,
            network,
            device: device.clone(),
            state: EvaluatorState::Untrained,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn descriptors(&self) -> &[LayerDescriptor] {
        self.network.descriptors()
    }

    /// Copies the current parameters out into a tensor-free network.
    pub fn snapshot(&self) -> Result<CpuNetwork> {
        Ok(CpuNetwork::from_network(&self.network)?)
    }

    /// Creates the optimizer for a training session over this evaluator's parameters.
    pub fn optimizer(&self, config: OptimizerConfig) -> Result<SessionOptimizer> {
        Ok(SessionOptimizer::new(self.varmap.all_vars(), config)?)
    }

    pub fn evaluate(&self, vector: &[f32]) -> Result<f32> {
        let x = self.to_batch(&[vector])?;
        let score = self.network.forward(&x)?.reshape(())?.to_scalar::<f32>()?;
        Ok(score)
    }

    pub fn evaluate_batch<V: AsRef<[f32]>>(&self, vectors: &[V]) -> Result<Vec<f32>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        let x = self.to_batch(vectors)?;
        Ok(self.network.forward(&x)?.flatten_all()?.to_vec1::<f32>()?)
    }

    pub fn evaluate_board(&self, board: &Board) -> Result<f32> {
        let features = encode_board(board)?;
        self.evaluate(&features)
    }

    /// One step on the absolute error against `target`. Returns the loss before the step.
    pub fn train_single<O: Optimizer>(
        &mut self,
        opt: &mut O,
        vector: &[f32],
        target: f32,
    ) -> Result<f32> {
        let x = self.to_batch(&[vector])?;
        let y = Tensor::new(&[[target]], &self.device)?;

        let preds = self.network.forward(&x)?;
        let loss = l1(&preds, &y)?;
        self.step(opt, &loss)
    }

    /// One step on the mean absolute error over the batch.
    pub fn train_batch<O: Optimizer, V: AsRef<[f32]>>(
        &mut self,
        opt: &mut O,
        vectors: &[V],
        targets: &[f32],
    ) -> Result<f32> {
        if vectors.is_empty() || vectors.len() != targets.len() {
            return Err(EvalError::ShapeMismatch {
                expected: format!("{} targets for a non-empty batch", vectors.len()),
                actual: format!("{} vectors, {} targets", vectors.len(), targets.len()),
            });
        }

        let x = self.to_batch(vectors)?;
        let y = Tensor::from_slice(targets, (targets.len(), 1), &self.device)?;

        let preds = self.network.forward(&x)?;
        let loss = mean_l1(&preds, &y)?;
        self.step(opt, &loss)
    }

    /// One step on the discounted adjacent-difference loss along a line of play.
    ///
    /// `vectors` are consecutive positions. Returns the full folded loss (see
    /// [`discounted_sequence_loss`]).
    pub fn train_sequence<O: Optimizer, V: AsRef<[f32]>>(
        &mut self,
        opt: &mut O,
        vectors: &[V],
        discount: f64,
    ) -> Result<f32> {
        if !(0.0..=1.0).contains(&discount) {
            return Err(EvalError::InvalidConfig(format!(
                "discount must be within [0, 1], got {}",
                discount
            )));
        }
        if vectors.len() < 2 {
            return Err(EvalError::ShapeMismatch {
                expected: "sequence of at least 2 positions".into(),
                actual: format!("{} positions", vectors.len()),
            });
        }

        let x = self.to_batch(vectors)?;
        let scores = self.network.forward(&x)?;
        let loss = discounted_sequence_loss(&scores, discount)?;
        self.step(opt, &loss)
    }

    /// Writes every parameter plus the architecture signature as safetensors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let mut tensors: HashMap<String, Tensor> = self
            .parameters()?
            .iter()
            .map(|(name, var)| (name.clone(), var.as_tensor().clone()))
            .collect();
        tensors.insert(ARCHITECTURE_KEY.to_string(), self.signature()?);

        candle_core::safetensors::save(&tensors, path)?;
        log::info!("Saved evaluator parameters to {}", path.display());
        Ok(())
    }

    /// Restores parameters written by [`Evaluator::save`].
    ///
    /// Nothing is modified unless the file matches this architecture exactly.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tensors = candle_core::safetensors::load(path, &self.device)
            .map_err(|e| deserialization(path, e))?;

        let stored = tensors
            .get(ARCHITECTURE_KEY)
            .ok_or_else(|| deserialization(path, "missing architecture signature"))?
            .to_dtype(DType::U32)
            .and_then(|t| t.to_vec1::<u32>())
            .map_err(|e| deserialization(path, e))?;
        let expected = self.signature()?.to_vec1::<u32>()?;
        if stored != expected {
            return Err(deserialization(
                path,
                format!("architecture {:?} does not match {:?}", stored, expected),
            ));
        }

        let params = self.parameters()?;
        let mut updates = Vec::with_capacity(params.len());
        for (name, var) in params.iter() {
            let tensor = tensors
                .get(name)
                .ok_or_else(|| deserialization(path, format!("missing tensor {}", name)))?;
            if tensor.dims() != var.dims() {
                return Err(deserialization(
                    path,
                    format!(
                        "tensor {} has shape {:?}, expected {:?}",
                        name,
                        tensor.dims(),
                        var.dims()
                    ),
                ));
            }
            updates.push((var, tensor.to_dtype(var.dtype())?));
        }

        for (var, tensor) in updates {
            var.set(&tensor)?;
        }
        drop(params);

        self.state = EvaluatorState::Trained;
        log::info!("Loaded evaluator parameters from {}", path.display());
        Ok(())
    }

    fn step<O: Optimizer>(&mut self, opt: &mut O, loss: &Tensor) -> Result<f32> {
        opt.backward_step(loss)?;
        self.state = EvaluatorState::Trained;
        Ok(loss.to_scalar::<f32>()?)
    }

    // Stacks vectors into an (n, input_width) tensor, rejecting any wrong width.
    fn to_batch<V: AsRef<[f32]>>(&self, vectors: &[V]) -> Result<Tensor> {
        let width = self.config.input_width;

        let mut data = Vec::with_capacity(vectors.len() * width);
        for vector in vectors {
            let vector = vector.as_ref();
            if vector.len() != width {
                return Err(EvalError::width(width, vector.len()));
            }
            data.extend_from_slice(vector);
        }

        Ok(Tensor::from_vec(data, (vectors.len(), width), &self.device)?)
    }

    fn signature(&self) -> Result<Tensor> {
        let widths: Vec<u32> = self.config.widths().iter().map(|&w| w as u32).collect();
        Ok(Tensor::new(widths.as_slice(), &Device::Cpu)?)
    }

    fn parameters(&self) -> Result<MutexGuard<'_, HashMap<String, Var>>> {
        self.varmap
            .data()
            .lock()
            .map_err(|_| EvalError::Tensor(candle_core::Error::Msg("parameter lock poisoned".into())))
    }
}

fn deserialization(path: &Path, err: impl std::fmt::Display) -> EvalError {
    EvalError::Deserialization(format!("{}: {}", path.display(), err))
}
