use candle_core::{Device, Tensor};
use evaluator::loss::huber;
use evaluator::samples::Samples;
use evaluator::Evaluator;
use std::error::Error;

const HUBER_DELTA: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Losses {
    /// Mean absolute error, the quantity `train_batch` minimises.
    pub mae: f32,
    pub huber: f32,
}

/// Scores `indices` in batches without touching the parameters.
pub fn evaluate(
    evaluator: &Evaluator,
    samples: &Samples,
    indices: &[usize],
    batch_size: usize,
) -> Result<Losses, Box<dyn Error>> {
    let mut preds = Vec::with_capacity(indices.len());
    let mut targets = Vec::with_capacity(indices.len());

    for (features, scores) in samples.batches(indices, batch_size) {
        preds.extend(evaluator.evaluate_batch(&features)?);
        targets.extend(scores);
    }

    if preds.is_empty() {
        return Ok(Losses::default());
    }

    let mae = preds
        .iter()
        .zip(&targets)
        .map(|(p, t)| (p - t).abs())
        .sum::<f32>()
        / preds.len() as f32;

    let n = preds.len();
    let preds = Tensor::from_vec(preds, n, &Device::Cpu)?;
    let targets = Tensor::from_vec(targets, n, &Device::Cpu)?;
    let huber = huber(&preds, &targets, HUBER_DELTA)?.to_scalar::<f32>()?;

    Ok(Losses { mae, huber })
}
