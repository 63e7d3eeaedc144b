use candle_core::{Result, Tensor};

/// Summed absolute difference.
pub fn l1(pred: &Tensor, target: &Tensor) -> Result<Tensor> {
    (pred - target)?.abs()?.sum_all()
}

/// Summed absolute difference divided by the batch size.
pub fn mean_l1(pred: &Tensor, target: &Tensor) -> Result<Tensor> {
    let batch = pred.dim(0)?.max(1);
    l1(pred, target)? / batch as f64
}

/// Temporal-difference consistency loss over scores of consecutive positions.
///
/// With `d_i = |s[i+1] - s[i]|`, the diff at `i` is weighted by
/// `discount^(n-2-i)`, i.e. the left to right fold
/// `loss = d[0]; loss = discount * loss + d[i]` for ascending `i`.
/// The last transition always counts fully.
/// `scores` is `(n)` or `(n, 1)` with `n >= 2`.
pub fn discounted_sequence_loss(scores: &Tensor, discount: f64) -> Result<Tensor> {
    let scores = scores.flatten_all()?;
    let n = scores.dim(0)?;
    if n < 2 {
        candle_core::bail!("sequence loss needs at least 2 scores, got {}", n)
    }

    let next = scores.narrow(0, 1, n - 1)?;
    let prev = scores.narrow(0, 0, n - 1)?;
    let diffs = (next - prev)?.abs()?;

    let weights: Vec<f32> = (0..n - 1)
        .map(|i| discount.powi((n - 2 - i) as i32) as f32)
        .collect();
    let weights = Tensor::from_vec(weights, n - 1, scores.device())?.to_dtype(scores.dtype())?;

    (diffs * weights)?.sum_all()
}

/// Huber loss, used as a validation metric.
pub fn huber(pred: &Tensor, target: &Tensor, delta: f64) -> Result<Tensor> {
    let diff = (pred - target)?;
    let abs_diff = diff.abs()?;

    let is_small = abs_diff.lt(delta)?;

    let quadratic = (diff.sqr()? * 0.5)?;
    let linear = ((abs_diff - 0.5 * delta)? * delta)?;

    let loss = is_small.where_cond(&quadratic, &linear)?;
    loss.mean_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn scalar(t: Tensor) -> f32 {
        t.to_scalar::<f32>().unwrap()
    }

    #[test]
    fn test_sequence_loss_weights_later_diffs_more() {
        let scores = Tensor::new(&[[1f32], [2.0], [4.0]], &Device::Cpu).unwrap();

        // diffs = [1, 2]
        let loss = scalar(discounted_sequence_loss(&scores, 0.5).unwrap());
        assert!((loss - 2.5).abs() < 1e-6);

        let loss = scalar(discounted_sequence_loss(&scores, 0.0).unwrap());
        assert!((loss - 2.0).abs() < 1e-6);

        let loss = scalar(discounted_sequence_loss(&scores, 1.0).unwrap());
        assert!((loss - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_sequence_loss_matches_explicit_fold() {
        let values = [0.3f32, -1.2, 0.7, 0.7, 2.5];
        let discount = 0.7;

        let diffs: Vec<f32> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let mut expected = diffs[0];
        for d in &diffs[1..] {
            expected = discount as f32 * expected + d;
        }

        // Same value from explicit weights discount^(n-2-i)
        let n = values.len();
        let weighted: f32 = diffs
            .iter()
            .enumerate()
            .map(|(i, d)| d * (discount as f32).powi((n - 2 - i) as i32))
            .sum();
        assert!((weighted - expected).abs() < 1e-5);

        let scores = Tensor::new(&values, &Device::Cpu).unwrap();
        let loss = scalar(discounted_sequence_loss(&scores, discount).unwrap());
        assert!((loss - expected).abs() < 1e-5);
    }

    #[test]
    fn test_sequence_loss_needs_two_scores() {
        let scores = Tensor::new(&[1f32], &Device::Cpu).unwrap();
        assert!(discounted_sequence_loss(&scores, 0.5).is_err());
    }

    #[test]
    fn test_mean_l1_averages_over_batch() {
        let pred = Tensor::zeros((3, 1), candle_core::DType::F32, &Device::Cpu).unwrap();
        let target = Tensor::new(&[[1f32], [2.0], [3.0]], &Device::Cpu).unwrap();

        assert!((scalar(mean_l1(&pred, &target).unwrap()) - 2.0).abs() < 1e-6);
        assert!((scalar(l1(&pred, &target).unwrap()) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_huber_is_quadratic_near_zero() {
        let pred = Tensor::new(&[0.5f32, 3.0], &Device::Cpu).unwrap();
        let target = Tensor::new(&[0f32, 0.0], &Device::Cpu).unwrap();

        // (0.125 + (3.0 - 0.5) * 1.0) / 2
        let loss = scalar(huber(&pred, &target, 1.0).unwrap());
        assert!((loss - 1.3125).abs() < 1e-6);
    }
}
