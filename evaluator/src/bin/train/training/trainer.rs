use candle_nn::Optimizer;
use evaluator::device::get_device;
use evaluator::{Evaluator, SessionOptimizer};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::data::Dataset;
use crate::training::evaluation::{evaluate, Losses};
use crate::training::metrics::MetricsTracker;
use crate::training::progress::TrainingProgressBar;

pub struct Trainer {
    evaluator: Evaluator,
    optimizer: SessionOptimizer,
    rng: StdRng,
    batch_size: usize,
    epochs: usize,
    lr_decay: f64,
    patience: u64,
    discount: Option<f64>,
    sequence_weight: f64,
    model_path: PathBuf,
}

impl Trainer {
    pub fn new(args: &Args, model_path: &Path) -> Result<Self, Box<dyn Error>> {
        let device = get_device()?;

        let evaluator = Evaluator::new(args.network_config()?, &device)?;
        for descriptor in evaluator.descriptors() {
            log::info!("  {}", descriptor);
        }

        let optimizer = evaluator.optimizer(args.optimizer_config())?;

        Ok(Self {
            evaluator,
            optimizer,
            rng: StdRng::seed_from_u64(args.seed),
            batch_size: args.batch_size.max(1),
            epochs: args.epochs,
            lr_decay: args.lr_decay,
            patience: args.patience,
            discount: args.discount,
            sequence_weight: args.sequence_weight,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn train(&mut self, dataset: &Dataset) -> Result<Losses, Box<dyn Error>> {
        let mut metrics = MetricsTracker::new(self.patience);
        let mut train_idx = dataset.train_indices();
        let mut train_lines = dataset.train_lines.clone();
        let val_idx = dataset.val_indices();

        for epoch in 1..=self.epochs {
            train_idx.shuffle(&mut self.rng);
            train_lines.shuffle(&mut self.rng);

            let (train_loss, val_loss) =
                self.train_epoch(dataset, &train_idx, &train_lines, &val_idx)?;
            log::info!(
                "Epoch {}: train {:.5}, val {:.5} (huber {:.5})",
                epoch,
                train_loss,
                val_loss.mae,
                val_loss.huber
            );

            if metrics.update(val_loss.mae) {
                self.evaluator.save(&self.model_path)?;
            }

            if metrics.should_stop() {
                log::info!("Early stopping after {} epochs", epoch);
                break;
            }

            self.decay_learning_rate();
        }

        log::info!("Best validation loss: {:.5}", metrics.best());
        self.test_model(dataset)
    }

    // Returns the mean training loss and the validation losses.
    fn train_epoch(
        &mut self,
        dataset: &Dataset,
        train_idx: &[usize],
        train_lines: &[Range<usize>],
        val_idx: &[usize],
    ) -> Result<(f32, Losses), Box<dyn Error>> {
        let samples = &dataset.samples;
        let num_batches = train_idx.len().div_ceil(self.batch_size);
        let progress = TrainingProgressBar::new(num_batches + self.discount.is_some() as usize)?;

        let mut total_loss = 0.0;
        let mut batches_processed = 0;
        let mut train_loss = 0.0;

        for (features, scores) in samples.batches(train_idx, self.batch_size) {
            let loss = self
                .evaluator
                .train_batch(&mut self.optimizer, &features, &scores)?;

            total_loss += loss;
            batches_processed += 1;
            train_loss = total_loss / batches_processed as f32;
            progress.update(train_loss, None);
        }

        if let Some(discount) = self.discount {
            let sequence_loss = self.train_sequences(dataset, train_lines, discount)?;
            progress.update(train_loss, Some(sequence_loss));
        }

        let val_loss = evaluate(&self.evaluator, samples, val_idx, self.batch_size)?;
        progress.finish(val_loss.mae, train_loss);

        Ok((train_loss, val_loss))
    }

    // One discounted sequence step per line, at a scaled learning rate.
    fn train_sequences(
        &mut self,
        dataset: &Dataset,
        lines: &[Range<usize>],
        discount: f64,
    ) -> Result<f32, Box<dyn Error>> {
        let base_lr = self.optimizer.learning_rate();
        self.optimizer
            .set_learning_rate(base_lr * self.sequence_weight);

        let result = self.sequence_pass(dataset, lines, discount);

        // Restore even when a step failed
        self.optimizer.set_learning_rate(base_lr);
        result
    }

    fn sequence_pass(
        &mut self,
        dataset: &Dataset,
        lines: &[Range<usize>],
        discount: f64,
    ) -> Result<f32, Box<dyn Error>> {
        let mut total = 0.0;
        let mut count = 0;

        for line in lines.iter().filter(|line| line.len() >= 2) {
            let positions = dataset.samples.sequence(line.clone());
            total += self
                .evaluator
                .train_sequence(&mut self.optimizer, positions, discount)?;
            count += 1;
        }

        Ok(total / count.max(1) as f32)
    }

    fn decay_learning_rate(&mut self) {
        let current_lr = self.optimizer.learning_rate();
        let new_lr = current_lr * self.lr_decay;
        self.optimizer.set_learning_rate(new_lr);
    }

    fn test_model(&mut self, dataset: &Dataset) -> Result<Losses, Box<dyn Error>> {
        log::info!("Running final test set evaluation...");
        if self.model_path.exists() {
            self.evaluator.load(&self.model_path)?;
        }

        let test_idx = dataset.test_indices();
        let test_loss = evaluate(&self.evaluator, &dataset.samples, &test_idx, self.batch_size)?;
        log::info!(
            "Test loss: {:.6} (huber {:.6})",
            test_loss.mae,
            test_loss.huber
        );

        Ok(test_loss)
    }
}
