use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Arc;

use board::BoardError;
use evaluator::samples::Samples;
use rayon::iter::*;

use crate::worker::LineWorker;

pub struct Generator {
    threads: usize,
    length: usize,
    seed: Option<u64>,
}

impl Generator {
    pub fn new(threads: usize, length: usize, seed: Option<u64>) -> Self {
        Self {
            threads,
            length,
            seed,
        }
    }

    pub fn run(&self, lines: usize, stop_flag: Arc<AtomicBool>) -> Result<Samples, BoardError> {
        log::info!(
            "Generating {} lines of up to {} positions using {} threads",
            lines,
            self.length,
            self.threads
        );

        let line_counter = Arc::new(AtomicUsize::new(0));

        let results: Vec<Vec<(usize, Samples)>> = (0..self.threads)
            .into_par_iter()
            .map(|tid| {
                let mut worker = LineWorker::new(
                    tid,
                    Arc::clone(&line_counter),
                    Arc::clone(&stop_flag),
                    self.length,
                    self.seed,
                );
                worker.play_lines(lines)
            })
            .collect::<Result<_, _>>()?;

        // Keep lines contiguous and ordered by id
        let mut played: Vec<(usize, Samples)> = results.into_iter().flatten().collect();
        played.sort_unstable_by_key(|(id, _)| *id);

        let mut samples = Samples::new();
        for (_, line) in played {
            samples.extend(line);
        }
        Ok(samples)
    }
}
