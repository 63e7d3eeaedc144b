use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::ops::Range;
use std::path::{Path, PathBuf};

use evaluator::samples::Samples;

/// Whole lines of play assigned to each split.
pub struct Dataset {
    pub samples: Samples,
    pub train_lines: Vec<Range<usize>>,
    pub val_lines: Vec<Range<usize>>,
    pub test_lines: Vec<Range<usize>>,
}

impl Dataset {
    pub fn load(
        data_dir: &Path,
        val_ratio: f64,
        test_ratio: f64,
        seed: u64,
    ) -> Result<Self, Box<dyn Error>> {
        let samples = load_samples(data_dir)?;
        if samples.is_empty() {
            return Err(format!("No samples found in {}", data_dir.display()).into());
        }

        let (rest, test_lines) = samples.split_lines(test_ratio, Some(seed));

        // Validation is carved from what is left after the test split
        let val_len = (rest.len() as f64 * val_ratio.clamp(0.0, 0.9)) as usize;
        let mut val_lines = rest;
        let train_lines = val_lines.split_off(val_len);

        log::info!(
            "Split {} lines into {} train, {} validation and {} test",
            train_lines.len() + val_lines.len() + test_lines.len(),
            train_lines.len(),
            val_lines.len(),
            test_lines.len()
        );

        Ok(Self {
            samples,
            train_lines,
            val_lines,
            test_lines,
        })
    }

    pub fn train_indices(&self) -> Vec<usize> {
        flatten(&self.train_lines)
    }

    pub fn val_indices(&self) -> Vec<usize> {
        flatten(&self.val_lines)
    }

    pub fn test_indices(&self) -> Vec<usize> {
        flatten(&self.test_lines)
    }
}

fn flatten(lines: &[Range<usize>]) -> Vec<usize> {
    lines.iter().flat_map(|r| r.clone()).collect()
}

/// Reads every CSV in `data_dir`, keeping line ids unique across files.
fn load_samples(data_dir: &Path) -> Result<Samples, Box<dyn Error>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut samples = Samples::new();
    for path in paths {
        let file = File::open(&path)?;
        let mut file_samples = Samples::read(BufReader::new(file))?;
        log::info!("Loaded {} samples from {:?}", file_samples.len(), path);

        if let Some(max) = samples.max_line_id() {
            file_samples.offset_line_ids(max + 1);
        }
        samples.extend(file_samples);
    }

    log::info!("Loaded {} total samples", samples.len());
    Ok(samples)
}
