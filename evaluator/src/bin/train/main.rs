mod args;
mod data;
mod training;

use args::Args;
use clap::Parser;
use data::Dataset;
use evaluator::version::VersionManager;
use log::LevelFilter;
use simplelog::{Config, SimpleLogger};
use std::error::Error;
use training::Trainer;

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let dataset = Dataset::load(&args.data_dir, args.val_ratio, args.test_ratio, args.seed)?;

    let manager = VersionManager::new(&args.versions_dir)?;
    let version = manager.create_next_version()?;
    let model_path = manager.file_path(version, "model.safetensors");
    log::info!("Training version v{}", version);

    let mut trainer = Trainer::new(&args, &model_path)?;
    trainer.train(&dataset)?;

    log::info!("Done! Model saved to {}", model_path.display());
    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    Ok(args)
}
