mod args;
mod generator;
mod worker;

use args::Args;
use chrono::Local;
use clap::Parser;
use generator::Generator;
use log::LevelFilter;
use simplelog::{Config, SimpleLogger};
use std::{
    error::Error,
    fs::{self, File},
    io::BufWriter,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    // Set up SIGINT handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = Arc::clone(&stop_flag);

    ctrlc::set_handler(move || {
        log::info!("Received SIGINT, stopping generation...");
        stop_flag_handler.store(true, Ordering::Relaxed);
    })?;

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let generator = Generator::new(threads, args.length, args.seed);
    let samples = generator.run(args.lines, stop_flag)?;

    log::info!("Generated {} samples", samples.len());

    fs::create_dir_all(&args.out_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    let path = args.out_dir.join(format!("{}.csv", timestamp));

    log::info!("Writing samples to {}", path.display());
    let mut file = BufWriter::new(File::create(&path)?);
    samples.write(&mut file)?;

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    Ok(args)
}
