use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Evaluator Data Generator")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Number of lines of play to generate.
    #[arg(long, default_value_t = 2000)]
    pub lines: usize,

    /// Maximum positions per line.
    #[arg(long, default_value_t = 24)]
    pub length: usize,

    /// Worker threads (defaults to the number of CPUs).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Seed for reproducible data sets.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory the CSV file is written to.
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,
}
