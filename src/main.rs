//! babble CLI: train the model on text files and print one generated sentence.
//!
//! Thin wrapper over the `babble` library crate. Logging goes to stderr so
//! stdout carries nothing but the sentence.

use std::fs;
use std::path::PathBuf;
use std::process;

use babble::{Babble, DEFAULT_MAX_LENGTH};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Generate sentences from a word-level Markov chain with Laplace smoothing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Context length in words.
    #[arg(long, default_value_t = 2)]
    order: usize,

    /// Additive smoothing strength.
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// PRNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Training file; repeat to train on several files.
    #[arg(long)]
    train: Vec<PathBuf>,

    /// Starting word for the sentence; repeat to give a longer prefix.
    #[arg(long)]
    start: Vec<String>,

    /// Maximum sentence length in words.
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    });

    let mut babble = match Babble::new(args.order, args.alpha, SmallRng::seed_from_u64(seed)) {
        Ok(babble) => babble,
        Err(err) => {
            error!("invalid configuration: {err}");
            process::exit(2);
        }
    };

    for path in &args.train {
        info!("training from {}", path.display());
        match fs::read_to_string(path) {
            Ok(text) => babble.train(&text),
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                process::exit(1);
            }
        }
    }

    let sentence = if args.start.is_empty() {
        babble.generate_sentence(args.max_length)
    } else {
        babble.generate_sentence_from(&args.start, args.max_length)
    };
    println!("{sentence}");
}
