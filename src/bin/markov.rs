//! Reads text from standard input and prints a random sequence of words that
//! follows the word to word transitions observed in it.

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use bstree::markov::{self, TransitionTable};

#[derive(Parser, Debug)]
#[command(
    name = "markov",
    about = "Generate text from a word level Markov chain read from stdin.",
    version
)]
struct Cli {
    /// Length (in words) of the generated sequence.
    #[arg(short = 'l', long, default_value_t = 30)]
    length: usize,
    /// Initial word of the sequence.
    ///
    /// If not specified, the chain starts at an arbitrary word of the input.
    #[arg(short = 'i', long)]
    initial: Option<String>,
    /// Print the transition statistics.
    #[arg(short = 't', long)]
    stats: bool,
    /// Word delimiter characters, also used to join the output.
    #[arg(short = 'd', long, default_value = " ")]
    delimiter: String,
    /// Wrap output if longer than 80 characters.
    #[arg(short = 'w', long)]
    wrap: bool,
    /// Seed for the random generator, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _r = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .try_init();

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let table = TransitionTable::from_reader(io::stdin().lock(), &cli.delimiter)
        .context("Failed to build the transition table")?;

    let mut out = io::stdout().lock();
    if cli.stats {
        table
            .write_stats(&mut out)
            .context("Failed to print the transition statistics")?;
    }

    let chain = table.generate(cli.initial.as_deref(), cli.length, &mut rng)?;
    // Any input gets a line of output, even a chain of no words.
    if !table.is_empty() {
        out.write_all(markov::render(&chain, &cli.delimiter, cli.wrap).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
