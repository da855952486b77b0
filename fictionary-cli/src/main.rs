//! fictionary CLI - a made-up word factory, following standard English word rules.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fictionary_core::model::collection::DATA_DIR_ENV;
use fictionary_core::model::ingest;
use fictionary_core::{DEFAULT_MIN_LENGTH, DEFAULT_NUM_WORDS, DataSource, Dictionary, ModelCollection};
use log::{LevelFilter, debug, warn};

const LENGTH_ERROR: &str = "Words cannot have a max-length shorter than their min-length!";

#[derive(Parser, Debug)]
#[command(name = "fictionary")]
#[command(version)]
#[command(about = "A made-up word factory, following standard English word rules.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Be verbose.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The number of words to generate.
    #[arg(short, long, default_value_t = DEFAULT_NUM_WORDS)]
    count: usize,

    /// Only generate words of LENGTH chars or longer.
    #[arg(short, long, value_name = "LENGTH", default_value_t = DEFAULT_MIN_LENGTH)]
    min_length: usize,

    /// Only generate words of LENGTH chars or shorter.
    #[arg(short = 'x', long, value_name = "LENGTH")]
    max_length: Option<usize>,

    /// The dictionary rules to follow: american, british, or all.
    #[arg(short, long, default_value_t = Dictionary::British)]
    dictionary: Dictionary,

    /// Directory holding the packaged models and words.txt.
    #[arg(long, value_name = "DIR", env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Re-create the cached model snapshot from the packaged model.
    #[arg(long)]
    refresh: bool,

    /// Neither read nor write cached model snapshots.
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the packaged models from ispell-style word lists
    Build {
        /// Directory of english.*, british.* and american.* word lists
        #[arg(short, long, value_name = "DIR")]
        wordlists: PathBuf,

        /// Directory to write <dictionary>.json and words.txt into
        #[arg(short, long, value_name = "DIR")]
        out: PathBuf,
    },
}

impl Cli {
    fn data_source(&self) -> DataSource {
        let mut source = DataSource::from_env().with_refresh(self.refresh);
        if let Some(dir) = &self.data_dir {
            source.data_dir = dir.clone();
        }
        if self.no_cache {
            source.snapshot_dir = None;
        }
        source
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// Ctrl-C ends the run quietly with a success status.
fn exit_cleanly_on_interrupt() {
    if let Err(e) = ctrlc::set_handler(|| process::exit(0)) {
        warn!("Could not install the Ctrl-C handler: {e}");
    }
}

fn generate(cli: &Cli) -> Result<()> {
    let source = cli.data_source();
    debug!("Reading models from {}", source.data_dir.display());
    let mut models = ModelCollection::new(source);

    let words = fictionary_core::get_random_words(
        &mut models,
        cli.count,
        cli.min_length,
        cli.max_length,
        cli.dictionary,
    )
    .with_context(|| format!("Failed to generate {} word(s) from the {} dictionary", cli.count, cli.dictionary))?;

    let mut stdout = io::stdout().lock();
    for word in words {
        match writeln!(stdout, "{word}") {
            Ok(()) => (),
            // Reader went away (e.g. piped into `head`), nothing left to do
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
            Err(e) => return Err(e).context("Failed to write output"),
        }
    }
    Ok(())
}

fn build(wordlists: &Path, out: &Path) -> Result<()> {
    let packaged = ingest::package(wordlists, out)
        .with_context(|| format!("Failed to build models from {}", wordlists.display()))?;
    for entry in packaged {
        eprintln!(
            "{}: {} states, {} words -> {}",
            entry.dictionary,
            entry.states,
            entry.words,
            entry.path.display()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.command.is_none() {
        if let Some(max_length) = cli.max_length {
            if cli.min_length > max_length {
                eprintln!("{LENGTH_ERROR}");
                return ExitCode::from(255);
            }
        }
    }

    init_logging(cli.verbose);
    exit_cleanly_on_interrupt();

    let result = match &cli.command {
        Some(Command::Build { wordlists, out }) => build(wordlists, out),
        None => generate(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
