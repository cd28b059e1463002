use clap::Parser;
use std::path::PathBuf;

/// How the digest is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The full digest as a JSON document.
    #[default]
    Json,

    /// One human-readable line per event, followed by the analysis.
    Text,
}

#[derive(Parser, Debug)]
#[command(
    name = "midi-digest",
    about = "Merge MIDI files into a note/chord digest for musical feedback."
)]
pub struct Args {
    /// Paths to the MIDI files, merged in the given order.
    #[arg(required = true, num_args = 1..)]
    pub midi: Vec<PathBuf>,

    /// What the composer was aiming for. Passed through to the digest untouched.
    #[arg(short, long)]
    pub intention: Option<String>,

    /// Output format: json|text.
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Dry run (log the first dry_run_max events and exit).
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Maximum events to log in dry run.
    #[arg(long, default_value_t = 80)]
    pub dry_run_max: usize,

    /// Logs every extracted event.
    #[arg(short, long)]
    pub verbose: bool,
}
