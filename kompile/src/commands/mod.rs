mod compile;
mod completions;
mod probe;

use clap::{Parser, Subcommand};
use compile::CompileCommand;
use completions::CompletionsCommand;
use eyre::Result;
use probe::ProbeCommand;

/// Extension trait for exiting on configuration errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for kompile_config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => exit_with_config_error(*e),
        }
    }
}

/// Print a configuration error as a diagnostic and exit.
pub(crate) fn exit_with_config_error(err: kompile_config::Error) -> ! {
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "kompile")]
#[command(version)]
#[command(about = "Compile Kotlin and Java sources through kapt, kotlinc and javac")]
pub(crate) struct Cli {
    /// Log pipeline progress (same as KOMPILE_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Compile(cmd) => cmd.run(),
            Commands::Probe(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the sources described by kompile.toml
    Compile(CompileCommand),

    /// Show the host toolchain a compilation would use
    Probe(ProbeCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
