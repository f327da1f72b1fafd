use std::{io, path::PathBuf};

use clap::Args;
use eyre::Result;
use kompile_config::KompileToml;
use kompile_pipeline::KotlinCompilation;

use super::{UnwrapOrExit, exit_with_config_error};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    /// Path to kompile.toml (defaults to ./kompile.toml)
    #[arg(short, long, default_value = "kompile.toml")]
    pub config: PathBuf,

    /// Workspace directory, overriding `working-dir` from the config
    #[arg(short, long)]
    pub working_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompileCommand {
    /// Run the compile command. Exits with status 1 unless the compilation
    /// succeeded.
    pub fn run(&self) -> Result<()> {
        let mut compilation = KompileToml::open(&self.config)
            .and_then(KompileToml::into_compilation)
            .unwrap_or_exit();
        if let Some(dir) = &self.working_dir {
            compilation = compilation.working_dir(dir);
        }

        // Compiler output goes to stderr so stdout only carries the report.
        let kotlin = KotlinCompilation::new(compilation).message_sink(io::stderr());
        let report = match ops::compile(kotlin) {
            Ok(report) => report,
            Err(err) => match err.downcast::<kompile_config::Error>() {
                Ok(config_err) => exit_with_config_error(config_err),
                Err(err) => return Err(err),
            },
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.render(&mut TerminalOutput::new());
        }

        if !report.exit_code.is_ok() {
            std::process::exit(1);
        }
        Ok(())
    }
}
