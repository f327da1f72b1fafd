use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use kompile_pipeline::host::SystemHost;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct ProbeCommand {
    /// Inspect this JDK instead of the host's
    #[arg(long)]
    pub jdk_home: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProbeCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::probe(&SystemHost, self.jdk_home.as_deref());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            report.render(&mut TerminalOutput::new());
        }
        Ok(())
    }
}
