//! Compile command report data structures.

use std::path::PathBuf;

use kompile_core::ExitCode;
use kompile_pipeline::pipeline::{StageOutcome, StageRecord};
use serde::Serialize;

use super::output::{Output, Report};

/// Report data from one compile call.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    /// Final exit code.
    pub exit_code: ExitCode,
    /// Classes directory of the workspace.
    pub output_directory: PathBuf,
    /// Stages in pipeline order, up to the one that stopped it.
    pub stages: Vec<StageRecord>,
    /// Files under the output directory.
    pub class_files: Vec<PathBuf>,
    /// Sources written by annotation processors.
    pub generated_sources: Vec<PathBuf>,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        out.section("Stages");
        for record in &self.stages {
            let outcome = match record.outcome {
                StageOutcome::Skipped => "skipped".to_string(),
                StageOutcome::Ran(code) => code.to_string(),
            };
            out.list_item(&format!("{:<7}{}", record.stage, outcome));
        }

        if !self.generated_sources.is_empty() {
            out.section("Generated sources");
            for source in &self.generated_sources {
                out.list_item(&source.display().to_string());
            }
        }

        out.key_value("Output", &self.output_directory.display().to_string());
        out.key_value("Class files", &self.class_files.len().to_string());
        out.key_value("Result", &self.exit_code.to_string());
    }
}
