//! Compilation context passed through pipeline stages.

use std::path::PathBuf;

use kompile_core::{ExitCode, Language};
use serde::Serialize;

use crate::{
    materialize::{StagedSource, find_sources, of_language},
    output::MessageStream,
    resolve::ResolvedCompilation,
};

/// What happened to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "exit_code")]
pub enum StageOutcome {
    Skipped,
    Ran(ExitCode),
}

/// One entry of the pipeline's execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: &'static str,
    pub outcome: StageOutcome,
}

/// State shared by the stages of one compile call.
pub struct CompilationContext<'a> {
    /// The resolved configuration.
    pub resolved: ResolvedCompilation,
    /// Sources staged into the workspace, in configuration order.
    pub staged: Vec<StagedSource>,
    /// Output of every stage.
    pub messages: MessageStream<'a>,
    /// Stages visited so far.
    pub records: Vec<StageRecord>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(
        resolved: ResolvedCompilation,
        staged: Vec<StagedSource>,
        messages: MessageStream<'a>,
    ) -> Self {
        Self {
            resolved,
            staged,
            messages,
            records: Vec::new(),
        }
    }

    /// Staged Kotlin sources followed by those generated during kapt.
    pub fn kotlin_sources(&self) -> Vec<PathBuf> {
        let mut sources = of_language(&self.staged, Language::Kotlin);
        sources.extend(find_sources(
            &self.resolved.kotlin_generated_dir,
            Language::Kotlin,
        ));
        sources
    }

    /// Staged Java sources followed by those generated during kapt.
    pub fn java_sources(&self) -> Vec<PathBuf> {
        let mut sources = of_language(&self.staged, Language::Java);
        sources.extend(find_sources(
            &self.resolved.workspace.kapt_sources(),
            Language::Java,
        ));
        sources
    }

    pub fn record(&mut self, stage: &'static str, outcome: StageOutcome) {
        self.records.push(StageRecord { stage, outcome });
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kompile_config::Compilation;
    use kompile_core::SourceUnit;
    use tempfile::TempDir;

    use super::*;
    use crate::{materialize::materialize, testing::StaticHost};

    #[test]
    fn test_sources_include_generated() {
        let temp = TempDir::new().unwrap();
        let resolved = ResolvedCompilation::resolve(
            Compilation::new().working_dir(temp.path()),
            &StaticHost::default(),
            false,
        )
        .unwrap();
        resolved.workspace.create().unwrap();
        let staged = materialize(
            &[
                SourceUnit::kotlin("Foo", "class Foo").unwrap(),
                SourceUnit::java("Bar", "class Bar {}").unwrap(),
            ],
            &resolved.workspace.sources(),
        )
        .unwrap();
        let generated = resolved.workspace.kapt_sources().join("gen/BarBuilder.java");
        fs::create_dir_all(generated.parent().unwrap()).unwrap();
        fs::write(&generated, "class BarBuilder {}").unwrap();

        let mut sink = Vec::new();
        let mut ctx = CompilationContext::new(resolved, staged, MessageStream::new(&mut sink));

        assert_eq!(ctx.kotlin_sources(), vec![temp.path().join("sources/Foo.kt")]);
        assert_eq!(
            ctx.java_sources(),
            vec![temp.path().join("sources/Bar.java"), generated]
        );

    }
}
