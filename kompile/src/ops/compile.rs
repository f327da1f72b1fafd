//! Compile operation.

use eyre::Result;
use kompile_pipeline::KotlinCompilation;
use tracing::debug;

use crate::reports::CompileReport;

/// Run `compilation` once and summarize the outcome.
pub fn compile(mut compilation: KotlinCompilation) -> Result<CompileReport> {
    let result = compilation.compile()?;
    debug!(
        exit_code = %result.exit_code(),
        output = %result.output_directory().display(),
        "compile finished"
    );

    Ok(CompileReport {
        exit_code: result.exit_code(),
        output_directory: result.output_directory().to_path_buf(),
        stages: compilation.last_stages().to_vec(),
        class_files: result.generated_files().to_vec(),
        generated_sources: result.sources_generated_by_processors().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use kompile_config::Compilation;
    use kompile_core::{ExitCode, SourceUnit};
    use kompile_pipeline::{
        pipeline::StageOutcome,
        testing::{FakeJavac, FakeKotlinc, StaticHost},
    };
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_compile_report() {
        let temp = TempDir::new().unwrap();
        let compilation = KotlinCompilation::new(
            Compilation::new()
                .working_dir(temp.path())
                .source(SourceUnit::java("Main.java", "public class Main {}").unwrap()),
        )
        .host(Arc::new(StaticHost::default()))
        .frontend(Arc::new(FakeKotlinc::new()))
        .java_compiler(Arc::new(FakeJavac::new()))
        .message_sink(io::sink());

        let report = compile(compilation).unwrap();

        assert_eq!(report.exit_code, ExitCode::Ok);
        assert_eq!(report.output_directory, temp.path().join("classes"));
        assert_eq!(report.class_files, vec![temp.path().join("classes/Main.class")]);
        assert!(report.generated_sources.is_empty());
        assert_eq!(
            report
                .stages
                .iter()
                .map(|r| (r.stage, r.outcome))
                .collect::<Vec<_>>(),
            vec![
                ("kapt", StageOutcome::Skipped),
                ("kotlin", StageOutcome::Skipped),
                ("java", StageOutcome::Ran(ExitCode::Ok)),
            ]
        );
    }
}
