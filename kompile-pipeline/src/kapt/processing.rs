//! Processor API and the round loop.

use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use eyre::{Context, Result, bail};
use indexmap::{IndexMap, IndexSet};
use kompile_core::{ExitCode, File, Language, Overwrite};
use tracing::debug;

use super::{
    GenerationRegistration,
    element::{Element, parse_elements},
};
use crate::diagnostic::{Diagnostic, DiagnosticCollector};

/// An annotation processor run during Stage A.
///
/// `process` is called once per round with the elements of that round's
/// inputs: first the original sources, then whatever the previous round
/// generated. A final round with no elements and
/// [`RoundEnvironment::processing_over`] set ends processing.
///
/// Returning an error fails the compilation with a compilation error.
pub trait AnnotationProcessor: Send + Sync {
    /// The name of this processor (for diagnostics).
    fn name(&self) -> &'static str;

    fn process(&self, round: &RoundEnvironment, env: &mut ProcessingEnvironment) -> Result<()>;
}

/// Inputs of one processing round.
#[derive(Debug, Clone, Default)]
pub struct RoundEnvironment {
    elements: Vec<Element>,
    processing_over: bool,
}

impl RoundEnvironment {
    /// A round over `files`. Elements declared twice under the same
    /// qualified name (a Kotlin class and its stub) are kept once, first
    /// occurrence wins.
    pub fn new(files: &[PathBuf]) -> Result<Self> {
        let mut elements: IndexMap<(String, bool), Element> = IndexMap::new();
        for path in files {
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            for element in parse_elements(path, &content) {
                let key = (element.qualified_name(), element.kind.is_type());
                elements.entry(key).or_insert(element);
            }
        }
        Ok(Self {
            elements: elements.into_values().collect(),
            processing_over: false,
        })
    }

    fn last() -> Self {
        Self {
            elements: Vec::new(),
            processing_over: true,
        }
    }

    /// Every declaration of this round's inputs.
    pub fn root_elements(&self) -> &[Element] {
        &self.elements
    }

    /// Declarations carrying `annotation` (simple or qualified name).
    pub fn elements_annotated_with(&self, annotation: &str) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.is_annotated_with(annotation))
            .collect()
    }

    /// Whether this is the final round.
    pub fn processing_over(&self) -> bool {
        self.processing_over
    }
}

/// Creates generated source files.
///
/// Java files go under the kapt sources directory and Kotlin files under the
/// generated-Kotlin directory, laid out by package. A file can be created
/// once per processing run.
#[derive(Debug)]
pub struct Filer {
    java_dir: PathBuf,
    kotlin_dir: PathBuf,
    created: IndexSet<PathBuf>,
    pending: Vec<PathBuf>,
}

impl Filer {
    pub fn new(java_dir: impl Into<PathBuf>, kotlin_dir: impl Into<PathBuf>) -> Self {
        Self {
            java_dir: java_dir.into(),
            kotlin_dir: kotlin_dir.into(),
            created: IndexSet::new(),
            pending: Vec::new(),
        }
    }

    /// Write the Java source of type `qualified_name`.
    pub fn create_source_file(&mut self, qualified_name: &str, content: &str) -> Result<PathBuf> {
        let path = source_path(&self.java_dir, qualified_name, Language::Java)?;
        self.create(path, content)
    }

    /// Write a Kotlin source named after `qualified_name`.
    pub fn create_kotlin_file(&mut self, qualified_name: &str, content: &str) -> Result<PathBuf> {
        let path = source_path(&self.kotlin_dir, qualified_name, Language::Kotlin)?;
        self.create(path, content)
    }

    fn create(&mut self, path: PathBuf, content: &str) -> Result<PathBuf> {
        if self.created.contains(&path) {
            bail!("attempt to recreate {}", path.display());
        }
        File::new(&path, content)
            .overwrite(Overwrite::Always)
            .write()?;
        self.created.insert(path.clone());
        self.pending.push(path.clone());
        Ok(path)
    }

    /// Every file created so far, in creation order.
    pub fn created(&self) -> impl Iterator<Item = &Path> {
        self.created.iter().map(PathBuf::as_path)
    }

    fn take_pending(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending)
    }
}

fn source_path(root: &Path, qualified_name: &str, language: Language) -> Result<PathBuf> {
    let segments: Vec<&str> = qualified_name.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("invalid type name `{}`", qualified_name);
    }
    let mut path = root.to_path_buf();
    path.extend(&segments);
    path.set_extension(language.extension());
    Ok(path)
}

/// What processors see of the compilation.
#[derive(Debug)]
pub struct ProcessingEnvironment {
    options: BTreeMap<String, String>,
    filer: Filer,
    messager: DiagnosticCollector,
}

impl ProcessingEnvironment {
    pub fn new(options: BTreeMap<String, String>, filer: Filer) -> Self {
        Self {
            options,
            filer,
            messager: DiagnosticCollector::new(),
        }
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn filer(&mut self) -> &mut Filer {
        &mut self.filer
    }

    /// Report a diagnostic. Errors fail the compilation once processing ends.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.messager.report(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.messager.diagnostics()
    }
}

/// Run every processor of `registration` over `inputs`, round after round,
/// until a round generates nothing.
pub(crate) fn process(
    registration: &GenerationRegistration,
    inputs: &[PathBuf],
    messages: &mut dyn Write,
) -> Result<ExitCode> {
    let dirs = &registration.directories;
    let filer = Filer::new(&dirs.java_sources, &dirs.kotlin_generated);
    let mut env = ProcessingEnvironment::new(registration.options.clone(), filer);

    let mut round = RoundEnvironment::new(inputs)?;
    let mut number = 1;
    loop {
        debug!(round = number, elements = round.root_elements().len(), "processing round");
        for processor in &registration.processors {
            if let Err(err) = processor.process(&round, &mut env) {
                env.messager.print_to(messages)?;
                writeln!(
                    messages,
                    "error: annotation processor {} failed: {:#}",
                    processor.name(),
                    err
                )?;
                return Ok(ExitCode::CompilationError);
            }
        }
        if round.processing_over() {
            break;
        }

        let generated = env.filer.take_pending();
        round = if generated.is_empty() {
            RoundEnvironment::last()
        } else {
            RoundEnvironment::new(&generated)?
        };
        number += 1;
    }

    env.messager.print_to(messages)?;
    if env.messager.has_errors() {
        return Ok(ExitCode::CompilationError);
    }
    Ok(ExitCode::Ok)
}
