//! Test doubles for the host toolchain.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests. The fakes understand just enough of Kotlin and Java to
//! exercise the pipeline: type declarations become class files and imports
//! must resolve against the classpath.

use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

use eyre::{Context, Result};
use kompile_core::{ExitCode, File, JavaVersion, Overwrite};
use regex::Regex;

use crate::{
    diagnostic::{Diagnostic, DiagnosticCollector},
    frontend::{FrontendMode, K2JvmArgs, KotlinFrontend},
    host::HostEnvironment,
    javac::{JavaCompilerService, ServiceError},
    kapt::{self, Element, ElementKind, KAPT_PLUGIN_ID},
};

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)\s*;").expect("valid regex"));

static SERIAL: Mutex<()> = Mutex::new(());

/// Serialize tests that touch process-wide system properties.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A host with a fixed classpath and JDKs.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    classpath: Vec<PathBuf>,
    jdk_home: Option<PathBuf>,
    versions: HashMap<PathBuf, JavaVersion>,
}

impl StaticHost {
    pub fn classpath(mut self, entry: impl Into<PathBuf>) -> Self {
        self.classpath.push(entry.into());
        self
    }

    pub fn jdk_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.jdk_home = Some(home.into());
        self
    }

    /// Report `version` for the JDK installed at `home`.
    pub fn jdk(mut self, home: impl Into<PathBuf>, version: JavaVersion) -> Self {
        self.versions.insert(home.into(), version);
        self
    }
}

impl HostEnvironment for StaticHost {
    fn classpath(&self) -> Vec<PathBuf> {
        self.classpath.clone()
    }

    fn jdk_home(&self) -> Option<PathBuf> {
        self.jdk_home.clone()
    }

    fn jdk_version(&self, home: &Path) -> Option<JavaVersion> {
        self.versions.get(home).cloned()
    }
}

/// A cloneable in-memory message sink.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Header of a class file with the given major version.
pub fn class_file_bytes(major: u16) -> Vec<u8> {
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00];
    bytes.extend_from_slice(&major.to_be_bytes());
    bytes
}

fn braces_balanced(content: &str) -> bool {
    let mut depth = 0i32;
    for c in content.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// `<root>/<package dirs>/<Name>.<extension>`.
fn element_path(root: &Path, element: &Element, extension: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    if let Some(package) = &element.package {
        path.extend(package.split('.'));
    }
    path.push(format!("{}.{}", element.name, extension));
    path
}

fn write_class_files(sources: &[PathBuf], destination: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for source in sources {
        let content = read(source)?;
        for element in kapt::parse_elements(source, &content)
            .into_iter()
            .filter(|e| e.kind.is_type())
        {
            let path = element_path(destination, &element, "class");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, class_file_bytes(52))?;
            written.push(path);
        }
    }
    Ok(written)
}

/// A Kotlin front end that "compiles" declarations into class-file headers.
///
/// Compiling fails on unbalanced braces. In stubs mode it writes a Java stub
/// for every Kotlin type, keeping its annotations, then runs the registered
/// compiler plugins like the real front end does.
#[derive(Debug, Default)]
pub struct FakeKotlinc {
    calls: Mutex<Vec<K2JvmArgs>>,
}

impl FakeKotlinc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> Vec<K2JvmArgs> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_syntax(args: &K2JvmArgs, messages: &mut dyn Write) -> Result<bool> {
        let mut ok = true;
        for source in &args.sources {
            if !braces_balanced(&read(source)?) {
                writeln!(messages, "e: {}: Expecting '}}'", source.display())?;
                ok = false;
            }
        }
        Ok(ok)
    }

    fn write_stubs(args: &K2JvmArgs) -> Result<()> {
        let Some(stubs) = args.plugin_option(KAPT_PLUGIN_ID, "stubs").first().copied() else {
            return Ok(());
        };
        for source in &args.sources {
            let content = read(source)?;
            for element in kapt::parse_elements(source, &content)
                .into_iter()
                .filter(|e| e.kind.is_type())
            {
                File::new(element_path(Path::new(stubs), &element, "java"), stub(&element))
                    .overwrite(Overwrite::Always)
                    .write()?;
            }
        }
        Ok(())
    }
}

fn stub(element: &Element) -> String {
    let mut out = String::new();
    if let Some(package) = &element.package {
        out.push_str(&format!("package {};\n\n", package));
    }
    for annotation in &element.annotations {
        out.push_str(&format!("@{}\n", annotation));
    }
    let keyword = match element.kind {
        ElementKind::Interface => "interface",
        ElementKind::Enum => "enum",
        ElementKind::Annotation => "@interface",
        _ => "class",
    };
    out.push_str(&format!("public {} {} {{}}\n", keyword, element.name));
    out
}

impl KotlinFrontend for FakeKotlinc {
    fn name(&self) -> &'static str {
        "fake-kotlinc"
    }

    fn exec(&self, args: &K2JvmArgs, messages: &mut dyn Write) -> Result<ExitCode> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.clone());

        if !Self::check_syntax(args, messages)? {
            return Ok(ExitCode::CompilationError);
        }
        match args.mode {
            FrontendMode::Compile => {
                write_class_files(&args.sources, &args.destination)?;
                Ok(ExitCode::Ok)
            }
            FrontendMode::StubsAndApt => {
                Self::write_stubs(args)?;
                kapt::run_plugins(args, messages)
            }
        }
    }
}

/// A Java compiler service that checks imports against the `-cp` directories
/// and writes class-file headers to `-d`.
#[derive(Debug, Default)]
pub struct FakeJavac {
    calls: Mutex<Vec<Vec<String>>>,
    failure: Mutex<Option<ServiceError>>,
}

impl FakeJavac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `error`.
    pub fn fail_with(self, error: ServiceError) -> Self {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Arguments of every call so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn resolves(import: &str, classpath: &[PathBuf]) -> bool {
    if import.starts_with("java.") || import.starts_with("javax.") {
        return true;
    }
    let mut relative: PathBuf = import.split('.').collect();
    relative.set_extension("class");
    classpath.iter().any(|dir| dir.join(&relative).is_file())
}

impl JavaCompilerService for FakeJavac {
    fn name(&self) -> &'static str {
        "fake-javac"
    }

    fn compile(
        &self,
        args: &[String],
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<bool, ServiceError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.to_vec());
        if let Some(error) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(error);
        }

        let destination = flag_value(args, "-d")
            .map(PathBuf::from)
            .ok_or_else(|| ServiceError::InvalidArgument("missing -d".to_string()))?;
        let classpath: Vec<PathBuf> = flag_value(args, "-cp")
            .map(|cp| std::env::split_paths(cp).collect())
            .unwrap_or_default();
        let sources: Vec<PathBuf> = args
            .iter()
            .filter(|a| a.ends_with(".java"))
            .map(PathBuf::from)
            .collect();

        for source in &sources {
            let content = std::fs::read_to_string(source)?;
            if !braces_balanced(&content) {
                diagnostics.report(Diagnostic::error("reached end of file while parsing").at(source, 1));
            }
            for caps in IMPORT.captures_iter(&content) {
                if !resolves(&caps[1], &classpath) {
                    let line = content[..caps.get(0).map_or(0, |m| m.start())]
                        .lines()
                        .count() as u32
                        + 1;
                    diagnostics.report(
                        Diagnostic::error(format!("cannot find symbol {}", &caps[1]))
                            .at(source, line),
                    );
                }
            }
        }
        if diagnostics.has_errors() {
            return Ok(false);
        }

        write_class_files(&sources, &destination)
            .map_err(|err| ServiceError::Runtime(format!("{:#}", err)))?;
        Ok(true)
    }
}
