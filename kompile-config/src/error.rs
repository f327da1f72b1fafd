use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for configuration operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, pointing at `needle` when it occurs in the source.
    pub fn validation_error_near(&self, message: impl Into<String>, needle: &str) -> Box<Error> {
        let span = self
            .src
            .find(needle)
            .map(|offset| SourceSpan::from((offset, needle.len())));
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(kompile::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse kompile.toml")]
    #[diagnostic(code(kompile::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(kompile::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid source path '{path}'")]
    #[diagnostic(
        code(kompile::source_path),
        help("source paths must be relative to the sources root: {reason}")
    )]
    InvalidSourcePath { path: PathBuf, reason: String },

    #[error("JDK home '{path}' does not exist")]
    #[diagnostic(code(kompile::jdk_home), help("point jdk-home at a JDK installation directory"))]
    JdkHomeNotFound { path: PathBuf },

    #[error("tools.jar is required by JDK {version} but could not be found")]
    #[diagnostic(
        code(kompile::tools_jar),
        help(
            "add tools.jar to the classpath, set jdk-home to a JDK that ships lib/tools.jar, or use a JDK 9+ toolchain"
        )
    )]
    MissingToolsJar { version: String },

    #[error("kapt option '{option}' must point to an existing directory: '{path}'")]
    #[diagnostic(code(kompile::kapt_generated_dir))]
    InvalidGeneratedDir { option: String, path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}
