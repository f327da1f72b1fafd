//! Message aggregation.
//!
//! Every stage writes to one [`MessageStream`], which forwards the output to
//! the caller's sink as it arrives and keeps a copy for the result.

use std::io::{self, Write};

use tracing::warn;

/// A misconfiguration recognizable from compiler output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownProblem {
    /// A pre-modular `tools.jar` was loaded by a modular JDK.
    ToolsJarOnModularJdk,
    /// javac ran without a JDK and without the host classpath.
    MissingPlatformClasses,
}

impl KnownProblem {
    const ALL: [KnownProblem; 2] = [
        KnownProblem::ToolsJarOnModularJdk,
        KnownProblem::MissingPlatformClasses,
    ];

    /// Text whose presence in the output reveals the problem.
    pub fn marker(&self) -> &'static str {
        match self {
            KnownProblem::ToolsJarOnModularJdk => {
                "No enum constant com.sun.tools.javac.main.Option.BOOT_CLASS_PATH"
            }
            KnownProblem::MissingPlatformClasses => {
                "Unable to find package java.lang in classpath or bootclasspath"
            }
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            KnownProblem::ToolsJarOnModularJdk => {
                "a tools.jar from a JDK 8 or older was used with a JDK 9 or newer. \
                 Remove tools.jar from the classpath, or set jdk_home to a JDK 8 \
                 installation if you compile against JDK 8."
            }
            KnownProblem::MissingPlatformClasses => {
                "javac could not find the JDK classes. Set jdk_home to a JDK \
                 installation, or enable inherit_classpath so the host's classes \
                 are visible."
            }
        }
    }
}

/// Problems whose marker occurs in `text`.
pub fn known_problems(text: &str) -> Vec<KnownProblem> {
    KnownProblem::ALL
        .into_iter()
        .filter(|problem| text.contains(problem.marker()))
        .collect()
}

/// Tees writes into the caller's sink and an in-memory buffer.
pub struct MessageStream<'a> {
    sink: &'a mut dyn Write,
    buffer: Vec<u8>,
}

impl<'a> MessageStream<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
        }
    }

    /// Everything written so far.
    pub fn captured(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// End the stream and return the captured text.
    ///
    /// Warnings about known problems found in the text are written to the
    /// sink only, so the returned text is exactly what the stages printed.
    pub fn finish(mut self) -> io::Result<String> {
        let text = self.captured();
        for problem in known_problems(&text) {
            warn!(problem = ?problem, "{}", problem.advice());
            writeln!(self.sink, "warning: {}", problem.advice())?;
        }
        self.sink.flush()?;
        Ok(text)
    }
}

impl Write for MessageStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.sink.write(buf)?;
        self.buffer.extend_from_slice(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
