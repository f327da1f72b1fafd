use std::fmt;

use serde::Serialize;

/// Outcome of a compilation stage, and of a whole compile call.
///
/// `Ok` is the only success value; the others carry no relative severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitCode {
    Ok,
    InternalError,
    CompilationError,
    ScriptExecutionError,
}

impl ExitCode {
    /// Returns true if this is the success value.
    pub fn is_ok(&self) -> bool {
        matches!(self, ExitCode::Ok)
    }

    /// Map a `kotlinc` process exit status.
    pub fn from_kotlinc(code: i32) -> Self {
        match code {
            0 => ExitCode::Ok,
            1 => ExitCode::CompilationError,
            3 => ExitCode::ScriptExecutionError,
            _ => ExitCode::InternalError,
        }
    }

    /// Map a `javac` process exit status.
    pub fn from_javac(code: i32) -> Self {
        match code {
            0 => ExitCode::Ok,
            1 => ExitCode::CompilationError,
            _ => ExitCode::InternalError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Ok => write!(f, "OK"),
            ExitCode::InternalError => write!(f, "INTERNAL_ERROR"),
            ExitCode::CompilationError => write!(f, "COMPILATION_ERROR"),
            ExitCode::ScriptExecutionError => write!(f, "SCRIPT_EXECUTION_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kotlinc_codes() {
        assert_eq!(ExitCode::from_kotlinc(0), ExitCode::Ok);
        assert_eq!(ExitCode::from_kotlinc(1), ExitCode::CompilationError);
        assert_eq!(ExitCode::from_kotlinc(2), ExitCode::InternalError);
        assert_eq!(ExitCode::from_kotlinc(3), ExitCode::ScriptExecutionError);
        assert_eq!(ExitCode::from_kotlinc(-1), ExitCode::InternalError);
    }

    #[test]
    fn test_javac_codes() {
        assert_eq!(ExitCode::from_javac(0), ExitCode::Ok);
        assert_eq!(ExitCode::from_javac(1), ExitCode::CompilationError);
        assert_eq!(ExitCode::from_javac(2), ExitCode::InternalError);
        assert_eq!(ExitCode::from_javac(4), ExitCode::InternalError);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Ok.to_string(), "OK");
        assert_eq!(ExitCode::CompilationError.to_string(), "COMPILATION_ERROR");
    }
}
