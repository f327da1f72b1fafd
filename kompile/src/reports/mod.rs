//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target or print
//! them as JSON.

mod compile;
mod output;
mod probe;

pub use compile::CompileReport;
pub use output::{Report, TerminalOutput};
pub use probe::{ProbeReport, RuntimeJar};
