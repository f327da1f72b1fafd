//! Operations behind the commands.
//!
//! Each operation collects its data into a report without printing, so
//! commands decide how it is rendered.

mod compile;
mod probe;

pub use compile::compile;
pub use probe::probe;
