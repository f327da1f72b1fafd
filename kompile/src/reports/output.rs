//! Output trait for rendering reports to different formats.

/// Target output for reports.
///
/// Reports describe *what* to output using these semantic methods.
/// Implementations decide *how* to render.
pub trait Output {
    /// Start a new section with a heading.
    fn section(&mut self, name: &str);

    /// Render a key-value pair.
    fn key_value(&mut self, key: &str, value: &str);

    /// Render a bullet list item.
    fn list_item(&mut self, text: &str);
}

/// A report that can render itself to an output.
pub trait Report {
    /// Render this report to the given output.
    fn render(&self, out: &mut dyn Output);
}

/// Terminal output implementation.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn section(&mut self, name: &str) {
        println!("{}:", name);
    }

    fn key_value(&mut self, key: &str, value: &str) {
        println!("{}: {}", key, value);
    }

    fn list_item(&mut self, text: &str) {
        println!("  - {}", text);
    }
}

/// Renders like [`TerminalOutput`], into a string.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct PlainOutput {
    pub text: String,
}

#[cfg(test)]
impl Output for PlainOutput {
    fn section(&mut self, name: &str) {
        self.text.push_str(&format!("{}:\n", name));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.text.push_str(&format!("{}: {}\n", key, value));
    }

    fn list_item(&mut self, text: &str) {
        self.text.push_str(&format!("  - {}\n", text));
    }
}
