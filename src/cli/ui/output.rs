use console::style;

/// Console writer for results and progress. Diagnostics go through
/// `tracing` to stderr; everything here is the user-facing transcript.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress progress lines; results and errors still print
    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn progress(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).cyan());
        }
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Markdown body, printed verbatim
    pub fn document(&self, text: &str) {
        println!("{}", text);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
