use termion::color::{self, Fg};

use super::CompilationError;

/// Prints compilation errors to the terminal.
pub struct DiagnosticsPrinter<'a> {
    source: Option<&'a str>,
    errors: &'a [CompilationError],
}

impl<'a> DiagnosticsPrinter<'a> {
    pub fn new(errors: &'a [CompilationError]) -> Self {
        Self {
            source: None,
            errors,
        }
    }

    /// Name the file the errors came from.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn print(&self) {
        for error in self.errors {
            eprintln!("{}", self.stringify_error(error));
        }
    }

    /// [E] (file) kind: message
    ///     context
    fn stringify_error(&self, e: &CompilationError) -> String {
        let location = match self.source {
            Some(source) => format!(" {source}:"),
            None => String::new(),
        };
        let mut s = format!(
            "{}[E]{}{} {}{}:{} {}",
            Fg(color::Red),
            Fg(color::Reset),
            location,
            Fg(color::Blue),
            e.kind(),
            Fg(color::Reset),
            e,
        );
        for line in e.context() {
            s += &format!("\n\t{line}");
        }
        s
    }
}
