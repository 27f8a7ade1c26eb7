use owo_colors::OwoColorize;
use std::{fmt, sync::Arc};

/// Token context: the source line a token came from, plus the line and column it sits at
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Context {
    pub source: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl Context {
    pub fn new(source: &str, line: u32) -> Self {
        Self {
            source: Arc::from(source),
            line,
            column: 1,
        }
    }

    pub fn advance_char(&mut self, c: char) {
        if c == '\t' {
            self.column += 4;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "   {} at line {}, column {}",
            "-->".bright_blue().bold(),
            self.line.bright_yellow(),
            self.column.bright_yellow(),
        )?;

        writeln!(
            f,
            "{:^6}{} {}",
            self.line.bright_blue(),
            "|".bright_blue(),
            self.source
        )?;
        for _ in 0..self.column + 6 {
            write!(f, "{}", ".".bright_red())?;
        }
        writeln!(f, "{}", "^ Here".bright_red())
    }
}
