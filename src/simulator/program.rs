use crate::parser::error::{Contextualize, ParseError, ParserError};
use crate::parser::{self, Context, Line};
use hashbrown::HashMap;

/// A parsed program: its instructions, in order, and where each label points to.
/// A label refers to the first instruction after it, so a label at the very end of the program
/// points one past the last line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<Line>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Parses a program given as source lines. Line numbers in errors start at 1.
    pub fn parse<I, S>(source: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut program = Self::default();

        for (i, text) in source.into_iter().enumerate() {
            let text = text.as_ref();
            let number = i as u32 + 1;
            let statement = parser::parse_statement(text, number)?;

            if let Some(label) = statement.label {
                if program.labels.contains_key(&label) {
                    return Err(ParserError::DuplicateLabel(label)
                        .with_context(Context::new(text.trim_end(), number)));
                }
                program.labels.insert(label, program.lines.len());
            }

            if let Some(line) = statement.line {
                program.lines.push(line);
            }
        }

        tracing::debug!(
            lines = program.lines.len(),
            labels = program.labels.len(),
            "program parsed"
        );
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The instruction at `index`, if there's one
    pub fn get(&self, index: i64) -> Option<&Line> {
        usize::try_from(index).ok().and_then(|i| self.lines.get(i))
    }

    /// Where a label points to
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Every label and its line, sorted by line
    pub fn labels(&self) -> Vec<(&str, usize)> {
        let mut labels: Vec<_> = self
            .labels
            .iter()
            .map(|(name, &line)| (name.as_str(), line))
            .collect();
        labels.sort_by_key(|&(name, line)| (line, name));
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_point_to_the_next_instruction() {
        let source = "
            start: li $t0 1
            # a comment

            loop:
            middle:
                inc $t0
            end:
        ";
        let program = Program::parse(source.lines()).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.label("start"), Some(0));
        assert_eq!(program.label("loop"), Some(1));
        assert_eq!(program.label("middle"), Some(1));
        assert_eq!(program.label("end"), Some(2));
        assert_eq!(program.label("nowhere"), None);
        assert_eq!(
            program.labels(),
            &[("start", 0), ("loop", 1), ("middle", 1), ("end", 2)]
        );
    }

    #[test]
    fn instructions_keep_their_source_line() {
        let program = Program::parse(["", "li $t0 1", "# nothing", "inc $t0"]).unwrap();
        let numbers: Vec<u32> = program.lines().iter().map(Line::number).collect();
        assert_eq!(numbers, &[2, 4]);
        assert!(program.get(-1).is_none());
        assert!(program.get(2).is_none());
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = Program::parse(["a:", "li $t0 1", "a: inc $t0"]).unwrap_err();
        assert_eq!(
            err.root(),
            &ParseError::Parser(ParserError::DuplicateLabel("a".into()))
        );
        assert_eq!(err.context().map(|ctx| ctx.line), Some(3));
    }

    #[test]
    fn parse_errors_stop_loading() {
        let err = Program::parse(["li $t0 1", "li $t0 0xZZ"]).unwrap_err();
        assert_eq!(err.context().map(|ctx| ctx.line), Some(2));
    }
}
