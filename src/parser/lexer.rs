use super::error::{Contextualize, LexerError, ParseError};
use super::token::Context;
use std::fmt;

macro_rules! allowed_identifier {
    () => {
        'a'..='z' | 'A'..='Z' | '_' | '0'..='9' | '.'
    };
    (start) => {
        'a'..='z' | 'A'..='Z' | '_'
    };
}

macro_rules! expect {
    (Some($exp:expr) = $found:expr) => {
        let found = $found;
        if !matches!(found, Some(c) if c == $exp) {
            return Err(ParseError::from(LexerError::UnexpectedChar {
                expected: $exp,
                found: found.unwrap_or('\0'),
            }));
        }
    };
}

/// Characters that may end a word
fn is_boundary(c: Option<char>) -> bool {
    matches!(
        c,
        None | Some(' ' | ',' | '#' | '(' | ')' | ':' | '\t' | '\x0b'..='\x0d')
    )
}

/// Parses an integer literal: decimal, `0x` hexadecimal, `0b` binary or `0o` octal, with an
/// optional leading minus sign. Values that don't fit an i64 are accepted as long as they fit
/// an u64, and are reinterpreted as two's complement.
pub fn parse_integer(literal: &str) -> Option<i64> {
    let (negative, slice) = match literal.strip_prefix('-') {
        Some(positive_part) => (true, positive_part),
        None => (false, literal),
    };

    let slice = slice.replace('_', "");
    let lower = slice.to_ascii_lowercase();
    let magnitude = if let Some(digits) = lower.strip_prefix("0x") {
        u64::from_str_radix(digits, 16)
    } else if let Some(digits) = lower.strip_prefix("0b") {
        u64::from_str_radix(digits, 2)
    } else if let Some(digits) = lower.strip_prefix("0o") {
        u64::from_str_radix(digits, 8)
    } else if lower.starts_with('+') {
        return None;
    } else {
        lower.parse::<u64>()
    }
    .ok()?;

    if negative {
        if magnitude > i64::MIN.unsigned_abs() {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        Some(magnitude as i64)
    }
}

/// Lexeme data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Identifier(String),
    Label(String),
    Register(String),
    Integer(i64),
    CharLiteral(char),
    Char(char),
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Identifier(id) => write!(f, "{}", id),
            Data::Label(l) => write!(f, "{}:", l),
            Data::Register(r) => write!(f, "${}", r),
            Data::Integer(i) => write!(f, "{}", i),
            Data::CharLiteral(c) => write!(f, "'{}'", c.escape_default()),
            Data::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Lexeme given by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub data: Data,
    pub ctx: Context,
}

impl Lexeme {
    pub fn new(data: Data, ctx: Context) -> Self {
        Self { data, ctx }
    }
}

pub trait ContextualizeResult {
    fn with_ctx(self, ctx: Context) -> Self;
}

impl ContextualizeResult for Result<Data, ParseError> {
    fn with_ctx(self, ctx: Context) -> Self {
        self.map_err(|e| e.with_context(ctx))
    }
}

#[derive(Debug)]
/// Iterator over the lexemes of a single line of EzASM. Also see [`Lexeme`]
pub struct Lexer<'a> {
    /// The line being lexed
    content: &'a str,
    /// Current position in the content string
    cursor: usize,
    /// Context of the current lexeme
    context: Context,
    /// Set once an error is returned, so the iterator stops right after it
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(content: &'a str, line: u32) -> Self {
        Self {
            content,
            cursor: 0,
            context: Context::new(content, line),
            failed: false,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn peek(&self) -> Option<char> {
        self.content.get(self.cursor..)?.chars().next()
    }

    pub fn consume(&mut self) -> Option<char> {
        let next_char = self.peek()?;
        self.cursor += next_char.len_utf8();
        self.context.advance_char(next_char);
        Some(next_char)
    }

    pub fn consume_comment(&mut self) {
        while self.consume().is_some() {
            // continue consuming
        }
    }

    /// Consumes everything up to the next word boundary
    fn consume_word(&mut self, mut word: String) -> String {
        while !is_boundary(self.peek()) {
            if let Some(c) = self.consume() {
                word.push(c);
            }
        }
        word
    }

    fn next_identifier(&mut self) -> Result<Data, ParseError> {
        let mut id = String::new();
        while let Some(c @ allowed_identifier!()) = self.peek() {
            self.consume();
            id.push(c);
        }

        if !is_boundary(self.peek()) {
            let word = self.consume_word(id);
            return Err(LexerError::InvalidIdentifier(word).into());
        }

        if let Some(':') = self.peek() {
            self.consume();
            return Ok(Data::Label(id));
        }

        Ok(Data::Identifier(id))
    }

    // WARN: assumes the '$' has already been consumed
    fn next_register(&mut self) -> Result<Data, ParseError> {
        let mut name = String::new();
        while let Some(c @ ('a'..='z' | 'A'..='Z' | '_' | '0'..='9')) = self.peek() {
            self.consume();
            name.push(c);
        }

        if !is_boundary(self.peek()) {
            let word = self.consume_word(format!("${}", name));
            return Err(LexerError::InvalidIdentifier(word).into());
        }

        if name.is_empty() {
            return Err(LexerError::EmptyRegister.into());
        }

        Ok(Data::Register(name))
    }

    // WARN: assumes the '\' has already been consumed
    fn next_escape_sequence(&mut self) -> Result<char, ParseError> {
        match self.consume() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('\'') => Ok('\''),
            Some('"') => Ok('"'),
            Some(c) => Err(LexerError::InvalidEscape(c).into()),
            None => Err(LexerError::InvalidEscape('\0').into()),
        }
    }

    fn next_char_literal(&mut self) -> Result<Data, ParseError> {
        expect!(Some('\'') = self.consume());
        let mut c = match self.consume() {
            Some(c) => c,
            None => {
                return Err(LexerError::UnexpectedChar {
                    expected: '\'',
                    found: '\0',
                }
                .into())
            }
        };
        if c == '\\' {
            c = self.next_escape_sequence()?;
        }
        expect!(Some('\'') = self.consume());

        Ok(Data::CharLiteral(c))
    }

    fn next_number(&mut self) -> Result<Data, ParseError> {
        let mut literal = String::new();
        if let Some('-') = self.peek() {
            self.consume();
            literal.push('-');
        }
        let literal = self.consume_word(literal);

        parse_integer(&literal)
            .map(Data::Integer)
            .ok_or_else(|| LexerError::InvalidImmediate(literal).into())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let next_char = self.peek()?;
        let ctx = self.context.clone();

        let res = match next_char {
            // whitespace
            ' ' | ',' | '\t' | '\x0b'..='\x0d' => {
                self.consume();
                return self.next();
            }

            // comments
            '#' => {
                self.consume_comment();
                return None;
            }

            '(' | ')' | ':' => {
                self.consume();
                Ok(Data::Char(next_char))
            }

            '$' => {
                self.consume();
                self.next_register()
            }

            '\'' => self.next_char_literal(),
            '-' | '0'..='9' => self.next_number(),
            allowed_identifier!(start) => self.next_identifier(),

            c => {
                self.consume();
                Err(LexerError::UnknownChar(c).into())
            }
        };

        let res = res.with_ctx(ctx.clone());
        self.failed = res.is_err();
        Some(res.map(|data| Lexeme::new(data, ctx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lex(line: &str) -> Vec<Data> {
        Lexer::new(line, 1).map(|l| l.unwrap().data).collect()
    }

    fn lex_err(line: &str) -> ParseError {
        Lexer::new(line, 1)
            .find_map(Result::err)
            .expect("expected a lexer error")
    }

    #[test]
    fn test_lexer_creation() {
        assert_eq!(lex(""), &[]);
        assert_eq!(lex("   # only a comment"), &[]);
    }

    #[test]
    fn test_chars() {
        let mut lexer = Lexer::new("abc", 1);
        assert_eq!(lexer.peek(), Some('a'));
        assert_eq!(lexer.consume(), Some('a'));
        assert_eq!(lexer.peek(), Some('b'));
        assert_eq!(lexer.consume(), Some('b'));
        assert_eq!(lexer.consume(), Some('c'));
        assert_eq!(lexer.consume(), None);
    }

    #[test]
    fn test_lexer_basic() {
        use Data::*;
        assert_eq!(
            lex("main: add $t0, $t1, 8($sp) # trailing comment"),
            &[
                Label("main".into()),
                Identifier("add".into()),
                Register("t0".into()),
                Register("t1".into()),
                Integer(8),
                Char('('),
                Register("sp".into()),
                Char(')'),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        use Data::*;
        assert_eq!(
            lex("-40 0x5F -0b101 0o777 0xFFFFFFFFFFFFFFFF -9223372036854775808"),
            &[
                Integer(-40),
                Integer(0x5F),
                Integer(-0b101),
                Integer(0o777),
                Integer(-1),
                Integer(i64::MIN),
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(
            lex_err("li $t0 12abc").root(),
            &ParseError::Lexer(LexerError::InvalidImmediate("12abc".into()))
        );
        assert!(matches!(
            lex_err("li $t0 -9223372036854775809").root(),
            ParseError::Lexer(LexerError::InvalidImmediate(_))
        ));
    }

    #[test]
    fn test_char_literal() {
        use Data::*;
        assert_eq!(
            lex(r"'H' '\n' '\''"),
            &[CharLiteral('H'), CharLiteral('\n'), CharLiteral('\'')]
        );
        assert_eq!(
            lex_err(r"'\q'").root(),
            &ParseError::Lexer(LexerError::InvalidEscape('q'))
        );
    }

    #[test]
    fn test_identifiers() {
        use Data::*;
        assert_eq!(
            lex("abc ABC main.loop _start"),
            &[
                Identifier("abc".into()),
                Identifier("ABC".into()),
                Identifier("main.loop".into()),
                Identifier("_start".into()),
            ]
        );
        assert_eq!(
            lex_err("beq $t0 $t1 sk!p").root(),
            &ParseError::Lexer(LexerError::InvalidIdentifier("sk!p".into()))
        );
    }

    #[test]
    fn test_registers() {
        assert_eq!(lex("$T0 $0"), &[Data::Register("T0".into()), Data::Register("0".into())]);
        assert_eq!(
            lex_err("mv $ $t0").root(),
            &ParseError::Lexer(LexerError::EmptyRegister)
        );
    }

    #[test]
    fn test_error_context() {
        let err = lex_err("add $t0 $t1 @");
        let ctx = err.context().expect("lexer errors carry a context");
        assert_eq!(ctx.line, 1);
        assert_eq!(ctx.column, 13);
    }

    proptest! {
        #[test]
        fn decimal_integers_parse_back(x: i64) {
            prop_assert_eq!(parse_integer(&x.to_string()), Some(x));
        }

        #[test]
        fn hex_integers_parse_back(x: u64) {
            prop_assert_eq!(parse_integer(&format!("{:#x}", x)), Some(x as i64));
        }
    }
}
