//!
//! Parses single lines of EzASM into a mnemonic and its operands. Parsing is purely syntactic:
//! whether an instruction, register or label actually exists is only checked when the line is
//! dispatched (see [`crate::instruction::Dispatcher`]).
//!
//! ```text
//! loop: add $t0, $t0, 1     # label, mnemonic and three operands
//!       mv 8($sp) $t0       # memory reference
//!       bne $t0 10 loop     # label reference
//! ```
//!

pub mod error;
pub mod lexer;
pub mod token;

use error::{Contextualize, LexerError, ParseError, ParserError};
use lexer::{Data, Lexeme, Lexer};
use std::iter::Peekable;
pub use token::{Context, Token};

/// One instruction: a lowercase mnemonic plus its operands, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub mnemonic: String,
    pub tokens: Vec<Token>,
    pub ctx: Context,
}

impl Line {
    /// The (1-based) source line this instruction came from
    pub fn number(&self) -> u32 {
        self.ctx.line
    }
}

/// Everything a source line may contain: an optional label definition followed by an
/// optional instruction. Blank and comment-only lines have neither.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    pub label: Option<String>,
    pub line: Option<Line>,
}

/// Parses a line that must contain an instruction. A label definition in front of it is
/// accepted but discarded, as labels only mean something inside a [`crate::simulator::Program`].
pub fn parse(text: &str, line_number: u32) -> Result<Line, ParseError> {
    parse_statement(text, line_number)?.line.ok_or_else(|| {
        ParserError::EmptyMnemonic.with_context(Context::new(text.trim_end(), line_number))
    })
}

/// Parses any source line
pub fn parse_statement(text: &str, line_number: u32) -> Result<Statement, ParseError> {
    let mut lexemes = Lexer::new(text, line_number).peekable();
    let mut statement = Statement::default();

    let mut first = match lexemes.next() {
        None => return Ok(statement),
        Some(lexeme) => lexeme.map_err(|e| reinterpret(e, ParserError::InvalidMnemonic))?,
    };

    if let Data::Label(label) = first.data {
        statement.label = Some(label);
        first = match lexemes.next() {
            None => return Ok(statement),
            Some(lexeme) => lexeme.map_err(|e| reinterpret(e, ParserError::InvalidMnemonic))?,
        };
    }

    let mnemonic = match first.data {
        Data::Identifier(name) => name.to_ascii_lowercase(),
        other => return Err(ParserError::InvalidMnemonic(other.to_string()).with_context(first.ctx)),
    };

    let mut tokens = Vec::new();
    while let Some(lexeme) = lexemes.next() {
        let lexeme = lexeme.map_err(|e| reinterpret(e, ParserError::InvalidLabel))?;
        tokens.push(parse_operand(lexeme, &mut lexemes)?);
    }

    statement.line = Some(Line {
        mnemonic,
        tokens,
        ctx: first.ctx,
    });
    Ok(statement)
}

/// The lexer can't tell what a malformed word was supposed to be, but we can
fn reinterpret(err: ParseError, as_: fn(String) -> ParserError) -> ParseError {
    let renamed = match (err.root(), err.context()) {
        (ParseError::Lexer(LexerError::InvalidIdentifier(word)), Some(ctx))
            if !word.starts_with('$') =>
        {
            Some(as_(word.clone()).with_context(ctx.clone()))
        }
        _ => None,
    };
    renamed.unwrap_or(err)
}

fn parse_operand<'a>(
    lexeme: Lexeme,
    lexemes: &mut Peekable<Lexer<'a>>,
) -> Result<Token, ParseError> {
    match lexeme.data {
        Data::Register(name) => Ok(Token::Register(name)),
        Data::Identifier(label) => Ok(Token::Label(label)),
        Data::CharLiteral(c) => Ok(Token::Immediate(c as i64)),
        Data::Integer(x) => {
            let paren = lexemes.next_if(|l| matches!(l, Ok(Lexeme { data: Data::Char('('), .. })));
            match paren {
                Some(_) => parse_memory(x, lexeme.ctx, lexemes),
                None => Ok(Token::Immediate(x)),
            }
        }
        Data::Char('(') => parse_memory(0, lexeme.ctx, lexemes),
        Data::Label(label) => {
            Err(ParserError::UnexpectedToken(format!("{}:", label)).with_context(lexeme.ctx))
        }
        Data::Char(c) => Err(ParserError::InvalidOperand(c.to_string()).with_context(lexeme.ctx)),
    }
}

/// Parses the `$base)` part of a memory reference. The opening parenthesis has already been
/// consumed.
fn parse_memory<'a>(
    offset: i64,
    ctx: Context,
    lexemes: &mut Peekable<Lexer<'a>>,
) -> Result<Token, ParseError> {
    let malformed = |seen: String| {
        ParserError::InvalidMemoryRef(seen)
            .with_tip("memory references look like `offset($register)`, as in `8($sp)`")
            .with_context(ctx.clone())
    };

    let base = match lexemes.next() {
        Some(Ok(Lexeme {
            data: Data::Register(base),
            ..
        })) => base,
        Some(Ok(other)) => return Err(malformed(format!("{}({}", offset, other.data))),
        Some(Err(e)) => return Err(e),
        None => return Err(malformed(format!("{}(", offset))),
    };

    match lexemes.next() {
        Some(Ok(Lexeme {
            data: Data::Char(')'),
            ..
        })) => Ok(Token::Memory { base, offset }),
        Some(Ok(other)) => Err(malformed(format!("{}(${}{}", offset, base, other.data))),
        Some(Err(e)) => Err(e),
        None => Err(malformed(format!("{}(${}", offset, base))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        parse(text, 1).unwrap().tokens
    }

    fn root_err(text: &str) -> ParseError {
        parse(text, 1).unwrap_err().root().clone()
    }

    #[test]
    fn test_parse_instruction() {
        let line = parse("  ADD $t0, $t0 $t1  ", 7).unwrap();
        assert_eq!(line.mnemonic, "add");
        assert_eq!(line.number(), 7);
        assert_eq!(
            line.tokens,
            &[
                Token::Register("t0".into()),
                Token::Register("t0".into()),
                Token::Register("t1".into()),
            ]
        );
    }

    #[test]
    fn test_operand_forms() {
        assert_eq!(
            tokens("mv -8($sp) 'a' 0x10 skip ($t1)"),
            &[
                Token::Memory {
                    base: "sp".into(),
                    offset: -8
                },
                Token::Immediate('a' as i64),
                Token::Immediate(16),
                Token::Label("skip".into()),
                Token::Memory {
                    base: "t1".into(),
                    offset: 0
                },
            ]
        );
    }

    #[test]
    fn test_statement_with_label() {
        let stmt = parse_statement("loop: add $t0 $t0 1 # increment", 3).unwrap();
        assert_eq!(stmt.label.as_deref(), Some("loop"));
        assert_eq!(stmt.line.unwrap().mnemonic, "add");

        let stmt = parse_statement("skip:", 4).unwrap();
        assert_eq!(stmt.label.as_deref(), Some("skip"));
        assert!(stmt.line.is_none());

        assert_eq!(parse_statement("   # nothing", 5).unwrap(), Statement::default());
    }

    #[test]
    fn test_empty_mnemonic() {
        assert_eq!(root_err(""), ParseError::Parser(ParserError::EmptyMnemonic));
        assert_eq!(root_err("label:"), ParseError::Parser(ParserError::EmptyMnemonic));
    }

    #[test]
    fn test_invalid_mnemonic() {
        assert_eq!(
            root_err("$t0 $t1"),
            ParseError::Parser(ParserError::InvalidMnemonic("$t0".into()))
        );
        assert_eq!(
            root_err("a-dd $t0"),
            ParseError::Parser(ParserError::InvalidMnemonic("a-dd".into()))
        );
    }

    #[test]
    fn test_invalid_label_reference() {
        assert_eq!(
            root_err("beq $t0 $t0 sk!p"),
            ParseError::Parser(ParserError::InvalidLabel("sk!p".into()))
        );
    }

    #[test]
    fn test_malformed_memory_references() {
        for text in ["mv $t0 8(sp)", "mv $t0 8($sp", "mv $t0 8(5)", "mv $t0 ($sp $t1)"] {
            assert!(
                matches!(root_err(text), ParseError::Parser(ParserError::InvalidMemoryRef(_))),
                "{text} should be a malformed memory reference"
            );
        }
    }

    #[test]
    fn test_invalid_operands() {
        assert_eq!(
            root_err("add $t0 ) $t1"),
            ParseError::Parser(ParserError::InvalidOperand(")".into()))
        );
        assert_eq!(
            root_err("push :"),
            ParseError::Parser(ParserError::InvalidOperand(":".into()))
        );
    }

    #[test]
    fn test_unexpected_tokens() {
        assert_eq!(
            root_err("j other: $t1"),
            ParseError::Parser(ParserError::UnexpectedToken("other:".into()))
        );
    }

    #[test]
    fn test_unregistered_things_still_parse() {
        let line = parse("foobar $bogus nowhere", 1).unwrap();
        assert_eq!(line.mnemonic, "foobar");
        assert_eq!(
            line.tokens,
            &[Token::Register("bogus".into()), Token::Label("nowhere".into())]
        );
    }
}
