use super::token;
use owo_colors::OwoColorize;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexerError {
    #[error("Expected '{}', but found '{}'", expected.bright_blue(), found.escape_default().bright_yellow())]
    UnexpectedChar { expected: char, found: char },

    #[error("Unexpected character '{}'", .0.escape_default().bright_yellow())]
    UnknownChar(char),

    #[error("'{}' is not a valid immediate value", .0.bright_yellow())]
    InvalidImmediate(String),

    #[error("Invalid escape sequence '{}{}'", "\\".bright_yellow(), .0.bright_yellow())]
    InvalidEscape(char),

    #[error("'{}' is not a valid identifier", .0.bright_yellow())]
    InvalidIdentifier(String),

    #[error("Expected a register name after '{}'", "$".bright_blue())]
    EmptyRegister,
}

/// Represents any kind of error the parser may find
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("Expected an instruction name")]
    EmptyMnemonic,

    #[error("'{}' is not a valid instruction name", .0.bright_yellow())]
    InvalidMnemonic(String),

    #[error("'{}' is not a valid operand", .0.bright_yellow())]
    InvalidOperand(String),

    #[error("Malformed memory reference '{}'", .0.bright_yellow())]
    InvalidMemoryRef(String),

    #[error("'{}' is not a valid label", .0.bright_yellow())]
    InvalidLabel(String),

    #[error("Label '{}' was defined more than once", .0.bright_yellow())]
    DuplicateLabel(String),

    #[error("Did not expect '{}' here", .0.bright_yellow())]
    UnexpectedToken(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Lexer(#[from] LexerError),
    #[error("{0}")]
    Parser(#[from] ParserError),
    #[error("{}\n{}", err.bold(), ctx)]
    WithContext {
        err: Box<ParseError>,
        ctx: token::Context,
    },
    #[error("{err}\n   {}: {tip}\n", "[tip]".bright_yellow())]
    WithTip {
        err: Box<ParseError>,
        tip: Cow<'static, str>,
    },
}

impl ParseError {
    /// The error without any context or tips attached
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::WithContext { err, .. } | ParseError::WithTip { err, .. } => err.root(),
            _ => self,
        }
    }

    /// Where the error happened, if we know it
    pub fn context(&self) -> Option<&token::Context> {
        match self {
            ParseError::WithContext { ctx, .. } => Some(ctx),
            ParseError::WithTip { err, .. } => err.context(),
            _ => None,
        }
    }
}

pub trait Contextualize {
    fn with_context(self, ctx: token::Context) -> ParseError;
    fn with_tip(self, tip: impl Into<Cow<'static, str>>) -> ParseError;
}

impl Contextualize for ParseError {
    fn with_context(self, ctx: token::Context) -> ParseError {
        match self {
            ParseError::WithContext { err, .. } => ParseError::WithContext { err, ctx },
            _ => ParseError::WithContext {
                err: Box::new(self),
                ctx,
            },
        }
    }

    fn with_tip(self, tip: impl Into<Cow<'static, str>>) -> ParseError {
        ParseError::WithTip {
            err: Box::new(self),
            tip: tip.into(),
        }
    }
}

macro_rules! impl_contextualize {
    ($type:ty) => {
        impl Contextualize for $type {
            fn with_context(self, ctx: token::Context) -> ParseError {
                ParseError::WithContext {
                    err: Box::new(self.into()),
                    ctx,
                }
            }

            fn with_tip(self, tip: impl Into<Cow<'static, str>>) -> ParseError {
                ParseError::WithTip {
                    err: Box::new(self.into()),
                    tip: tip.into(),
                }
            }
        }
    };
}

impl_contextualize! { LexerError }
impl_contextualize! { ParserError }
