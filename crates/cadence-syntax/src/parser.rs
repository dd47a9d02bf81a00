//! Parser seam and parse diagnostics.

use crate::ast::{Position, SyntaxTree};
use std::fmt;

/// Anything that can turn Cadence source into a [`SyntaxTree`].
///
/// The workspace ships [`DeclarationScanner`](crate::DeclarationScanner); hosts with a
/// full Cadence parser implement this trait over their own AST.
pub trait Parser: Send + Sync {
    fn parse(&self, code: &str) -> Result<Box<dyn SyntaxTree>, ParseError>;
}

impl<P: Parser + ?Sized> Parser for &P {
    fn parse(&self, code: &str) -> Result<Box<dyn SyntaxTree>, ParseError> {
        (**self).parse(code)
    }
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    fn parse(&self, code: &str) -> Result<Box<dyn SyntaxTree>, ParseError> {
        (**self).parse(code)
    }
}

/// A single parser message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Source did not parse. Carries every diagnostic the parser produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.diagnostics.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ParseError {}
