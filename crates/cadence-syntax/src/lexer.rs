//! Tokenizer for the subset of Cadence lexical structure the scanner needs.
//!
//! Comments and whitespace are dropped. String literals are decoded, and string
//! template interpolations (`\(expr)`) are skipped over. Everything that
//! is not an identifier, number or string comes out as a single-character
//! [`TokenKind::Punct`]; the scanner only cares about braces, parentheses and commas.

use crate::ast::Position;
use crate::parser::Diagnostic;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    /// A string literal. `value` is decoded with interpolations dropped; `raw` is the
    /// source text between the quotes.
    String { value: String, raw: String },
    /// Numeric literal text, including hex addresses such as `0x01`.
    Number(String),
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

struct Lexer<'a> {
    code: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Byte offset of the next char.
    offset: usize,
    line: usize,
    column: usize,
}

/// Tokenize `code`, stopping at the first lexical error.
pub fn tokenize(code: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer {
        code,
        chars: code.chars().peekable(),
        offset: 0,
        line: 1,
        column: 1,
    }
    .run()
}

impl<'a> Lexer<'a> {
    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn run(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.position();
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.skip_line_comment(),
                '/' if self.peek_second() == Some('*') => self.skip_block_comment(start)?,
                '"' => {
                    let (value, raw) = self.string(start)?;
                    tokens.push(Token {
                        kind: TokenKind::String { value, raw },
                        position: start,
                    });
                }
                c if c.is_alphabetic() || c == '_' => {
                    let text = self.take_while(|c| c.is_alphanumeric() || c == '_');
                    tokens.push(Token {
                        kind: TokenKind::Identifier(text),
                        position: start,
                    });
                }
                c if c.is_ascii_digit() => {
                    let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    tokens.push(Token {
                        kind: TokenKind::Number(text),
                        position: start,
                    });
                }
                c => {
                    self.bump();
                    tokens.push(Token {
                        kind: TokenKind::Punct(c),
                        position: start,
                    });
                }
            }
        }

        Ok(tokens)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Block comments nest.
    fn skip_block_comment(&mut self, start: Position) -> Result<(), Diagnostic> {
        self.bump();
        self.bump();
        let mut depth = 1usize;

        while depth > 0 {
            match self.bump() {
                Some('/') if self.peek() == Some('*') => {
                    self.bump();
                    depth += 1;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    depth -= 1;
                }
                Some(_) => {}
                None => return Err(Diagnostic::new("unterminated block comment", start)),
            }
        }

        Ok(())
    }

    /// Decoded value and raw text of the string literal at the cursor.
    fn string(&mut self, start: Position) -> Result<(String, String), Diagnostic> {
        self.bump();
        let body_start = self.offset;
        let mut value = String::new();

        loop {
            let escape_start = self.position();
            let before = self.offset;
            match self.bump() {
                Some('"') => return Ok((value, self.code[body_start..before].to_string())),
                Some('\\') if self.peek() == Some('(') => self.template(escape_start)?,
                Some('\\') => value.push(self.escape(escape_start)?),
                Some('\n') | None => {
                    return Err(Diagnostic::new("unterminated string literal", start))
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// Skip a `\(expr)` interpolation up to its matching `)`, including nested
    /// parentheses and nested string literals.
    fn template(&mut self, start: Position) -> Result<(), Diagnostic> {
        self.bump();
        let mut depth = 1usize;

        while depth > 0 {
            let position = self.position();
            match self.peek() {
                Some('"') => {
                    self.string(position)?;
                }
                Some('(') => {
                    self.bump();
                    depth += 1;
                }
                Some(')') => {
                    self.bump();
                    depth -= 1;
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(Diagnostic::new("unterminated string template", start)),
            }
        }

        Ok(())
    }

    fn escape(&mut self, start: Position) -> Result<char, Diagnostic> {
        let c = match self.bump() {
            Some('0') => '\0',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',
            Some('u') => return self.unicode_escape(start),
            Some(other) => {
                return Err(Diagnostic::new(
                    format!("invalid escape sequence `\\{}`", other),
                    start,
                ))
            }
            None => return Err(Diagnostic::new("unterminated string literal", start)),
        };
        Ok(c)
    }

    /// `\u{XXXX}` with one to eight hex digits.
    fn unicode_escape(&mut self, start: Position) -> Result<char, Diagnostic> {
        let invalid = || Diagnostic::new("invalid unicode escape sequence", start);

        if self.bump() != Some('{') {
            return Err(invalid());
        }
        let digits = self.take_while(|c| c.is_ascii_hexdigit());
        if self.bump() != Some('}') || digits.is_empty() || digits.len() > 8 {
            return Err(invalid());
        }

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(invalid)
    }
}
