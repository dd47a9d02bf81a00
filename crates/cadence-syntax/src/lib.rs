//! Cadence Syntax
//!
//! Declaration-level syntax support for Cadence programs.
//!
//! This crate provides:
//! - [`ast`]: The [`SyntaxTree`] capability trait and declaration types
//! - [`parser`]: The [`Parser`] seam and [`ParseError`] diagnostics
//! - [`scanner`]: [`DeclarationScanner`], a top-level declaration scanner usable as a parser
//!
//! The import resolver only ever asks a parsed program for its imports and its
//! top-level composite/interface declarations, so a host with a full Cadence parser
//! can plug it in by implementing [`Parser`] and [`SyntaxTree`].

pub mod ast;
mod lexer;
pub mod parser;
pub mod scanner;

pub use ast::{
    CompositeDeclaration, CompositeKind, Declarations, ImportDeclaration, ImportLocation,
    InterfaceDeclaration, Position, SyntaxTree,
};
pub use parser::{Diagnostic, ParseError, Parser};
pub use scanner::DeclarationScanner;
