//! Declaration-level view of a Cadence program.
//!
//! The resolver only needs two things from a parsed program: its import declarations
//! and its top-level composite/interface declarations. [`SyntaxTree`] is that capability,
//! so any parser that can answer those queries can drive resolution.

use std::fmt;

/// A 1-based line/column position in source text. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where an import points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportLocation {
    /// `import X from "./X.cdc"` - the only kind the resolver binds.
    String(String),
    /// `import X from 0x01`, kept as the raw literal.
    Address(String),
    /// `import X`, resolved by the host environment.
    Identifier(String),
}

impl ImportLocation {
    pub fn as_string_location(&self) -> Option<&str> {
        match self {
            ImportLocation::String(location) => Some(location),
            _ => None,
        }
    }
}

impl fmt::Display for ImportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportLocation::String(location) => write!(f, "{:?}", location),
            ImportLocation::Address(address) => f.write_str(address),
            ImportLocation::Identifier(identifier) => f.write_str(identifier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    /// Imported identifiers, empty for `import "location"`.
    pub identifiers: Vec<String>,
    pub location: ImportLocation,
    pub position: Position,
}

/// Kind keyword of a composite or interface declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Contract,
    Resource,
    Struct,
    Event,
    Enum,
    Attachment,
}

impl CompositeKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "contract" => CompositeKind::Contract,
            "resource" => CompositeKind::Resource,
            "struct" => CompositeKind::Struct,
            "event" => CompositeKind::Event,
            "enum" => CompositeKind::Enum,
            "attachment" => CompositeKind::Attachment,
            _ => return None,
        })
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            CompositeKind::Contract => "contract",
            CompositeKind::Resource => "resource",
            CompositeKind::Struct => "struct",
            CompositeKind::Event => "event",
            CompositeKind::Enum => "enum",
            CompositeKind::Attachment => "attachment",
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeDeclaration {
    pub kind: CompositeKind,
    pub identifier: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    pub kind: CompositeKind,
    pub identifier: String,
    pub position: Position,
}

/// The queries a parsed program must answer for import resolution.
pub trait SyntaxTree: fmt::Debug + Send + Sync {
    /// Import declarations in source order.
    fn import_declarations(&self) -> &[ImportDeclaration];

    /// Top-level composite declarations in source order.
    fn composite_declarations(&self) -> &[CompositeDeclaration];

    /// Top-level interface declarations in source order.
    fn interface_declarations(&self) -> &[InterfaceDeclaration];
}

/// Plain owned declaration lists, produced by [`DeclarationScanner`](crate::DeclarationScanner)
/// and handy for hosts that adapt another parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub imports: Vec<ImportDeclaration>,
    pub composites: Vec<CompositeDeclaration>,
    pub interfaces: Vec<InterfaceDeclaration>,
}

impl SyntaxTree for Declarations {
    fn import_declarations(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    fn composite_declarations(&self) -> &[CompositeDeclaration] {
        &self.composites
    }

    fn interface_declarations(&self) -> &[InterfaceDeclaration] {
        &self.interfaces
    }
}
