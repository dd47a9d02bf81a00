//! Top-level declaration scanner.
//!
//! [`DeclarationScanner`] is the default [`Parser`]. It does not parse Cadence; it
//! tokenizes the source, tracks delimiter nesting, and records the declarations that
//! appear at nesting depth zero:
//!
//! | Form | Recorded as |
//! |------|-------------|
//! | `import "loc"` | import, no identifiers, string location |
//! | `import 0x01` | import, no identifiers, address location |
//! | `import A, B from "loc"` / `from 0x01` / `from Name` | import with identifiers |
//! | `import Name` | import, identifier location |
//! | `<kind> Name` | composite declaration |
//! | `<kind> interface Name` | interface declaration |
//!
//! where `<kind>` is one of `contract`, `resource`, `struct`, `event`, `enum`, `attachment`.
//! Access modifiers such as `access(all)` or `pub` are skipped naturally because
//! their parenthesized part is nested.
//!
//! Malformed imports, escaped import locations and unbalanced delimiters are reported
//! as diagnostics; lexical errors (unterminated strings, templates or comments, bad
//! escapes) stop the scan. String template interpolations (`\(expr)`) are skipped.

use crate::ast::{
    CompositeDeclaration, CompositeKind, Declarations, ImportDeclaration, ImportLocation,
    InterfaceDeclaration, Position, SyntaxTree,
};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::parser::{Diagnostic, ParseError, Parser};
use tracing::trace;

/// Default parser adapter: scans top-level imports and declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationScanner;

impl DeclarationScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan `code` into owned declaration lists.
    pub fn scan(&self, code: &str) -> Result<Declarations, ParseError> {
        let tokens = tokenize(code)?;
        let mut scan = Scan {
            tokens: &tokens,
            pos: 0,
            open: Vec::new(),
            declarations: Declarations::default(),
            diagnostics: Vec::new(),
        };
        scan.run();

        if !scan.diagnostics.is_empty() {
            return Err(ParseError::new(scan.diagnostics));
        }

        trace!(
            imports = scan.declarations.imports.len(),
            composites = scan.declarations.composites.len(),
            interfaces = scan.declarations.interfaces.len(),
            "scanned declarations"
        );
        Ok(scan.declarations)
    }
}

impl Parser for DeclarationScanner {
    fn parse(&self, code: &str) -> Result<Box<dyn SyntaxTree>, ParseError> {
        Ok(Box::new(self.scan(code)?))
    }
}

/// Words that start a new declaration and so cannot be an import location.
fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "import" | "access" | "pub" | "priv" | "fun" | "let" | "var" | "transaction"
    ) || CompositeKind::from_keyword(word).is_some()
}

struct Scan<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Open delimiters with where they were opened.
    open: Vec<(char, Position)>,
    declarations: Declarations,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Scan<'t> {
    fn peek(&self) -> Option<&'t Token> {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Position of the next token, or `fallback` at end of input.
    fn here(&self, fallback: Position) -> Position {
        self.peek().map(|t| t.position).unwrap_or(fallback)
    }

    fn error(&mut self, message: impl Into<String>, position: Position) {
        self.diagnostics.push(Diagnostic::new(message, position));
    }

    fn run(&mut self) {
        while let Some(token) = self.next() {
            match &token.kind {
                TokenKind::Punct(c @ ('{' | '(' | '[')) => self.open.push((*c, token.position)),
                TokenKind::Punct(c @ ('}' | ')' | ']')) => self.close(*c, token.position),
                TokenKind::Identifier(word) if self.open.is_empty() => {
                    self.top_level_word(word, token.position)
                }
                _ => {}
            }
        }

        for (c, position) in std::mem::take(&mut self.open) {
            self.error(format!("unclosed `{}`", c), position);
        }
    }

    fn close(&mut self, c: char, position: Position) {
        let expected = match c {
            '}' => '{',
            ')' => '(',
            _ => '[',
        };
        match self.open.pop() {
            Some((open, _)) if open == expected => {}
            Some((open, opened_at)) => self.error(
                format!("mismatched `{}`, `{}` opened at {} is still open", c, open, opened_at),
                position,
            ),
            None => self.error(format!("unexpected `{}`", c), position),
        }
    }

    fn top_level_word(&mut self, word: &str, position: Position) {
        if word == "import" {
            self.import(position);
        } else if let Some(kind) = CompositeKind::from_keyword(word) {
            self.composite(kind, position);
        }
    }

    fn composite(&mut self, kind: CompositeKind, position: Position) {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Identifier(word)) if word == "interface" => {
                self.pos += 1;
                match self.peek().map(|t| &t.kind) {
                    Some(TokenKind::Identifier(name)) => {
                        self.pos += 1;
                        self.declarations.interfaces.push(InterfaceDeclaration {
                            kind,
                            identifier: name.clone(),
                            position,
                        });
                    }
                    _ => {
                        let at = self.here(position);
                        self.error(format!("expected {} interface name", kind), at);
                    }
                }
            }
            Some(TokenKind::Identifier(name)) => {
                self.pos += 1;
                self.declarations.composites.push(CompositeDeclaration {
                    kind,
                    identifier: name.clone(),
                    position,
                });
            }
            _ => {
                let at = self.here(position);
                self.error(format!("expected {} name", kind), at);
            }
        }
    }

    /// String or hex address literal at the cursor.
    ///
    /// String locations must be written without escapes, so the location seen by
    /// resolution is exactly the text between the quotes.
    fn location_literal(&mut self) -> Option<ImportLocation> {
        let token = self.peek()?;
        let location = match &token.kind {
            TokenKind::String { value, raw } => {
                if raw.contains('\\') {
                    self.error(
                        "escape sequences are not allowed in import locations",
                        token.position,
                    );
                }
                ImportLocation::String(value.clone())
            }
            TokenKind::Number(n) if n.starts_with("0x") || n.starts_with("0X") => {
                ImportLocation::Address(n.clone())
            }
            _ => return None,
        };
        self.pos += 1;
        Some(location)
    }

    fn import(&mut self, position: Position) {
        if let Some(location) = self.location_literal() {
            self.push_import(Vec::new(), location, position);
            return;
        }

        let mut identifiers = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Identifier(word)) if word == "from" => {
                    self.pos += 1;
                    return self.import_from(identifiers, position);
                }
                Some(TokenKind::Identifier(word)) if !is_keyword(word) => {
                    self.pos += 1;
                    identifiers.push(word.clone());
                }
                _ => {
                    let at = self.here(position);
                    self.error("expected import location", at);
                    return;
                }
            }

            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Punct(',')) => self.pos += 1,
                Some(TokenKind::Identifier(word)) if word == "from" => {
                    self.pos += 1;
                    return self.import_from(identifiers, position);
                }
                _ => break,
            }
        }

        // `import Name` without `from` names an identifier location.
        if identifiers.len() == 1 {
            let name = identifiers.remove(0);
            self.push_import(Vec::new(), ImportLocation::Identifier(name), position);
        } else {
            let at = self.here(position);
            self.error("expected `from` after imported identifiers", at);
        }
    }

    fn import_from(&mut self, identifiers: Vec<String>, position: Position) {
        if let Some(location) = self.location_literal() {
            self.push_import(identifiers, location, position);
            return;
        }
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Identifier(name)) if !is_keyword(name) => {
                self.pos += 1;
                let location = ImportLocation::Identifier(name.clone());
                self.push_import(identifiers, location, position);
            }
            _ => {
                let at = self.here(position);
                self.error("expected import location after `from`", at);
            }
        }
    }

    fn push_import(
        &mut self,
        identifiers: Vec<String>,
        location: ImportLocation,
        position: Position,
    ) {
        self.declarations.imports.push(ImportDeclaration {
            identifiers,
            location,
            position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(code: &str) -> Declarations {
        DeclarationScanner::new().scan(code).expect("scan")
    }

    fn messages(code: &str) -> Vec<String> {
        DeclarationScanner::new()
            .scan(code)
            .expect_err("should fail")
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_contract_with_imports() {
        let code = r#"
            import FungibleToken from "./FungibleToken.cdc"
            import NonFungibleToken, MetadataViews from 0x1d7e57aa55817448

            access(all) contract Kitty {
                access(all) resource NFT {}
                access(all) event Minted(id: UInt64)
                init() {}
            }
        "#;
        let decls = scan(code);

        assert_eq!(decls.imports.len(), 2);
        assert_eq!(decls.imports[0].identifiers, vec!["FungibleToken"]);
        assert_eq!(
            decls.imports[0].location,
            ImportLocation::String("./FungibleToken.cdc".into())
        );
        assert_eq!(
            decls.imports[1].identifiers,
            vec!["NonFungibleToken", "MetadataViews"]
        );
        assert_eq!(
            decls.imports[1].location,
            ImportLocation::Address("0x1d7e57aa55817448".into())
        );
        assert_eq!(decls.imports[1].position, Position::new(3, 13));

        // Nested resource and event are not top-level declarations.
        assert_eq!(decls.composites.len(), 1);
        assert_eq!(decls.composites[0].kind, CompositeKind::Contract);
        assert_eq!(decls.composites[0].identifier, "Kitty");
        assert!(decls.interfaces.is_empty());
    }

    #[test]
    fn test_contract_interface() {
        let decls =
            scan("pub contract interface FungibleToken { pub resource interface Vault {} }");
        assert!(decls.composites.is_empty());
        assert_eq!(decls.interfaces.len(), 1);
        assert_eq!(decls.interfaces[0].kind, CompositeKind::Contract);
        assert_eq!(decls.interfaces[0].identifier, "FungibleToken");
    }

    #[test]
    fn test_bare_string_and_identifier_imports() {
        let decls = scan("import \"Foo\"\nimport Crypto\nimport 0x01\ntransaction {}");
        let locations: Vec<_> = decls.imports.iter().map(|i| i.location.clone()).collect();
        assert_eq!(
            locations,
            vec![
                ImportLocation::String("Foo".into()),
                ImportLocation::Identifier("Crypto".into()),
                ImportLocation::Address("0x01".into()),
            ]
        );
        assert!(decls.imports.iter().all(|i| i.identifiers.is_empty()));
        assert!(decls.composites.is_empty());
    }

    #[test]
    fn test_import_from_without_identifiers() {
        let decls = scan(r#"import from "B""#);
        assert_eq!(decls.imports.len(), 1);
        assert_eq!(decls.imports[0].location, ImportLocation::String("B".into()));
    }

    #[test]
    fn test_keyword_is_not_an_import_location() {
        let msgs = messages("import A from
contract X {}");
        assert_eq!(msgs, vec!["expected import location after `from`"]);
    }

    #[test]
    fn test_keywords_in_bodies_and_strings_are_ignored() {
        let code = r#"
            access(all) fun main(): String {
                let s = "import X from \"Y\""
                // contract Fake {}
                return s
            }
        "#;
        let decls = scan(code);
        assert!(decls.imports.is_empty());
        assert!(decls.composites.is_empty());
    }

    #[test]
    fn test_string_templates_in_script() {
        let code = r#"
            import Greeter from "Greeter"

            access(all) fun main(name: String): String {
                log("greeting \(name) (\(name.length) chars)")
                return "\(Greeter.prefix(of: "}"))\(name)"
            }
        "#;
        let decls = scan(code);
        assert_eq!(decls.imports.len(), 1);
        assert_eq!(decls.imports[0].location, ImportLocation::String("Greeter".into()));
        assert!(decls.composites.is_empty());
    }

    #[test]
    fn test_escaped_import_location_is_rejected() {
        let err = DeclarationScanner::new()
            .scan("import B from \"\\u{42}\"\naccess(all) contract A {}")
            .unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        assert_eq!(
            err.diagnostics[0].message,
            "escape sequences are not allowed in import locations"
        );
        assert_eq!(err.diagnostics[0].position, Position::new(1, 15));
    }

    #[test]
    fn test_unbalanced_delimiters() {
        assert_eq!(messages("contract A {"), vec!["unclosed `{`"]);
        assert_eq!(messages("contract A {}}"), vec!["unexpected `}`"]);
        let mismatched = messages("contract A { ( }");
        assert!(mismatched[0].starts_with("mismatched `}`"));
    }

    #[test]
    fn test_malformed_imports_are_all_reported() {
        let msgs = messages("import A from\nimport B, C\nimport , \ncontract X {}");
        assert_eq!(
            msgs,
            vec![
                "expected import location after `from`",
                "expected `from` after imported identifiers",
                "expected import location",
            ]
        );
    }

    #[test]
    fn test_lexical_error_is_reported() {
        assert_eq!(messages("import A from \"A"), vec!["unterminated string literal"]);
    }

    #[test]
    fn test_parser_trait_object() {
        let parser: Box<dyn Parser> = Box::new(DeclarationScanner);
        let tree = parser.parse("access(all) contract C {}").unwrap();
        assert_eq!(tree.composite_declarations()[0].identifier, "C");
        assert!(tree.import_declarations().is_empty());
    }
}
