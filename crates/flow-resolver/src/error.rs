//! Resolver error types.
//!
//! Every failing operation on a collection returns one of these and leaves the
//! collection as it was before the call.

use cadence_syntax::ParseError;
use std::fmt;

/// An import whose location matched neither a program in the collection nor an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedImport {
    /// Name of the importing program, or its location when it has no name.
    pub from: String,
    /// The import location exactly as written in source.
    pub import: String,
}

impl fmt::Display for UnresolvedImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {:?} in {} could not be resolved", self.import, self.from)
    }
}

#[derive(Debug)]
pub enum ResolveError {
    /// The loader could not produce source for a location.
    Load {
        location: String,
        source: anyhow::Error,
    },

    /// Source was loaded but did not parse. Diagnostics are the parser's, verbatim.
    Parse { location: String, error: ParseError },

    /// A program with this location is already in the collection.
    DuplicateLocation { location: String },

    /// Imports that matched neither a program nor an alias, in program then import order.
    UnresolvedImports(Vec<UnresolvedImport>),

    /// Ordering was requested for a collection holding programs that cannot be deployed.
    NotAContract { programs: Vec<String> },

    /// The dependency graph has cycles; each is a list of program names.
    CyclicImports { cycles: Vec<Vec<String>> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Load { location, source } => {
                write!(f, "failed to load program {:?}: {:#}", location, source)
            }
            ResolveError::Parse { location, error } => {
                write!(f, "failed to parse program {:?}: {}", location, error)
            }
            ResolveError::DuplicateLocation { location } => {
                write!(f, "program location {:?} was already added", location)
            }
            ResolveError::UnresolvedImports(imports) => {
                let rendered: Vec<String> = imports.iter().map(|i| i.to_string()).collect();
                write!(f, "unresolved imports: {}", rendered.join("; "))
            }
            ResolveError::NotAContract { programs } => write!(
                f,
                "only contracts can be deployed, but these programs are not contracts: {}",
                programs.join(", ")
            ),
            ResolveError::CyclicImports { cycles } => {
                let rendered: Vec<String> = cycles
                    .iter()
                    .map(|cycle| format!("[{}]", cycle.join(", ")))
                    .collect();
                write!(f, "cyclic imports detected: {}", rendered.join(", "))
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Load { source, .. } => {
                let source: &(dyn std::error::Error + Send + Sync + 'static) = source.as_ref();
                Some(source)
            }
            ResolveError::Parse { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_syntax::{Diagnostic, Position};

    #[test]
    fn test_display_messages() {
        let err = ResolveError::UnresolvedImports(vec![
            UnresolvedImport {
                from: "A".into(),
                import: "Missing".into(),
            },
            UnresolvedImport {
                from: "./b.cdc".into(),
                import: "Other".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "unresolved imports: import \"Missing\" in A could not be resolved; \
             import \"Other\" in ./b.cdc could not be resolved"
        );

        let err = ResolveError::CyclicImports {
            cycles: vec![vec!["A".into(), "B".into()], vec!["C".into()]],
        };
        assert_eq!(err.to_string(), "cyclic imports detected: [A, B], [C]");
    }

    #[test]
    fn test_sources_are_exposed() {
        use std::error::Error;

        let err = ResolveError::Load {
            location: "A".into(),
            source: anyhow::anyhow!("disk on fire"),
        };
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
        assert!(err.to_string().contains("disk on fire"));

        let err = ResolveError::Parse {
            location: "A".into(),
            error: ParseError::from(Diagnostic::new("unclosed `{`", Position::new(1, 2))),
        };
        assert_eq!(err.source().unwrap().to_string(), "1:2: unclosed `{`");

        let err = ResolveError::DuplicateLocation { location: "A".into() };
        assert!(err.source().is_none());
    }
}
