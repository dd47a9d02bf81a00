//! # Program Imports
//!
//! [`ProgramImports`] is a collection of programs plus an alias table. Resolution binds
//! every string import of every program either to another program in the collection
//! (a dependency) or to a pre-deployed address (an alias).
//!
//! ## Lookup order
//!
//! For an import `L` written in program `P`:
//!
//! 1. the loader maps `L` to a location relative to `P` and canonicalizes it;
//! 2. a program with that canonical location wins;
//! 3. otherwise an alias keyed by `L` (or by the canonical location) is used;
//! 4. otherwise the import is unresolved.
//!
//! Bindings are keyed by `L` exactly as written, which is what the rewriter searches for.
//!
//! ## Usage
//!
//! ```
//! use flow_deployer_types::{Address, Aliases};
//! use flow_resolver::{MemoryLoader, ProgramImports};
//!
//! let loader = MemoryLoader::new()
//!     .with("Script", "import FT from \"FungibleToken\"\naccess(all) fun main() {}");
//! let aliases = Aliases::try_from_pairs([("FungibleToken", "ee82856bf20e2aa6")]).unwrap();
//!
//! let mut imports = ProgramImports::new(loader, aliases);
//! imports.add_program("Script", Address::ZERO, "", vec![]).unwrap();
//! imports.resolve().unwrap();
//!
//! let script = imports.programs().next().unwrap();
//! assert!(script.replaced_imports().contains("0xee82856bf20e2aa6"));
//! ```

use crate::error::{ResolveError, UnresolvedImport};
use crate::loader::Loader;
use crate::program::{Dependency, Program, ProgramId};
use cadence_syntax::{DeclarationScanner, Parser};
use flow_deployer_types::{Address, Aliases, Args};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, trace};

/// Bindings computed for one program, committed only when the whole resolution succeeds.
#[derive(Debug, Default)]
pub(crate) struct ProgramBindings {
    pub(crate) dependencies: BTreeMap<String, Dependency>,
    pub(crate) aliases: BTreeMap<String, Address>,
}

/// A set of programs that import each other, plus aliases for everything else.
///
/// Operations must be externally serialized; nothing here locks.
pub struct ProgramImports {
    loader: Box<dyn Loader>,
    parser: Box<dyn Parser>,
    aliases: Aliases,
    /// Programs indexed by id; never reordered.
    programs: Vec<Program>,
    /// Observable order of `programs()`.
    order: Vec<ProgramId>,
    /// Canonical location -> program.
    by_location: HashMap<String, ProgramId>,
}

impl ProgramImports {
    /// Create a collection that parses with [`DeclarationScanner`].
    pub fn new(loader: impl Loader + 'static, aliases: Aliases) -> Self {
        Self::with_parser(loader, DeclarationScanner::new(), aliases)
    }

    pub fn with_parser(
        loader: impl Loader + 'static,
        parser: impl Parser + 'static,
        aliases: Aliases,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            parser: Box::new(parser),
            aliases,
            programs: Vec::new(),
            order: Vec::new(),
            by_location: HashMap::new(),
        }
    }

    /// Load, parse and append a program.
    ///
    /// On error nothing is added.
    pub fn add_program(
        &mut self,
        location: &str,
        target: Address,
        account_name: &str,
        args: Args,
    ) -> Result<&Program, ResolveError> {
        let key = self.loader.canonicalize(location);
        if self.by_location.contains_key(&key) {
            return Err(ResolveError::DuplicateLocation {
                location: location.to_string(),
            });
        }

        let code = self
            .loader
            .load(location)
            .map_err(|source| ResolveError::Load {
                location: location.to_string(),
                source,
            })?;

        let id = ProgramId::new(self.programs.len());
        let program = Program::new(
            id,
            location,
            code,
            target,
            account_name,
            args,
            self.parser.as_ref(),
        )
        .map_err(|error| ResolveError::Parse {
            location: location.to_string(),
            error,
        })?;

        debug!(
            location = %location,
            id = id.index(),
            name = %program.name(),
            is_contract = program.is_contract(),
            "added program"
        );

        self.by_location.insert(key, id);
        self.programs.push(program);
        self.order.push(id);
        Ok(&self.programs[id.index()])
    }

    /// Bind every string import of every program.
    ///
    /// All unresolved imports are reported together and no binding is committed unless
    /// every import resolves. Calling it again recomputes bindings from scratch.
    pub fn resolve(&mut self) -> Result<(), ResolveError> {
        let bindings = self.compute_bindings()?;
        self.commit_bindings(bindings);
        Ok(())
    }

    /// Programs in their current order: insertion order, or deployment order after a sort.
    pub fn programs(&self) -> impl Iterator<Item = &Program> + '_ {
        self.order.iter().map(move |id| &self.programs[id.index()])
    }

    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(id.index())
    }

    pub fn program_by_location(&self, location: &str) -> Option<&Program> {
        let key = self.loader.canonicalize(location);
        self.by_location.get(&key).and_then(|id| self.program(*id))
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Programs indexed by id.
    pub(crate) fn programs_by_id(&self) -> &[Program] {
        &self.programs
    }

    pub(crate) fn set_order(&mut self, order: Vec<ProgramId>) {
        debug_assert_eq!(order.len(), self.programs.len());
        self.order = order;
    }

    /// Compute bindings for every program, indexed by id.
    pub(crate) fn compute_bindings(&self) -> Result<Vec<ProgramBindings>, ResolveError> {
        let mut all = Vec::with_capacity(self.programs.len());
        let mut unresolved = Vec::new();

        for program in &self.programs {
            let mut bindings = ProgramBindings::default();

            for import in program.imports() {
                let resolved = self.loader.resolve_import(program.location(), import);
                let key = self.loader.canonicalize(&resolved);

                if let Some(&dep_id) = self.by_location.get(&key) {
                    let target = self.programs[dep_id.index()].target();
                    trace!(
                        from = %program.display_name(),
                        import = %import,
                        to = dep_id.index(),
                        "bound import to program"
                    );
                    bindings
                        .dependencies
                        .insert(import.to_string(), Dependency { id: dep_id, target });
                } else if let Some(address) =
                    self.aliases.get(import).or_else(|| self.aliases.get(&key))
                {
                    trace!(
                        from = %program.display_name(),
                        import = %import,
                        address = %address,
                        "bound import to alias"
                    );
                    bindings.aliases.insert(import.to_string(), address);
                } else {
                    unresolved.push(UnresolvedImport {
                        from: program.display_name().to_string(),
                        import: import.to_string(),
                    });
                }
            }

            all.push(bindings);
        }

        if !unresolved.is_empty() {
            debug!(count = unresolved.len(), "unresolved imports");
            return Err(ResolveError::UnresolvedImports(unresolved));
        }

        debug!(
            programs = all.len(),
            dependencies = all.iter().map(|b| b.dependencies.len()).sum::<usize>(),
            aliases = all.iter().map(|b| b.aliases.len()).sum::<usize>(),
            "resolved imports"
        );
        Ok(all)
    }

    pub(crate) fn commit_bindings(&mut self, bindings: Vec<ProgramBindings>) {
        for (program, bindings) in self.programs.iter_mut().zip(bindings) {
            program.set_bindings(bindings.dependencies, bindings.aliases);
        }
    }
}

impl fmt::Debug for ProgramImports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramImports")
            .field("programs", &self.programs().map(|p| p.location()).collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}
