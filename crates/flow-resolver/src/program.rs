//! A single parsed program and its resolution state.
//!
//! A [`Program`] moves through two states: parsed (after
//! [`ProgramImports::add_program`](crate::ProgramImports::add_program)) and linked
//! (after resolution fills in its dependencies and aliases). Rewriting with
//! [`Program::replaced_imports`] is a projection and never changes the program.

use crate::rewrite::replace_imports;
use cadence_syntax::{CompositeKind, ParseError, Parser, SyntaxTree};
use flow_deployer_types::{Address, Args};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Stable identifier of a program within its collection: its insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProgramId(usize);

impl ProgramId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An import bound to another program in the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub id: ProgramId,
    /// Target address of the imported program, substituted when rewriting.
    pub target: Address,
}

/// One unit of Cadence source: a contract, script or transaction.
#[derive(Debug)]
pub struct Program {
    id: ProgramId,
    location: String,
    name: String,
    target: Address,
    account_name: String,
    code: String,
    ast: Box<dyn SyntaxTree>,
    args: Args,
    dependencies: BTreeMap<String, Dependency>,
    aliases: BTreeMap<String, Address>,
}

impl Program {
    pub(crate) fn new(
        id: ProgramId,
        location: impl Into<String>,
        code: String,
        target: Address,
        account_name: impl Into<String>,
        args: Args,
        parser: &dyn Parser,
    ) -> Result<Self, ParseError> {
        let ast = parser.parse(&code)?;
        let name = parse_name(ast.as_ref());

        Ok(Self {
            id,
            location: location.into(),
            name,
            target,
            account_name: account_name.into(),
            code,
            ast,
            args,
            dependencies: BTreeMap::new(),
            aliases: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Contract name, or an empty string when the program declares no contract.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name for messages: the contract name, falling back to the location.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.location
        } else {
            &self.name
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Original source, exactly as loaded.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Account the program deploys to (zero for scripts and transactions).
    pub fn target(&self) -> Address {
        self.target
    }

    pub fn ast(&self) -> &dyn SyntaxTree {
        self.ast.as_ref()
    }

    /// Imports bound to programs in the same collection, keyed by import location.
    pub fn dependencies(&self) -> &BTreeMap<String, Dependency> {
        &self.dependencies
    }

    /// Imports bound to pre-deployed addresses, keyed by import location.
    pub fn aliases(&self) -> &BTreeMap<String, Address> {
        &self.aliases
    }

    /// Distinct string import locations in source order.
    ///
    /// Address and identifier imports are already concrete and are not listed.
    pub fn imports(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.ast
            .import_declarations()
            .iter()
            .filter_map(|import| import.location.as_string_location())
            .filter(|location| seen.insert(*location))
            .collect()
    }

    pub fn has_imports(&self) -> bool {
        !self.imports().is_empty()
    }

    /// True when the program declares exactly one top-level composite.
    ///
    /// Interface-only programs are not deployable and so are not contracts here.
    pub fn is_contract(&self) -> bool {
        self.ast.composite_declarations().len() == 1
    }

    /// Source with every bound import location replaced by its address.
    pub fn replaced_imports(&self) -> String {
        let dependencies = self
            .dependencies
            .iter()
            .map(|(location, dep)| (location.as_str(), dep.target));
        let aliases = self
            .aliases
            .iter()
            .map(|(location, address)| (location.as_str(), *address));

        replace_imports(&self.code, dependencies.chain(aliases))
    }

    pub(crate) fn set_bindings(
        &mut self,
        dependencies: BTreeMap<String, Dependency>,
        aliases: BTreeMap<String, Address>,
    ) {
        self.dependencies = dependencies;
        self.aliases = aliases;
    }
}

/// First contract-kind composite, else first contract-kind interface, else empty.
fn parse_name(ast: &dyn SyntaxTree) -> String {
    ast.composite_declarations()
        .iter()
        .find(|decl| decl.kind == CompositeKind::Contract)
        .map(|decl| decl.identifier.clone())
        .or_else(|| {
            ast.interface_declarations()
                .iter()
                .find(|decl| decl.kind == CompositeKind::Contract)
                .map(|decl| decl.identifier.clone())
        })
        .unwrap_or_default()
}
