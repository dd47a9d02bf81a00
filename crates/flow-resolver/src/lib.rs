//! Flow Resolver
//!
//! Import resolution, source rewriting and deployment ordering for Cadence programs.
//!
//! This crate provides:
//! - [`loader`]: The [`Loader`] trait with file and in-memory implementations
//! - [`program`]: [`Program`], one parsed unit and its bindings
//! - [`imports`]: [`ProgramImports`], binding imports to programs or aliases
//! - [`deployment`]: [`DeploymentImports`], ordering contracts so dependencies deploy first
//! - [`rewrite`]: Substitution of bound addresses for quoted import locations
//!
//! # Data flow
//!
//! ```text
//! add_program(location, target, account, args)
//!     │  Loader::load ──▶ Parser::parse ──▶ Program (parsed)
//!     ▼
//! resolve() / sort()
//!     │  each string import ──▶ program in collection | alias | unresolved
//!     ▼
//! programs() in order ──▶ Program::replaced_imports() ──▶ source ready to deploy
//! ```
//!
//! A collection is single-threaded: callers serialize access. Identical inputs in the
//! same insertion order always produce identical order and identical rewritten bytes.

pub mod deployment;
pub mod error;
pub mod imports;
pub mod loader;
pub mod program;
pub mod rewrite;

pub use deployment::{DeploymentImports, DeploymentPlan, PlannedContract};
pub use error::{ResolveError, UnresolvedImport};
pub use imports::ProgramImports;
pub use loader::{FileLoader, Loader, MemoryLoader};
pub use program::{Dependency, Program, ProgramId};
