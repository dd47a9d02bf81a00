//! Flow Deployer
//!
//! Import resolution and deployment ordering for Cadence projects:
//!
//! - **Parsing**: Extract import and declaration headers ([`syntax`])
//! - **Resolution**: Bind imports to programs or aliases ([`ProgramImports`])
//! - **Ordering**: Deploy contracts after their dependencies ([`DeploymentImports`])
//! - **Rewriting**: Substitute addresses for import locations ([`Program::replaced_imports`])
//!
//! See [`resolver`] for the full API and [`types`] for addresses and alias tables.

pub use cadence_syntax as syntax;
pub use flow_deployer_types as types;
pub use flow_resolver as resolver;

pub use flow_deployer_types::{Address, AddressError, Aliases, Args};
pub use flow_resolver::{
    DeploymentImports, DeploymentPlan, FileLoader, Loader, MemoryLoader, Program, ProgramId,
    ProgramImports, ResolveError, UnresolvedImport,
};
