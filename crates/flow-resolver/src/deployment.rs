//! # Deployment Ordering
//!
//! [`DeploymentImports`] is a [`ProgramImports`] restricted to contracts, with one extra
//! operation: [`sort`](DeploymentImports::sort) puts every contract after everything it
//! imports.
//!
//! ## Algorithm
//!
//! ```text
//!   imports ──resolve──▶ bindings ──▶ graph (dep ──▶ importer)
//!                                        │
//!                          Kahn's algorithm, ready set = min-heap on ProgramId
//!                                        │
//!                 all nodes emitted? ──yes──▶ commit bindings + order
//!                        │ no
//!                        ▼
//!             tarjan_scc ──▶ cycles (size > 1, or self-loop) ──▶ CyclicImports
//! ```
//!
//! Choosing the smallest ready id at each step makes the order a pure function of the
//! inputs and keeps it as close to insertion order as the dependencies allow.

use crate::error::ResolveError;
use crate::imports::{ProgramBindings, ProgramImports};
use crate::loader::Loader;
use crate::program::{Program, ProgramId};
use cadence_syntax::Parser;
use flow_deployer_types::{Address, Aliases, Args};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use tracing::{debug, warn};

/// Dependency graph over program ids. Node `i` is the program with id `i`.
type ImportGraph = DiGraph<ProgramId, ()>;

/// A set of contracts to deploy, orderable by their imports.
#[derive(Debug)]
pub struct DeploymentImports {
    imports: ProgramImports,
}

impl DeploymentImports {
    pub fn new(loader: impl Loader + 'static, aliases: Aliases) -> Self {
        Self {
            imports: ProgramImports::new(loader, aliases),
        }
    }

    pub fn with_parser(
        loader: impl Loader + 'static,
        parser: impl Parser + 'static,
        aliases: Aliases,
    ) -> Self {
        Self {
            imports: ProgramImports::with_parser(loader, parser, aliases),
        }
    }

    /// See [`ProgramImports::add_program`].
    pub fn add_program(
        &mut self,
        location: &str,
        target: Address,
        account_name: &str,
        args: Args,
    ) -> Result<&Program, ResolveError> {
        self.imports.add_program(location, target, account_name, args)
    }

    /// See [`ProgramImports::resolve`].
    pub fn resolve(&mut self) -> Result<(), ResolveError> {
        self.imports.resolve()
    }

    /// Resolve and order contracts so each follows all of its dependencies.
    ///
    /// Fails with [`ResolveError::NotAContract`] before doing anything else if any
    /// program is not a contract. On any failure neither bindings nor order change.
    pub fn sort(&mut self) -> Result<(), ResolveError> {
        let not_contracts: Vec<String> = self
            .imports
            .programs()
            .filter(|p| !p.is_contract())
            .map(|p| p.display_name().to_string())
            .collect();
        if !not_contracts.is_empty() {
            return Err(ResolveError::NotAContract {
                programs: not_contracts,
            });
        }

        let bindings = self.imports.compute_bindings()?;
        let order = deployment_order(self.imports.programs_by_id(), &bindings)?;

        self.imports.commit_bindings(bindings);
        self.imports.set_order(order);

        debug!(
            order = ?self.imports.programs().map(|p| p.display_name()).collect::<Vec<_>>(),
            "sorted contracts for deployment"
        );
        Ok(())
    }

    /// Programs in deployment order once sorted, insertion order before.
    pub fn programs(&self) -> impl Iterator<Item = &Program> + '_ {
        self.imports.programs()
    }

    pub fn imports(&self) -> &ProgramImports {
        &self.imports
    }

    /// Summary of the current order, suitable for showing before deploying.
    pub fn plan(&self) -> DeploymentPlan {
        let contracts = self
            .imports
            .programs()
            .map(|program| PlannedContract {
                name: program.name().to_string(),
                location: program.location().to_string(),
                account: program.account_name().to_string(),
                target: program.target(),
                dependencies: program
                    .dependencies()
                    .values()
                    .filter_map(|dep| self.imports.program(dep.id))
                    .map(|dep| dep.location().to_string())
                    .collect(),
                aliases: program.aliases().clone(),
            })
            .collect();

        DeploymentPlan { contracts }
    }
}

/// Stable topological order of `programs`, or every cycle that prevents one.
fn deployment_order(
    programs: &[Program],
    bindings: &[ProgramBindings],
) -> Result<Vec<ProgramId>, ResolveError> {
    let graph = build_graph(programs, bindings);

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors_directed(node, Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(programs.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(graph[NodeIndex::new(index)]);

        for next in graph.neighbors_directed(NodeIndex::new(index), Direction::Outgoing) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(next.index()));
            }
        }
    }

    if order.len() == programs.len() {
        return Ok(order);
    }

    let cycles: Vec<Vec<String>> = find_cycles(&graph)
        .into_iter()
        .map(|cycle| {
            cycle
                .into_iter()
                .map(|id| programs[id.index()].display_name().to_string())
                .collect()
        })
        .collect();

    warn!(cycles = ?cycles, "cyclic imports between contracts");
    Err(ResolveError::CyclicImports { cycles })
}

/// One node per program in id order; an edge `dep -> importer` per dependency binding.
fn build_graph(programs: &[Program], bindings: &[ProgramBindings]) -> ImportGraph {
    let mut graph = ImportGraph::with_capacity(programs.len(), 0);
    for program in programs {
        graph.add_node(program.id());
    }

    for (importer, program_bindings) in bindings.iter().enumerate() {
        for dep in program_bindings.dependencies.values() {
            graph.add_edge(NodeIndex::new(dep.id.index()), NodeIndex::new(importer), ());
        }
    }

    graph
}

/// Every strongly connected component that is a cycle, ordered by its smallest id.
///
/// Single-node components only count when the node imports itself.
fn find_cycles(graph: &ImportGraph) -> Vec<Vec<ProgramId>> {
    let mut cycles: Vec<Vec<ProgramId>> = petgraph::algo::tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| cycle_order(graph, &scc))
        .collect();

    cycles.sort_by_key(|cycle| cycle[0]);
    cycles
}

/// Order the members of one cyclic component.
///
/// A simple cycle is reported as the walk along import edges starting from its
/// smallest id, e.g. `A imports B imports C imports A` gives `[A, B, C]`. Any other
/// component has no single walk, so its members are listed by ascending id.
fn cycle_order(graph: &ImportGraph, scc: &[NodeIndex]) -> Vec<ProgramId> {
    let members: BTreeSet<NodeIndex> = scc.iter().copied().collect();

    // Edges point from dependency to importer, so a node's imports are its predecessors.
    let imports_within = |node: NodeIndex| -> BTreeSet<NodeIndex> {
        graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|n| members.contains(n))
            .collect()
    };

    let mut sorted: Vec<NodeIndex> = members.iter().copied().collect();
    sorted.sort_by_key(|n| graph[*n]);

    let start = sorted[0];
    let mut walk = vec![start];
    let mut current = start;
    loop {
        let targets = imports_within(current);
        if targets.len() != 1 {
            break;
        }
        let Some(&next) = targets.iter().next() else {
            break;
        };
        if next == start {
            if walk.len() == members.len() {
                return walk.into_iter().map(|n| graph[n]).collect();
            }
            break;
        }
        if walk.contains(&next) {
            break;
        }
        walk.push(next);
        current = next;
    }

    sorted.into_iter().map(|n| graph[n]).collect()
}

/// Serializable view of a deployment, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentPlan {
    pub contracts: Vec<PlannedContract>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedContract {
    pub name: String,
    pub location: String,
    pub account: String,
    pub target: Address,
    /// Locations of the programs this contract imports.
    pub dependencies: Vec<String>,
    /// Import locations bound to pre-deployed addresses.
    pub aliases: BTreeMap<String, Address>,
}

impl DeploymentPlan {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
