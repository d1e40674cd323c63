//! Symmetry-reduced oblivious routing for datacenter topologies.
//!
//! The crate computes demand-oblivious split ratios that minimize the
//! worst-case link congestion over the hose demand polytope, exploiting
//! topology automorphisms to shrink the LP, then compresses the resulting
//! routes into per-node weighted-multipath forwarding rules.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - Prefer clarity and better design over compatibility; breaking changes
//!   are encouraged when they improve quality.

pub mod expand;
pub mod formulate;
pub mod lp;
pub mod pipeline;
pub mod rules;
pub mod sym;
pub mod topo;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::expand::{expand, RoutingSolution};
    pub use crate::formulate::{formulate, ReducedSolution, RoutingLp};
    pub use crate::lp::{LpSolver, MicroLp};
    pub use crate::pipeline::{run, run_with_cache, PipelineCfg, PipelineOutput, PipelineReport};
    pub use crate::rules::{group_rules, GroupedRules, RuleCfg};
    pub use crate::sym::{OrbitPartition, SymCfg, SymmetryCache};
    pub use crate::topo::{gen, Topology, TopologyBuilder, TopologyError};
}
