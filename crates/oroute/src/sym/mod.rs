//! Automorphism engine: certified symmetry detection and orbit partitions.
//!
//! Purpose
//! - Discover a generating set of the topology's automorphism group within a
//!   caller-specified time budget, never claiming a symmetry that has not
//!   been verified against adjacency, capacities and node attributes.
//! - Partition nodes, commodities, flow links and certificate indices into
//!   orbits; the reduced LP is written over one representative per class.
//!
//! Soundness contract
//! - Orbits are closures under *verified* permutations only. A budget hit
//!   yields a coarser-grouping (finer-partition) result, which costs LP size
//!   but never correctness; with no generators at all the partition is
//!   trivial and the reduced LP degenerates to the full one.
//!
//! Code cross-refs: `formulate::formulate`, `expand::expand`, `rules`.

pub mod cache;
mod orbits;
mod refine;
mod search;
mod types;

pub use cache::SymmetryCache;
pub use orbits::{AuxOrbits, CommodityOrbit, FlowLinkOrbits, OrbitPartition};
pub use refine::{color_classes, stable_colors};
pub use search::{find_generators, SearchOutcome, SymCfg};
pub use types::{verify_automorphism, Perm};

#[cfg(test)]
mod tests;
