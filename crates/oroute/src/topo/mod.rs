//! Topology model.
//!
//! Purpose
//! - One immutable graph structure (`Topology`) shared read-only by every
//!   pipeline stage: symmetry detection, formulation, expansion, grouping.
//! - Node attributes follow the hose model: `hosts` bounds per-node demand,
//!   `routing` marks transit capability.
//!
//! Code cross-refs: `sym::OrbitPartition`, `formulate::formulate`.

pub mod gen;
mod types;

pub use types::{Commodity, DLink, Fingerprint, Node, NodeAttrs, Topology, TopologyBuilder};

use thiserror::Error;

/// Rejected before any formulation work starts.
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no nodes")]
    Empty,
    #[error("link references unknown node {node}")]
    UnknownNode { node: Node },
    #[error("self loop at node {node}")]
    SelfLoop { node: Node },
    #[error("link ({u}, {v}) has non-positive capacity {capacity}")]
    BadCapacity { u: Node, v: Node, capacity: f64 },
    #[error("topology is not connected")]
    Disconnected,
    #[error("fewer than two host nodes; no commodities to route")]
    TooFewHosts,
}

#[cfg(test)]
mod tests;
