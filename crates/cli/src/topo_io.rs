//! JSON topology descriptions for the command line.
//!
//! A topology file lists node attributes and undirected capacitated links:
//!
//! ```json
//! {
//!   "name": "ring6",
//!   "nodes": [{"hosts": 1, "routing": true}, ...],
//!   "links": [[0, 1, 1.0], [1, 2, 1.0], ...]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use oroute::topo::{gen, Topology, TopologyBuilder};

#[derive(Debug, Deserialize, Serialize)]
pub struct TopoFile {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<(usize, usize, f64)>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NodeSpec {
    pub hosts: u32,
    #[serde(default = "default_routing")]
    pub routing: bool,
}

fn default_routing() -> bool {
    true
}

pub fn load_topology(path: &Path) -> Result<Topology> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading topology file {}", path.display()))?;
    let file: TopoFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing topology file {}", path.display()))?;

    let mut b = TopologyBuilder::new(file.name);
    for node in &file.nodes {
        b.add_node(node.hosts, node.routing);
    }
    for &(u, v, cap) in &file.links {
        b.add_link(u, v, cap);
    }
    b.build().context("invalid topology")
}

pub fn describe(topo: &Topology) -> TopoFile {
    TopoFile {
        name: topo.name().to_string(),
        nodes: (0..topo.num_nodes())
            .map(|n| NodeSpec {
                hosts: topo.hosts(n),
                routing: topo.is_routing(n),
            })
            .collect(),
        links: topo
            .ulinks()
            .into_iter()
            .map(|(u, v)| (u, v, topo.capacity(u, v)))
            .collect(),
    }
}

/// Built-in shapes for `gen`: `ring:<n>`, `clique:<n>`, `torus:<rows>x<cols>`.
///
/// Unlike the generators themselves this path is fed by untrusted command
/// line arguments, so every precondition is checked up front.
pub fn generate(shape: &str, hosts: u32, capacity: f64) -> Result<Topology> {
    anyhow::ensure!(hosts >= 1, "nodes need at least one host, got {hosts}");
    anyhow::ensure!(
        capacity.is_finite() && capacity > 0.0,
        "link capacity must be positive and finite, got {capacity}"
    );
    let (kind, dims) = shape
        .split_once(':')
        .with_context(|| format!("bad shape {shape:?}, expected kind:dims"))?;
    match kind {
        "ring" => {
            let n: usize = dims.parse()?;
            anyhow::ensure!(n >= 2, "ring needs at least two nodes, got {n}");
            Ok(gen::ring(n, hosts, capacity))
        }
        "clique" => {
            let n: usize = dims.parse()?;
            anyhow::ensure!(n >= 2, "clique needs at least two nodes, got {n}");
            Ok(gen::clique(n, hosts, capacity))
        }
        "torus" => {
            let (rows, cols) = dims
                .split_once('x')
                .with_context(|| format!("bad torus dims {dims:?}, expected RxC"))?;
            let (rows, cols): (usize, usize) = (rows.parse()?, cols.parse()?);
            anyhow::ensure!(
                rows >= 2 && cols >= 2,
                "torus needs at least 2x2 nodes, got {rows}x{cols}"
            );
            Ok(gen::torus2d(rows, cols, hosts, capacity))
        }
        other => anyhow::bail!("unknown shape kind {other:?}"),
    }
}
