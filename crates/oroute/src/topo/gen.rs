//! Small reference topologies for tests, benches and demos.
//!
//! Only the regular families needed by the test scenarios live here; large
//! datacenter designs (fat-tree, BCube, SlimFly) are out of scope.

use super::{Topology, TopologyBuilder};

/// Ring of `n` routing nodes, `hosts` servers each, uniform link capacity.
///
/// `n = 2` degenerates to a doubled link between the two nodes.
pub fn ring(n: usize, hosts: u32, capacity: f64) -> Topology {
    assert!(n >= 2, "ring needs at least two nodes");
    let mut b = TopologyBuilder::new(format!("Ring-{n}-{hosts}"));
    for _ in 0..n {
        b.add_node(hosts, true);
    }
    for i in 0..n {
        b.add_link(i, (i + 1) % n, capacity);
    }
    b.build().expect("ring is always valid")
}

/// Complete graph on `n` routing nodes with uniform link capacity.
pub fn clique(n: usize, hosts: u32, capacity: f64) -> Topology {
    assert!(n >= 2, "clique needs at least two nodes");
    let mut b = TopologyBuilder::new(format!("Clique-{n}-{hosts}"));
    for _ in 0..n {
        b.add_node(hosts, true);
    }
    for i in 0..n {
        for j in (i + 1)..n {
            b.add_link(i, j, capacity);
        }
    }
    b.build().expect("clique is always valid")
}

/// 2D torus of `rows x cols` routing nodes with wraparound links.
pub fn torus2d(rows: usize, cols: usize, hosts: u32, capacity: f64) -> Topology {
    assert!(rows >= 2 && cols >= 2, "torus needs at least 2x2 nodes");
    let mut b = TopologyBuilder::new(format!("Torus2D-{rows}x{cols}-{hosts}"));
    for _ in 0..rows * cols {
        b.add_node(hosts, true);
    }
    let id = |r: usize, c: usize| r * cols + c;
    for r in 0..rows {
        for c in 0..cols {
            b.add_link(id(r, c), id(r, (c + 1) % cols), capacity);
            b.add_link(id(r, c), id((r + 1) % rows, c), capacity);
        }
    }
    b.build().expect("torus is always valid")
}
