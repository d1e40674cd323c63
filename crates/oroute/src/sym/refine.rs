//! Color refinement (1-dimensional Weisfeiler–Lehman).
//!
//! Produces an equitable node coloring: two nodes share a color only if they
//! agree on attributes and on the multiset of (neighbor color, capacity)
//! signatures. Refinement classes are unions of true orbits, so they serve
//! as candidate pruning for the generator search but are never treated as
//! orbits themselves.

use std::collections::BTreeMap;

use crate::topo::{Node, Topology};

/// Initial coloring by `(routing, hosts)`.
pub fn initial_colors(topo: &Topology) -> Vec<u32> {
    let mut classes: BTreeMap<(bool, u32), u32> = BTreeMap::new();
    let mut keys: Vec<(bool, u32)> = (0..topo.num_nodes())
        .map(|n| {
            let a = topo.attrs(n);
            (a.routing, a.hosts)
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    sorted.dedup();
    for (i, k) in sorted.into_iter().enumerate() {
        classes.insert(k, i as u32);
    }
    keys.drain(..).map(|k| classes[&k]).collect()
}

/// Refine `colors` in place until stable; returns the number of classes.
pub fn refine(topo: &Topology, colors: &mut Vec<u32>) -> usize {
    let n = topo.num_nodes();
    loop {
        let mut sigs: Vec<(u32, Vec<(u32, u64)>)> = Vec::with_capacity(n);
        for u in 0..n {
            let mut nbr: Vec<(u32, u64)> = topo
                .neighbors(u)
                .iter()
                .map(|&v| (colors[v], topo.capacity_bits(u, v)))
                .collect();
            nbr.sort_unstable();
            sigs.push((colors[u], nbr));
        }
        let mut relabel: BTreeMap<&(u32, Vec<(u32, u64)>), u32> = BTreeMap::new();
        let mut uniq: Vec<&(u32, Vec<(u32, u64)>)> = sigs.iter().collect();
        uniq.sort_unstable();
        uniq.dedup();
        for (i, s) in uniq.into_iter().enumerate() {
            relabel.insert(s, i as u32);
        }
        let next: Vec<u32> = sigs.iter().map(|s| relabel[s]).collect();
        let stable = next == *colors;
        let classes = relabel.len();
        *colors = next;
        if stable {
            return classes;
        }
    }
}

/// Convenience: initial colors refined to stability.
pub fn stable_colors(topo: &Topology) -> Vec<u32> {
    let mut colors = initial_colors(topo);
    refine(topo, &mut colors);
    colors
}

/// Nodes grouped by color, each group sorted.
pub fn color_classes(colors: &[u32]) -> Vec<Vec<Node>> {
    let mut classes: BTreeMap<u32, Vec<Node>> = BTreeMap::new();
    for (n, &c) in colors.iter().enumerate() {
        classes.entry(c).or_default().push(n);
    }
    classes.into_values().collect()
}
