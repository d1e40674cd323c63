//! Budgeted automorphism generator search.
//!
//! Stabilizer-chain scheme: for each base point `b` in index order, find one
//! verified automorphism per new orbit element of `b` among permutations
//! fixing `0..b` pointwise. Candidate images are pruned by the stable
//! refinement coloring; every completed permutation is re-verified against
//! the topology before acceptance, so the output is sound regardless of
//! where the time budget cuts the search off.

use std::time::{Duration, Instant};

use crate::topo::{Node, Topology};

use super::refine::stable_colors;
use super::types::{verify_automorphism, Perm};

/// Search configuration.
#[derive(Clone, Copy, Debug)]
pub struct SymCfg {
    /// Wall-clock budget for generator discovery. On exhaustion the
    /// generators found so far are returned (safe, less compressive).
    pub budget: Duration,
}

impl Default for SymCfg {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(30),
        }
    }
}

/// Search result: verified generators plus a completeness flag.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub generators: Vec<Perm>,
    /// False if the budget expired before the search space was exhausted.
    pub complete: bool,
}

/// Find a generating set of (a subgroup of) the automorphism group.
pub fn find_generators(topo: &Topology, cfg: &SymCfg) -> SearchOutcome {
    let n = topo.num_nodes();
    let deadline = Instant::now() + cfg.budget;
    let colors = stable_colors(topo);
    let mut generators: Vec<Perm> = Vec::new();
    let mut complete = true;

    'bases: for b in 0..n {
        // Orbit of b under generators fixing all points below b.
        let mut orbit = point_orbit(b, &generators, b);
        for c in (b + 1)..n {
            if colors[c] != colors[b] || orbit.contains(&c) {
                continue;
            }
            if Instant::now() >= deadline {
                complete = false;
                break 'bases;
            }
            let mut images: Vec<Option<Node>> = vec![None; n];
            let mut used = vec![false; n];
            for i in 0..b {
                images[i] = Some(i);
                used[i] = true;
            }
            images[b] = Some(c);
            used[c] = true;
            let mut timed_out = false;
            if let Some(p) = extend(topo, &colors, &mut images, &mut used, deadline, &mut timed_out)
            {
                debug_assert!(verify_automorphism(topo, &p));
                if verify_automorphism(topo, &p) {
                    generators.push(p);
                    orbit = point_orbit(b, &generators, b);
                }
            }
            if timed_out {
                complete = false;
                break 'bases;
            }
        }
    }
    SearchOutcome {
        generators,
        complete,
    }
}

/// Orbit of `point` under the generators that fix every node below `fixed`.
fn point_orbit(point: Node, generators: &[Perm], fixed: usize) -> Vec<Node> {
    let stab: Vec<&Perm> = generators
        .iter()
        .filter(|g| (0..fixed).all(|i| g.apply(i) == i))
        .collect();
    let mut orbit = vec![point];
    let mut frontier = vec![point];
    while let Some(x) = frontier.pop() {
        for g in &stab {
            let y = g.apply(x);
            if !orbit.contains(&y) {
                orbit.push(y);
                frontier.push(y);
            }
        }
    }
    orbit
}

/// Backtracking extension of a partial image table to a full automorphism.
///
/// Consistency at each assignment: equal refined color, adjacency with every
/// already-assigned neighbor (equal capacity bits), and non-adjacency with
/// every already-assigned non-neighbor.
fn extend(
    topo: &Topology,
    colors: &[u32],
    images: &mut Vec<Option<Node>>,
    used: &mut Vec<bool>,
    deadline: Instant,
    timed_out: &mut bool,
) -> Option<Perm> {
    let n = topo.num_nodes();
    let next = (0..n).find(|&i| images[i].is_none());
    let Some(i) = next else {
        let full: Vec<Node> = images.iter().map(|x| x.unwrap()).collect();
        return Some(Perm::from_images(full));
    };
    if Instant::now() >= deadline {
        *timed_out = true;
        return None;
    }
    'cand: for j in 0..n {
        if used[j] || colors[j] != colors[i] {
            continue;
        }
        for k in 0..n {
            let Some(ik) = images[k] else { continue };
            let adj = topo.has_link(i, k);
            if adj != topo.has_link(j, ik) {
                continue 'cand;
            }
            if adj && topo.capacity_bits(i, k) != topo.capacity_bits(j, ik) {
                continue 'cand;
            }
        }
        images[i] = Some(j);
        used[j] = true;
        if let Some(p) = extend(topo, colors, images, used, deadline, timed_out) {
            return Some(p);
        }
        images[i] = None;
        used[j] = false;
        if *timed_out {
            return None;
        }
    }
    None
}
