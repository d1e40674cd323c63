//! Expansion of an orbit-representative solution to every commodity.
//!
//! Purpose: replay each representative's flow through the stored frame
//! permutations so that all commodities get concrete per-link split values,
//! then check flow conservation on the result. The expanded routing is
//! automorphism-invariant by construction: a member's flow on a link equals
//! the representative's flow on the frame-mapped link.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::debug;

use crate::formulate::ReducedSolution;
use crate::sym::OrbitPartition;
use crate::topo::{Commodity, DLink, Node, Topology};

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error(
        "flow conservation violated for commodity ({}, {}) at node {node} (residual {residual:.3e})",
        .commodity.0, .commodity.1
    )]
    Conservation {
        commodity: Commodity,
        node: Node,
        residual: f64,
    },
    #[error("negative flow {value:.3e} on link ({}, {}) for commodity ({}, {})",
        .link.0, .link.1, .commodity.0, .commodity.1)]
    NegativeFlow {
        commodity: Commodity,
        link: DLink,
        value: f64,
    },
}

/// Full per-commodity routing with its worst-case congestion ratio.
#[derive(Clone, Debug)]
pub struct RoutingSolution {
    pub ratio: f64,
    /// Commodity -> link -> units of flow (per unit of demand). Links with
    /// negligible flow are omitted.
    pub flows: HashMap<Commodity, HashMap<DLink, f64>>,
}

impl RoutingSolution {
    /// Guaranteed throughput fraction, the reciprocal of the ratio.
    pub fn throughput(&self) -> f64 {
        1.0 / self.ratio
    }

    pub fn flow(&self, sd: Commodity, link: DLink) -> f64 {
        self.flows
            .get(&sd)
            .and_then(|m| m.get(&link))
            .copied()
            .unwrap_or(0.0)
    }

    /// Normalized split fractions over the out-links of `node` for `sd`.
    /// Empty when no flow of that commodity leaves the node.
    pub fn out_fractions(&self, topo: &Topology, sd: Commodity, node: Node) -> Vec<(DLink, f64)> {
        let mut out: Vec<(DLink, f64)> = topo
            .neighbors(node)
            .iter()
            .map(|&h| ((node, h), self.flow(sd, (node, h))))
            .filter(|&(_, f)| f > 0.0)
            .collect();
        let total: f64 = out.iter().map(|&(_, f)| f).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        for (_, f) in &mut out {
            *f /= total;
        }
        out.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Forwarding table of `node`: every commodity with outgoing flow there,
    /// with its ordered `(next hop, weight)` list.
    pub fn forwarding_table(
        &self,
        topo: &Topology,
        node: Node,
    ) -> BTreeMap<Commodity, Vec<(Node, f64)>> {
        let mut table = BTreeMap::new();
        for &sd in self.flows.keys() {
            let fracs = self.out_fractions(topo, sd, node);
            if !fracs.is_empty() {
                table.insert(sd, fracs.into_iter().map(|((_, h), w)| (h, w)).collect());
            }
        }
        table
    }
}

/// Expand a reduced solution to all commodities and verify conservation.
///
/// `eps` bounds both the tolerated conservation residual and the threshold
/// below which a flow value is treated as zero.
pub fn expand(
    topo: &Topology,
    orbits: &OrbitPartition,
    reduced: &ReducedSolution,
    eps: f64,
) -> Result<RoutingSolution, ExpansionError> {
    let dlinks = topo.dlinks();
    let mut flows: HashMap<Commodity, HashMap<DLink, f64>> = HashMap::new();

    for (k, orbit) in orbits.commodity_orbits.iter().enumerate() {
        let rep_of = &orbits.flow_links[k].rep_of;
        for &sd in &orbit.members {
            let mut per_link = HashMap::new();
            for &e in &dlinks {
                let rep_link = rep_of[&orbit.to_rep_frame(sd, e)];
                let f = reduced.flows[k][&rep_link];
                if f < -eps {
                    return Err(ExpansionError::NegativeFlow {
                        commodity: sd,
                        link: e,
                        value: f,
                    });
                }
                if f > eps {
                    per_link.insert(e, f);
                }
            }
            check_conservation(topo, sd, &per_link, eps)?;
            flows.insert(sd, per_link);
        }
    }

    debug!(
        commodities = flows.len(),
        ratio = reduced.ratio,
        "expanded representative solution"
    );
    Ok(RoutingSolution {
        ratio: reduced.ratio,
        flows,
    })
}

fn check_conservation(
    topo: &Topology,
    sd: Commodity,
    per_link: &HashMap<DLink, f64>,
    eps: f64,
) -> Result<(), ExpansionError> {
    let (s, d) = sd;
    for n in 0..topo.num_nodes() {
        let mut residual = 0.0;
        for &h in topo.neighbors(n) {
            residual += per_link.get(&(h, n)).copied().unwrap_or(0.0);
            residual -= per_link.get(&(n, h)).copied().unwrap_or(0.0);
        }
        residual += f64::from(u8::from(n == s));
        residual -= f64::from(u8::from(n == d));
        // Each dropped sub-eps link contributes at most eps of residual.
        let tol = eps * (topo.neighbors(n).len() as f64 * 2.0 + 1.0);
        if residual.abs() > tol {
            return Err(ExpansionError::Conservation {
                commodity: sd,
                node: n,
                residual,
            });
        }
    }
    Ok(())
}
