//! Assembly of the (reduced) oblivious-routing LP.

use std::collections::HashMap;

use crate::lp::{CmpOp, LpProblem, LpSolution, VarId};
use crate::sym::OrbitPartition;
use crate::topo::{DLink, Topology};

/// The assembled LP plus variable registries for solution extraction.
#[derive(Clone, Debug)]
pub struct RoutingLp {
    pub problem: LpProblem,
    /// Worst-case congestion ratio (the minimized objective).
    pub r: VarId,
    /// Per commodity orbit: representative link -> flow variable.
    flow: Vec<HashMap<DLink, VarId>>,
    /// Source-side certificate variable per auxiliary orbit.
    beta: Vec<VarId>,
    /// Destination-side certificate variable per auxiliary orbit.
    gamma: Vec<VarId>,
}

/// Reduced solution: one flow value per (commodity orbit, link class).
#[derive(Clone, Debug)]
pub struct ReducedSolution {
    pub ratio: f64,
    /// Parallel to `OrbitPartition::commodity_orbits`.
    pub flows: Vec<HashMap<DLink, f64>>,
}

/// Build the oblivious-routing LP over the given orbit partition.
///
/// With `OrbitPartition::trivial` this is exactly the full formulation; with
/// a detected partition it is the equivalent reduced one. The minimax over
/// the hose-model demand polytope is encoded by LP duality: β/γ certificate
/// variables per `(host, link)` orbit bound every link's worst-case load by
/// `r` simultaneously (constraints 3 and 4 below).
pub fn formulate(topo: &Topology, orbits: &OrbitPartition) -> RoutingLp {
    let mut p = LpProblem::new();
    let hosts = topo.host_nodes();

    let r = p.add_var(0.0, f64::INFINITY);
    let flow: Vec<HashMap<DLink, VarId>> = orbits
        .flow_links
        .iter()
        .map(|fl| {
            fl.rep_links
                .iter()
                .map(|&e| (e, p.add_var(0.0, topo.capacity(e.0, e.1))))
                .collect()
        })
        .collect();
    let beta: Vec<VarId> = orbits.aux.reps.iter().map(|_| p.add_var(0.0, f64::INFINITY)).collect();
    let gamma: Vec<VarId> = orbits.aux.reps.iter().map(|_| p.add_var(0.0, f64::INFINITY)).collect();

    p.set_objective(vec![(r, 1.0)]);

    // 1. Flow conservation per representative commodity at every node:
    //    inflow + [n = s] = outflow + [n = d]. Link variables resolve through
    //    the orbit's representative map, so coefficients aggregate when
    //    several local links share a class.
    for (k, orbit) in orbits.commodity_orbits.iter().enumerate() {
        let (s, d) = orbit.rep;
        let rep_of = &orbits.flow_links[k].rep_of;
        for n in 0..topo.num_nodes() {
            let mut terms: HashMap<VarId, f64> = HashMap::new();
            for &h in topo.neighbors(n) {
                *terms.entry(flow[k][&rep_of[&(h, n)]]).or_insert(0.0) += 1.0;
                *terms.entry(flow[k][&rep_of[&(n, h)]]).or_insert(0.0) -= 1.0;
            }
            let rhs = f64::from(u8::from(n == d)) - f64::from(u8::from(n == s));
            p.add_constraint(sorted_terms(terms), CmpOp::Eq, rhs);
        }
    }

    // 2. Structural zeros: no transit into non-routing nodes (except the
    //    destination), none back into the source, none out of the destination.
    for (k, orbit) in orbits.commodity_orbits.iter().enumerate() {
        let (s, d) = orbit.rep;
        for &(i, j) in &orbits.flow_links[k].rep_links {
            if (!topo.is_routing(j) && j != d) || j == s || i == d {
                p.add_constraint(vec![(flow[k][&(i, j)], 1.0)], CmpOp::Eq, 0.0);
            }
        }
    }

    // 3. Certificate throughput, one per representative constraint link:
    //    Σ_u hosts(u)·(β + γ) ≤ r.
    for &e in &orbits.link_constrs {
        let mut terms: HashMap<VarId, f64> = HashMap::new();
        for &u in &hosts {
            let a = orbits.aux.rep_of[&(u, e)];
            let w = f64::from(topo.hosts(u));
            *terms.entry(beta[a]).or_insert(0.0) += w;
            *terms.entry(gamma[a]).or_insert(0.0) += w;
        }
        *terms.entry(r).or_insert(0.0) -= 1.0;
        p.add_constraint(sorted_terms(terms), CmpOp::Le, 0.0);
    }

    // 4. Certificate linking: f/cap ≤ β[source side] + γ[destination side].
    for (k, orbit) in orbits.commodity_orbits.iter().enumerate() {
        let (s, d) = orbit.rep;
        for &e in &orbits.flow_links[k].rep_links {
            let cap = topo.capacity(e.0, e.1);
            let b = beta[orbits.aux.rep_of[&(s, e)]];
            let g = gamma[orbits.aux.rep_of[&(d, e)]];
            p.add_constraint(
                vec![(flow[k][&e], 1.0 / cap), (b, -1.0), (g, -1.0)],
                CmpOp::Le,
                0.0,
            );
        }
    }

    RoutingLp {
        problem: p,
        r,
        flow,
        beta,
        gamma,
    }
}

impl RoutingLp {
    pub fn flow_var(&self, orbit: usize, rep_link: DLink) -> VarId {
        self.flow[orbit][&rep_link]
    }

    pub fn num_certificate_vars(&self) -> usize {
        self.beta.len() + self.gamma.len()
    }

    /// Read the solved flow values back out of a solver assignment.
    pub fn extract(&self, sol: &LpSolution) -> ReducedSolution {
        let flows = self
            .flow
            .iter()
            .map(|m| m.iter().map(|(&e, &v)| (e, sol.value(v))).collect())
            .collect();
        ReducedSolution {
            ratio: sol.value(self.r),
            flows,
        }
    }
}

fn sorted_terms(terms: HashMap<VarId, f64>) -> Vec<(VarId, f64)> {
    let mut out: Vec<(VarId, f64)> = terms.into_iter().filter(|&(_, c)| c != 0.0).collect();
    out.sort_unstable_by_key(|&(v, _)| v.0);
    out
}
