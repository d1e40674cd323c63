//! End-to-end oblivious-routing pipeline.
//!
//! Purpose: wire the stages together. Detect the automorphism group,
//! formulate the reduced LP over orbit representatives, solve it, expand the
//! representative flows to every commodity, and compress the result into
//! per-node forwarding rules. Each stage logs a `tracing` event with its
//! wall time; the final report aggregates the numbers a capacity study needs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::expand::{expand, ExpansionError, RoutingSolution};
use crate::formulate::formulate;
use crate::lp::{LpSolver, SolverError};
use crate::rules::{group_rules, GroupedRules, GroupingError, RuleCfg};
use crate::sym::{OrbitPartition, SymCfg, SymmetryCache};
use crate::topo::Topology;

#[derive(Clone, Debug)]
pub struct PipelineCfg {
    pub sym: SymCfg,
    pub rules: RuleCfg,
    /// Numeric tolerance for expansion checks.
    pub eps: f64,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            sym: SymCfg::default(),
            rules: RuleCfg::default(),
            eps: 1e-6,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("LP solve failed: {0}")]
    Solver(#[from] SolverError),
    #[error("solution expansion failed: {0}")]
    Expansion(#[from] ExpansionError),
    #[error("rule grouping failed: {0}")]
    Grouping(#[from] GroupingError),
}

/// Stage timings and problem/solution measurements.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub oblivious_ratio: f64,
    pub throughput: f64,
    pub detect_time: Duration,
    pub solve_time: Duration,
    /// False when the symmetry search hit its budget and the partition is a
    /// coarser (still sound) fallback.
    pub symmetry_complete: bool,
    pub generators: usize,
    pub node_orbits: usize,
    pub commodity_orbits: usize,
    pub flow_classes: usize,
    pub lp_vars: usize,
    pub lp_constraints: usize,
    pub total_rules: usize,
    pub total_matches: usize,
    pub rule_templates: usize,
    /// Grouped over ungrouped entry count (lower is better).
    pub rule_compression: f64,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub solution: RoutingSolution,
    pub rules: GroupedRules,
    pub report: PipelineReport,
}

/// Run the full pipeline on a topology.
pub fn run(
    topo: &Topology,
    solver: &dyn LpSolver,
    cfg: &PipelineCfg,
) -> Result<PipelineOutput, PipelineError> {
    let t = Instant::now();
    let orbits = Arc::new(OrbitPartition::detect(topo, &cfg.sym));
    run_on_partition(topo, solver, &orbits, cfg, t.elapsed())
}

/// Like [`run`], but reuses a cached orbit partition for the topology's
/// fingerprint when one exists.
pub fn run_with_cache(
    topo: &Topology,
    solver: &dyn LpSolver,
    cache: &mut SymmetryCache,
    cfg: &PipelineCfg,
) -> Result<PipelineOutput, PipelineError> {
    let t = Instant::now();
    let orbits = cache.get_or_detect(topo, &cfg.sym);
    run_on_partition(topo, solver, &orbits, cfg, t.elapsed())
}

fn run_on_partition(
    topo: &Topology,
    solver: &dyn LpSolver,
    orbits: &OrbitPartition,
    cfg: &PipelineCfg,
    detect_time: Duration,
) -> Result<PipelineOutput, PipelineError> {
    info!(
        name = topo.name(),
        complete = orbits.complete,
        generators = orbits.generators.len(),
        node_orbits = orbits.num_node_orbits(),
        commodity_orbits = orbits.num_commodity_orbits(),
        detect_ms = detect_time.as_millis() as u64,
        "symmetry detection done"
    );
    if !orbits.complete {
        warn!(
            name = topo.name(),
            "symmetry search budget exhausted; using a coarser partition"
        );
    }

    let lp = formulate(topo, orbits);
    info!(
        vars = lp.problem.num_vars(),
        constraints = lp.problem.num_constraints(),
        "reduced LP formulated"
    );

    let t = Instant::now();
    let sol = solver.solve(&lp.problem)?;
    let solve_time = t.elapsed();
    info!(
        solver = solver.name(),
        ratio = sol.objective,
        solve_ms = solve_time.as_millis() as u64,
        "LP solved"
    );

    let solution = expand(topo, orbits, &lp.extract(&sol), cfg.eps)?;
    let rules = group_rules(topo, orbits, &solution, &cfg.rules)?;
    info!(
        rules = rules.stats.total_rules,
        matches = rules.stats.total_matches,
        templates = rules.stats.templates,
        "forwarding rules grouped"
    );

    let report = PipelineReport {
        oblivious_ratio: solution.ratio,
        throughput: solution.throughput(),
        detect_time,
        solve_time,
        symmetry_complete: orbits.complete,
        generators: orbits.generators.len(),
        node_orbits: orbits.num_node_orbits(),
        commodity_orbits: orbits.num_commodity_orbits(),
        flow_classes: orbits.num_flow_classes(),
        lp_vars: lp.problem.num_vars(),
        lp_constraints: lp.problem.num_constraints(),
        total_rules: rules.stats.total_rules,
        total_matches: rules.stats.total_matches,
        rule_templates: rules.stats.templates,
        rule_compression: if rules.stats.total_matches == 0 {
            0.0
        } else {
            rules.stats.total_rules as f64 / rules.stats.total_matches as f64
        },
    };
    Ok(PipelineOutput { solution, rules, report })
}
