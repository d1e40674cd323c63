//! Timing probe for the full pipeline on a host-per-node ring.
//!
//! Purpose
//! - Provide a reproducible data point for "how long do detection, solving,
//!   and grouping take on a small ring, and how much does symmetry save?"
//! - Print the oblivious ratio next to the full-formulation size so the
//!   reduction factor is visible at a glance.

use std::time::Instant;

use oroute::formulate::formulate;
use oroute::lp::MicroLp;
use oroute::pipeline::{run, PipelineCfg};
use oroute::sym::OrbitPartition;
use oroute::topo::gen;

fn main() {
    let topo = gen::ring(10, 1, 1.0);

    let start = Instant::now();
    let out = run(&topo, &MicroLp, &PipelineCfg::default()).expect("ring pipeline succeeds");
    let total_ms = start.elapsed().as_secs_f64() * 1e3;

    let full = formulate(&topo, &OrbitPartition::trivial(&topo));

    println!(
        "topology={} nodes={} commodities={}",
        topo.name(),
        topo.num_nodes(),
        out.solution.flows.len()
    );
    println!(
        "ratio={:.9} throughput={:.9} symmetry_complete={}",
        out.report.oblivious_ratio, out.report.throughput, out.report.symmetry_complete
    );
    println!(
        "lp_vars={} lp_constraints={} (full: {} vars, {} constraints)",
        out.report.lp_vars,
        out.report.lp_constraints,
        full.problem.num_vars(),
        full.problem.num_constraints()
    );
    println!(
        "rules={} matches={} templates={}",
        out.report.total_rules, out.report.total_matches, out.report.rule_templates
    );
    println!(
        "detect_time_ms={:.3} solve_time_ms={:.3} total_ms={total_ms:.3}",
        out.report.detect_time.as_secs_f64() * 1e3,
        out.report.solve_time.as_secs_f64() * 1e3
    );
}
