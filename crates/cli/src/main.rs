use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use oroute::lp::MicroLp;
use oroute::pipeline::{run, PipelineCfg, PipelineOutput};
use oroute::rules::RuleCfg;
use oroute::sym::{OrbitPartition, SymCfg};

mod topo_io;

#[derive(Parser)]
#[command(name = "oroute")]
#[command(about = "Oblivious routing optimizer and rule compressor")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve a topology and write the report (and optionally the rules) as JSON
    Solve {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Also write the grouped forwarding rules here
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Symmetry search budget in seconds
        #[arg(long, default_value_t = 30)]
        budget_secs: u64,
        /// WCMP weight granularity
        #[arg(long, default_value_t = 1e-6)]
        quantum: f64,
        /// Per-node rule table capacity
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Print the orbit structure of a topology as JSON
    Orbits {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 30)]
        budget_secs: u64,
    },
    /// Write a built-in topology (ring:<n>, clique:<n>, torus:<r>x<c>) as JSON
    Gen {
        #[arg(long)]
        shape: String,
        #[arg(long, default_value_t = 1)]
        hosts: u32,
        #[arg(long, default_value_t = 1.0)]
        capacity: f64,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    match Cmd::parse().action {
        Action::Solve {
            input,
            out,
            rules,
            budget_secs,
            quantum,
            capacity,
        } => solve(&input, &out, rules.as_deref(), budget_secs, quantum, capacity),
        Action::Orbits { input, budget_secs } => orbits(&input, budget_secs),
        Action::Gen {
            shape,
            hosts,
            capacity,
            out,
        } => gen(&shape, hosts, capacity, &out),
    }
}

fn solve(
    input: &Path,
    out: &Path,
    rules_out: Option<&Path>,
    budget_secs: u64,
    quantum: f64,
    capacity: Option<usize>,
) -> Result<()> {
    let topo = topo_io::load_topology(input)?;
    let cfg = PipelineCfg {
        sym: SymCfg {
            budget: Duration::from_secs(budget_secs),
        },
        rules: RuleCfg {
            weight_quantum: quantum,
            table_capacity: capacity,
        },
        ..PipelineCfg::default()
    };
    let output = run(&topo, &MicroLp, &cfg).context("pipeline failed")?;

    write_json(out, &report_json(&topo.name().to_string(), &output))?;
    if let Some(path) = rules_out {
        write_json(path, &rules_json(&output))?;
    }
    tracing::info!(
        ratio = output.report.oblivious_ratio,
        rules = output.report.total_rules,
        out = %out.display(),
        "solved"
    );
    Ok(())
}

fn orbits(input: &Path, budget_secs: u64) -> Result<()> {
    let topo = topo_io::load_topology(input)?;
    let cfg = SymCfg {
        budget: Duration::from_secs(budget_secs),
    };
    let partition = OrbitPartition::detect(&topo, &cfg);
    let obj = serde_json::json!({
        "topology": topo.name(),
        "complete": partition.complete,
        "generators": partition.generators.len(),
        "node_orbits": partition.node_orbits,
        "commodity_orbits": partition.commodity_orbits.iter().map(|o| {
            serde_json::json!({ "rep": o.rep, "size": o.members.len() })
        }).collect::<Vec<_>>(),
        "flow_classes": partition.num_flow_classes(),
        "link_constraint_classes": partition.link_constrs.len(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn gen(shape: &str, hosts: u32, capacity: f64, out: &Path) -> Result<()> {
    let topo = topo_io::generate(shape, hosts, capacity)?;
    write_json(out, &serde_json::to_value(topo_io::describe(&topo))?)?;
    tracing::info!(shape, out = %out.display(), "generated");
    Ok(())
}

fn report_json(name: &str, output: &PipelineOutput) -> serde_json::Value {
    let r = &output.report;
    serde_json::json!({
        "topology": name,
        "oblivious_ratio": r.oblivious_ratio,
        "throughput": r.throughput,
        "symmetry_complete": r.symmetry_complete,
        "generators": r.generators,
        "node_orbits": r.node_orbits,
        "commodity_orbits": r.commodity_orbits,
        "flow_classes": r.flow_classes,
        "lp": { "vars": r.lp_vars, "constraints": r.lp_constraints },
        "rules": {
            "total": r.total_rules,
            "matches": r.total_matches,
            "templates": r.rule_templates,
            "compression": r.rule_compression,
        },
        "timings_ms": {
            "detect": r.detect_time.as_secs_f64() * 1e3,
            "solve": r.solve_time.as_secs_f64() * 1e3,
        },
    })
}

fn rules_json(output: &PipelineOutput) -> serde_json::Value {
    let nodes: Vec<_> = output
        .rules
        .per_node
        .iter()
        .map(|nr| {
            serde_json::json!({
                "node": nr.node,
                "matched": nr.matched,
                "rules": nr.rules.iter().map(|rule| serde_json::json!({
                    "matches": rule.matches,
                    "action": rule.fractions(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::json!({ "nodes": nodes })
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
