//! Oblivious-routing LP formulation.
//!
//! Purpose: turn a topology plus an orbit partition into a linear program
//! whose optimum is the worst-case congestion ratio `r` over the hose demand
//! polytope, together with split-ratio flow variables per representative
//! commodity. The same assembler serves both the full formulation (via
//! `OrbitPartition::trivial`) and the symmetry-reduced one; their optima
//! coincide because the reduced program is the full one averaged over the
//! automorphism group.

mod build;

pub use build::{formulate, ReducedSolution, RoutingLp};
