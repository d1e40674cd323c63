//! LP model and the external-solver boundary.
//!
//! Purpose
//! - `LpProblem` is a solver-agnostic sparse model: variable bounds, linear
//!   constraints, linear objective (minimization).
//! - `LpSolver` is the capability interface to the numerical solver; the
//!   formulation/reduction/expansion stages never see a concrete backend.
//! - `MicroLp` adapts the pure-Rust microlp simplex via `good_lp`.
//!
//! Failure surfaces as `SolverError`; the pipeline reports it verbatim and
//! never swaps in an alternate solver on its own.

mod microlp;

pub use microlp::MicroLp;

use thiserror::Error;

/// Index of a declared variable within one [`LpProblem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VarId(pub(crate) usize);

/// Variable bounds; `ub` may be `f64::INFINITY`.
#[derive(Clone, Copy, Debug)]
pub struct VarDef {
    pub lb: f64,
    pub ub: f64,
}

/// Constraint comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Le,
    Eq,
}

/// Sparse linear constraint `Σ coeff·var (≤ | =) rhs`.
#[derive(Clone, Debug)]
pub struct LinConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub op: CmpOp,
    pub rhs: f64,
}

/// A linear program in minimization form.
#[derive(Clone, Debug, Default)]
pub struct LpProblem {
    vars: Vec<VarDef>,
    constraints: Vec<LinConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl LpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, lb: f64, ub: f64) -> VarId {
        debug_assert!(lb <= ub, "variable bounds crossed");
        self.vars.push(VarDef { lb, ub });
        VarId(self.vars.len() - 1)
    }

    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, op: CmpOp, rhs: f64) {
        self.constraints.push(LinConstraint { terms, op, rhs });
    }

    /// Set the (minimized) objective as sparse terms.
    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>) {
        self.objective = terms;
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn constraints(&self) -> &[LinConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }
}

/// Variable assignment plus objective value.
#[derive(Clone, Debug)]
pub struct LpSolution {
    pub objective: f64,
    values: Vec<f64>,
}

impl LpSolution {
    pub fn new(objective: f64, values: Vec<f64>) -> Self {
        Self { objective, values }
    }

    #[inline]
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }
}

/// Terminal solver outcomes other than an optimal solution.
#[derive(Debug, Error)]
pub enum SolverError {
    /// No finite congestion ratio exists for the declared uncertainty set.
    #[error("linear program is infeasible")]
    Infeasible,
    #[error("linear program is unbounded")]
    Unbounded,
    /// Numerical failure, timeout, license problem, etc.
    #[error("solver failure: {0}")]
    Failed(String),
}

/// Capability interface to an external LP solver.
///
/// Any conforming implementation can be substituted without touching the
/// formulation or expansion stages. Implementations must scope whatever
/// session/license state they hold to the `solve` call.
pub trait LpSolver {
    fn name(&self) -> &str;

    fn solve(&self, problem: &LpProblem) -> Result<LpSolution, SolverError>;
}
