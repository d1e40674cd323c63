//! Adapter from [`LpProblem`] to the microlp backend behind `good_lp`.

use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable};

use super::{CmpOp, LpProblem, LpSolution, LpSolver, SolverError};

/// Pure-Rust simplex backend. Stateless; each solve builds and drops its own
/// model, so no solver resource outlives the call.
#[derive(Clone, Copy, Debug, Default)]
pub struct MicroLp;

impl LpSolver for MicroLp {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, problem: &LpProblem) -> Result<LpSolution, SolverError> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = problem
            .vars()
            .iter()
            .map(|def| {
                let mut v = variable().min(def.lb);
                if def.ub.is_finite() {
                    v = v.max(def.ub);
                }
                vars.add(v)
            })
            .collect();

        let objective: Expression = problem
            .objective()
            .iter()
            .map(|&(v, c)| handles[v.0] * c)
            .sum();
        let mut model = vars.minimise(objective).using(good_lp::microlp);

        for c in problem.constraints() {
            let lhs: Expression = c.terms.iter().map(|&(v, k)| handles[v.0] * k).sum();
            let cons = match c.op {
                CmpOp::Le => constraint::leq(lhs, c.rhs),
                CmpOp::Eq => constraint::eq(lhs, c.rhs),
            };
            model = model.with(cons);
        }

        match model.solve() {
            Ok(sol) => {
                let values: Vec<f64> = handles.iter().map(|&h| sol.value(h)).collect();
                let objective = problem
                    .objective()
                    .iter()
                    .map(|&(v, c)| c * values[v.0])
                    .sum();
                Ok(LpSolution::new(objective, values))
            }
            Err(ResolutionError::Infeasible) => Err(SolverError::Infeasible),
            Err(ResolutionError::Unbounded) => Err(SolverError::Unbounded),
            Err(other) => Err(SolverError::Failed(other.to_string())),
        }
    }
}
