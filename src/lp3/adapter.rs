use std::collections::HashMap;

use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, VariableDefinition};
use log::debug;

use super::{Lp3Backend, Lp3Constraint, Lp3Outcome, Lp3Problem, Lp3Var};

/// Builds the `good_lp` variable table and constraint list shared by every
/// backend. Only the final `.using(solver)` call differs between them.
fn prepare(
    problem: &Lp3Problem,
) -> (
    ProblemVariables,
    HashMap<(usize, usize), Variable>,
    Expression,
    Vec<good_lp::Constraint>,
) {
    let mut vars = ProblemVariables::new();
    let mut var_ids: HashMap<(usize, usize), Variable> = HashMap::new();
    for Lp3Var { edge, vertex } in &problem.variables {
        let handle = vars.add(
            VariableDefinition::new()
                .min(0.0)
                .max(1.0)
                .name(format!("x_{edge}_{vertex}")),
        );
        var_ids.insert((*edge, *vertex), handle);
    }

    let mut constraints = Vec::with_capacity(problem.constraints.len());
    for constraint in &problem.constraints {
        match constraint {
            Lp3Constraint::EdgeSum { edge, u, v } => {
                let xu = var_ids[&(*edge, *u)];
                let xv = var_ids[&(*edge, *v)];
                let mut expr: Expression = 0.into();
                expr.add_mul(1.0, &xu);
                expr.add_mul(1.0, &xv);
                constraints.push(expr.eq(1.0));
            }
            Lp3Constraint::Load {
                terms,
                dedicated_load,
                ..
            } => {
                let mut expr: Expression = (*dedicated_load).into();
                for (var, weight) in terms {
                    expr.add_mul(*weight, &var_ids[&(var.edge, var.vertex)]);
                }
                constraints.push(expr.leq(1.0));
            }
            Lp3Constraint::Star { vars: star_vars, .. } => {
                let mut expr: Expression = 0.into();
                for var in star_vars {
                    expr.add_mul(1.0, &var_ids[&(var.edge, var.vertex)]);
                }
                constraints.push(expr.leq(1.0));
            }
        }
    }

    // LP3 is a feasibility program; minimising the zero expression makes
    // any feasible point an optimum.
    let objective: Expression = 0.into();
    (vars, var_ids, objective, constraints)
}

fn finish(
    result: std::result::Result<impl Solution, ResolutionError>,
    var_ids: &HashMap<(usize, usize), Variable>,
) -> std::result::Result<HashMap<(usize, usize), f64>, Lp3Outcome> {
    match result {
        Ok(solution) => Ok(var_ids
            .iter()
            .map(|(&key, &var)| (key, solution.value(var)))
            .collect()),
        Err(ResolutionError::Infeasible) => Err(Lp3Outcome::Infeasible),
        Err(other) => Err(Lp3Outcome::Error(other.to_string())),
    }
}

struct MicroLpBackend;

impl Lp3Backend for MicroLpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &Lp3Problem) -> std::result::Result<HashMap<(usize, usize), f64>, Lp3Outcome> {
        let (vars, var_ids, objective, constraints) = prepare(problem);
        let mut model = vars.minimise(objective).using(good_lp::solvers::microlp::microlp);
        for constraint in constraints {
            model = model.with(constraint);
        }
        debug!("solving LP3 with microlp ({} variables)", var_ids.len());
        finish(model.solve(), &var_ids)
    }
}

struct ClarabelBackend;

impl Lp3Backend for ClarabelBackend {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, problem: &Lp3Problem) -> std::result::Result<HashMap<(usize, usize), f64>, Lp3Outcome> {
        let (vars, var_ids, objective, constraints) = prepare(problem);
        let mut model = vars.minimise(objective).using(good_lp::solvers::clarabel::clarabel);
        for constraint in constraints {
            model = model.with(constraint);
        }
        debug!("solving LP3 with clarabel ({} variables)", var_ids.len());
        finish(model.solve(), &var_ids)
    }
}

/// Fixed backend priority list: try the lightweight pure-Rust simplex
/// solver first, fall back to the interior-point solver on solver-level
/// failure. `solve_lp3` never falls through on a definitive infeasibility.
pub fn backend_priority_list() -> Vec<Box<dyn Lp3Backend>> {
    vec![Box::new(MicroLpBackend), Box::new(ClarabelBackend)]
}
