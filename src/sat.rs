//! Satisfiability of expressions under additional constraints.
//!
//! A solution is a complete assignment of the variables of the expression and of the constraints
//! such that the expression evaluates to true and all constraints hold.
//!
//! ```
//! use bolex::{solve, ParsedExpression, SatOptions};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("AB'")?;
//! let result = solve(&parsed, &SatOptions::default())?;
//! assert!(result.satisfiable());
//! assert_eq!(result.solutions().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::truth_table::MAX_TABLE_VARIABLES;
use crate::*;

use log::{debug, info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Additional constraints on a list of variables
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// All listed variables take the given value
    Equals { variables: Vec<Variable>, value: bool },
    /// None of the listed variables takes the given value
    NotEquals { variables: Vec<Variable>, value: bool },
    /// At least one listed variable is true
    AtLeastOne { variables: Vec<Variable> },
    /// At most one listed variable is true
    AtMostOne { variables: Vec<Variable> },
    /// Exactly one listed variable is true
    ExactlyOne { variables: Vec<Variable> },
}

/// Search methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatMethod {
    /// DPLL up to 10 variables, WalkSAT above
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "dpll")]
    Dpll,
    #[serde(rename = "walksat")]
    WalkSat,
    #[serde(rename = "brute-force")]
    BruteForce,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SatOptions {
    pub method: SatMethod,
    /// Collect all solutions instead of stopping at the first one (not supported by WalkSAT)
    pub find_all: bool,
    pub max_solutions: Option<usize>,
    /// Flip budget of WalkSAT
    pub max_flips: usize,
    /// Probability of a random flip in WalkSAT
    pub noise: f64,
    /// Seed of the WalkSAT random generator, a random seed is used if missing
    pub seed: Option<u64>,
    pub constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatMetadata {
    /// The method actually used
    pub method: SatMethod,
    /// Visited nodes (DPLL), flips (WalkSAT) or evaluated assignments (brute force)
    pub search_steps: usize,
    pub variables: Vec<Variable>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SatResult {
    satisfiable: bool,
    solutions: Vec<Assignment>,
    metadata: SatMetadata,
}

/// An assignment on which two expressions disagree
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Counterexample {
    pub assignment: Assignment,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquivalenceResult {
    pub equivalent: bool,
    pub variables: Vec<Variable>,
    /// Number of evaluated assignments
    pub checked: usize,
    pub counterexamples: Vec<Counterexample>,
}

impl Constraint {
    pub fn variables(&self) -> &[Variable] {
        match self {
            Constraint::Equals { variables, .. }
            | Constraint::NotEquals { variables, .. }
            | Constraint::AtLeastOne { variables }
            | Constraint::AtMostOne { variables }
            | Constraint::ExactlyOne { variables } => variables,
        }
    }

    /// Evaluate on a partial assignment: None if the constraint can still hold or fail
    pub fn eval_partial(&self, lookup: impl Fn(Variable) -> Option<bool>) -> Option<bool> {
        let values: Vec<Option<bool>> = self.variables().iter().map(|v| lookup(*v)).collect();
        let trues = values.iter().filter(|v| **v == Some(true)).count();
        let unknown = values.iter().filter(|v| v.is_none()).count();
        match self {
            Constraint::Equals { value, .. } => all_fixed_to(&values, *value),
            Constraint::NotEquals { value, .. } => all_fixed_to(&values, !*value),
            Constraint::AtLeastOne { .. } => match (trues, unknown) {
                (0, 0) => Some(false),
                (0, _) => None,
                _ => Some(true),
            },
            Constraint::AtMostOne { .. } => match (trues, unknown) {
                (t, _) if t > 1 => Some(false),
                (_, 0) => Some(true),
                _ => None,
            },
            Constraint::ExactlyOne { .. } => match (trues, unknown) {
                (t, _) if t > 1 => Some(false),
                (t, 0) => Some(t == 1),
                _ => None,
            },
        }
    }
}

fn all_fixed_to(values: &[Option<bool>], target: bool) -> Option<bool> {
    if values.iter().any(|v| *v == Some(!target)) {
        return Some(false);
    }
    match values.iter().all(|v| v.is_some()) {
        true => Some(true),
        false => None,
    }
}

impl LogicFunction for Constraint {
    fn eval(&self, state: &State) -> bool {
        self.eval_partial(|v| Some(state.is_active(v))).unwrap_or(false)
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        variables.extend(self.variables().iter().copied());
    }
}

/// Three-valued evaluation of an expression: None when the value depends on unassigned variables
pub fn eval_partial(expr: &Expr, lookup: &impl Fn(Variable) -> Option<bool>) -> Option<bool> {
    match expr {
        Expr::Constant(b) => Some(*b),
        Expr::Variable(v) => lookup(*v),
        Expr::Not(e) => eval_partial(e, lookup).map(|b| !b),
        Expr::And(l, r) => match (eval_partial(l, lookup), eval_partial(r, lookup)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Expr::Or(l, r) => match (eval_partial(l, lookup), eval_partial(r, lookup)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    }
}

impl SatMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SatMethod::Auto => "auto",
            SatMethod::Dpll => "dpll",
            SatMethod::WalkSat => "walksat",
            SatMethod::BruteForce => "brute-force",
        }
    }
}

impl FromStr for SatMethod {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SatMethod::Auto),
            "dpll" => Ok(SatMethod::Dpll),
            "walksat" | "walk-sat" => Ok(SatMethod::WalkSat),
            "brute-force" | "brute_force" | "bruteforce" => Ok(SatMethod::BruteForce),
            _ => Err(BolexError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for SatMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for SatOptions {
    fn default() -> Self {
        Self {
            method: SatMethod::Auto,
            find_all: false,
            max_solutions: None,
            max_flips: 10_000,
            noise: 0.5,
            seed: None,
            constraints: vec![],
        }
    }
}

impl SatOptions {
    pub fn with_method(method: SatMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn find_all(mut self) -> Self {
        self.find_all = true;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// The search space: an expression and constraints over a sorted list of variables
struct Problem<'a> {
    expr: &'a Expr,
    constraints: &'a [Constraint],
    variables: Vec<Variable>,
}

impl<'a> Problem<'a> {
    fn new(expr: &'a Expr, constraints: &'a [Constraint]) -> Self {
        let mut vars = expr.get_variables();
        for c in constraints {
            c.collect_variables(&mut vars);
        }
        Self {
            expr,
            constraints,
            variables: vars.to_vec(),
        }
    }

    fn lookup<'p>(&'p self, partial: &'p [Option<bool>]) -> impl Fn(Variable) -> Option<bool> + 'p {
        move |v| {
            self.variables
                .binary_search(&v)
                .ok()
                .and_then(|idx| partial[idx])
        }
    }

    /// Combined status of all constraints on a partial assignment
    fn status(&self, partial: &[Option<bool>]) -> Option<bool> {
        let lookup = self.lookup(partial);
        let mut result = eval_partial(self.expr, &lookup);
        if result == Some(false) {
            return result;
        }
        for c in self.constraints {
            match c.eval_partial(&lookup) {
                Some(false) => return Some(false),
                Some(true) => (),
                None => result = None,
            }
        }
        result
    }

    /// Direct evaluation of the expression and all constraints
    fn is_solution(&self, state: &State) -> bool {
        self.expr.eval(state) && self.constraints.iter().all(|c| c.eval(state))
    }

    fn state(&self, partial: &[Option<bool>]) -> State {
        self.variables
            .iter()
            .zip(partial)
            .filter(|(_, value)| **value == Some(true))
            .map(|(v, _)| *v)
            .collect()
    }

    fn dpll(
        &self,
        depth: usize,
        partial: &mut Vec<Option<bool>>,
        find_all: bool,
        solutions: &mut Vec<State>,
        steps: &mut usize,
    ) -> bool {
        *steps += 1;
        match self.status(partial) {
            Some(false) => return false,
            Some(true) if depth == self.variables.len() => {
                solutions.push(self.state(partial));
                return !find_all;
            }
            _ if depth == self.variables.len() => return false,
            _ => (),
        }
        for value in [true, false] {
            partial[depth] = Some(value);
            if self.dpll(depth + 1, partial, find_all, solutions, steps) {
                partial[depth] = None;
                return true;
            }
        }
        partial[depth] = None;
        false
    }

    fn brute_force(&self, find_all: bool, steps: &mut usize) -> Vec<State> {
        let mut solutions = vec![];
        for index in 0..1usize << self.variables.len() {
            *steps += 1;
            let state = State::from_index(index, &self.variables);
            if self.is_solution(&state) {
                solutions.push(state);
                if !find_all {
                    break;
                }
            }
        }
        solutions
    }

    /// Local search over the checks: the conjuncts of the expression and the constraints
    fn walksat(&self, options: &SatOptions, steps: &mut usize) -> Option<State> {
        let seed = options.seed.unwrap_or_else(rand::random);
        debug!("WalkSAT seed: {}", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let noise = match options.noise.is_nan() {
            true => 0.5,
            false => options.noise.clamp(0.0, 1.0),
        };

        let mut state: State = self
            .variables
            .iter()
            .filter(|_| rng.gen_bool(0.5))
            .copied()
            .collect();

        let checks: Vec<&dyn LogicFunction> = self
            .expr
            .operands(Operator::And)
            .into_iter()
            .map(|e| e as &dyn LogicFunction)
            .chain(self.constraints.iter().map(|c| c as &dyn LogicFunction))
            .collect();
        let check_variables: Vec<Vec<Variable>> =
            checks.iter().map(|c| c.get_variables().to_vec()).collect();
        let satisfied = |state: &State| checks.iter().filter(|c| c.eval(state)).count();

        for _ in 0..options.max_flips {
            let unsatisfied: Vec<usize> = checks
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.eval(&state))
                .map(|(idx, _)| idx)
                .collect();
            if unsatisfied.is_empty() {
                return Some(state);
            }

            let candidates = &check_variables[unsatisfied[rng.gen_range(0..unsatisfied.len())]];
            if candidates.is_empty() {
                // a constant check can not be repaired by flipping variables
                return None;
            }
            let var = match rng.gen_bool(noise) {
                true => candidates[rng.gen_range(0..candidates.len())],
                false => {
                    let mut best = candidates[0];
                    let mut best_count = 0;
                    for v in candidates {
                        state.flip(*v);
                        let count = satisfied(&state);
                        state.flip(*v);
                        if count > best_count {
                            best = *v;
                            best_count = count;
                        }
                    }
                    best
                }
            };
            state.flip(var);
            *steps += 1;
        }
        match self.is_solution(&state) {
            true => Some(state),
            false => None,
        }
    }
}

/// Search the solutions of an expression under the configured constraints.
///
/// DPLL and brute force are limited to 10 variables (expression and constraints together).
/// WalkSAT returns at most one solution, and an unsatisfiable result only means that no
/// solution was found within the flip budget.
pub fn solve(parsed: &ParsedExpression, options: &SatOptions) -> Result<SatResult, BolexError> {
    let problem = Problem::new(parsed.ast(), &options.constraints);
    let n = problem.variables.len();
    let method = match options.method {
        SatMethod::Auto if n <= MAX_TABLE_VARIABLES => SatMethod::Dpll,
        SatMethod::Auto => SatMethod::WalkSat,
        SatMethod::Dpll => {
            BolexError::check_capacity("DPLL", n, MAX_TABLE_VARIABLES)?;
            SatMethod::Dpll
        }
        SatMethod::BruteForce => {
            BolexError::check_capacity("Brute force", n, MAX_TABLE_VARIABLES)?;
            SatMethod::BruteForce
        }
        SatMethod::WalkSat => SatMethod::WalkSat,
    };
    info!("solving '{}' with {} over {} variables", parsed.ast(), method, n);

    let mut steps = 0;
    let found = match method {
        SatMethod::BruteForce => problem.brute_force(options.find_all, &mut steps),
        SatMethod::WalkSat => problem.walksat(options, &mut steps).into_iter().collect(),
        _ => {
            let mut solutions = vec![];
            let mut partial = vec![None; n];
            problem.dpll(0, &mut partial, options.find_all, &mut solutions, &mut steps);
            solutions
        }
    };

    let mut solutions = vec![];
    for state in found {
        match problem.is_solution(&state) {
            true => solutions.push(state.assignment(&problem.variables)),
            false => warn!("discarding invalid solution {}", state),
        }
    }
    let satisfiable = !solutions.is_empty();
    if let Some(max) = options.max_solutions {
        solutions.truncate(max);
    }

    Ok(SatResult {
        satisfiable,
        solutions,
        metadata: SatMetadata {
            method,
            search_steps: steps,
            variables: problem.variables,
        },
    })
}

/// Compare two expressions on all assignments of the union of their variables
pub fn equivalent(
    left: &ParsedExpression,
    right: &ParsedExpression,
) -> Result<EquivalenceResult, BolexError> {
    let mut vars = left.get_variables();
    vars.union_with(&right.get_variables());
    let variables = vars.to_vec();
    BolexError::check_capacity("Equivalence checking", variables.len(), MAX_TABLE_VARIABLES)?;

    let size = 1usize << variables.len();
    let mut counterexamples = vec![];
    for index in 0..size {
        let state = State::from_index(index, &variables);
        let (l, r) = (left.eval(&state), right.eval(&state));
        if l != r {
            counterexamples.push(Counterexample {
                assignment: state.assignment(&variables),
                left: l,
                right: r,
            });
        }
    }
    debug!(
        "'{}' and '{}' differ on {} of {} assignments",
        left.ast(),
        right.ast(),
        counterexamples.len(),
        size
    );
    Ok(EquivalenceResult {
        equivalent: counterexamples.is_empty(),
        variables,
        checked: size,
        counterexamples,
    })
}

impl SatResult {
    pub fn satisfiable(&self) -> bool {
        self.satisfiable
    }

    pub fn solutions(&self) -> &[Assignment] {
        &self.solutions
    }

    pub fn metadata(&self) -> &SatMetadata {
        &self.metadata
    }
}
