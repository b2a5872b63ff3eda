//! Parse, analyze and transform Boolean expressions.
//!
//! [Boolean variables](Variable) are single ASCII letters. A [State] is the set of all variables associated
//! to the ```true``` value: other variables are implicitly ```false```.
//! A [Pattern] is defined by two sets of fixed variables (```true``` or ```false```), while other variables
//! remain free. It is read as a product term in sums of products and as a clause in products of sums.
//!
//! According to the [LogicFunction] trait, a Boolean function can be evaluated in a specific [State] and reports
//! the variables it depends on. Expressions, patterns, constraints and circuits all implement this trait,
//! which is used to build truth tables and to check equivalences.
//!
//! # Boolean expressions
//!
//! A [Boolean expression](Expr) combines variables and constants with Boolean operators (AND, OR, NOT).
//! It is an immutable tree: transformations build new trees and share unchanged subtrees.
//! Textual expressions are normalized and validated before parsing: several notations are accepted
//! for each operator (```+```, ```|```, ```OR``` for disjunction, juxtaposition, ```·```, ```*```, ```&```,
//! ```AND``` for conjunction, postfix ```'```, prefix ```!``` or ```NOT``` for negation).
//!
//! ```
//! use bolex::{Expr, LogicFunction, ParsedExpression, State, Variable};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("A AND (b | !C)")?;
//! assert_eq!(parsed.ast().to_string(), "A(b + C')");
//! assert_eq!(parsed.variable_names(), "ACb");
//!
//! // Evaluate the expression on a state
//! let a = Variable::try_from('A')?;
//! let state = State::from_iter([a]);
//! assert!(parsed.eval(&state));
//!
//! // Build expressions directly with operators
//! let expr: Expr = a & !Variable::try_from('C')?;
//! assert_eq!(expr.to_string(), "AC'");
//! # Ok(())
//! # }
//! ```
//!
//! # Truth tables and canonical forms
//!
//! The [truth table](TruthTable) lists the value of a function for all assignments of its variables,
//! the first variable being the most significant bit of the row index. The minterms and maxterms give
//! the canonical sum of products and product of sums. Exhaustive operations are limited to 10 variables.
//!
//! ```
//! use bolex::{ParsedExpression, TruthTable};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("A + B'")?;
//! let table = TruthTable::from_parsed(&parsed)?;
//! assert_eq!(table.len(), 4);
//! assert_eq!(table.maxterms(), [1]);
//! assert_eq!(table.canonical_pos().to_string(), "A + B'");
//! # Ok(())
//! # }
//! ```
//!
//! # Simplification and minimization
//!
//! The [simplifier](simplify()) rewrites expressions with a catalog of Boolean laws and reports each
//! applied law. The [minimization suite](minimize()) computes minimal sums of products from the truth
//! table with the Quine-McCluskey, Petrick and Espresso strategies, and ranks the results.
//! [Karnaugh maps](KarnaughMap) group adjacent cells of functions of 2 to 6 variables.
//!
//! ```
//! use bolex::{minimize, simplify, KarnaughMap, KarnaughOptions, MinimizeOptions, ParsedExpression, SimplifyOptions};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("A + A'")?;
//! let result = simplify(&parsed, &SimplifyOptions::default())?;
//! assert_eq!(result.simplified().to_string(), "1");
//! assert_eq!(result.steps()[0].law.name(), "Complement Law");
//!
//! let parsed = ParsedExpression::parse("AB + A'B + AB'")?;
//! let report = minimize(&parsed, &MinimizeOptions::default())?;
//! assert_eq!(report.best().map(|r| r.expression().to_string()), Some("A + B".into()));
//!
//! let map = KarnaughMap::build(&parsed, &KarnaughOptions::default())?;
//! assert_eq!(map.groups().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Satisfiability, conversions and circuits
//!
//! The [SAT solver](solve()) searches assignments satisfying an expression and additional
//! [constraints](Constraint). The [converter](convert()) produces canonical and minimized sums of products
//! and products of sums. A [circuit](Circuit) is the gate netlist of an expression, with its layout
//! and its description in Verilog and VHDL. The [engine](analyze()) runs all of them, for single
//! expressions or for parallel batches.
//!
//! ```
//! use bolex::{equivalent, solve, Constraint, ParsedExpression, SatOptions};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let left = ParsedExpression::parse("(AB)'")?;
//! let right = ParsedExpression::parse("A' + B'")?;
//! assert!(equivalent(&left, &right)?.equivalent);
//!
//! let options = SatOptions::default().find_all().constraint(Constraint::AtMostOne {
//!     variables: left.variables().to_vec(),
//! });
//! let result = solve(&left, &options)?;
//! assert_eq!(result.solutions().len(), 3);
//! # Ok(())
//! # }
//! ```

mod error;
mod expr;
mod pattern;
mod rules;
mod states;

pub mod circuit;
pub mod convert;
pub mod efmt;
pub mod engine;
pub mod hdl;
pub mod implicants;
pub mod karnaugh;
pub mod minimize;
pub mod parse;
pub mod primes;
pub mod sat;
pub mod simplify;
pub mod tools;
pub mod truth_table;
pub mod variable;

#[macro_use]
extern crate pest_derive;

// Export public structures and API
pub use circuit::{Circuit, CircuitOptions, Gate, GateKind, Layout};
pub use convert::{convert, ConversionResult, TargetForm};
pub use engine::{analyze, analyze_batch, Analysis, EngineConfig, Stages};
pub use error::{BolexError, SyntaxError};
pub use expr::{Expr, ExprMetrics, Operator};
pub use implicants::Implicant;
pub use karnaugh::{KarnaughMap, KarnaughOptions};
pub use minimize::{minimize, Algorithm, MinimizationReport, MinimizationResult, MinimizeOptions};
pub use parse::ParsedExpression;
pub use pattern::Pattern;
pub use primes::PrimeChart;
pub use rules::LogicFunction;
pub use sat::{equivalent, solve, Constraint, EquivalenceResult, SatMethod, SatOptions, SatResult};
pub use simplify::{simplify, Law, SimplificationResult, SimplifyMethod, SimplifyOptions};
pub use states::{Assignment, State};
pub use truth_table::TruthTable;
pub use variable::{VarSet, Variable};
