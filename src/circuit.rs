//! Gate-level netlists of expressions.
//!
//! Each variable becomes an input gate, each NOT/AND/OR node of the tree becomes a gate wired to
//! the gates of its operands, and a single output gate is wired to the gate of the root.
//! Gates are created after their operands: the list of gates is in topological order.
//!
//! ```
//! use bolex::{Circuit, CircuitOptions, GateKind, ParsedExpression};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("AB' + C")?;
//! let circuit = Circuit::build(&parsed, &CircuitOptions::default())?;
//! assert_eq!(circuit.stats().inputs, 3);
//! assert_eq!(circuit.stats().logic_gates, 3);
//! assert_eq!(circuit.gates().last().map(|g| g.kind), Some(GateKind::Output));
//! assert!(circuit.verilog().contains("and g4(w4, A, w3);"));
//! # Ok(())
//! # }
//! ```

use crate::hdl;
use crate::*;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    Input,
    Output,
    And,
    Or,
    Not,
    Constant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Gate {
    pub id: usize,
    pub kind: GateKind,
    /// Variable name, constant value or gate type
    pub label: String,
    /// Identifiers of the gates driving the inputs of this gate
    pub inputs: Vec<usize>,
    /// Distance to the sources: 0 for inputs and constants
    pub level: usize,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from_gate: usize,
    pub to_gate: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Placement of the gates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Sources in the first column, then one column per gate in creation order
    BuildOrder,
    /// One column per level
    Leveled,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitOptions {
    pub layout: Layout,
    pub spacing_x: f64,
    pub spacing_y: f64,
    /// Name of the generated module and entity
    pub module_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitStats {
    pub inputs: usize,
    /// AND, OR and NOT gates
    pub logic_gates: usize,
    pub and_gates: usize,
    pub or_gates: usize,
    pub not_gates: usize,
    /// Largest level of a logic gate
    pub depth: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Circuit {
    expression: Expr,
    variables: Vec<Variable>,
    gates: Vec<Gate>,
    connections: Vec<Connection>,
    bounds: Bounds,
    stats: CircuitStats,
    notes: Vec<String>,
    verilog: String,
    vhdl: String,
}

/// Thresholds of the optimization notes
const MAX_NOT_GATES: usize = 2;
const MAX_DEPTH: usize = 4;
const MAX_LOGIC_GATES: usize = 10;

#[derive(Default)]
struct NetlistBuilder {
    gates: Vec<Gate>,
    inputs: BTreeMap<Variable, usize>,
    constants: [Option<usize>; 2],
}

impl NetlistBuilder {
    fn add(&mut self, kind: GateKind, label: String, inputs: Vec<usize>) -> usize {
        let id = self.gates.len();
        let level = match kind {
            GateKind::Input | GateKind::Constant => 0,
            _ => 1 + inputs.iter().map(|i| self.gates[*i].level).max().unwrap_or(0),
        };
        self.gates.push(Gate {
            id,
            kind,
            label,
            inputs,
            level,
            position: Position::default(),
        });
        id
    }

    fn input(&mut self, var: Variable) -> usize {
        if let Some(id) = self.inputs.get(&var) {
            return *id;
        }
        let id = self.add(GateKind::Input, var.to_string(), vec![]);
        self.inputs.insert(var, id);
        id
    }

    fn constant(&mut self, value: bool) -> usize {
        if let Some(id) = self.constants[value as usize] {
            return id;
        }
        let id = self.add(GateKind::Constant, (value as u8).to_string(), vec![]);
        self.constants[value as usize] = Some(id);
        id
    }

    fn build(&mut self, expr: &Expr) -> usize {
        match expr {
            Expr::Variable(v) => self.input(*v),
            Expr::Constant(b) => self.constant(*b),
            Expr::Not(e) => {
                let e = self.build(e);
                self.add(GateKind::Not, "NOT".into(), vec![e])
            }
            Expr::And(l, r) => {
                let inputs = vec![self.build(l), self.build(r)];
                self.add(GateKind::And, "AND".into(), inputs)
            }
            Expr::Or(l, r) => {
                let inputs = vec![self.build(l), self.build(r)];
                self.add(GateKind::Or, "OR".into(), inputs)
            }
        }
    }
}

impl GateKind {
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::Input => "INPUT",
            GateKind::Output => "OUTPUT",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Not => "NOT",
            GateKind::Constant => "CONSTANT",
        }
    }

    /// AND, OR and NOT gates
    pub fn is_logic(&self) -> bool {
        matches!(self, GateKind::And | GateKind::Or | GateKind::Not)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Layout {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "build-order" | "build_order" => Ok(Layout::BuildOrder),
            "leveled" | "levels" => Ok(Layout::Leveled),
            _ => Err(BolexError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl Default for CircuitOptions {
    fn default() -> Self {
        Self {
            layout: Layout::BuildOrder,
            spacing_x: 120.0,
            spacing_y: 80.0,
            module_name: "logic_circuit".to_string(),
        }
    }
}

impl CircuitOptions {
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }
}

impl Circuit {
    /// Build the netlist of a parsed expression, with its layout and HDL texts
    pub fn build(parsed: &ParsedExpression, options: &CircuitOptions) -> Result<Self, BolexError> {
        hdl::check_identifier(&options.module_name)?;

        let mut builder = NetlistBuilder::default();
        for var in parsed.variables() {
            builder.input(*var);
        }
        let root = builder.build(parsed.ast());
        builder.add(GateKind::Output, "result".into(), vec![root]);
        let mut gates = builder.gates;

        let connections = gates
            .iter()
            .flat_map(|g| {
                g.inputs.iter().map(move |i| Connection {
                    from_gate: *i,
                    to_gate: g.id,
                })
            })
            .collect();

        let bounds = match options.layout {
            Layout::BuildOrder => place_build_order(&mut gates, options),
            Layout::Leveled => place_leveled(&mut gates, options),
        };
        let stats = compute_stats(&gates);
        let notes = optimization_notes(&stats);
        debug!(
            "circuit of '{}': {} gates, {} connections, depth {}",
            parsed.ast(),
            gates.len(),
            gates.iter().map(|g| g.inputs.len()).sum::<usize>(),
            stats.depth
        );

        let mut circuit = Self {
            expression: parsed.ast().clone(),
            variables: parsed.variables().to_vec(),
            gates,
            connections,
            bounds,
            stats,
            notes,
            verilog: String::new(),
            vhdl: String::new(),
        };
        circuit.verilog = hdl::verilog(&circuit, &options.module_name);
        circuit.vhdl = hdl::vhdl(&circuit, &options.module_name);
        Ok(circuit)
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate(&self, id: usize) -> &Gate {
        &self.gates[id]
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The single output gate
    pub fn output(&self) -> Option<&Gate> {
        self.gates.iter().find(|g| g.kind == GateKind::Output)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn stats(&self) -> &CircuitStats {
        &self.stats
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn verilog(&self) -> &str {
        &self.verilog
    }

    pub fn vhdl(&self) -> &str {
        &self.vhdl
    }

    /// Simulate the netlist: the value of each gate, in gate order
    pub fn simulate(&self, state: &State) -> Vec<bool> {
        let mut values: Vec<bool> = Vec::with_capacity(self.gates.len());
        for gate in &self.gates {
            let value = match gate.kind {
                GateKind::Input => gate
                    .label
                    .parse::<Variable>()
                    .map(|v| state.is_active(v))
                    .unwrap_or(false),
                GateKind::Constant => gate.label == "1",
                GateKind::Not => !values[gate.inputs[0]],
                GateKind::And => gate.inputs.iter().all(|i| values[*i]),
                GateKind::Or => gate.inputs.iter().any(|i| values[*i]),
                GateKind::Output => values[gate.inputs[0]],
            };
            values.push(value);
        }
        values
    }
}

impl LogicFunction for Circuit {
    fn eval(&self, state: &State) -> bool {
        self.simulate(state).last().copied().unwrap_or(false)
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        variables.extend(self.variables.iter().copied());
    }
}

fn bounds_of(gates: &[Gate], options: &CircuitOptions) -> Bounds {
    let max_x = gates.iter().map(|g| g.position.x).fold(0.0, f64::max);
    let max_y = gates.iter().map(|g| g.position.y).fold(0.0, f64::max);
    Bounds {
        width: max_x + options.spacing_x,
        height: max_y + options.spacing_y,
    }
}

/// Sources in the first column, each other gate in its own column, vertically centered on its inputs
fn place_build_order(gates: &mut [Gate], options: &CircuitOptions) -> Bounds {
    let mut sources = 0;
    let mut column = 0;
    for idx in 0..gates.len() {
        let position = match gates[idx].kind {
            GateKind::Input | GateKind::Constant => {
                sources += 1;
                Position {
                    x: 0.0,
                    y: (sources - 1) as f64 * options.spacing_y,
                }
            }
            _ => {
                column += 1;
                let inputs = &gates[idx].inputs;
                let y = inputs.iter().map(|i| gates[*i].position.y).sum::<f64>()
                    / inputs.len().max(1) as f64;
                Position {
                    x: column as f64 * options.spacing_x,
                    y,
                }
            }
        };
        gates[idx].position = position;
    }
    bounds_of(gates, options)
}

/// One column per level, gates stacked in creation order within a level
fn place_leveled(gates: &mut [Gate], options: &CircuitOptions) -> Bounds {
    let mut rows: BTreeMap<usize, usize> = BTreeMap::new();
    for gate in gates.iter_mut() {
        let row = rows.entry(gate.level).or_insert(0);
        gate.position = Position {
            x: gate.level as f64 * options.spacing_x,
            y: *row as f64 * options.spacing_y,
        };
        *row += 1;
    }
    bounds_of(gates, options)
}

fn compute_stats(gates: &[Gate]) -> CircuitStats {
    let count = |kind: GateKind| gates.iter().filter(|g| g.kind == kind).count();
    CircuitStats {
        inputs: count(GateKind::Input),
        logic_gates: gates.iter().filter(|g| g.kind.is_logic()).count(),
        and_gates: count(GateKind::And),
        or_gates: count(GateKind::Or),
        not_gates: count(GateKind::Not),
        depth: gates
            .iter()
            .filter(|g| g.kind.is_logic())
            .map(|g| g.level)
            .max()
            .unwrap_or(0),
    }
}

fn optimization_notes(stats: &CircuitStats) -> Vec<String> {
    let mut notes = vec![];
    if stats.not_gates > MAX_NOT_GATES {
        notes.push(format!(
            "{} NOT gates: De Morgan's laws may reduce the number of inverters",
            stats.not_gates
        ));
    }
    if stats.depth > MAX_DEPTH {
        notes.push(format!(
            "Depth {}: a two-level form would shorten the propagation delay",
            stats.depth
        ));
    }
    if stats.logic_gates > MAX_LOGIC_GATES {
        notes.push(format!(
            "{} logic gates: minimizing the expression may reduce the gate count",
            stats.logic_gates
        ));
    }
    notes
}
