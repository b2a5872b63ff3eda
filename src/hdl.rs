//! Hardware description of circuits.
//!
//! Both dialects serialize the same list of gates: every logic gate drives a wire named after
//! its identifier (```w4```), inputs keep the name of their variable and the output port is
//! named ```result```.

use crate::circuit::{Circuit, Gate, GateKind};
use crate::BolexError;

use once_cell::sync::Lazy;
use regex::Regex;

static RE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap());

/// Name of the output port
pub const OUTPUT_PORT: &str = "result";

/// Check that a module name is a valid identifier in both dialects
pub fn check_identifier(name: &str) -> Result<(), BolexError> {
    if !RE_IDENTIFIER.is_match(name) || name.ends_with('_') || name.contains("__") {
        return Err(BolexError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Structural Verilog: one primitive instance per logic gate
pub fn verilog(circuit: &Circuit, module_name: &str) -> String {
    let inputs: Vec<&Gate> = sources(circuit, GateKind::Input).collect();
    let signal = |id: usize| verilog_signal(circuit.gate(id));
    let mut code = String::new();

    let ports: Vec<&str> = inputs
        .iter()
        .map(|g| g.label.as_str())
        .chain(std::iter::once(OUTPUT_PORT))
        .collect();
    code.push_str(&format!("module {}({});\n", module_name, ports.join(", ")));
    if !inputs.is_empty() {
        let names: Vec<&str> = inputs.iter().map(|g| g.label.as_str()).collect();
        code.push_str(&format!("  input {};\n", names.join(", ")));
    }
    code.push_str(&format!("  output {};\n", OUTPUT_PORT));

    let wires: Vec<String> = wires(circuit).map(|g| signal(g.id)).collect();
    if !wires.is_empty() {
        code.push_str(&format!("  wire {};\n", wires.join(", ")));
    }
    code.push('\n');

    for gate in circuit.gates() {
        let operands: Vec<String> = gate.inputs.iter().map(|i| signal(*i)).collect();
        match gate.kind {
            GateKind::Input => (),
            GateKind::Constant => code.push_str(&format!(
                "  assign {} = 1'b{};\n",
                signal(gate.id),
                gate.label
            )),
            GateKind::And | GateKind::Or | GateKind::Not => code.push_str(&format!(
                "  {} g{}({}, {});\n",
                gate.kind.name().to_lowercase(),
                gate.id,
                signal(gate.id),
                operands.join(", ")
            )),
            GateKind::Output => {
                code.push_str(&format!("  assign {} = {};\n", OUTPUT_PORT, operands.join("")))
            }
        }
    }
    code.push_str("endmodule\n");
    code
}

/// VHDL dataflow architecture: one concurrent signal assignment per logic gate
pub fn vhdl(circuit: &Circuit, entity_name: &str) -> String {
    let signal = |id: usize| vhdl_signal(circuit.gate(id));
    let mut code = String::new();

    code.push_str("library ieee;\nuse ieee.std_logic_1164.all;\n\n");
    code.push_str(&format!("entity {} is\n  port (\n", entity_name));
    for gate in sources(circuit, GateKind::Input) {
        code.push_str(&format!("    {} : in std_logic;\n", signal(gate.id)));
    }
    code.push_str(&format!("    {} : out std_logic\n  );\n", OUTPUT_PORT));
    code.push_str(&format!("end entity {};\n\n", entity_name));

    code.push_str(&format!("architecture dataflow of {} is\n", entity_name));
    for gate in wires(circuit) {
        code.push_str(&format!("  signal {} : std_logic;\n", signal(gate.id)));
    }
    code.push_str("begin\n");

    for gate in circuit.gates() {
        let operands: Vec<String> = gate.inputs.iter().map(|i| signal(*i)).collect();
        let value = match gate.kind {
            GateKind::Input => continue,
            GateKind::Constant => format!("'{}'", gate.label),
            GateKind::Not => format!("not {}", operands.join("")),
            GateKind::And => operands.join(" and "),
            GateKind::Or => operands.join(" or "),
            GateKind::Output => {
                code.push_str(&format!("  {} <= {};\n", OUTPUT_PORT, operands.join("")));
                continue;
            }
        };
        code.push_str(&format!("  {} <= {};\n", signal(gate.id), value));
    }
    code.push_str("end architecture dataflow;\n");
    code
}

fn sources(circuit: &Circuit, kind: GateKind) -> impl Iterator<Item = &Gate> {
    circuit.gates().iter().filter(move |g| g.kind == kind)
}

/// Gates driving an internal wire
fn wires(circuit: &Circuit) -> impl Iterator<Item = &Gate> {
    circuit
        .gates()
        .iter()
        .filter(|g| g.kind.is_logic() || g.kind == GateKind::Constant)
}

fn verilog_signal(gate: &Gate) -> String {
    match gate.kind {
        GateKind::Input => gate.label.clone(),
        GateKind::Output => OUTPUT_PORT.to_string(),
        _ => format!("w{}", gate.id),
    }
}

/// VHDL is case insensitive: lower case variables get a suffix
fn vhdl_signal(gate: &Gate) -> String {
    match gate.kind {
        GateKind::Input if gate.label.chars().all(|c| c.is_ascii_lowercase()) => {
            format!("{}_lc", gate.label)
        }
        _ => verilog_signal(gate),
    }
}

#[cfg(test)]
mod tests {
    use crate::circuit::{Circuit, CircuitOptions};
    use crate::hdl::*;
    use crate::ParsedExpression;

    use test_log::test;

    fn circuit(text: &str) -> Result<Circuit, BolexError> {
        let parsed = ParsedExpression::parse(text)?;
        Circuit::build(&parsed, &CircuitOptions::default())
    }

    #[test]
    fn verilog_module() -> Result<(), BolexError> {
        let c = circuit("AB' + C")?;
        let expected = "module logic_circuit(A, B, C, result);
  input A, B, C;
  output result;
  wire w3, w4, w5;

  not g3(w3, B);
  and g4(w4, A, w3);
  or g5(w5, w4, C);
  assign result = w5;
endmodule
";
        assert_eq!(c.verilog(), expected);
        Ok(())
    }

    #[test]
    fn vhdl_entity() -> Result<(), BolexError> {
        let c = circuit("AB' + C")?;
        let expected = "library ieee;
use ieee.std_logic_1164.all;

entity logic_circuit is
  port (
    A : in std_logic;
    B : in std_logic;
    C : in std_logic;
    result : out std_logic
  );
end entity logic_circuit;

architecture dataflow of logic_circuit is
  signal w3 : std_logic;
  signal w4 : std_logic;
  signal w5 : std_logic;
begin
  w3 <= not B;
  w4 <= A and w3;
  w5 <= w4 or C;
  result <= w5;
end architecture dataflow;
";
        assert_eq!(c.vhdl(), expected);
        Ok(())
    }

    #[test]
    fn constants_and_case() -> Result<(), BolexError> {
        let c = circuit("Aa + 1")?;
        assert!(c.verilog().contains("assign w3 = 1'b1;"));
        assert!(c.verilog().contains("and g2(w2, A, a);"));
        assert!(c.vhdl().contains("a_lc : in std_logic;"));
        assert!(c.vhdl().contains("w2 <= A and a_lc;"));
        assert!(c.vhdl().contains("w3 <= '1';"));

        let c = circuit("1")?;
        assert!(c.verilog().starts_with("module logic_circuit(result);\n  output result;"));
        assert!(c.vhdl().contains("  port (\n    result : out std_logic\n  );"));
        Ok(())
    }

    #[test]
    fn both_dialects_describe_the_same_gates() -> Result<(), BolexError> {
        let c = circuit("(A + B)'(C + D') + AD")?;
        for gate in c.gates().iter().filter(|g| g.kind.is_logic()) {
            let instance = format!("{} g{}(w{}", gate.kind.name().to_lowercase(), gate.id, gate.id);
            assert!(c.verilog().contains(&instance));
            let assignment = format!("  w{} <= ", gate.id);
            assert!(c.vhdl().contains(&assignment));
        }
        let instances = c.verilog().lines().filter(|l| l.contains(" g")).count();
        let assignments = c.vhdl().lines().filter(|l| l.contains(" <= ")).count();
        assert_eq!(instances + 1, assignments);
        Ok(())
    }

    #[test]
    fn identifiers() {
        assert!(check_identifier("adder").is_ok());
        assert!(check_identifier("logic_circuit2").is_ok());
        assert!(check_identifier("2fast").is_err());
        assert!(check_identifier("bad__name").is_err());
        assert!(check_identifier("trailing_").is_err());
        assert!(check_identifier("").is_err());
    }
}
