//! Formatting API for expressions

use crate::{Expr, Operator, Variable};
use delegate::delegate;

use std::fmt;

/// Symbols used by an infix formatter
pub struct FormatterConfig<'a> {
    s_and: &'a str,
    s_or: &'a str,
    s_not: &'a str,
    postfix_not: bool,
}

/// Canonical notation: ```AB' + (C + D)'```
pub static CANONICAL_FMT_CFG: FormatterConfig = FormatterConfig {
    s_and: "",
    s_or: " + ",
    s_not: "'",
    postfix_not: true,
};

/// Programming notation: ```A & !B | !(C | D)```
pub static PROGRAMMING_FMT_CFG: FormatterConfig = FormatterConfig {
    s_and: " & ",
    s_or: " | ",
    s_not: "!",
    postfix_not: false,
};

/// An expression displayed with a specific formatter configuration
pub struct InfixFormatted<'a> {
    expr: &'a Expr,
    cfg: &'a FormatterConfig<'a>,
}

/// Define hooks to display separate parts of expressions.
///
/// This trait provide entry points used by [crate::Expr::fmt_with] to control the presentation of the expression.
/// The expression visits the inner tree and calls the hooks defined in this trait for each node and leaf.
pub trait ExprFormatter {
    /// Pass-through function calling an internal [fmt::Formatter].
    ///
    /// This function enables the use of the ```write!``` macro in other functions.
    fn write_fmt(&mut self, args: fmt::Arguments) -> fmt::Result;

    /// Write a fixed Boolean node
    fn write_bool(&mut self, b: bool) -> fmt::Result;

    /// Write a single variable, which can be negated
    fn write_variable(&mut self, var: Variable, value: bool) -> fmt::Result;

    /// Start writing a negated sub-expression.
    ///
    /// Atomic operands (constants, variables and other negations) do not need grouping.
    fn start_negation(&mut self, atomic: bool) -> fmt::Result;

    /// Stop writing a negated sub-expression
    fn end_negation(&mut self, atomic: bool) -> fmt::Result;

    /// Start writing an operation
    fn start_operation(&mut self, op: Operator, parent: Option<Operator>) -> fmt::Result;

    /// Stop writing an operation
    fn end_operation(&mut self, op: Operator, parent: Option<Operator>) -> fmt::Result;

    /// Separate operands in the ongoing operation
    fn sep_operation(&mut self, op: Operator) -> fmt::Result;
}

impl FormatterConfig<'_> {
    pub fn operator(&self, op: Operator) -> &str {
        match op {
            Operator::And => self.s_and,
            Operator::Or => self.s_or,
        }
    }

    pub fn infix<'a>(&'a self, expr: &'a Expr) -> InfixFormatted<'a> {
        InfixFormatted { expr, cfg: self }
    }
}

pub struct InfixFormatter<'a, 'b>(&'a mut fmt::Formatter<'b>, &'a FormatterConfig<'a>);
pub struct PrefixFormatter<'a, 'b>(InfixFormatter<'a, 'b>);

impl<'a, 'b> InfixFormatter<'a, 'b> {
    pub fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
        Self(f, &CANONICAL_FMT_CFG)
    }
    pub fn with(f: &'a mut fmt::Formatter<'b>, cfg: &'a FormatterConfig) -> Self {
        Self(f, cfg)
    }
}

impl<'a, 'b> PrefixFormatter<'a, 'b> {
    pub fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
        Self(InfixFormatter::new(f))
    }
}

impl ExprFormatter for InfixFormatter<'_, '_> {
    fn write_fmt(&mut self, args: fmt::Arguments) -> fmt::Result {
        fmt::Formatter::write_fmt(self.0, args)
    }

    fn write_bool(&mut self, b: bool) -> fmt::Result {
        match b {
            false => write!(self, "0"),
            true => write!(self, "1"),
        }
    }

    fn write_variable(&mut self, var: Variable, value: bool) -> fmt::Result {
        match (value, self.1.postfix_not) {
            (true, _) => write!(self, "{}", var),
            (false, true) => write!(self, "{}{}", var, self.1.s_not),
            (false, false) => write!(self, "{}{}", self.1.s_not, var),
        }
    }

    fn start_negation(&mut self, atomic: bool) -> fmt::Result {
        if !self.1.postfix_not {
            write!(self, "{}", self.1.s_not)?;
        }
        match atomic {
            true => Ok(()),
            false => write!(self, "("),
        }
    }

    fn end_negation(&mut self, atomic: bool) -> fmt::Result {
        if !atomic {
            write!(self, ")")?;
        }
        match self.1.postfix_not {
            true => write!(self, "{}", self.1.s_not),
            false => Ok(()),
        }
    }

    fn start_operation(&mut self, op: Operator, parent: Option<Operator>) -> fmt::Result {
        match op.priority() < parent.map(|o| o.priority()).unwrap_or(0) {
            true => write!(self, "("),
            false => Ok(()),
        }
    }

    fn end_operation(&mut self, op: Operator, parent: Option<Operator>) -> fmt::Result {
        match op.priority() < parent.map(|o| o.priority()).unwrap_or(0) {
            true => write!(self, ")"),
            false => Ok(()),
        }
    }

    fn sep_operation(&mut self, op: Operator) -> fmt::Result {
        write!(self, "{}", self.1.operator(op))
    }
}

/// Display an expression as a prefix s-expression: ```(+ A (· B C'))```
pub struct PrefixFormatted<'a>(pub &'a Expr);

impl fmt::Display for PrefixFormatted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ef = PrefixFormatter::new(f);
        self.0.fmt_with(&mut ef)
    }
}

impl fmt::Display for InfixFormatted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ef = InfixFormatter::with(f, self.cfg);
        self.expr.fmt_with(&mut ef)
    }
}

impl ExprFormatter for PrefixFormatter<'_, '_> {
    delegate! {
        to self.0 {
            fn write_fmt(&mut self, args: fmt::Arguments) -> fmt::Result;
            fn write_bool(&mut self, b: bool) -> fmt::Result;
            fn write_variable(&mut self, var: Variable, value: bool) -> fmt::Result;
        }
    }

    fn start_negation(&mut self, _atomic: bool) -> fmt::Result {
        write!(self, "(' ")
    }

    fn end_negation(&mut self, _atomic: bool) -> fmt::Result {
        write!(self, ")")
    }

    fn start_operation(&mut self, op: Operator, _parent: Option<Operator>) -> fmt::Result {
        match op {
            Operator::And => write!(self, "(· "),
            Operator::Or => write!(self, "(+ "),
        }
    }

    fn end_operation(&mut self, _op: Operator, _parent: Option<Operator>) -> fmt::Result {
        write!(self, ")")
    }

    fn sep_operation(&mut self, _op: Operator) -> fmt::Result {
        write!(self, " ")
    }
}

#[cfg(test)]
mod tests {
    use crate::efmt;
    use crate::*;

    #[test]
    fn notations() -> Result<(), BolexError> {
        let expr: Expr = "A + B'(C + D)".parse()?;
        assert_eq!(format!("{}", &expr), "A + B'(C + D)");
        assert_eq!(
            format!("{}", efmt::PROGRAMMING_FMT_CFG.infix(&expr)),
            "A | !B & (C | D)"
        );
        assert_eq!(
            format!("{}", efmt::PrefixFormatted(&expr)),
            "(+ A (· B' (+ C D)))"
        );

        let expr: Expr = "(AB)' + (A')'".parse()?;
        assert_eq!(format!("{}", &expr), "(AB)' + A''");
        assert_eq!(
            format!("{}", efmt::PROGRAMMING_FMT_CFG.infix(&expr)),
            "!(A & B) | !!A"
        );
        Ok(())
    }
}
