use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BolexError {
    /// The expression could not be parsed
    #[error("Invalid expression '{expression}': {error}")]
    Syntax {
        expression: String,
        error: SyntaxError,
    },

    /// The operation does not support this many variables
    #[error("{operation} supports at most {limit} variables, found {variables}")]
    Capacity {
        operation: &'static str,
        variables: usize,
        limit: usize,
    },

    /// The expression is too large or too deeply nested to be processed safely
    #[error("The {what} ({found}) exceeds the limit of {limit}")]
    TooComplex {
        what: &'static str,
        found: usize,
        limit: usize,
    },

    /// Unknown minimization algorithm
    #[error("Unsupported minimization algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// Karnaugh maps are only defined for 2 to 6 variables
    #[error("Karnaugh maps need 2 to 6 variables, found {0}")]
    UnsupportedSize(usize),

    /// The name is not a valid variable name
    #[error("The name '{0}' is not a valid variable")]
    InvalidName(String),

    /// Unknown method or option name
    #[error("Unsupported method '{0}'")]
    UnsupportedMethod(String),

    /// The distributed form has too many terms
    #[error("{operation} produced more than {limit} terms")]
    TooManyTerms { operation: &'static str, limit: usize },
}

/// The construct that made an expression invalid.
///
/// Positions are character offsets in the normalized text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("the expression is empty")]
    Empty,

    #[error("invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("closing parenthesis without opening at position {position}")]
    UnexpectedClosing { position: usize },

    #[error("{count} unclosed parenthesis")]
    Unclosed { count: usize },

    #[error("empty parentheses at position {position}")]
    EmptyParentheses { position: usize },

    #[error("adjacent operators '{operators}' at position {position}")]
    AdjacentOperators { operators: String, position: usize },

    #[error("operator next to a parenthesis in '{construct}' at position {position}")]
    OperatorAtBoundary { construct: String, position: usize },

    #[error("leading operator '{0}'")]
    LeadingOperator(char),

    #[error("trailing operator '{0}'")]
    TrailingOperator(char),

    #[error("complement without operand at position {position}")]
    MisplacedComplement { position: usize },

    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
}

impl BolexError {
    pub(crate) fn syntax(expression: &str, error: SyntaxError) -> Self {
        BolexError::Syntax {
            expression: expression.to_string(),
            error,
        }
    }

    pub(crate) fn check_capacity(
        operation: &'static str,
        variables: usize,
        limit: usize,
    ) -> Result<(), BolexError> {
        if variables > limit {
            return Err(BolexError::Capacity {
                operation,
                variables,
                limit,
            });
        }
        Ok(())
    }
}

impl Serialize for BolexError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
