//! Compilation errors and their reporting.

mod printer;

use std::fmt::Display;

use crate::{graph::NodeId, types::Type};

pub use printer::DiagnosticsPrinter;

/// Result of every fallible graph construction or compilation step.
pub type CompilationResult<T> = Result<T, CompilationError>;

/// Everything that can go wrong while building or compiling a graph. Every variant carries
/// enough context (node ids, operators, types) to find the offending construction call.
#[derive(Debug, Clone, PartialEq)]
pub enum CompilationError {
    /// No signature of `operator` accepts the operand types.
    Type {
        operator: String,
        operands: Vec<NodeId>,
        operand_types: Vec<Type>,
        message: String,
    },

    /// Two declarations want the same identifier.
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// A node, operator or variable the target language cannot express.
    UnsupportedConstruct {
        node: Option<NodeId>,
        construct: String,
    },

    /// Non-boolean condition or incompatible branches.
    MalformedConditional { condition: NodeId, message: String },
}

impl CompilationError {
    pub fn new_unsupported<S>(node: Option<NodeId>, construct: S) -> Self
    where
        S: ToString,
    {
        Self::UnsupportedConstruct {
            node,
            construct: construct.to_string(),
        }
    }

    pub fn new_collision<S>(name: &str, first: S, second: S) -> Self
    where
        S: ToString,
    {
        Self::NameCollision {
            name: name.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Short name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompilationError::Type { .. } => "type error",
            CompilationError::NameCollision { .. } => "name collision",
            CompilationError::UnsupportedConstruct { .. } => "unsupported construct",
            CompilationError::MalformedConditional { .. } => "malformed conditional",
        }
    }

    /// Lines of additional context, shown below the message by the [DiagnosticsPrinter].
    pub fn context(&self) -> Vec<String> {
        match self {
            CompilationError::Type {
                operator,
                operands,
                operand_types,
                ..
            } => {
                let mut lines = vec![format!("operator: `{operator}`")];
                for (id, t) in operands.iter().zip(operand_types) {
                    lines.push(format!("operand {id}: {t}"));
                }
                lines
            }
            CompilationError::NameCollision { first, second, .. } => {
                vec![format!("first: {first}"), format!("second: {second}")]
            }
            CompilationError::UnsupportedConstruct { node, .. } => match node {
                Some(id) => vec![format!("node: {id}")],
                None => vec![],
            },
            CompilationError::MalformedConditional { condition, .. } => {
                vec![format!("condition: {condition}")]
            }
        }
    }
}

impl Display for CompilationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilationError::Type {
                operator,
                operand_types,
                message,
                ..
            } => {
                let types: Vec<String> = operand_types.iter().map(|t| t.to_string()).collect();
                write!(f, "`{operator}({})`: {message}", types.join(", "))
            }
            CompilationError::NameCollision {
                name,
                first,
                second,
            } => write!(
                f,
                "`{name}` is declared both as `{first}` and as `{second}`"
            ),
            CompilationError::UnsupportedConstruct { node, construct } => match node {
                Some(id) => write!(f, "{construct} (node {id})"),
                None => write!(f, "{construct}"),
            },
            CompilationError::MalformedConditional { condition, message } => {
                write!(f, "conditional on {condition}: {message}")
            }
        }
    }
}

impl std::error::Error for CompilationError {}
