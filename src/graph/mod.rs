//! The expression graph. Nodes live in an arena owned by a [Graph] and are referred to by
//! [NodeId]. Every constructor type checks its operands before the node exists, so a graph
//! can never hold an ill-typed node.
//!
//! Sharing is by identity: using the same [NodeId] twice shares the node, building an equal
//! subtree twice does not. There is no structural interning.

mod ops;

use std::{
    fmt::{self, Display},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use serde::Deserialize;

use crate::{
    checker::{self, ArgType},
    dialect::{self, Dialect},
    diagnostics::{CompilationError, CompilationResult},
    types::Type,
};

static NEXT_GRAPH: AtomicU32 = AtomicU32::new(0);

/// Handle to a node. Only valid for the graph that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    graph: u32,
    index: u32,
}

impl NodeId {
    /// Position of the node in its graph. Grows with construction order.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.index)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.index)
    }
}

/// A constant value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Float(f64),
}

impl Literal {
    pub fn ty(&self) -> Type {
        match self {
            Literal::Bool(_) => Type::Bool,
            Literal::Int(_) => Type::Int,
            Literal::Float(_) => Type::Float,
        }
    }

    /// Literals rendered with a leading minus sign.
    pub fn is_negative(&self) -> bool {
        match self {
            Literal::Bool(_) => false,
            Literal::Int(n) => *n < 0,
            Literal::Float(v) => v.is_sign_negative(),
        }
    }
}

/// Renders the literal in its target language lexical form. Floats always carry a decimal
/// point or an exponent.
impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(v) => {
                let s = format!("{v}");
                if s.contains('.') || s.contains('e') || s.contains('E') {
                    write!(f, "{s}")
                } else {
                    write!(f, "{s}.0")
                }
            }
        }
    }
}

/// Where an external variable gets its value from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Read-only, per invocation.
    Attribute,
    /// Read-only, per program.
    Uniform,
    /// Passed between pipeline stages, per invocation.
    Varying,
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageKind::Attribute => "attribute",
            StorageKind::Uniform => "uniform",
            StorageKind::Varying => "varying",
        };
        write!(f, "{s}")
    }
}

/// Precision qualifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
pub enum Precision {
    #[serde(rename = "lowp")]
    #[value(name = "lowp")]
    Low,
    #[serde(rename = "mediump")]
    #[value(name = "mediump")]
    Medium,
    #[serde(rename = "highp")]
    #[value(name = "highp")]
    High,
}

impl Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        };
        write!(f, "{s}")
    }
}

/// An external input or output binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub kind: StorageKind,
    pub ty: Type,
    pub precision: Option<Precision>,
}

impl Variable {
    pub fn new<S>(name: S, kind: StorageKind, ty: Type) -> Self
    where
        S: ToString,
    {
        Self {
            name: name.to_string(),
            kind,
            ty,
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: Option<Precision>) -> Self {
        self.precision = precision;
        self
    }

    /// Whether `name` is spelled like a user identifier. `gl_` prefixes and double
    /// underscores belong to the implementation. Keywords are checked by
    /// [crate::dialect::Dialect::is_reserved].
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !name.starts_with("gl_")
            && !name.contains("__")
    }
}

/// Variables print as they would be declared, without the trailing semicolon.
impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Some(p) => write!(f, "{} {} {} {}", self.kind, p, self.ty, self.name),
            None => write!(f, "{} {} {}", self.kind, self.ty, self.name),
        }
    }
}

/// Node categories.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Literal(Literal),
    Operator {
        symbol: String,
        operands: Vec<NodeId>,
    },
    Variable(Variable),
    Conditional {
        condition: NodeId,
        then: NodeId,
        otherwise: NodeId,
    },
}

/// A node in the expression graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    ty: Type,
    kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Result type, fixed at construction.
    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Nodes this node reads, in operand order.
    pub fn operands(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Literal(_) | NodeKind::Variable(_) => vec![],
            NodeKind::Operator { operands, .. } => operands.clone(),
            NodeKind::Conditional {
                condition,
                then,
                otherwise,
            } => vec![*condition, *then, *otherwise],
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self.kind, NodeKind::Conditional { .. })
    }

    /// Literals and variables. Never bound to temporaries.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal(_) | NodeKind::Variable(_))
    }
}

/// One line per node, e.g. `n3: float = sin(n2)`.
impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Literal(literal) => write!(f, "{}: {} = {literal}", self.id, self.ty),
            NodeKind::Variable(variable) => write!(f, "{}: {variable}", self.id),
            NodeKind::Operator { symbol, operands } => {
                let operands: Vec<String> = operands.iter().map(|o| o.to_string()).collect();
                write!(f, "{}: {} = {symbol}({})", self.id, self.ty, operands.join(", "))
            }
            NodeKind::Conditional {
                condition,
                then,
                otherwise,
            } => write!(
                f,
                "{}: {} = if {condition} then {then} else {otherwise}",
                self.id, self.ty
            ),
        }
    }
}

/// Arena of type checked nodes.
pub struct Graph {
    tag: u32,
    dialect: Arc<dyn Dialect>,
    nodes: Vec<Node>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Graph")
            .field("tag", &self.tag)
            .field("dialect", &self.dialect.name())
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl Graph {
    /// Create an empty graph checked against GLSL ES 1.00.
    pub fn new() -> Self {
        Self::with_dialect(dialect::glsl_es_100())
    }

    /// Create an empty graph checked against `dialect`.
    pub fn with_dialect(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            tag: NEXT_GRAPH.fetch_add(1, Ordering::Relaxed),
            dialect,
            nodes: vec![],
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node. `None` if the id belongs to another graph.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.graph != self.tag {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    /// Look up a node, reporting foreign ids as errors.
    pub fn node(&self, id: NodeId) -> CompilationResult<&Node> {
        self.get(id).ok_or_else(|| {
            CompilationError::new_unsupported(Some(id), "node does not belong to this graph")
        })
    }

    /// Type of a node.
    pub fn type_of(&self, id: NodeId) -> CompilationResult<Type> {
        Ok(self.node(id)?.ty)
    }

    /// Iterate all nodes in construction order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    fn push(&mut self, ty: Type, kind: NodeKind) -> NodeId {
        let id = NodeId {
            graph: self.tag,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(Node { id, ty, kind });
        id
    }

    /// Create a literal node.
    pub fn literal(&mut self, literal: Literal) -> CompilationResult<NodeId> {
        if let Literal::Float(v) = literal {
            if !v.is_finite() {
                return Err(CompilationError::new_unsupported(
                    None,
                    format!("float literal `{v}` has no finite representation"),
                ));
            }
        }
        Ok(self.push(literal.ty(), NodeKind::Literal(literal)))
    }

    pub fn float(&mut self, v: f64) -> CompilationResult<NodeId> {
        self.literal(Literal::Float(v))
    }

    pub fn int(&mut self, v: i32) -> NodeId {
        self.push(Type::Int, NodeKind::Literal(Literal::Int(v)))
    }

    pub fn boolean(&mut self, v: bool) -> NodeId {
        self.push(Type::Bool, NodeKind::Literal(Literal::Bool(v)))
    }

    /// Create a variable node. Each call creates a distinct node, even for equal variables.
    pub fn variable(&mut self, variable: Variable) -> CompilationResult<NodeId> {
        if !Variable::is_valid_name(&variable.name) {
            return Err(CompilationError::new_unsupported(
                None,
                format!("`{}` is not a valid variable name", variable.name),
            ));
        }
        if self.dialect.is_reserved(&variable.name) {
            return Err(CompilationError::new_unsupported(
                None,
                format!(
                    "`{}` is reserved by {} and can not name a variable",
                    variable.name,
                    self.dialect.name()
                ),
            ));
        }

        let ty = variable.ty;
        let allowed = match variable.kind {
            StorageKind::Uniform => true,
            StorageKind::Attribute | StorageKind::Varying => ty.is_gen() || ty.is_matrix(),
        };
        if !allowed {
            return Err(CompilationError::new_unsupported(
                None,
                format!("{} variables can not have type `{ty}`", variable.kind),
            ));
        }
        if variable.precision.is_some() && variable.kind != StorageKind::Varying {
            return Err(CompilationError::new_unsupported(
                None,
                format!("precision qualifier on {} `{}`", variable.kind, variable.name),
            ));
        }

        Ok(self.push(ty, NodeKind::Variable(variable)))
    }

    pub fn attribute<S>(&mut self, name: S, ty: Type) -> CompilationResult<NodeId>
    where
        S: ToString,
    {
        self.variable(Variable::new(name, StorageKind::Attribute, ty))
    }

    pub fn uniform<S>(&mut self, name: S, ty: Type) -> CompilationResult<NodeId>
    where
        S: ToString,
    {
        self.variable(Variable::new(name, StorageKind::Uniform, ty))
    }

    pub fn varying<S>(
        &mut self,
        name: S,
        ty: Type,
        precision: Option<Precision>,
    ) -> CompilationResult<NodeId>
    where
        S: ToString,
    {
        self.variable(Variable::new(name, StorageKind::Varying, ty).with_precision(precision))
    }

    fn arg_type(&self, id: NodeId) -> CompilationResult<ArgType> {
        let node = self.node(id)?;
        Ok(ArgType {
            ty: node.ty,
            coercible: matches!(node.kind, NodeKind::Literal(Literal::Int(_))),
        })
    }

    /// Promote an integer literal to a fresh float literal node.
    fn coerce(&mut self, id: NodeId) -> CompilationResult<NodeId> {
        let value = match self.node(id)?.kind {
            NodeKind::Literal(Literal::Int(n)) => Some(n),
            _ => None,
        };
        match value {
            Some(n) => self.literal(Literal::Float(n as f64)),
            None => Err(CompilationError::new_unsupported(
                Some(id),
                "only integer literals can be promoted to float",
            )),
        }
    }

    /// Apply `symbol` to `operands`. Integer literal operands are promoted to float when the
    /// chosen signature needs it.
    pub fn operator(&mut self, symbol: &str, operands: &[NodeId]) -> CompilationResult<NodeId> {
        let args = operands
            .iter()
            .map(|id| self.arg_type(*id))
            .collect::<CompilationResult<Vec<_>>>()?;

        let resolution = checker::check(self.dialect(), symbol, &args)
            .map_err(|m| m.into_error(symbol, operands, &args))?;

        let mut operands = operands.to_vec();
        for i in resolution.coerced {
            operands[i] = self.coerce(operands[i])?;
        }

        Ok(self.push(
            resolution.result,
            NodeKind::Operator {
                symbol: symbol.to_string(),
                operands,
            },
        ))
    }

    /// Select components of a vector, `components` being e.g. `"xyz"` or `"rg"`.
    pub fn swizzle(&mut self, operand: NodeId, components: &str) -> CompilationResult<NodeId> {
        self.operator(&format!(".{components}"), &[operand])
    }

    /// Expression valued if/else. Both branches are computed by the emitted program only on
    /// the path selected by `condition`, unless they are shared with other expressions.
    pub fn conditional(
        &mut self,
        condition: NodeId,
        then: NodeId,
        otherwise: NodeId,
    ) -> CompilationResult<NodeId> {
        let args = [
            self.arg_type(condition)?,
            self.arg_type(then)?,
            self.arg_type(otherwise)?,
        ];

        let resolution =
            checker::check_conditional(&args).map_err(|m| CompilationError::MalformedConditional {
                condition,
                message: m.to_string(),
            })?;

        let mut branches = [condition, then, otherwise];
        for i in resolution.coerced {
            branches[i] = self.coerce(branches[i])?;
        }
        let [condition, then, otherwise] = branches;

        Ok(self.push(
            resolution.result,
            NodeKind::Conditional {
                condition,
                then,
                otherwise,
            },
        ))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
