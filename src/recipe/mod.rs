//! Recipes: JSON descriptions of an expression graph and its outputs.
//!
//! ```json
//! {
//!     "stage": "fragment",
//!     "nodes": [
//!         { "id": "uv", "kind": "varying", "name": "v_uv", "type": "vec2" },
//!         { "id": "tex", "kind": "uniform", "name": "u_tex", "type": "sampler2D" },
//!         { "id": "color", "kind": "op", "op": "texture2D", "args": ["tex", "uv"] }
//!     ],
//!     "outputs": [{ "name": "gl_FragColor", "value": "color" }]
//! }
//! ```
//!
//! Operands name earlier nodes by id, or are inline JSON literals. Using an id twice shares the
//! node. Integers without a fraction are `int` literals, `1.0` is a `float` literal.

use std::{fmt::Display, fs, io};

use fnv::FnvHashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    compiler::{compile, CompileOptions},
    dialect::Stage,
    diagnostics::CompilationError,
    graph::{Graph, NodeId, Precision, StorageKind, Variable},
    types::Type,
};

#[derive(Debug)]
pub enum RecipeError {
    Io(io::Error),
    Json(serde_json::Error),
    UnknownNode(String),
    DuplicateNode(String),
    IntOutOfRange(String),
    InvalidOperand(String),
    /// Building the node with the given id failed.
    Node {
        id: String,
        error: CompilationError,
    },
    Compile(CompilationError),
}

impl RecipeError {
    /// Attribute a construction error to the recipe node being built.
    fn at(self, id: &str) -> Self {
        match self {
            RecipeError::Compile(error) => RecipeError::Node {
                id: id.to_string(),
                error,
            },
            other => other,
        }
    }
}

impl Display for RecipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeError::Io(e) => write!(f, "could not read recipe: {e}"),
            RecipeError::Json(e) => write!(f, "malformed recipe: {e}"),
            RecipeError::UnknownNode(id) => write!(f, "unknown node `{id}`"),
            RecipeError::DuplicateNode(id) => write!(f, "node `{id}` is defined twice"),
            RecipeError::IntOutOfRange(n) => {
                write!(f, "integer literal `{n}` does not fit in 32 bits")
            }
            RecipeError::InvalidOperand(v) => {
                write!(f, "`{v}` is neither a node id nor a literal")
            }
            RecipeError::Node { id, error } => write!(f, "node `{id}`: {error}"),
            RecipeError::Compile(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for RecipeError {}

impl From<io::Error> for RecipeError {
    fn from(e: io::Error) -> Self {
        RecipeError::Io(e)
    }
}

impl From<serde_json::Error> for RecipeError {
    fn from(e: serde_json::Error) -> Self {
        RecipeError::Json(e)
    }
}

impl From<CompilationError> for RecipeError {
    fn from(e: CompilationError) -> Self {
        RecipeError::Compile(e)
    }
}

/// How to build one node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeRecipe {
    Attribute {
        name: String,
        #[serde(rename = "type")]
        ty: Type,
    },
    Uniform {
        name: String,
        #[serde(rename = "type")]
        ty: Type,
    },
    Varying {
        name: String,
        #[serde(rename = "type")]
        ty: Type,
        #[serde(default)]
        precision: Option<Precision>,
    },
    Literal {
        value: Value,
    },
    Op {
        op: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    If {
        condition: Value,
        then: Value,
        #[serde(rename = "else")]
        otherwise: Value,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    pub id: String,
    #[serde(flatten)]
    pub node: NodeRecipe,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputEntry {
    pub name: String,
    pub value: Value,
}

/// A parsed recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub stage: Option<Stage>,
    pub nodes: Vec<NodeEntry>,
    pub outputs: Vec<OutputEntry>,
}

impl Recipe {
    pub fn parse(json: &str) -> Result<Self, RecipeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, RecipeError> {
        let json = fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// `base` with the stage the recipe asks for, if any.
    pub fn options(&self, base: CompileOptions) -> CompileOptions {
        match self.stage {
            Some(stage) => base.with_stage(stage),
            None => base,
        }
    }

    /// Build the graph and the named output roots.
    pub fn build(&self) -> Result<(Graph, Vec<(String, NodeId)>), RecipeError> {
        let mut builder = GraphBuilder {
            graph: Graph::new(),
            ids: FnvHashMap::default(),
        };

        for entry in &self.nodes {
            if builder.ids.contains_key(&entry.id) {
                return Err(RecipeError::DuplicateNode(entry.id.clone()));
            }
            let id = builder.node(&entry.node).map_err(|e| e.at(&entry.id))?;
            builder.ids.insert(entry.id.clone(), id);
        }

        let roots = self
            .outputs
            .iter()
            .map(|output| Ok((output.name.clone(), builder.operand(&output.value)?)))
            .collect::<Result<Vec<_>, RecipeError>>()?;

        Ok((builder.graph, roots))
    }

    /// Build and compile the recipe.
    pub fn cook(&self, options: &CompileOptions) -> Result<String, RecipeError> {
        let (graph, roots) = self.build()?;
        Ok(compile(&graph, &roots, options)?)
    }
}

struct GraphBuilder {
    graph: Graph,
    ids: FnvHashMap<String, NodeId>,
}

impl GraphBuilder {
    fn node(&mut self, node: &NodeRecipe) -> Result<NodeId, RecipeError> {
        let id = match node {
            NodeRecipe::Attribute { name, ty } => self
                .graph
                .variable(Variable::new(name, StorageKind::Attribute, *ty))?,
            NodeRecipe::Uniform { name, ty } => self
                .graph
                .variable(Variable::new(name, StorageKind::Uniform, *ty))?,
            NodeRecipe::Varying {
                name,
                ty,
                precision,
            } => self.graph.varying(name, *ty, *precision)?,
            NodeRecipe::Literal { value } => self.literal(value)?,
            NodeRecipe::Op { op, args } => {
                let operands = args
                    .iter()
                    .map(|arg| self.operand(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.graph.operator(op, &operands)?
            }
            NodeRecipe::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.operand(condition)?;
                let then = self.operand(then)?;
                let otherwise = self.operand(otherwise)?;
                self.graph.conditional(condition, then, otherwise)?
            }
        };
        Ok(id)
    }

    /// A node id reference or an inline literal. Inline literals are fresh nodes.
    fn operand(&mut self, value: &Value) -> Result<NodeId, RecipeError> {
        match value {
            Value::String(id) => self
                .ids
                .get(id)
                .copied()
                .ok_or_else(|| RecipeError::UnknownNode(id.clone())),
            _ => self.literal(value),
        }
    }

    fn literal(&mut self, value: &Value) -> Result<NodeId, RecipeError> {
        match value {
            Value::Bool(b) => Ok(self.graph.boolean(*b)),
            Value::Number(n) if n.is_f64() => match n.as_f64() {
                Some(v) => Ok(self.graph.float(v)?),
                None => Err(RecipeError::InvalidOperand(n.to_string())),
            },
            Value::Number(n) => {
                let v = n
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| RecipeError::IntOutOfRange(n.to_string()))?;
                Ok(self.graph.int(v))
            }
            other => Err(RecipeError::InvalidOperand(other.to_string())),
        }
    }
}
