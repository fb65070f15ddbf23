//! Target language tables. A [Dialect] tells the type checker which operators exist and which
//! operand types they accept, and tells the emitter how to spell them. The core never hard-codes
//! an operator: swapping the dialect changes language coverage without touching the algorithm.

mod glsl;

use std::{fmt::Display, sync::Arc};

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::{graph::StorageKind, types::Type};

pub use glsl::Glsl;

lazy_static! {
    static ref GLSL_ES_100: Arc<Glsl> = Arc::new(Glsl::es_100());
}

/// The shared, read-only GLSL ES 1.00 table.
pub fn glsl_es_100() -> Arc<dyn Dialect> {
    GLSL_ES_100.clone()
}

/// Pipeline stage a program is compiled for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Vertex,
    Fragment,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Vertex => write!(f, "vertex"),
            Stage::Fragment => write!(f, "fragment"),
        }
    }
}

/// How an operator is written in the target language.
#[derive(Clone, Debug, PartialEq)]
pub enum Syntax {
    /// Infix with two operands, prefix with one.
    Operator(String),
    /// Function call or type constructor.
    Call(String),
}

/// A parameter of a [Signature].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Param {
    Exact(Type),
    /// One of `float`, `vec2`, `vec3`, `vec4`. All `Gen` positions of a signature bind to the
    /// same type.
    Gen,
    /// Any non-opaque type. All `Any` positions of a signature bind to the same type.
    Any,
}

impl Param {
    /// Whether `t` can bind this parameter.
    pub fn admits(&self, t: Type) -> bool {
        match self {
            Param::Exact(e) => *e == t,
            Param::Gen => t.is_gen(),
            Param::Any => !t.is_opaque(),
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Exact(t) => write!(f, "{t}"),
            Param::Gen => write!(f, "genType"),
            Param::Any => write!(f, "T"),
        }
    }
}

/// One accepted combination of operand types and the type it produces.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub result: Param,
}

impl Signature {
    pub fn new(params: &[Param], result: Param) -> Self {
        Self {
            params: params.to_vec(),
            result,
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "({}) -> {}", params.join(", "), self.result)
    }
}

/// Table entry for one operator symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorDef {
    pub syntax: Syntax,
    pub signatures: Vec<Signature>,
}

/// A target shading language.
pub trait Dialect: Send + Sync {
    /// Human readable name, used in generated headers and logs.
    fn name(&self) -> &str;

    /// Look up an operator by symbol.
    fn operator(&self, symbol: &str) -> Option<&OperatorDef>;

    /// Every operator symbol, sorted.
    fn symbols(&self) -> Vec<&str>;

    /// Type of a builtin output variable available in `stage`, if `name` is one.
    fn builtin_output(&self, stage: Stage, name: &str) -> Option<Type>;

    /// Storage kind that non-builtin outputs of `stage` are declared with. `None` if the stage
    /// can only write builtins.
    fn output_storage(&self, stage: Stage) -> Option<StorageKind>;

    /// Keyword declaring a variable of the given storage kind.
    fn qualifier(&self, kind: StorageKind) -> &str;

    /// Whether `name` is taken by the language itself: keywords, type names, builtin
    /// functions and the entry point. Such names can not be declared.
    fn is_reserved(&self, name: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_admits_float_family_only() {
        assert!(Param::Gen.admits(Type::Float));
        assert!(Param::Gen.admits(Type::Vec4));
        assert!(!Param::Gen.admits(Type::Int));
        assert!(!Param::Gen.admits(Type::Mat2));
    }

    #[test]
    fn any_rejects_opaque() {
        assert!(Param::Any.admits(Type::BVec2));
        assert!(!Param::Any.admits(Type::Sampler2D));
    }

    #[test]
    fn signature_display() {
        let sig = Signature::new(&[Param::Gen, Param::Exact(Type::Float)], Param::Gen);
        assert_eq!(sig.to_string(), "(genType, float) -> genType");
    }

    #[test]
    fn default_table_is_shared() {
        let a = glsl_es_100();
        let b = glsl_es_100();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
