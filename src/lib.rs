//! Glaze compiles typed shader expression graphs into linear GLSL.
//!
//! Build a [graph::Graph] with its typed constructors, then hand the output roots to
//! [compiler::compile]:
//!
//! ```
//! use glaze::{compiler::{compile, CompileOptions}, graph::Graph, types::Type};
//!
//! let mut g = Graph::new();
//! let v = g.attribute("v", Type::Vec4).unwrap();
//! let x = g.length(v).unwrap();
//! let xyz = g.vec3(&[x, x, x]).unwrap();
//! let source = compile(&g, &[("v_len", xyz)], &CompileOptions::default()).unwrap();
//! assert!(source.contains("float tmp0 = length(v);"));
//! ```

pub mod checker;
pub mod cli;
pub mod compiler;
pub mod diagnostics;
pub mod dialect;
pub mod graph;
pub mod recipe;
pub mod types;

#[cfg(test)]
mod tests;
