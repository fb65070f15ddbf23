mod recipes;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::{
    compiler::{compile, compile_program, emit, CompileOptions},
    dialect::{Glsl, Param, Signature, Syntax},
    diagnostics::CompilationError,
    graph::Graph,
    types::Type,
};

/// A table with nothing but float addition and `sin`.
fn tiny_dialect() -> Glsl {
    let mut table = Glsl::new("tiny");
    table.define(
        "+",
        Syntax::Operator("+".to_string()),
        vec![Signature::new(&[Param::Gen, Param::Gen], Param::Gen)],
    );
    table.define(
        "sin",
        Syntax::Call("sin".to_string()),
        vec![Signature::new(&[Param::Gen], Param::Gen)],
    );
    table
}

#[test]
fn dialect_limits_construction() {
    let mut g = Graph::with_dialect(Arc::new(tiny_dialect()));
    let a = g.attribute("a", Type::Vec2).unwrap();
    let s = g.sin(a).unwrap();
    let sum = g.add(s, s).unwrap();
    let err = g.cos(a).unwrap_err();
    assert_eq!(
        err,
        CompilationError::UnsupportedConstruct {
            node: None,
            construct: "unknown operator `cos`".to_string()
        }
    );

    let source = compile(&g, &[("v_out", sum)], &CompileOptions::default()).unwrap();
    assert_eq!(
        source,
        "attribute vec2 a;
varying vec2 v_out;

void main(void) {
    vec2 tmp0 = sin(a);
    v_out = tmp0 + tmp0;
}
"
    );
}

#[test]
fn emitter_rejects_operators_missing_from_its_table() {
    let mut g = Graph::new();
    let a = g.attribute("a", Type::Float).unwrap();
    let c = g.cos(a).unwrap();
    let program = compile_program(&g, &[("v_out", c)], &CompileOptions::default()).unwrap();

    let err = emit(&program, &tiny_dialect()).unwrap_err();
    assert_eq!(err.kind(), "unsupported construct");
}

#[test]
fn independent_graphs_compile_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut g = Graph::new();
                let a = g.attribute("a", Type::Float).unwrap();
                let k = g.float(i as f64).unwrap();
                let sum = g.add(a, k).unwrap();
                compile(&g, &[("v_out", sum)], &CompileOptions::default()).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let source = handle.join().unwrap();
        assert!(source.contains(&format!("v_out = a + {i}.0;")));
    }
}

#[test]
fn ids_from_another_graph_are_rejected_at_compile_time() {
    let mut g1 = Graph::new();
    let a = g1.attribute("a", Type::Float).unwrap();
    let g2 = Graph::new();
    let err = compile(&g2, &[("v_out", a)], &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompilationError::UnsupportedConstruct { node: Some(id), .. } if id == a));
}

#[test]
fn vertex_program_with_every_output_kind() {
    let mut g = Graph::new();
    let pos = g.attribute("a_pos", Type::Vec3).unwrap();
    let uv = g.attribute("a_uv", Type::Vec2).unwrap();
    let mvp = g.uniform("u_mvp", Type::Mat4).unwrap();
    let size = g.uniform("u_size", Type::Float).unwrap();
    let one = g.int(1);
    let pos4 = g.vec4(&[pos, one]).unwrap();
    let clip = g.mul(mvp, pos4).unwrap();
    let w = g.swizzle(clip, "w").unwrap();
    let point = g.div(size, w).unwrap();

    let source = compile(
        &g,
        &[("gl_Position", clip), ("gl_PointSize", point), ("v_uv", uv)],
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(
        source,
        "attribute vec3 a_pos;
attribute vec2 a_uv;
uniform mat4 u_mvp;
uniform float u_size;
varying vec2 v_uv;

void main(void) {
    vec4 tmp0 = u_mvp * vec4(a_pos, 1.0);
    gl_Position = tmp0;
    gl_PointSize = u_size / tmp0.w;
    v_uv = a_uv;
}
"
    );
}
