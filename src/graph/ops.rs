//! Shorthands for common operators. Each one is [Graph::operator] with a fixed symbol.

use super::{Graph, NodeId};
use crate::diagnostics::CompilationResult;

macro_rules! unary {
    ($($(#[$doc:meta])* $name:ident => $symbol:literal),* $(,)?) => {
        impl Graph {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, a: NodeId) -> CompilationResult<NodeId> {
                    self.operator($symbol, &[a])
                }
            )*
        }
    };
}

macro_rules! binary {
    ($($(#[$doc:meta])* $name:ident => $symbol:literal),* $(,)?) => {
        impl Graph {
            $(
                $(#[$doc])*
                pub fn $name(&mut self, a: NodeId, b: NodeId) -> CompilationResult<NodeId> {
                    self.operator($symbol, &[a, b])
                }
            )*
        }
    };
}

unary! {
    /// Unary minus.
    neg => "-",
    not => "!",
    sin => "sin",
    cos => "cos",
    sqrt => "sqrt",
    abs => "abs",
    fract => "fract",
    normalize => "normalize",
    length => "length",
}

binary! {
    add => "+",
    sub => "-",
    mul => "*",
    div => "/",
    lt => "<",
    gt => ">",
    eq => "==",
    and => "&&",
    or => "||",
    min => "min",
    max => "max",
    pow => "pow",
    dot => "dot",
    cross => "cross",
    /// Sample a 2D texture.
    texture2d => "texture2D",
}

impl Graph {
    pub fn clamp(&mut self, x: NodeId, lo: NodeId, hi: NodeId) -> CompilationResult<NodeId> {
        self.operator("clamp", &[x, lo, hi])
    }

    pub fn mix(&mut self, a: NodeId, b: NodeId, t: NodeId) -> CompilationResult<NodeId> {
        self.operator("mix", &[a, b, t])
    }

    pub fn vec2(&mut self, parts: &[NodeId]) -> CompilationResult<NodeId> {
        self.operator("vec2", parts)
    }

    pub fn vec3(&mut self, parts: &[NodeId]) -> CompilationResult<NodeId> {
        self.operator("vec3", parts)
    }

    pub fn vec4(&mut self, parts: &[NodeId]) -> CompilationResult<NodeId> {
        self.operator("vec4", parts)
    }
}

#[cfg(test)]
mod tests {
    use crate::{graph::Graph, types::Type};

    #[test]
    fn shorthands_infer_types() {
        let mut g = Graph::new();
        let v = g.attribute("v", Type::Vec4).unwrap();
        let len = g.length(v).unwrap();
        assert_eq!(g.type_of(len).unwrap(), Type::Float);
        let xyz = g.vec3(&[len, len, len]).unwrap();
        assert_eq!(g.type_of(xyz).unwrap(), Type::Vec3);
        let n = g.normalize(xyz).unwrap();
        let c = g.cross(n, xyz).unwrap();
        assert_eq!(g.type_of(c).unwrap(), Type::Vec3);
        let b = g.lt(len, len).unwrap();
        assert_eq!(g.type_of(b).unwrap(), Type::Bool);
    }

    #[test]
    fn texture_lookup() {
        let mut g = Graph::new();
        let tex = g.uniform("u_tex", Type::Sampler2D).unwrap();
        let uv = g.varying("v_uv", Type::Vec2, None).unwrap();
        let color = g.texture2d(tex, uv).unwrap();
        assert_eq!(g.type_of(color).unwrap(), Type::Vec4);
        assert!(g.texture2d(uv, tex).is_err());
    }
}
