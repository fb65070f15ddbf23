//! The closed set of value types an expression node can have.

use std::fmt::Display;

use serde::Deserialize;

/// Type of a node in the expression graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    BVec2,
    BVec3,
    BVec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
    #[serde(rename = "sampler2D")]
    Sampler2D,
    #[serde(rename = "samplerCube")]
    SamplerCube,
}

impl Type {
    /// All types, in declaration order.
    pub const ALL: [Type; 17] = [
        Type::Bool,
        Type::Int,
        Type::Float,
        Type::Vec2,
        Type::Vec3,
        Type::Vec4,
        Type::BVec2,
        Type::BVec3,
        Type::BVec4,
        Type::IVec2,
        Type::IVec3,
        Type::IVec4,
        Type::Mat2,
        Type::Mat3,
        Type::Mat4,
        Type::Sampler2D,
        Type::SamplerCube,
    ];

    /// Number of components. Matrices count their columns, samplers count as one.
    pub fn components(&self) -> u8 {
        match self {
            Type::Bool | Type::Int | Type::Float => 1,
            Type::Vec2 | Type::BVec2 | Type::IVec2 | Type::Mat2 => 2,
            Type::Vec3 | Type::BVec3 | Type::IVec3 | Type::Mat3 => 3,
            Type::Vec4 | Type::BVec4 | Type::IVec4 | Type::Mat4 => 4,
            Type::Sampler2D | Type::SamplerCube => 1,
        }
    }

    /// The scalar type of a scalar or vector. `None` for matrices and samplers.
    pub fn scalar(&self) -> Option<Type> {
        match self {
            Type::Bool | Type::BVec2 | Type::BVec3 | Type::BVec4 => Some(Type::Bool),
            Type::Int | Type::IVec2 | Type::IVec3 | Type::IVec4 => Some(Type::Int),
            Type::Float | Type::Vec2 | Type::Vec3 | Type::Vec4 => Some(Type::Float),
            _ => None,
        }
    }

    /// Build the scalar (`width == 1`) or vector type with the given scalar base.
    pub fn vector(scalar: Type, width: u8) -> Option<Type> {
        let t = match (scalar, width) {
            (Type::Bool, 1) => Type::Bool,
            (Type::Bool, 2) => Type::BVec2,
            (Type::Bool, 3) => Type::BVec3,
            (Type::Bool, 4) => Type::BVec4,
            (Type::Int, 1) => Type::Int,
            (Type::Int, 2) => Type::IVec2,
            (Type::Int, 3) => Type::IVec3,
            (Type::Int, 4) => Type::IVec4,
            (Type::Float, 1) => Type::Float,
            (Type::Float, 2) => Type::Vec2,
            (Type::Float, 3) => Type::Vec3,
            (Type::Float, 4) => Type::Vec4,
            _ => return None,
        };
        Some(t)
    }

    pub fn is_vector(&self) -> bool {
        self.scalar().is_some() && self.components() > 1
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Type::Mat2 | Type::Mat3 | Type::Mat4)
    }

    /// Member of the float family `float`, `vec2`, `vec3` and `vec4`.
    pub fn is_gen(&self) -> bool {
        self.scalar() == Some(Type::Float)
    }

    /// Opaque types can only be read from variables, never computed or stored in temporaries.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Type::Sampler2D | Type::SamplerCube)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::Vec2 => "vec2",
            Type::Vec3 => "vec3",
            Type::Vec4 => "vec4",
            Type::BVec2 => "bvec2",
            Type::BVec3 => "bvec3",
            Type::BVec4 => "bvec4",
            Type::IVec2 => "ivec2",
            Type::IVec3 => "ivec3",
            Type::IVec4 => "ivec4",
            Type::Mat2 => "mat2",
            Type::Mat3 => "mat3",
            Type::Mat4 => "mat4",
            Type::Sampler2D => "sampler2D",
            Type::SamplerCube => "samplerCube",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vector_round_trips_through_scalar_and_width() {
        for t in Type::ALL {
            if let Some(scalar) = t.scalar() {
                assert_eq!(Type::vector(scalar, t.components()), Some(t));
            }
        }
    }

    #[test]
    fn gen_family() {
        let gen: Vec<Type> = Type::ALL.into_iter().filter(|t| t.is_gen()).collect();
        assert_eq!(gen, vec![Type::Float, Type::Vec2, Type::Vec3, Type::Vec4]);
        assert!(!Type::Mat3.is_gen());
        assert!(!Type::IVec2.is_gen());
    }

    #[test]
    fn display_uses_glsl_spelling() {
        assert_eq!(Type::BVec3.to_string(), "bvec3");
        assert_eq!(Type::Sampler2D.to_string(), "sampler2D");
        assert_eq!(Type::SamplerCube.to_string(), "samplerCube");
    }

    #[test]
    fn deserializes_from_glsl_spelling() {
        for t in Type::ALL {
            let json = format!("\"{t}\"");
            let parsed: Type = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn matrices_and_samplers_have_no_scalar() {
        assert_eq!(Type::Mat4.scalar(), None);
        assert_eq!(Type::Sampler2D.scalar(), None);
        assert!(Type::SamplerCube.is_opaque());
        assert!(!Type::Vec4.is_opaque());
        assert!(Type::Vec2.is_vector());
        assert!(!Type::Float.is_vector());
    }
}
