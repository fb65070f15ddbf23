//! The GLSL ES 1.00 operator and builtin table.

use fnv::FnvHashMap;

use super::{Dialect, OperatorDef, Param, Signature, Stage, Syntax};
use crate::{graph::StorageKind, types::Type};

use Param::{Any, Gen};

const BOOL: Param = Param::Exact(Type::Bool);
const INT: Param = Param::Exact(Type::Int);
const FLOAT: Param = Param::Exact(Type::Float);
const VEC2: Param = Param::Exact(Type::Vec2);
const VEC3: Param = Param::Exact(Type::Vec3);
const VEC4: Param = Param::Exact(Type::Vec4);

const VECTORS: [(Type, Type); 3] = [
    (Type::Vec2, Type::Mat2),
    (Type::Vec3, Type::Mat3),
    (Type::Vec4, Type::Mat4),
];

/// Keywords and names reserved for future use by GLSL ES 1.00.
const KEYWORDS: &[&str] = &[
    "attribute", "const", "uniform", "varying", "break", "continue", "do", "for", "while",
    "if", "else", "in", "out", "inout", "float", "int", "void", "bool", "true", "false",
    "lowp", "mediump", "highp", "precision", "invariant", "discard", "return", "mat2",
    "mat3", "mat4", "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4", "bvec2", "bvec3",
    "bvec4", "sampler2D", "samplerCube", "struct", "asm", "class", "union", "enum",
    "typedef", "template", "this", "packed", "goto", "switch", "default", "inline",
    "noinline", "volatile", "public", "static", "extern", "external", "interface", "flat",
    "long", "short", "double", "half", "fixed", "unsigned", "superp", "input", "output",
    "hvec2", "hvec3", "hvec4", "dvec2", "dvec3", "dvec4", "fvec2", "fvec3", "fvec4",
    "sampler1D", "sampler3D", "sampler1DShadow", "sampler2DShadow", "sampler2DRect",
    "sampler3DRect", "sampler2DRectShadow", "sizeof", "cast", "namespace", "using",
];

/// GLSL operator table.
#[derive(Debug, Clone, Default)]
pub struct Glsl {
    name: String,
    operators: FnvHashMap<String, OperatorDef>,
}

fn sig(params: &[Param], result: Param) -> Signature {
    Signature::new(params, result)
}

impl Glsl {
    /// An empty table. Use [Glsl::define] to fill it.
    pub fn new<S>(name: S) -> Self
    where
        S: ToString,
    {
        Self {
            name: name.to_string(),
            operators: FnvHashMap::default(),
        }
    }

    /// Add signatures to an operator, creating the operator if needed.
    pub fn define(&mut self, symbol: &str, syntax: Syntax, signatures: Vec<Signature>) {
        self.operators
            .entry(symbol.to_string())
            .or_insert_with(|| OperatorDef {
                syntax,
                signatures: vec![],
            })
            .signatures
            .extend(signatures);
    }

    fn infix(&mut self, symbol: &str, signatures: Vec<Signature>) {
        self.define(symbol, Syntax::Operator(symbol.to_string()), signatures);
    }

    fn call(&mut self, name: &str, signatures: Vec<Signature>) {
        self.define(name, Syntax::Call(name.to_string()), signatures);
    }

    /// The OpenGL ES Shading Language 1.00 table.
    pub fn es_100() -> Self {
        let mut table = Self::new("GLSL ES 1.00");
        table.arithmetic();
        table.relational();
        table.constructors();
        table.builtin_functions();
        table
    }

    fn arithmetic(&mut self) {
        for op in ["+", "-", "*", "/"] {
            let mut sigs = vec![
                sig(&[Gen, Gen], Gen),
                sig(&[Gen, FLOAT], Gen),
                sig(&[FLOAT, Gen], Gen),
                sig(&[INT, INT], INT),
            ];
            for (_, mat) in VECTORS {
                let m = Param::Exact(mat);
                sigs.push(sig(&[m, m], m));
                sigs.push(sig(&[m, FLOAT], m));
                sigs.push(sig(&[FLOAT, m], m));
            }
            if op == "*" {
                for (vec, mat) in VECTORS {
                    let (v, m) = (Param::Exact(vec), Param::Exact(mat));
                    sigs.push(sig(&[m, v], v));
                    sigs.push(sig(&[v, m], v));
                }
            }
            self.infix(op, sigs);
        }

        // Unary negation shares the `-` symbol.
        let mut neg = vec![sig(&[Gen], Gen), sig(&[INT], INT)];
        for (_, mat) in VECTORS {
            neg.push(sig(&[Param::Exact(mat)], Param::Exact(mat)));
        }
        self.infix("-", neg);
    }

    fn relational(&mut self) {
        for op in ["<", ">", "<=", ">="] {
            self.infix(op, vec![sig(&[FLOAT, FLOAT], BOOL), sig(&[INT, INT], BOOL)]);
        }
        for op in ["==", "!="] {
            self.infix(op, vec![sig(&[Any, Any], BOOL)]);
        }
        for op in ["&&", "||", "^^"] {
            self.infix(op, vec![sig(&[BOOL, BOOL], BOOL)]);
        }
        self.infix("!", vec![sig(&[BOOL], BOOL)]);
    }

    fn constructors(&mut self) {
        self.call("float", vec![sig(&[INT], FLOAT), sig(&[BOOL], FLOAT)]);
        self.call("int", vec![sig(&[FLOAT], INT), sig(&[BOOL], INT)]);
        self.call("bool", vec![sig(&[FLOAT], BOOL), sig(&[INT], BOOL)]);
        self.call(
            "vec2",
            vec![
                sig(&[FLOAT], VEC2),
                sig(&[FLOAT, FLOAT], VEC2),
                sig(&[VEC3], VEC2),
                sig(&[VEC4], VEC2),
            ],
        );
        self.call(
            "vec3",
            vec![
                sig(&[FLOAT], VEC3),
                sig(&[FLOAT, FLOAT, FLOAT], VEC3),
                sig(&[VEC2, FLOAT], VEC3),
                sig(&[FLOAT, VEC2], VEC3),
                sig(&[VEC4], VEC3),
            ],
        );
        self.call(
            "vec4",
            vec![
                sig(&[FLOAT], VEC4),
                sig(&[FLOAT, FLOAT, FLOAT, FLOAT], VEC4),
                sig(&[VEC3, FLOAT], VEC4),
                sig(&[FLOAT, VEC3], VEC4),
                sig(&[VEC2, VEC2], VEC4),
                sig(&[VEC2, FLOAT, FLOAT], VEC4),
                sig(&[FLOAT, FLOAT, VEC2], VEC4),
            ],
        );
        for (vec, mat) in VECTORS {
            let (v, m) = (Param::Exact(vec), Param::Exact(mat));
            let columns = vec![v; vec.components() as usize];
            self.call(
                &mat.to_string(),
                vec![sig(&[FLOAT], m), Signature::new(&columns, m)],
            );
        }
    }

    fn builtin_functions(&mut self) {
        for f in [
            "radians",
            "degrees",
            "sin",
            "cos",
            "tan",
            "asin",
            "acos",
            "exp",
            "log",
            "exp2",
            "log2",
            "sqrt",
            "inversesqrt",
            "abs",
            "sign",
            "floor",
            "ceil",
            "fract",
            "normalize",
        ] {
            self.call(f, vec![sig(&[Gen], Gen)]);
        }
        self.call("atan", vec![sig(&[Gen], Gen), sig(&[Gen, Gen], Gen)]);
        self.call("pow", vec![sig(&[Gen, Gen], Gen)]);
        for f in ["mod", "min", "max"] {
            self.call(f, vec![sig(&[Gen, Gen], Gen), sig(&[Gen, FLOAT], Gen)]);
        }
        self.call(
            "clamp",
            vec![sig(&[Gen, Gen, Gen], Gen), sig(&[Gen, FLOAT, FLOAT], Gen)],
        );
        self.call(
            "mix",
            vec![sig(&[Gen, Gen, Gen], Gen), sig(&[Gen, Gen, FLOAT], Gen)],
        );
        self.call("step", vec![sig(&[Gen, Gen], Gen), sig(&[FLOAT, Gen], Gen)]);
        self.call(
            "smoothstep",
            vec![
                sig(&[Gen, Gen, Gen], Gen),
                sig(&[FLOAT, FLOAT, Gen], Gen),
            ],
        );
        self.call("length", vec![sig(&[Gen], FLOAT)]);
        self.call("distance", vec![sig(&[Gen, Gen], FLOAT)]);
        self.call("dot", vec![sig(&[Gen, Gen], FLOAT)]);
        self.call("cross", vec![sig(&[VEC3, VEC3], VEC3)]);
        self.call("faceforward", vec![sig(&[Gen, Gen, Gen], Gen)]);
        self.call("reflect", vec![sig(&[Gen, Gen], Gen)]);
        self.call("refract", vec![sig(&[Gen, Gen, FLOAT], Gen)]);
        self.call(
            "matrixCompMult",
            VECTORS
                .iter()
                .map(|(_, mat)| {
                    let m = Param::Exact(*mat);
                    sig(&[m, m], m)
                })
                .collect(),
        );
        self.call(
            "texture2D",
            vec![sig(&[Param::Exact(Type::Sampler2D), VEC2], VEC4)],
        );
        self.call(
            "textureCube",
            vec![sig(&[Param::Exact(Type::SamplerCube), VEC3], VEC4)],
        );
    }
}

impl Dialect for Glsl {
    fn name(&self) -> &str {
        &self.name
    }

    fn operator(&self, symbol: &str) -> Option<&OperatorDef> {
        self.operators.get(symbol)
    }

    fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.operators.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    fn builtin_output(&self, stage: Stage, name: &str) -> Option<Type> {
        match (stage, name) {
            (Stage::Vertex, "gl_Position") => Some(Type::Vec4),
            (Stage::Vertex, "gl_PointSize") => Some(Type::Float),
            (Stage::Fragment, "gl_FragColor") => Some(Type::Vec4),
            _ => None,
        }
    }

    fn output_storage(&self, stage: Stage) -> Option<StorageKind> {
        match stage {
            Stage::Vertex => Some(StorageKind::Varying),
            Stage::Fragment => None,
        }
    }

    fn qualifier(&self, kind: StorageKind) -> &str {
        match kind {
            StorageKind::Attribute => "attribute",
            StorageKind::Uniform => "uniform",
            StorageKind::Varying => "varying",
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == "main" || KEYWORDS.contains(&name) || self.operators.contains_key(name)
    }
}
