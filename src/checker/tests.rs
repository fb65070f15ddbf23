use super::*;
use crate::dialect::glsl_es_100;
use pretty_assertions::assert_eq;

fn arg(ty: Type) -> ArgType {
    ArgType::new(ty)
}

fn check_glsl(operator: &str, args: &[ArgType]) -> Result<Resolution, Mismatch> {
    check(glsl_es_100().as_ref(), operator, args)
}

#[test]
fn gen_binds_consistently() {
    let r = check_glsl("+", &[arg(Type::Vec3), arg(Type::Vec3)]).unwrap();
    assert_eq!(r.result, Type::Vec3);
    assert!(r.coerced.is_empty());

    let err = check_glsl("+", &[arg(Type::Vec3), arg(Type::Vec2)]).unwrap_err();
    assert_eq!(err, Mismatch::NoSignature);
}

#[test]
fn scalar_broadcast() {
    let r = check_glsl("*", &[arg(Type::Float), arg(Type::Vec4)]).unwrap();
    assert_eq!(r.result, Type::Vec4);
    let r = check_glsl("*", &[arg(Type::Vec2), arg(Type::Float)]).unwrap();
    assert_eq!(r.result, Type::Vec2);
}

#[test]
fn matrix_times_vector() {
    let r = check_glsl("*", &[arg(Type::Mat4), arg(Type::Vec4)]).unwrap();
    assert_eq!(r.result, Type::Vec4);
    assert!(check_glsl("+", &[arg(Type::Mat4), arg(Type::Vec4)]).is_err());
}

#[test]
fn int_arithmetic_stays_int() {
    let r = check_glsl("+", &[ArgType::int_literal(), ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Int);
    assert!(r.coerced.is_empty());
}

#[test]
fn int_literal_promotes_next_to_float() {
    let r = check_glsl("+", &[arg(Type::Float), ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Float);
    assert_eq!(r.coerced, vec![1]);
}

#[test]
fn int_literal_promotes_into_scalar_position() {
    let r = check_glsl("*", &[arg(Type::Vec3), ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Vec3);
    assert_eq!(r.coerced, vec![1]);
}

#[test]
fn only_literals_are_promoted() {
    let int_variable = arg(Type::Int);
    let err = check_glsl("+", &[arg(Type::Float), int_variable]).unwrap_err();
    assert_eq!(err, Mismatch::NoSignature);
}

#[test]
fn all_literal_gen_call_becomes_float() {
    let r = check_glsl("sin", &[ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Float);
    assert_eq!(r.coerced, vec![0]);
}

#[test]
fn constructor_promotes_literals() {
    let r = check_glsl(
        "vec4",
        &[
            arg(Type::Vec3),
            ArgType::int_literal(),
        ],
    )
    .unwrap();
    assert_eq!(r.result, Type::Vec4);
    assert_eq!(r.coerced, vec![1]);
}

#[test]
fn equality_accepts_any_matching_types() {
    let r = check_glsl("==", &[arg(Type::BVec2), arg(Type::BVec2)]).unwrap();
    assert_eq!(r.result, Type::Bool);
    assert!(check_glsl("==", &[arg(Type::Int), arg(Type::Float)]).is_err());
    assert!(check_glsl("==", &[arg(Type::Sampler2D), arg(Type::Sampler2D)]).is_err());
}

#[test]
fn equality_promotes_int_literal() {
    let r = check_glsl("==", &[arg(Type::Float), ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Bool);
    assert_eq!(r.coerced, vec![1]);
}

#[test]
fn arity_is_reported() {
    let err = check_glsl("sin", &[arg(Type::Float), arg(Type::Float)]).unwrap_err();
    assert_eq!(
        err,
        Mismatch::Arity {
            expected: vec![1],
            found: 2
        }
    );
    assert_eq!(err.to_string(), "expected 1 operand(s), found 2");

    let err = check_glsl("-", &[]).unwrap_err();
    assert_eq!(err.to_string(), "expected 1 or 2 operand(s), found 0");
}

#[test]
fn unknown_operator() {
    let err = check_glsl("texture", &[arg(Type::Vec2)]).unwrap_err();
    assert_eq!(err, Mismatch::UnknownOperator);
    let err = err.into_error("texture", &[], &[arg(Type::Vec2)]);
    assert_eq!(err.kind(), "unsupported construct");
}

#[test]
fn swizzles() {
    let r = check_glsl(".xyz", &[arg(Type::Vec4)]).unwrap();
    assert_eq!(r.result, Type::Vec3);
    let r = check_glsl(".x", &[arg(Type::IVec2)]).unwrap();
    assert_eq!(r.result, Type::Int);
    let r = check_glsl(".rrgg", &[arg(Type::BVec3)]).unwrap();
    assert_eq!(r.result, Type::BVec4);
}

#[test]
fn bad_swizzles() {
    let cases = [
        (".z", Type::Vec2),
        (".xr", Type::Vec4),
        (".xyzwx", Type::Vec4),
        (".x", Type::Float),
        (".x", Type::Mat2),
        (".q", Type::Vec3),
        (".k", Type::Vec3),
    ];
    for (symbol, ty) in cases {
        let err = check_glsl(symbol, &[arg(ty)]).unwrap_err();
        assert!(
            matches!(err, Mismatch::BadSwizzle(_)),
            "{symbol} on {ty} gave {err:?}"
        );
    }
}

#[test]
fn conditional_branches() {
    let cond = arg(Type::Bool);
    let r = check_conditional(&[cond, arg(Type::Vec3), arg(Type::Vec3)]).unwrap();
    assert_eq!(r.result, Type::Vec3);

    let r = check_conditional(&[cond, arg(Type::Float), ArgType::int_literal()]).unwrap();
    assert_eq!(r.result, Type::Float);
    assert_eq!(r.coerced, vec![2]);

    let err = check_conditional(&[cond, arg(Type::Vec3), arg(Type::Vec2)]).unwrap_err();
    assert_eq!(err, Mismatch::BranchMismatch(Type::Vec3, Type::Vec2));
}

#[test]
fn conditional_rejections() {
    let err = check_conditional(&[arg(Type::Float), arg(Type::Float), arg(Type::Float)]);
    assert_eq!(err.unwrap_err(), Mismatch::NonBooleanCondition(Type::Float));

    let err = check_conditional(&[arg(Type::Bool), arg(Type::Sampler2D), arg(Type::Sampler2D)]);
    assert_eq!(err.unwrap_err(), Mismatch::OpaqueBranch(Type::Sampler2D));
}
