//! Glaze type checker. Resolves operator applications against the signature table of a
//! [Dialect] and decides which operands need an integer literal to float promotion.

#[cfg(test)]
mod tests;

use std::fmt::Display;

use crate::{
    dialect::{Dialect, Param, Signature},
    diagnostics::CompilationError,
    graph::NodeId,
    types::Type,
};

/// Component name sets usable in a swizzle. A swizzle may not mix sets.
const SWIZZLE_SETS: [&str; 3] = ["xyzw", "rgba", "stpq"];

/// What the checker knows about an operand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArgType {
    pub ty: Type,
    /// The operand is an integer literal and may be promoted to `float`.
    pub coercible: bool,
}

impl ArgType {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            coercible: false,
        }
    }

    pub fn int_literal() -> Self {
        Self {
            ty: Type::Int,
            coercible: true,
        }
    }
}

/// A successful check.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub result: Type,
    /// Operand positions to promote from `int` to `float`.
    pub coerced: Vec<usize>,
}

impl Resolution {
    fn exact(result: Type) -> Self {
        Self {
            result,
            coerced: vec![],
        }
    }
}

/// Why a check failed.
#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    UnknownOperator,
    Arity { expected: Vec<usize>, found: usize },
    NoSignature,
    BadSwizzle(String),
    NonBooleanCondition(Type),
    BranchMismatch(Type, Type),
    OpaqueBranch(Type),
}

impl Mismatch {
    /// Attach the operator application the mismatch was found in.
    pub fn into_error(self, operator: &str, operands: &[NodeId], args: &[ArgType]) -> CompilationError {
        let message = match self {
            Mismatch::UnknownOperator => {
                return CompilationError::new_unsupported(
                    None,
                    format!("unknown operator `{operator}`"),
                )
            }
            Mismatch::NoSignature => format!("no signature of `{operator}` accepts these operands"),
            other => other.to_string(),
        };
        CompilationError::Type {
            operator: operator.to_string(),
            operands: operands.to_vec(),
            operand_types: args.iter().map(|a| a.ty).collect(),
            message,
        }
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::UnknownOperator => write!(f, "unknown operator"),
            Mismatch::Arity { expected, found } => {
                let expected: Vec<String> = expected.iter().map(|n| n.to_string()).collect();
                write!(
                    f,
                    "expected {} operand(s), found {found}",
                    expected.join(" or ")
                )
            }
            Mismatch::NoSignature => write!(f, "no matching signature"),
            Mismatch::BadSwizzle(reason) => write!(f, "{reason}"),
            Mismatch::NonBooleanCondition(t) => {
                write!(f, "condition must be `bool`, found `{t}`")
            }
            Mismatch::BranchMismatch(a, b) => {
                write!(f, "branches have incompatible types `{a}` and `{b}`")
            }
            Mismatch::OpaqueBranch(t) => write!(f, "branches can not have opaque type `{t}`"),
        }
    }
}

/// Check an operator application and compute its result type.
///
/// Signatures are tried in table order, first without promotions and then allowing integer
/// literals in `float` positions. The first match wins. Symbols starting with `.` are swizzles.
pub fn check(dialect: &dyn Dialect, operator: &str, args: &[ArgType]) -> Result<Resolution, Mismatch> {
    if let Some(components) = operator.strip_prefix('.') {
        return check_swizzle(components, args);
    }

    let def = dialect.operator(operator).ok_or(Mismatch::UnknownOperator)?;

    let mut arities: Vec<usize> = def.signatures.iter().map(|s| s.params.len()).collect();
    arities.sort_unstable();
    arities.dedup();
    if !arities.contains(&args.len()) {
        return Err(Mismatch::Arity {
            expected: arities,
            found: args.len(),
        });
    }

    for promote in [false, true] {
        for signature in &def.signatures {
            if let Some(resolution) = resolve(signature, args, promote) {
                return Ok(resolution);
            }
        }
    }
    Err(Mismatch::NoSignature)
}

/// Pick the type `Gen`/`Any` parameters stand for. Operands that are not promotable literals
/// take precedence.
fn bind(signature: &Signature, args: &[ArgType], promote: bool) -> Option<Type> {
    let generic: Vec<(&Param, &ArgType)> = signature
        .params
        .iter()
        .zip(args)
        .filter(|(p, _)| matches!(p, Param::Gen | Param::Any))
        .collect();

    if let Some((_, a)) = generic.iter().find(|(p, a)| !a.coercible && p.admits(a.ty)) {
        return Some(a.ty);
    }
    if let Some((_, a)) = generic.iter().find(|(p, a)| p.admits(a.ty)) {
        return Some(a.ty);
    }

    // Only integer literals in `Gen` positions: they all become floats.
    let has_gen = generic.iter().any(|(p, _)| **p == Param::Gen);
    (promote && has_gen).then_some(Type::Float)
}

fn resolve(signature: &Signature, args: &[ArgType], promote: bool) -> Option<Resolution> {
    if signature.params.len() != args.len() {
        return None;
    }

    let binding = bind(signature, args, promote);
    let mut coerced = vec![];

    for (i, (param, arg)) in signature.params.iter().zip(args).enumerate() {
        let expected = match param {
            Param::Exact(t) => *t,
            Param::Gen | Param::Any => binding?,
        };
        if arg.ty == expected {
            continue;
        }
        if promote && arg.coercible && expected == Type::Float {
            coerced.push(i);
            continue;
        }
        return None;
    }

    let result = match signature.result {
        Param::Exact(t) => t,
        Param::Gen | Param::Any => binding?,
    };
    Some(Resolution { result, coerced })
}

fn check_swizzle(components: &str, args: &[ArgType]) -> Result<Resolution, Mismatch> {
    let [arg] = args else {
        return Err(Mismatch::BadSwizzle(format!(
            "a swizzle takes one operand, found {}",
            args.len()
        )));
    };

    let scalar = match arg.ty.scalar() {
        Some(scalar) if arg.ty.is_vector() => scalar,
        _ => return Err(Mismatch::BadSwizzle(format!("can not swizzle `{}`", arg.ty))),
    };

    let count = components.chars().count();
    if !(1..=4).contains(&count) {
        return Err(Mismatch::BadSwizzle(format!(
            "a swizzle selects one to four components, `{components}` selects {count}"
        )));
    }

    let first = components.chars().next().unwrap_or_default();
    let set = SWIZZLE_SETS
        .iter()
        .find(|set| set.contains(first))
        .ok_or_else(|| Mismatch::BadSwizzle(format!("`{first}` is not a vector component")))?;

    for c in components.chars() {
        let index = set.find(c).ok_or_else(|| {
            Mismatch::BadSwizzle(format!(
                "`{components}` mixes component sets or names an unknown component"
            ))
        })?;
        if index >= arg.ty.components() as usize {
            return Err(Mismatch::BadSwizzle(format!(
                "component `{c}` is out of range for `{}`",
                arg.ty
            )));
        }
    }

    let result = Type::vector(scalar, count as u8)
        .ok_or_else(|| Mismatch::BadSwizzle(format!("can not swizzle `{}`", arg.ty)))?;
    Ok(Resolution::exact(result))
}

/// Check the operands of a conditional: `[condition, then, otherwise]`.
pub fn check_conditional(args: &[ArgType; 3]) -> Result<Resolution, Mismatch> {
    let [condition, then, otherwise] = args;

    if condition.ty != Type::Bool {
        return Err(Mismatch::NonBooleanCondition(condition.ty));
    }
    for branch in [then, otherwise] {
        if branch.ty.is_opaque() {
            return Err(Mismatch::OpaqueBranch(branch.ty));
        }
    }

    if then.ty == otherwise.ty {
        return Ok(Resolution::exact(then.ty));
    }
    if then.coercible && otherwise.ty == Type::Float {
        return Ok(Resolution {
            result: Type::Float,
            coerced: vec![1],
        });
    }
    if otherwise.coercible && then.ty == Type::Float {
        return Ok(Resolution {
            result: Type::Float,
            coerced: vec![2],
        });
    }
    Err(Mismatch::BranchMismatch(then.ty, otherwise.ty))
}
