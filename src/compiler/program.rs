//! Assembles a [CompiledProgram]: the declarations a program needs, its body and the output
//! assignments, with every identifier checked for collisions.

use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    dialect::{Dialect, Stage},
    diagnostics::{CompilationError, CompilationResult},
    graph::{NodeId, Precision, StorageKind, Variable},
    types::Type,
};

use super::lowering::{Expr, Statement};

/// An external variable the program declares.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub variable: Variable,
    /// Written by the program instead of read.
    pub output: bool,
}

/// `name = value;` at the end of the program body.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputAssignment {
    pub name: String,
    pub value: Expr,
}

/// A linear program, ready to be rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledProgram {
    pub stage: Stage,
    /// Default float precision, only rendered for fragment programs.
    pub float_precision: Option<Precision>,
    /// Attributes, then uniforms, then varyings.
    pub declarations: Vec<Declaration>,
    pub statements: Vec<Statement>,
    pub outputs: Vec<OutputAssignment>,
}

impl CompiledProgram {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.variable.name == name)
    }

    /// Every identifier the program defines: declarations, then temporaries.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .map(|d| d.variable.name.as_str())
            .chain(self.statements.iter().map(|s| s.name()))
    }
}

/// Declaration signature without the name, e.g. `varying mediump vec2`.
fn describe(variable: &Variable) -> String {
    match variable.precision {
        Some(p) => format!("{} {} {}", variable.kind, p, variable.ty),
        None => format!("{} {}", variable.kind, variable.ty),
    }
}

pub(crate) struct ProgramBuilder<'a> {
    dialect: &'a dyn Dialect,
    stage: Stage,
    declarations: Vec<Declaration>,
    by_name: FnvHashMap<String, usize>,
    outputs: FnvHashMap<String, Type>,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, stage: Stage) -> Self {
        Self {
            dialect,
            stage,
            declarations: vec![],
            by_name: FnvHashMap::default(),
            outputs: FnvHashMap::default(),
        }
    }

    fn declare(&mut self, variable: Variable, output: bool) -> CompilationResult<()> {
        if let Some(&i) = self.by_name.get(&variable.name) {
            let existing = &mut self.declarations[i];
            let same = existing.variable.kind == variable.kind
                && existing.variable.ty == variable.ty
                && (output || existing.variable.precision == variable.precision);
            if !same {
                return Err(CompilationError::new_collision(
                    &variable.name,
                    describe(&existing.variable),
                    describe(&variable),
                ));
            }
            existing.output |= output;
            return Ok(());
        }

        self.by_name
            .insert(variable.name.clone(), self.declarations.len());
        self.declarations.push(Declaration { variable, output });
        Ok(())
    }

    /// Declare a variable the program reads.
    pub fn declare_input(&mut self, id: NodeId, variable: &Variable) -> CompilationResult<()> {
        if variable.kind == StorageKind::Attribute && self.stage != Stage::Vertex {
            return Err(CompilationError::new_unsupported(
                Some(id),
                format!(
                    "attribute `{}` read by a {} program",
                    variable.name, self.stage
                ),
            ));
        }
        self.declare(variable.clone(), false)
    }

    /// Declare an output root. Builtins are checked against their type, other names become
    /// stage outputs if the stage has any.
    pub fn declare_output(&mut self, name: &str, id: NodeId, ty: Type) -> CompilationResult<()> {
        if let Some(previous) = self.outputs.insert(name.to_string(), ty) {
            return Err(CompilationError::new_collision(
                name,
                format!("output {previous}"),
                format!("output {ty}"),
            ));
        }

        if let Some(builtin) = self.dialect.builtin_output(self.stage, name) {
            if builtin != ty {
                return Err(CompilationError::Type {
                    operator: name.to_string(),
                    operands: vec![id],
                    operand_types: vec![ty],
                    message: format!("builtin output `{name}` has type `{builtin}`"),
                });
            }
            return Ok(());
        }

        if !Variable::is_valid_name(name) {
            return Err(CompilationError::new_unsupported(
                Some(id),
                format!(
                    "`{name}` is neither a builtin output of {} programs nor a valid identifier",
                    self.stage
                ),
            ));
        }
        if self.dialect.is_reserved(name) {
            return Err(CompilationError::new_unsupported(
                Some(id),
                format!(
                    "`{name}` is reserved by {} and can not name an output",
                    self.dialect.name()
                ),
            ));
        }

        let Some(kind) = self.dialect.output_storage(self.stage) else {
            return Err(CompilationError::new_unsupported(
                Some(id),
                format!(
                    "{} programs can only write builtin outputs, not `{name}`",
                    self.stage
                ),
            ));
        };
        if !(ty.is_gen() || ty.is_matrix()) {
            return Err(CompilationError::new_unsupported(
                Some(id),
                format!("output `{name}` can not have type `{ty}`"),
            ));
        }

        self.declare(Variable::new(name, kind, ty), true)
    }

    /// Identifiers temporaries must not use.
    pub fn reserved_names(&self) -> FnvHashSet<String> {
        self.by_name
            .keys()
            .chain(self.outputs.keys())
            .cloned()
            .collect()
    }

    pub fn finish(
        mut self,
        float_precision: Option<Precision>,
        statements: Vec<Statement>,
        outputs: Vec<OutputAssignment>,
    ) -> CompiledProgram {
        // Stable, so discovery and root order survive within each kind.
        self.declarations.sort_by_key(|d| d.variable.kind);
        CompiledProgram {
            stage: self.stage,
            float_precision,
            declarations: self.declarations,
            statements,
            outputs,
        }
    }
}
