//! Renders a [CompiledProgram] as source text.

use log::trace;

use crate::{
    dialect::{Dialect, Stage, Syntax},
    diagnostics::{CompilationError, CompilationResult},
};

use super::{
    lowering::{Expr, Statement},
    program::CompiledProgram,
};

const INDENT: &str = "    ";

/// Render `program`. The same program always renders to the same text.
pub fn emit(program: &CompiledProgram, dialect: &dyn Dialect) -> CompilationResult<String> {
    let mut emitter = Emitter {
        dialect,
        out: String::new(),
    };
    emitter.program(program)?;
    Ok(emitter.out)
}

struct Emitter<'a> {
    dialect: &'a dyn Dialect,
    out: String,
}

impl<'a> Emitter<'a> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out += INDENT;
        }
        self.out += text;
        self.out.push('\n');
    }

    fn program(&mut self, program: &CompiledProgram) -> CompilationResult<()> {
        let mut header = false;
        if let (Stage::Fragment, Some(precision)) = (program.stage, program.float_precision) {
            self.line(0, &format!("precision {precision} float;"));
            header = true;
        }

        for declaration in &program.declarations {
            let v = &declaration.variable;
            let qualifier = self.dialect.qualifier(v.kind);
            let line = match v.precision {
                Some(p) => format!("{qualifier} {p} {} {};", v.ty, v.name),
                None => format!("{qualifier} {} {};", v.ty, v.name),
            };
            self.line(0, &line);
            header = true;
        }

        if header {
            self.out.push('\n');
        }

        self.line(0, "void main(void) {");
        for statement in &program.statements {
            self.statement(statement)?;
        }
        for output in &program.outputs {
            let value = self.expr(&output.value)?;
            self.line(1, &format!("{} = {value};", output.name));
        }
        self.line(0, "}");
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> CompilationResult<()> {
        trace!("emitting {}", statement.name());
        match statement {
            Statement::Bind { name, ty, value } => {
                let value = self.expr(value)?;
                self.line(1, &format!("{ty} {name} = {value};"));
            }
            Statement::Branch {
                name,
                ty,
                condition,
                then,
                otherwise,
            } => {
                let condition = self.expr(condition)?;
                let then = self.expr(then)?;
                let otherwise = self.expr(otherwise)?;
                self.line(1, &format!("{ty} {name};"));
                self.line(1, &format!("if ({condition}) {{"));
                self.line(2, &format!("{name} = {then};"));
                self.line(1, "} else {");
                self.line(2, &format!("{name} = {otherwise};"));
                self.line(1, "}");
            }
        }
        Ok(())
    }

    fn expr(&self, expr: &Expr) -> CompilationResult<String> {
        let (symbol, operands) = match expr {
            Expr::Temp(name) | Expr::Variable(name) => return Ok(name.clone()),
            Expr::Literal(literal) => return Ok(literal.to_string()),
            Expr::Operator { symbol, operands } => (symbol, operands),
        };

        if let Some(components) = symbol.strip_prefix('.') {
            return match operands.as_slice() {
                [operand] => Ok(format!("{}.{components}", self.operand(operand)?)),
                _ => Err(self.malformed(symbol, operands.len())),
            };
        }

        let def = self.dialect.operator(symbol).ok_or_else(|| {
            CompilationError::new_unsupported(
                None,
                format!(
                    "operator `{symbol}` is not available in {}",
                    self.dialect.name()
                ),
            )
        })?;

        match (&def.syntax, operands.as_slice()) {
            (Syntax::Call(name), _) => {
                let args = operands
                    .iter()
                    .map(|o| self.expr(o))
                    .collect::<CompilationResult<Vec<_>>>()?;
                Ok(format!("{name}({})", args.join(", ")))
            }
            (Syntax::Operator(op), [a]) => Ok(format!("{op}{}", self.operand(a)?)),
            (Syntax::Operator(op), [a, b]) => {
                Ok(format!("{} {op} {}", self.operand(a)?, self.operand(b)?))
            }
            (Syntax::Operator(_), _) => Err(self.malformed(symbol, operands.len())),
        }
    }

    /// Render an operand of an infix, prefix or postfix form.
    fn operand(&self, expr: &Expr) -> CompilationResult<String> {
        let s = self.expr(expr)?;
        if self.is_atomic(expr) {
            Ok(s)
        } else {
            Ok(format!("({s})"))
        }
    }

    /// Atoms never need parentheses: names, non-negative literals, calls and swizzles.
    fn is_atomic(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Temp(_) | Expr::Variable(_) => true,
            Expr::Literal(literal) => !literal.is_negative(),
            Expr::Operator { symbol, .. } => {
                symbol.starts_with('.')
                    || matches!(
                        self.dialect.operator(symbol).map(|d| &d.syntax),
                        Some(Syntax::Call(_))
                    )
            }
        }
    }

    fn malformed(&self, symbol: &str, count: usize) -> CompilationError {
        CompilationError::new_unsupported(
            None,
            format!("`{symbol}` can not be written with {count} operand(s)"),
        )
    }
}
