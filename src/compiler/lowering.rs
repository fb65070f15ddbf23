//! Turns materialized nodes into statements. Expression valued conditionals become an
//! uninitialized temporary assigned in both arms of an if/else.

use fnv::{FnvHashMap, FnvHashSet};
use log::trace;

use crate::{
    dialect::Dialect,
    diagnostics::{CompilationError, CompilationResult},
    graph::{Graph, Literal, Node, NodeId, NodeKind},
    types::Type,
};

use super::analyzer::Analysis;

/// An expression in which every materialized node is replaced by its temporary.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Temp(String),
    Variable(String),
    Literal(Literal),
    Operator { symbol: String, operands: Vec<Expr> },
}

/// One statement of the program body.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `ty name = value;`
    Bind { name: String, ty: Type, value: Expr },

    /// `ty name; if (condition) { name = then; } else { name = otherwise; }`
    Branch {
        name: String,
        ty: Type,
        condition: Expr,
        then: Expr,
        otherwise: Expr,
    },
}

impl Statement {
    /// Name of the temporary the statement defines.
    pub fn name(&self) -> &str {
        match self {
            Statement::Bind { name, .. } | Statement::Branch { name, .. } => name,
        }
    }
}

/// Hands out `{prefix}{n}`, skipping declared names and names the dialect reserves.
struct TempNames<'a> {
    prefix: String,
    next: usize,
    reserved: FnvHashSet<String>,
    dialect: &'a dyn Dialect,
}

impl TempNames<'_> {
    fn next(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if !self.reserved.contains(&name) && !self.dialect.is_reserved(&name) {
                return name;
            }
        }
    }
}

pub struct Lowering<'a> {
    graph: &'a Graph,
    analysis: &'a Analysis,
    names: TempNames<'a>,
    temps: FnvHashMap<NodeId, String>,
}

impl<'a> Lowering<'a> {
    /// `reserved` holds every identifier the program declares. Temporaries never take one.
    pub fn new(
        graph: &'a Graph,
        analysis: &'a Analysis,
        prefix: &str,
        reserved: FnvHashSet<String>,
    ) -> Self {
        Self {
            graph,
            analysis,
            names: TempNames {
                prefix: prefix.to_string(),
                next: 0,
                reserved,
                dialect: graph.dialect(),
            },
            temps: FnvHashMap::default(),
        }
    }

    /// Lower every materialized node, in analysis order.
    pub fn lower_all(&mut self) -> CompilationResult<Vec<Statement>> {
        let (graph, analysis) = (self.graph, self.analysis);
        let mut statements = vec![];
        for id in &analysis.order {
            let node = graph.node(*id)?;
            if analysis.is_materialized(node) {
                statements.push(self.lower(node)?);
            }
        }
        Ok(statements)
    }

    /// Lower one materialized node. Its operands must have been lowered already.
    pub fn lower(&mut self, node: &Node) -> CompilationResult<Statement> {
        let statement = match node.kind() {
            NodeKind::Operator { symbol, operands } => {
                let value = self.operator(symbol, operands)?;
                Statement::Bind {
                    name: self.names.next(),
                    ty: node.ty(),
                    value,
                }
            }
            NodeKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.expr(*condition)?;
                let then = self.expr(*then)?;
                let otherwise = self.expr(*otherwise)?;
                Statement::Branch {
                    name: self.names.next(),
                    ty: node.ty(),
                    condition,
                    then,
                    otherwise,
                }
            }
            NodeKind::Literal(_) | NodeKind::Variable(_) => {
                return Err(CompilationError::new_unsupported(
                    Some(node.id()),
                    "literals and variables are never bound to temporaries",
                ))
            }
        };

        trace!("{} := {}", statement.name(), node.id());
        self.temps.insert(node.id(), statement.name().to_string());
        Ok(statement)
    }

    /// Inline form of a node, as it appears where it is used.
    pub fn expr(&self, id: NodeId) -> CompilationResult<Expr> {
        if let Some(temp) = self.temps.get(&id) {
            return Ok(Expr::Temp(temp.clone()));
        }

        let node = self.graph.node(id)?;
        match node.kind() {
            NodeKind::Literal(literal) => Ok(Expr::Literal(*literal)),
            NodeKind::Variable(variable) => Ok(Expr::Variable(variable.name.clone())),
            NodeKind::Operator { symbol, operands } => self.operator(symbol, operands),
            NodeKind::Conditional { .. } => Err(CompilationError::new_unsupported(
                Some(id),
                "conditional used before it was lowered",
            )),
        }
    }

    fn operator(&self, symbol: &str, operands: &[NodeId]) -> CompilationResult<Expr> {
        let operands = operands
            .iter()
            .map(|id| self.expr(*id))
            .collect::<CompilationResult<Vec<_>>>()?;
        Ok(Expr::Operator {
            symbol: symbol.to_string(),
            operands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::analyzer::analyze;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    fn temp(name: &str) -> Expr {
        Expr::Temp(name.to_string())
    }

    fn op(symbol: &str, operands: Vec<Expr>) -> Expr {
        Expr::Operator {
            symbol: symbol.to_string(),
            operands,
        }
    }

    #[test]
    fn shared_operator_becomes_one_bind() {
        let mut g = Graph::new();
        let v = g.attribute("v", Type::Vec4).unwrap();
        let x = g.length(v).unwrap();
        let xyz = g.vec3(&[x, x, x]).unwrap();
        let analysis = analyze(&g, &[xyz]).unwrap();

        let mut lowering = Lowering::new(&g, &analysis, "tmp", FnvHashSet::default());
        let statements = lowering.lower_all().unwrap();
        assert_eq!(
            statements,
            vec![Statement::Bind {
                name: "tmp0".to_string(),
                ty: Type::Float,
                value: op("length", vec![var("v")]),
            }]
        );
        assert_eq!(
            lowering.expr(xyz).unwrap(),
            op("vec3", vec![temp("tmp0"), temp("tmp0"), temp("tmp0")])
        );
    }

    #[test]
    fn conditional_becomes_branch() {
        let mut g = Graph::new();
        let flag = g.uniform("u_flag", Type::Bool).unwrap();
        let a = g.attribute("a", Type::Float).unwrap();
        let s = g.sin(a).unwrap();
        let zero = g.float(0.0).unwrap();
        let k = g.conditional(flag, s, zero).unwrap();
        let root = g.cos(k).unwrap();
        let analysis = analyze(&g, &[root]).unwrap();

        let mut lowering = Lowering::new(&g, &analysis, "tmp", FnvHashSet::default());
        let statements = lowering.lower_all().unwrap();
        assert_eq!(
            statements,
            vec![Statement::Branch {
                name: "tmp0".to_string(),
                ty: Type::Float,
                condition: var("u_flag"),
                then: op("sin", vec![var("a")]),
                otherwise: Expr::Literal(Literal::Float(0.0)),
            }]
        );
        assert_eq!(lowering.expr(root).unwrap(), op("cos", vec![temp("tmp0")]));
    }

    #[test]
    fn nested_conditionals_lower_inner_first() {
        let mut g = Graph::new();
        let p = g.uniform("p", Type::Bool).unwrap();
        let q = g.uniform("q", Type::Bool).unwrap();
        let one = g.float(1.0).unwrap();
        let two = g.float(2.0).unwrap();
        let inner = g.conditional(q, one, two).unwrap();
        let outer = g.conditional(p, inner, one).unwrap();
        let analysis = analyze(&g, &[outer]).unwrap();

        let mut lowering = Lowering::new(&g, &analysis, "tmp", FnvHashSet::default());
        let statements = lowering.lower_all().unwrap();
        let names: Vec<&str> = statements.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["tmp0", "tmp1"]);
        match &statements[1] {
            Statement::Branch { then, .. } => assert_eq!(then, &temp("tmp0")),
            other => panic!("expected a branch, got {other:?}"),
        }
    }

    #[test]
    fn reserved_names_are_skipped() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let s = g.sin(a).unwrap();
        let c = g.cos(a).unwrap();
        let sum = g.add(s, s).unwrap();
        let prod = g.mul(c, c).unwrap();
        let analysis = analyze(&g, &[sum, prod]).unwrap();

        let reserved = FnvHashSet::from_iter(["t0".to_string(), "t2".to_string()]);
        let mut lowering = Lowering::new(&g, &analysis, "t", reserved);
        let statements = lowering.lower_all().unwrap();
        let names: Vec<&str> = statements.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["t1", "t3"]);
    }

    #[test]
    fn temporaries_skip_type_names() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let roots: Vec<NodeId> = (0..4)
            .map(|_| {
                let s = g.sin(a).unwrap();
                g.add(s, s).unwrap()
            })
            .collect();
        let analysis = analyze(&g, &roots).unwrap();

        let mut lowering = Lowering::new(&g, &analysis, "vec", FnvHashSet::default());
        let statements = lowering.lower_all().unwrap();
        let names: Vec<&str> = statements.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["vec0", "vec1", "vec5", "vec6"]);
    }
}
