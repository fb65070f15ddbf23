//! Finds the nodes a program needs, in dependency order, and counts how often each one is
//! referenced. Shared nodes are detected by identity: the same [NodeId] reached from two parents.

use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    diagnostics::CompilationResult,
    graph::{Graph, Node, NodeId, NodeKind},
};

/// Longest chain of operators rendered inside one expression. Lowering and emission recurse
/// over inline operands, so this bounds their stack use.
pub const MAX_INLINE_DEPTH: usize = 64;

/// Result of [analyze].
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Every node reachable from the roots, operands before their consumers.
    pub order: Vec<NodeId>,
    /// Number of parent operand slots and root slots referring to each node.
    pub references: FnvHashMap<NodeId, usize>,
    /// Unshared operators bound anyway, so no inline expression nests deeper than
    /// [MAX_INLINE_DEPTH].
    pub split: FnvHashSet<NodeId>,
}

impl Analysis {
    pub fn references(&self, id: NodeId) -> usize {
        self.references.get(&id).copied().unwrap_or(0)
    }

    /// Whether `node` is bound to a temporary. Shared operators, operators ending a chain
    /// of [MAX_INLINE_DEPTH] inline operators and every conditional are; literals and
    /// variables are always rendered inline.
    pub fn is_materialized(&self, node: &Node) -> bool {
        match node.kind() {
            NodeKind::Conditional { .. } => true,
            NodeKind::Operator { .. } => {
                self.references(node.id()) > 1 || self.split.contains(&node.id())
            }
            NodeKind::Literal(_) | NodeKind::Variable(_) => false,
        }
    }
}

struct Frame {
    id: NodeId,
    operands: Vec<NodeId>,
    next: usize,
}

impl Frame {
    fn new(node: &Node) -> Self {
        Self {
            id: node.id(),
            operands: node.operands(),
            next: 0,
        }
    }
}

/// Walk the graph from `roots` in one pass. Roots are visited in the given order and operands
/// left to right, so the result only depends on how the graph was built.
pub fn analyze(graph: &Graph, roots: &[NodeId]) -> CompilationResult<Analysis> {
    let mut visited = FnvHashSet::default();
    let mut references: FnvHashMap<NodeId, usize> = FnvHashMap::default();
    let mut order = vec![];

    for root in roots {
        let node = graph.node(*root)?;
        *references.entry(*root).or_default() += 1;
        if !visited.insert(*root) {
            continue;
        }

        // Explicit stack, deep graphs must not overflow the call stack.
        let mut stack = vec![Frame::new(node)];
        while let Some(frame) = stack.last_mut() {
            match frame.operands.get(frame.next).copied() {
                Some(operand) => {
                    frame.next += 1;
                    *references.entry(operand).or_default() += 1;
                    if visited.insert(operand) {
                        stack.push(Frame::new(graph.node(operand)?));
                    }
                }
                None => {
                    order.push(frame.id);
                    stack.pop();
                }
            }
        }
    }

    let split = split_deep_chains(graph, &order, &references)?;
    Ok(Analysis {
        order,
        references,
        split,
    })
}

/// Inline depth of every operator in `order`, which lists operands first. A node bound to a
/// temporary renders as a name and starts a new chain.
fn split_deep_chains(
    graph: &Graph,
    order: &[NodeId],
    references: &FnvHashMap<NodeId, usize>,
) -> CompilationResult<FnvHashSet<NodeId>> {
    let mut depth: FnvHashMap<NodeId, usize> = FnvHashMap::default();
    let mut split = FnvHashSet::default();

    for id in order {
        let node = graph.node(*id)?;
        let NodeKind::Operator { operands, .. } = node.kind() else {
            continue;
        };
        let inner = operands
            .iter()
            .filter_map(|o| depth.get(o))
            .max()
            .copied()
            .unwrap_or(0);
        let shared = references.get(id).copied().unwrap_or(0) > 1;
        if shared {
            continue;
        }
        if inner + 1 >= MAX_INLINE_DEPTH {
            split.insert(*id);
        } else {
            depth.insert(*id, inner + 1);
        }
    }

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn operands_come_first() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let s = g.sin(a).unwrap();
        let c = g.cos(s).unwrap();
        let analysis = analyze(&g, &[c]).unwrap();
        assert_eq!(analysis.order, vec![a, s, c]);
        for id in &analysis.order {
            let position = analysis.order.iter().position(|x| x == id).unwrap();
            for operand in g.node(*id).unwrap().operands() {
                let before = analysis.order.iter().position(|x| *x == operand).unwrap();
                assert!(before < position);
            }
        }
    }

    #[test]
    fn counts_every_operand_slot() {
        let mut g = Graph::new();
        let v = g.attribute("v", Type::Vec4).unwrap();
        let x = g.length(v).unwrap();
        let xyz = g.vec3(&[x, x, x]).unwrap();
        let analysis = analyze(&g, &[xyz]).unwrap();
        assert_eq!(analysis.references(x), 3);
        assert_eq!(analysis.references(v), 1);
        assert_eq!(analysis.references(xyz), 1);
        assert!(analysis.is_materialized(g.node(x).unwrap()));
        assert!(!analysis.is_materialized(g.node(xyz).unwrap()));
        assert!(!analysis.is_materialized(g.node(v).unwrap()));
    }

    #[test]
    fn roots_share_one_pass() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Vec2).unwrap();
        let n = g.normalize(a).unwrap();
        let x = g.swizzle(n, "x").unwrap();
        let y = g.swizzle(n, "y").unwrap();
        let analysis = analyze(&g, &[x, y]).unwrap();
        assert_eq!(analysis.order, vec![a, n, x, y]);
        assert_eq!(analysis.references(n), 2);
        assert!(analysis.is_materialized(g.node(n).unwrap()));
    }

    #[test]
    fn repeated_root_is_shared() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let s = g.sin(a).unwrap();
        let analysis = analyze(&g, &[s, s]).unwrap();
        assert_eq!(analysis.order, vec![a, s]);
        assert_eq!(analysis.references(s), 2);
    }

    #[test]
    fn unreachable_nodes_are_ignored() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let _unused = g.cos(a).unwrap();
        let s = g.sin(a).unwrap();
        let analysis = analyze(&g, &[s]).unwrap();
        assert_eq!(analysis.order, vec![a, s]);
    }

    #[test]
    fn conditionals_are_always_materialized() {
        let mut g = Graph::new();
        let c = g.boolean(true);
        let one = g.float(1.0).unwrap();
        let two = g.float(2.0).unwrap();
        let k = g.conditional(c, one, two).unwrap();
        let analysis = analyze(&g, &[k]).unwrap();
        assert_eq!(analysis.references(k), 1);
        assert!(analysis.is_materialized(g.node(k).unwrap()));
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut g = Graph::new();
        let mut x = g.attribute("a", Type::Float).unwrap();
        for _ in 0..10_000 {
            x = g.neg(x).unwrap();
        }
        let analysis = analyze(&g, &[x]).unwrap();
        assert_eq!(analysis.order.len(), 10_001);
        assert_eq!(analysis.split.len(), 10_000 / MAX_INLINE_DEPTH);
    }

    #[test]
    fn short_chains_stay_inline() {
        let mut g = Graph::new();
        let mut x = g.attribute("a", Type::Float).unwrap();
        for _ in 0..MAX_INLINE_DEPTH - 1 {
            x = g.sin(x).unwrap();
        }
        let analysis = analyze(&g, &[x]).unwrap();
        assert!(analysis.split.is_empty());

        let y = g.sin(x).unwrap();
        let analysis = analyze(&g, &[y]).unwrap();
        assert_eq!(analysis.split.iter().copied().collect::<Vec<_>>(), vec![y]);
        assert!(analysis.is_materialized(g.node(y).unwrap()));
    }

    #[test]
    fn shared_nodes_restart_the_chain() {
        let mut g = Graph::new();
        let a = g.attribute("a", Type::Float).unwrap();
        let mut x = g.sin(a).unwrap();
        for _ in 0..MAX_INLINE_DEPTH - 2 {
            x = g.sin(x).unwrap();
        }
        let shared = g.add(x, x).unwrap();
        let mut y = shared;
        for _ in 0..MAX_INLINE_DEPTH - 1 {
            y = g.cos(y).unwrap();
        }
        let analysis = analyze(&g, &[y]).unwrap();
        assert!(analysis.split.is_empty());
    }

    #[test]
    fn foreign_root_is_rejected() {
        let mut other = Graph::new();
        let foreign = other.attribute("a", Type::Float).unwrap();
        let g = Graph::new();
        assert!(analyze(&g, &[foreign]).is_err());
    }
}
