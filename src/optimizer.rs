use tracing::debug;

use crate::{
    ast::{Ast, BinOp, ExprKind, NodeId},
    environment::Environment,
    evaluator::{Evaluator, Scope},
    structs::math::NON_DETERMINISTIC,
};

/// Constant folding pass.
///
/// Walks the tree bottom-up and replaces subtrees whose operands are all
/// number literals with the number they evaluate to:
///
/// ```text
/// 1 + 2 * 3          =>  7
/// -(4)               =>  -4
/// 1 ? 2 : 3          =>  2
/// math.sqrt(16) + v.x  =>  4 + v.x
/// ```
///
/// Folding runs the ordinary evaluator against the scratch environment and
/// scope it is given, so results are identical to evaluating at runtime.
/// Calls into the random functions and `->` are never folded, and a subtree
/// whose evaluation fails is left as it is.
pub struct ConstantFolder<'a> {
    env: &'a Environment,
    scope: &'a mut Scope,
    folded: usize,
}

impl<'a> ConstantFolder<'a> {
    pub fn new(env: &'a Environment, scope: &'a mut Scope) -> Self {
        ConstantFolder { env, scope, folded: 0 }
    }

    /// Folds every foldable subtree of `ast` and returns how many nodes were
    /// replaced.
    pub fn fold(mut self, ast: &mut Ast) -> usize {
        if let Some(root) = ast.root() {
            self.visit(ast, root);
        }
        if self.folded > 0 {
            debug!(folded = self.folded, "folded constant expressions");
        }
        self.folded
    }

    fn visit(&mut self, ast: &mut Ast, id: NodeId) {
        let children = ast.node(id).params.clone();
        for child in children {
            self.visit(ast, child);
        }

        if !self.is_foldable(ast, id) {
            return;
        }

        *self.scope = Scope::new();
        let result = Evaluator::new(ast).eval(id, self.scope, self.env);
        if let Ok(value) = result {
            let n = value.as_number();
            ast.replace(id, ExprKind::Number(n));
            self.folded += 1;
        }
    }

    fn is_foldable(&self, ast: &Ast, id: NodeId) -> bool {
        let node = ast.node(id);
        let all_numbers = node
            .params
            .iter()
            .all(|&p| matches!(ast.kind(p), ExprKind::Number(_)));

        match &node.kind {
            ExprKind::Binary(BinOp::Arrow) => false,
            ExprKind::Binary(_) | ExprKind::Unary(_) | ExprKind::Ternary { .. } => all_numbers,
            ExprKind::Call(path) => {
                let is_math = path.value().eq_ignore_ascii_case("math") && path.has_children();
                let deterministic = path
                    .next()
                    .is_some_and(|f| !NON_DETERMINISTIC.contains(&f.value().to_lowercase().as_str()));
                is_math && deterministic && !path.next().is_some_and(|f| f.has_children()) && all_numbers
            }
            _ => false,
        }
    }
}
