//! Static queries over compiled expressions.

use std::collections::{BTreeSet, VecDeque};

use tracing::warn;

use crate::{ast::ExprKind, compiled::CompiledExpression};

/// Most nodes [`referenced_variables`] visits before giving up.
pub const MAX_VISITED_NODES: usize = 10_000;

/// Every name the expression reads or writes, with aliases expanded.
///
/// ```text
/// v.speed * q.anim_time   =>  {"query.anim_time", "variable.speed"}
/// ```
///
/// Calls are not included. The walk is breadth-first and stops after
/// [`MAX_VISITED_NODES`] nodes, returning what it found so far.
pub fn referenced_variables(expr: &CompiledExpression) -> BTreeSet<String> {
    let ast = expr.ast();
    let mut names = BTreeSet::new();
    let mut queue: VecDeque<_> = ast.root().into_iter().collect();
    let mut visited = 0;

    while let Some(id) = queue.pop_front() {
        visited += 1;
        if visited > MAX_VISITED_NODES {
            warn!(source = %expr.source(), limit = MAX_VISITED_NODES, "too many sub-expressions, stopping early");
            break;
        }

        let node = ast.node(id);
        if let ExprKind::Name(path) = &node.kind {
            names.insert(path.full().to_string());
        }
        queue.extend(node.params.iter().copied());
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::compile;

    fn names(source: &str) -> Vec<String> {
        referenced_variables(&compile(source).unwrap()).into_iter().collect()
    }

    #[test]
    fn test_collects_expanded_names() {
        assert_eq!(
            names("v.speed * q.anim_time + math.sin(t.a)"),
            vec!["query.anim_time", "temp.a", "variable.speed"]
        );
    }

    #[test]
    fn test_bare_name_root() {
        assert_eq!(names("c.x"), vec!["context.x"]);
        assert!(names("1 + 2").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(names("v.a = v.a + 1; v.a"), vec!["variable.a"]);
    }
}
