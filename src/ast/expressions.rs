use std::fmt;

use crate::ast::{BinOp, Path, Token, UnaryOp};

/// Index of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is. Children live in [`Node::params`] in the order listed on
/// each variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Literals
    /// Literal number
    ///
    /// # Example
    /// ```text
    /// 42
    /// 0.5
    /// ```
    Number(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// 'minecraft:pig'
    /// ```
    String(String),

    /// `true` or `false`. Evaluates to 1 or 0.
    Boolean(bool),

    // References
    /// Name reference resolved through the environment
    ///
    /// # Examples
    /// ```text
    /// query.anim_time
    /// v.speed
    /// ```
    Name(Path),

    /// Function call: the path of the callee, arguments in `params`
    ///
    /// # Example
    /// ```text
    /// math.clamp(v.x, 0, 1)
    /// ```
    Call(Path),

    /// Index into an array: `[target, index]`
    ///
    /// # Example
    /// ```text
    /// v.items[2]
    /// ```
    ArrayAccess,

    // Operations
    /// Prefix operator: `[operand]`
    Unary(UnaryOp),

    /// Binary operator: `[left, right]`
    Binary(BinOp),

    /// Assignment: `[target, value]`
    ///
    /// Evaluates to the assigned value rather than `0`, so `a = b = 1` sets
    /// both and a script ending in `v.x = 5` yields `5`.
    ///
    /// # Example
    /// ```text
    /// v.x = v.x + 1
    /// ```
    Assign,

    /// Conditional: `[condition, then?, else?]`. The flags record which
    /// branches were written, since `a ?: b` and `a ? b` are both accepted.
    ///
    /// # Examples
    /// ```text
    /// v.x ? 10 : 20
    /// v.x ? 10
    /// ```
    Ternary { has_then: bool, has_else: bool },

    // Control flow
    /// Braced statement list
    ///
    /// # Example
    /// ```text
    /// { v.x = 1; v.y = 2; }
    /// ```
    Block,

    /// `loop(count, body)`: `[count, body]`
    Loop,

    /// `for_each(var, collection, body)`: `[var, collection, body]`
    ForEach,

    /// `return expr`: `[expr]`
    Return,

    /// `break`
    Break,

    /// `continue`
    Continue,

    /// `this`, the value bound on the environment
    This,

    /// Top-level `;`-separated sequence with more than one statement
    Script,
}

impl ExprKind {
    /// Short type name shown in runtime traces.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Number(_) => "Number",
            ExprKind::String(_) => "String",
            ExprKind::Boolean(_) => "Boolean",
            ExprKind::Name(_) => "Name",
            ExprKind::Call(_) => "Call",
            ExprKind::ArrayAccess => "ArrayAccess",
            ExprKind::Unary(_) => "Unary",
            ExprKind::Binary(_) => "Binary",
            ExprKind::Assign => "Assign",
            ExprKind::Ternary { .. } => "Ternary",
            ExprKind::Block => "Block",
            ExprKind::Loop => "Loop",
            ExprKind::ForEach => "ForEach",
            ExprKind::Return => "Return",
            ExprKind::Break => "Break",
            ExprKind::Continue => "Continue",
            ExprKind::This => "This",
            ExprKind::Script => "Script",
        }
    }
}

/// Diagnostic metadata. The links are non-owning and only used to build
/// error traces; they are filled in by [`Ast::link`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprMeta {
    pub token: Option<Token>,
    pub parent: Option<NodeId>,
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: ExprKind,
    pub params: Vec<NodeId>,
    pub meta: ExprMeta,
}

impl Node {
    pub fn param(&self, index: usize) -> Option<NodeId> {
        self.params.get(index).copied()
    }
}

/// Arena holding every node of one parsed expression.
///
/// Nodes refer to their children by [`NodeId`], so parent and sibling links
/// never form ownership cycles. Nodes replaced by the optimizer stay in the
/// arena but are no longer reachable from the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, kind: ExprKind, params: Vec<NodeId>, token: Option<Token>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            params,
            meta: ExprMeta {
                token,
                ..ExprMeta::default()
            },
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &ExprKind {
        &self.nodes[id.0].kind
    }

    /// Rewrites a node in place as a leaf of `kind`, dropping its children.
    pub fn replace(&mut self, id: NodeId, kind: ExprKind) {
        let node = &mut self.nodes[id.0];
        node.kind = kind;
        node.params.clear();
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Assigns parent and previous/next sibling links for every node
    /// reachable from the root.
    pub fn link(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        self.nodes[root.0].meta.parent = None;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let params = self.nodes[id.0].params.clone();
            for (i, &child) in params.iter().enumerate() {
                let meta = &mut self.nodes[child.0].meta;
                meta.parent = Some(id);
                meta.previous = if i > 0 { Some(params[i - 1]) } else { None };
                meta.next = params.get(i + 1).copied();
                stack.push(child);
            }
        }
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.nodes[current.0].meta.parent)
    }
}
