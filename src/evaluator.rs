use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Ast, BinOp, ExprKind, NodeId, Path, Position, UnaryOp},
    environment::Environment,
    structs::{self, MoParams},
    value::Value,
};

/// What went wrong while evaluating, without location.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// First path segment names no root in the environment
    #[error("Unknown root '{0}'")]
    UnknownRoot(String),

    /// Path cannot be resolved by the struct it reached
    #[error("Invalid path '{0}'")]
    InvalidPath(String),

    /// Write to a read-only struct or member
    #[error("Cannot assign to read-only '{0}'")]
    ReadOnly(String),

    /// Member access on something that is not a struct
    #[error("'{0}' is not a struct")]
    NotAStruct(String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Missing argument {index}")]
    MissingArgument { index: usize },

    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Assignment target is not a name or an index
    #[error("Cannot assign to {0} expression")]
    InvalidAssignment(&'static str),

    /// The struct is already borrowed by an enclosing access, for example a
    /// store that contains itself
    #[error("Struct is already in use")]
    StructBusy,

    #[error("No host bindings registered for {0}")]
    UnregisteredHostType(&'static str),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl EvalError {
    /// Attaches the node the error was raised at.
    pub fn at(self, origin: NodeId) -> RuntimeError {
        RuntimeError {
            error: self,
            origin: Some(origin),
            trace: Vec::new(),
        }
    }
}

/// One line of a runtime trace: a node and where its token sits in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub node: &'static str,
    pub text: String,
    pub position: Position,
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at <{}> near {} \"{}\"", self.position, self.node, self.text)
    }
}

/// An [`EvalError`] with the node it happened at and, once it has crossed the
/// evaluation boundary, the chain of enclosing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub error: EvalError,
    pub origin: Option<NodeId>,
    pub trace: Vec<TraceFrame>,
}

impl RuntimeError {
    /// Fills in the trace by walking parent links from the origin, innermost
    /// first. Nodes without a source token are skipped.
    pub fn with_trace(mut self, ast: &Ast) -> Self {
        if let Some(origin) = self.origin {
            self.trace = ast
                .ancestors(origin)
                .filter_map(|id| {
                    let node = ast.node(id);
                    node.meta.token.as_ref().map(|token| TraceFrame {
                        node: node.kind.name(),
                        text: token.text.clone(),
                        position: token.position,
                    })
                })
                .collect();
        }
        self
    }

    /// Source position of the innermost frame.
    pub fn position(&self) -> Option<Position> {
        self.trace.first().map(|frame| frame.position)
    }
}

impl From<EvalError> for RuntimeError {
    fn from(error: EvalError) -> Self {
        RuntimeError {
            error,
            origin: None,
            trace: Vec::new(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        for frame in &self.trace {
            write!(f, "\n  {}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Attaches a node to plain evaluation errors.
trait Locate<T> {
    fn at(self, id: NodeId) -> Result<T, RuntimeError>;
}

impl<T> Locate<T> for Result<T, EvalError> {
    fn at(self, id: NodeId) -> Result<T, RuntimeError> {
        self.map_err(|e| e.at(id))
    }
}

/// Per-evaluation control state.
///
/// A fresh scope is created for every top-level evaluation, and loop bodies
/// run in a child scope so `break` and `continue` stay local to the loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub is_break: bool,
    pub is_continue: bool,
    pub return_value: Option<Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when statement lists should stop running.
    fn interrupted(&self) -> bool {
        self.return_value.is_some() || self.is_break || self.is_continue
    }
}

/// Tree-walking evaluator over one [`Ast`].
///
/// # Semantics
///
/// - Arithmetic and comparisons work on numbers; non-numbers count as `0`
/// - `==` and `!=` compare values of the same kind only
/// - `&&`, `||` and `!` short-circuit and yield `1` or `0`
/// - `a ? b : c` takes `b` only when `a` is exactly `1`
/// - `a ?? b` yields `b` when `a` is not truthy
/// - `a -> b` evaluates `b` inside the environment `a` yields
/// - Assignments yield the assigned value, so `a = b = 1` sets both
pub struct Evaluator<'a> {
    ast: &'a Ast,
}

impl<'a> Evaluator<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Evaluator { ast }
    }

    /// Evaluates the root of the tree. An empty tree yields `0`.
    pub fn evaluate(&self, scope: &mut Scope, env: &Environment) -> Result<Value, RuntimeError> {
        match self.ast.root() {
            Some(root) => self.eval(root, scope, env),
            None => Ok(Value::ZERO),
        }
    }

    pub fn eval(&self, id: NodeId, scope: &mut Scope, env: &Environment) -> Result<Value, RuntimeError> {
        let node = self.ast.node(id);
        let param = |index: usize| node.params[index];

        match &node.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::String(s.clone())),
            ExprKind::Boolean(b) => Ok(Value::from(*b)),
            ExprKind::This => Ok(env.this()),
            ExprKind::Name(path) => env.get(path, &MoParams::empty()).at(id),
            ExprKind::Call(path) => {
                let mut args = Vec::with_capacity(node.params.len());
                for &arg in &node.params {
                    args.push(self.eval(arg, scope, env)?);
                }
                env.get(path, &MoParams::new(args)).at(id)
            }
            ExprKind::ArrayAccess => self.eval_index(id, param(0), param(1), scope, env),
            ExprKind::Unary(op) => {
                let operand = self.eval(param(0), scope, env)?;
                Ok(match op {
                    UnaryOp::Minus => Value::Number(-operand.as_number()),
                    UnaryOp::Plus => Value::Number(operand.as_number()),
                    UnaryOp::Not => Value::from(!operand.as_bool()),
                })
            }
            ExprKind::Binary(op) => self.eval_binary(*op, param(0), param(1), scope, env),
            ExprKind::Assign => {
                let value = self.eval(param(1), scope, env)?;
                self.assign(param(0), value.clone(), scope, env)?;
                Ok(value)
            }
            ExprKind::Ternary { has_then, has_else } => {
                let condition = self.eval(param(0), scope, env)?;
                if condition == Value::ONE {
                    if *has_then {
                        self.eval(param(1), scope, env)
                    } else {
                        Ok(condition)
                    }
                } else if *has_else {
                    let index = if *has_then { 2 } else { 1 };
                    self.eval(param(index), scope, env)
                } else {
                    Ok(Value::ZERO)
                }
            }
            ExprKind::Block => {
                for &statement in &node.params {
                    self.eval(statement, scope, env)?;
                    if scope.interrupted() {
                        return Ok(scope.return_value.clone().unwrap_or(Value::ZERO));
                    }
                }
                Ok(Value::ZERO)
            }
            ExprKind::Script => {
                let mut result = Value::ZERO;
                for &statement in &node.params {
                    result = self.eval(statement, scope, env)?;
                    if let Some(value) = &scope.return_value {
                        return Ok(value.clone());
                    }
                }
                Ok(result)
            }
            ExprKind::Loop => {
                let count = self.eval(param(0), scope, env)?.as_number().trunc();
                let mut remaining = if count > 0.0 { count as u64 } else { 0 };
                let mut body_scope = Scope::new();
                while remaining > 0 {
                    remaining -= 1;
                    body_scope.is_break = false;
                    body_scope.is_continue = false;
                    self.eval(param(1), &mut body_scope, env)?;
                    if self.finish_iteration(&body_scope, scope) {
                        break;
                    }
                }
                Ok(scope.return_value.clone().unwrap_or(Value::ZERO))
            }
            ExprKind::ForEach => {
                let collection = self.eval(param(1), scope, env)?;
                let items = match &collection {
                    Value::Struct(s) => structs::values(s).at(id)?.unwrap_or_default(),
                    _ => Vec::new(),
                };
                let mut body_scope = Scope::new();
                for item in items {
                    body_scope.is_break = false;
                    body_scope.is_continue = false;
                    self.assign(param(0), item, &mut body_scope, env)?;
                    self.eval(param(2), &mut body_scope, env)?;
                    if self.finish_iteration(&body_scope, scope) {
                        break;
                    }
                }
                Ok(scope.return_value.clone().unwrap_or(Value::ZERO))
            }
            ExprKind::Return => {
                let value = self.eval(param(0), scope, env)?;
                scope.return_value = Some(value.clone());
                Ok(value)
            }
            ExprKind::Break => {
                scope.is_break = true;
                Ok(Value::ZERO)
            }
            ExprKind::Continue => {
                scope.is_continue = true;
                Ok(Value::ZERO)
            }
        }
    }

    /// Moves a `return` out of a loop body into the enclosing scope. Returns
    /// true when the loop should stop.
    fn finish_iteration(&self, body: &Scope, outer: &mut Scope) -> bool {
        if let Some(value) = &body.return_value {
            outer.return_value = Some(value.clone());
            return true;
        }
        body.is_break
    }

    fn eval_binary(
        &self,
        op: BinOp,
        left: NodeId,
        right: NodeId,
        scope: &mut Scope,
        env: &Environment,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                let result = self.eval(left, scope, env)?.as_bool() && self.eval(right, scope, env)?.as_bool();
                return Ok(Value::from(result));
            }
            BinOp::Or => {
                let result = self.eval(left, scope, env)?.as_bool() || self.eval(right, scope, env)?.as_bool();
                return Ok(Value::from(result));
            }
            BinOp::NullCoalesce => {
                let value = self.eval(left, scope, env)?;
                return if value.as_bool() {
                    Ok(value)
                } else {
                    self.eval(right, scope, env)
                };
            }
            BinOp::Arrow => {
                return match self.eval(left, scope, env)? {
                    Value::Environment(other) => self.eval(right, scope, &other),
                    value => {
                        debug!(found = value.type_name(), "left side of '->' is not an environment");
                        Ok(Value::ZERO)
                    }
                };
            }
            _ => {}
        }

        let l = self.eval(left, scope, env)?;
        let r = self.eval(right, scope, env)?;
        Ok(apply_binary(op, &l, &r))
    }

    /// Resolves the struct an index expression addresses. Names are looked up
    /// directly; any other target is evaluated, and a non-struct result is
    /// used as a path.
    fn index_target(&self, target: NodeId, scope: &mut Scope, env: &Environment) -> Result<(Value, Option<Path>), RuntimeError> {
        let path = match &self.ast.node(target).kind {
            ExprKind::Name(path) => path.clone(),
            _ => match self.eval(target, scope, env)? {
                value @ (Value::Struct(_) | Value::Environment(_)) => return Ok((value, None)),
                value => Path::new(&value.as_string()).expand_aliases(),
            },
        };
        let value = env.get(&path, &MoParams::empty()).at(target)?;
        Ok((value, Some(path)))
    }

    fn eval_index(
        &self,
        id: NodeId,
        target: NodeId,
        index: NodeId,
        scope: &mut Scope,
        env: &Environment,
    ) -> Result<Value, RuntimeError> {
        let index = index_segment(&self.eval(index, scope, env)?);
        let (value, _) = self.index_target(target, scope, env)?;
        match value {
            Value::Struct(array) => structs::read(&array, &Path::new(&index), &MoParams::empty()).at(id),
            other => Ok(other),
        }
    }

    /// Stores `value` into an assignable expression: a name or an index.
    pub fn assign(&self, target: NodeId, value: Value, scope: &mut Scope, env: &Environment) -> Result<(), RuntimeError> {
        let node = self.ast.node(target);
        match &node.kind {
            ExprKind::Name(path) => env.set(path, value).at(target),
            ExprKind::ArrayAccess => {
                let index = index_segment(&self.eval(node.params[1], scope, env)?);
                match self.index_target(node.params[0], scope, env)? {
                    (Value::Struct(array), _) => structs::write(&array, &Path::new(&index), value).at(target),
                    (_, Some(path)) => env.set(&path.join(&index), value).at(target),
                    (other, None) => Err(EvalError::NotAStruct(other.type_name().to_string()).at(target)),
                }
            }
            kind => Err(EvalError::InvalidAssignment(kind.name()).at(target)),
        }
    }
}

/// Index values are truncated to whole numbers before addressing.
fn index_segment(index: &Value) -> String {
    (index.as_number().trunc() as i64).to_string()
}

/// Operators that always evaluate both operands.
pub fn apply_binary(op: BinOp, l: &Value, r: &Value) -> Value {
    match op {
        BinOp::Add => Value::Number(l.as_number() + r.as_number()),
        BinOp::Subtract => Value::Number(l.as_number() - r.as_number()),
        BinOp::Multiply => Value::Number(l.as_number() * r.as_number()),
        BinOp::Divide => Value::Number(l.as_number() / r.as_number()),
        BinOp::Equal => Value::from(l == r),
        BinOp::NotEqual => Value::from(l != r),
        BinOp::LessThan => Value::from(l.as_number() < r.as_number()),
        BinOp::LessEqual => Value::from(l.as_number() <= r.as_number()),
        BinOp::GreaterThan => Value::from(l.as_number() > r.as_number()),
        BinOp::GreaterEqual => Value::from(l.as_number() >= r.as_number()),
        BinOp::And => Value::from(l.as_bool() && r.as_bool()),
        BinOp::Or => Value::from(l.as_bool() || r.as_bool()),
        BinOp::NullCoalesce => {
            if l.as_bool() {
                l.clone()
            } else {
                r.clone()
            }
        }
        BinOp::Arrow => Value::ZERO,
    }
}
