use crate::ast::TokenKind;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Logical
    /// Logical AND (`&&`)
    And,
    /// Logical OR (`||`)
    Or,

    /// Null-coalescing (`??`)
    NullCoalesce,

    /// Step into another environment (`->`)
    Arrow,
}

impl BinOp {
    /// The binary operator a token introduces in infix position.
    pub fn from_token(kind: TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Subtract,
            TokenKind::Star => BinOp::Multiply,
            TokenKind::Slash => BinOp::Divide,
            TokenKind::EqEq => BinOp::Equal,
            TokenKind::NotEq => BinOp::NotEqual,
            TokenKind::Lt => BinOp::LessThan,
            TokenKind::LtEq => BinOp::LessEqual,
            TokenKind::Gt => BinOp::GreaterThan,
            TokenKind::GtEq => BinOp::GreaterEqual,
            TokenKind::AndAnd => BinOp::And,
            TokenKind::OrOr => BinOp::Or,
            TokenKind::Coalesce => BinOp::NullCoalesce,
            TokenKind::Arrow => BinOp::Arrow,
            _ => return None,
        };
        Some(op)
    }

    pub fn precedence(self) -> Precedence {
        match self {
            BinOp::Add | BinOp::Subtract => Precedence::Sum,
            BinOp::Multiply | BinOp::Divide => Precedence::Product,
            BinOp::Equal
            | BinOp::NotEqual
            | BinOp::LessThan
            | BinOp::LessEqual
            | BinOp::GreaterThan
            | BinOp::GreaterEqual => Precedence::Compare,
            BinOp::And => Precedence::And,
            BinOp::Or => Precedence::Or,
            BinOp::NullCoalesce => Precedence::Coalesce,
            BinOp::Arrow => Precedence::Arrow,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::LessEqual => "<=",
            BinOp::GreaterThan => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::NullCoalesce => "??",
            BinOp::Arrow => "->",
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Numeric coercion (`+x`)
    Plus,
    /// Negation (`-x`)
    Minus,
    /// Logical not (`!x`)
    Not,
}

/// Binding power of infix operators, lowest first.
///
/// The parser keeps consuming infix operators while the next one binds tighter
/// than the level it was asked to parse at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Anything,
    Scope,
    Assignment,
    Conditional,
    ArrayAccess,
    Coalesce,
    And,
    Or,
    Compare,
    Sum,
    Product,
    Prefix,
    Arrow,
}
