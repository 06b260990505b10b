use std::collections::VecDeque;

use thiserror::Error;

use crate::{
    ast::{Ast, BinOp, ExprKind, NodeId, Path, Position, Precedence, Token, TokenKind, UnaryOp},
    lexer::{LexError, Lexer},
};

/// Default limit on expression nesting, see [`Parser::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Expected {expected} but found '{found}' at {position}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: Position,
    },

    #[error("Cannot start an expression with '{text}' at {position}")]
    NoPrefixRule { text: String, position: Position },

    #[error("Unexpected '{text}' after expression at {position}")]
    NoInfixRule { text: String, position: Position },

    #[error("{construct} expects {expected} arguments but {found} were given at {position}")]
    WrongArgumentCount {
        construct: String,
        expected: usize,
        found: usize,
        position: Position,
    },

    #[error("Unexpected end of input at {position}")]
    UnexpectedEof { position: Position },

    #[error("Expression nests deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(err) => err.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::NoPrefixRule { position, .. }
            | ParseError::NoInfixRule { position, .. }
            | ParseError::WrongArgumentCount { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::TooDeep { position, .. } => *position,
        }
    }
}

/// Pratt parser for MoLang.
///
/// Tokens are pulled from the lexer on demand; a small lookahead buffer holds
/// tokens that were peeked at but not consumed yet.
///
/// # Grammar
///
/// ```text
/// script     := statement (';' statement)* ';'?
/// statement  := expression
/// expression := prefix (infix)*
/// prefix     := number | string | 'true' | 'false' | 'this'
///             | name | name '(' args ')' | name '[' expression ']'
///             | '(' expression ')' | '{' (statement ';')* '}'
///             | ('-' | '+' | '!') expression
///             | 'return' expression | 'break' | 'continue'
///             | 'loop' '(' count ',' body ')'
///             | 'for_each' '(' var ',' collection ',' body ')'
/// infix      := binop expression
///             | '?' expression (':' expression)?  |  '?' ':' expression
///             | '[' expression ']'
///             | '=' expression
/// ```
///
/// # Operator levels (lowest first)
///
/// ```text
/// =   ?:   [ ]   ??   &&   ||   == != < <= > >=   + -   * /   prefix   ->
/// ```
pub struct Parser {
    lexer: Lexer,
    lookahead: VecDeque<Token>,
    ast: Ast,
    /// Height of the subtree under each node, indexed like the arena.
    heights: Vec<usize>,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            lookahead: VecDeque::new(),
            ast: Ast::new(),
            heights: Vec::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limits how deeply expressions may nest before parsing fails with
    /// [`ParseError::TooDeep`].
    ///
    /// The limit applies both to recursion while parsing and to the height of
    /// the finished tree, so a flat chain like `1 + 1 + ... + 1` counts one
    /// level per operator.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the whole input.
    ///
    /// An empty input yields an [`Ast`] without a root. A single statement
    /// becomes the root directly; several are wrapped in a `Script` node.
    pub fn parse(mut self) -> Result<Ast, ParseError> {
        let mut statements = Vec::new();
        loop {
            if self.check(TokenKind::Eof)? {
                break;
            }
            statements.push(self.parse_expression(Precedence::Anything)?);
            if !self.match_token(TokenKind::Semicolon)? {
                break;
            }
        }

        let trailing = self.advance()?;
        if !trailing.is(TokenKind::Eof) {
            return Err(ParseError::NoInfixRule {
                text: trailing.text,
                position: trailing.position,
            });
        }

        let root = match statements.len() {
            0 => None,
            1 => Some(statements[0]),
            _ => Some(self.ast.push(ExprKind::Script, statements, None)),
        };
        self.ast.set_root(root);
        self.ast.link();
        Ok(self.ast)
    }

    // Token stream helpers

    fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        if self.lookahead.is_empty() {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead.front().map_or(TokenKind::Eof, |t| t.kind))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }

    fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.peek_kind()? == kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.advance()?;
        if token.is(kind) {
            Ok(token)
        } else if token.is(TokenKind::Eof) {
            Err(ParseError::UnexpectedEof {
                position: token.position,
            })
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.text,
                expected: kind.name().to_string(),
                position: token.position,
            })
        }
    }

    /// Binding power of the next token in infix position. Tokens without an
    /// infix rule end the current expression.
    fn peek_precedence(&mut self) -> Result<Precedence, ParseError> {
        let precedence = match self.peek_kind()? {
            TokenKind::Question => Precedence::Conditional,
            TokenKind::LBracket => Precedence::ArrayAccess,
            TokenKind::Assign => Precedence::Assignment,
            kind => BinOp::from_token(kind).map_or(Precedence::Anything, BinOp::precedence),
        };
        Ok(precedence)
    }

    /// Adds a node to the arena, failing when the tree under it would be
    /// taller than the nesting limit.
    fn push(&mut self, kind: ExprKind, params: Vec<NodeId>, token: Token) -> Result<NodeId, ParseError> {
        let height = 1 + params
            .iter()
            .map(|p| self.heights.get(p.0).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        if height > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                position: token.position,
            });
        }
        let id = self.ast.push(kind, params, Some(token));
        self.heights.push(height);
        Ok(id)
    }

    // Expressions

    fn parse_expression(&mut self, precedence: Precedence) -> Result<NodeId, ParseError> {
        self.depth += 1;
        let result = self.parse_expression_at(precedence);
        self.depth -= 1;
        result
    }

    fn parse_expression_at(&mut self, precedence: Precedence) -> Result<NodeId, ParseError> {
        let token = self.advance()?;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                position: token.position,
            });
        }

        let mut left = self.parse_prefix(token)?;
        while precedence < self.peek_precedence()? {
            let token = self.advance()?;
            left = self.parse_infix(token, left)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self, token: Token) -> Result<NodeId, ParseError> {
        match token.kind {
            TokenKind::Number => {
                let value = token.text.parse::<f64>().map_err(|_| LexError::InvalidNumber {
                    text: token.text.clone(),
                    position: token.position,
                })?;
                self.push(ExprKind::Number(value), vec![], token)
            }
            TokenKind::String => {
                let text = token.text.clone();
                self.push(ExprKind::String(text), vec![], token)
            }
            TokenKind::True => self.push(ExprKind::Boolean(true), vec![], token),
            TokenKind::False => self.push(ExprKind::Boolean(false), vec![], token),
            TokenKind::This => self.push(ExprKind::This, vec![], token),
            TokenKind::Break => self.push(ExprKind::Break, vec![], token),
            TokenKind::Continue => self.push(ExprKind::Continue, vec![], token),
            TokenKind::Name => self.parse_name(token),
            TokenKind::LParen => {
                let inner = self.parse_expression(Precedence::Anything)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBrace => self.parse_block(token),
            TokenKind::Minus => self.parse_unary(UnaryOp::Minus, token),
            TokenKind::Plus => self.parse_unary(UnaryOp::Plus, token),
            TokenKind::Bang => self.parse_unary(UnaryOp::Not, token),
            TokenKind::Return => {
                let value = self.parse_expression(Precedence::Anything)?;
                self.push(ExprKind::Return, vec![value], token)
            }
            TokenKind::Loop => {
                let args = self.parse_builtin_args("loop", 2, &token)?;
                self.push(ExprKind::Loop, args, token)
            }
            TokenKind::ForEach => {
                let args = self.parse_builtin_args("for_each", 3, &token)?;
                self.push(ExprKind::ForEach, args, token)
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof {
                position: token.position,
            }),
            _ => Err(ParseError::NoPrefixRule {
                text: token.text,
                position: token.position,
            }),
        }
    }

    fn parse_infix(&mut self, token: Token, left: NodeId) -> Result<NodeId, ParseError> {
        match token.kind {
            TokenKind::Question => self.parse_ternary(token, left),
            TokenKind::LBracket => self.parse_index(token, left),
            TokenKind::Assign => {
                // One level below assignment so `a = b = 1` nests to the right.
                let value = self.parse_expression(Precedence::Scope)?;
                self.push(ExprKind::Assign, vec![left, value], token)
            }
            kind => match BinOp::from_token(kind) {
                Some(op) => {
                    let right = self.parse_expression(op.precedence())?;
                    self.push(ExprKind::Binary(op), vec![left, right], token)
                }
                None => Err(ParseError::NoInfixRule {
                    text: token.text,
                    position: token.position,
                }),
            },
        }
    }

    /// A name followed by `(` is a call. A name followed by `[` is indexed
    /// right away, so `1 + v.list[0]` indexes the list rather than the sum.
    fn parse_name(&mut self, token: Token) -> Result<NodeId, ParseError> {
        let path = Path::new(&token.text).expand_aliases();

        if let Some(args) = self.parse_args()? {
            return self.push(ExprKind::Call(path), args, token);
        }

        let name = self.push(ExprKind::Name(path), vec![], token)?;
        if self.check(TokenKind::LBracket)? {
            let bracket = self.advance()?;
            return self.parse_index(bracket, name);
        }
        Ok(name)
    }

    fn parse_index(&mut self, token: Token, target: NodeId) -> Result<NodeId, ParseError> {
        let index = self.parse_expression(Precedence::Anything)?;
        self.expect(TokenKind::RBracket)?;
        self.push(ExprKind::ArrayAccess, vec![target, index], token)
    }

    fn parse_unary(&mut self, op: UnaryOp, token: Token) -> Result<NodeId, ParseError> {
        let operand = self.parse_expression(Precedence::Prefix)?;
        self.push(ExprKind::Unary(op), vec![operand], token)
    }

    /// `cond ? then : else`, `cond ? then` and `cond ?: else`.
    fn parse_ternary(&mut self, token: Token, condition: NodeId) -> Result<NodeId, ParseError> {
        if self.match_token(TokenKind::Colon)? {
            let otherwise = self.parse_expression(Precedence::Conditional)?;
            let kind = ExprKind::Ternary {
                has_then: false,
                has_else: true,
            };
            return self.push(kind, vec![condition, otherwise], token);
        }

        let then = self.parse_expression(Precedence::Conditional)?;
        if self.match_token(TokenKind::Colon)? {
            let otherwise = self.parse_expression(Precedence::Conditional)?;
            let kind = ExprKind::Ternary {
                has_then: true,
                has_else: true,
            };
            self.push(kind, vec![condition, then, otherwise], token)
        } else {
            let kind = ExprKind::Ternary {
                has_then: true,
                has_else: false,
            };
            self.push(kind, vec![condition, then], token)
        }
    }

    fn parse_block(&mut self, token: Token) -> Result<NodeId, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.match_token(TokenKind::RBrace)? {
                break;
            }
            items.push(self.parse_expression(Precedence::Scope)?);
            if !self.match_token(TokenKind::Semicolon)? {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        self.push(ExprKind::Block, items, token)
    }

    /// Parenthesized, comma-separated arguments, or `None` when the next token
    /// is not `(`.
    fn parse_args(&mut self) -> Result<Option<Vec<NodeId>>, ParseError> {
        if !self.match_token(TokenKind::LParen)? {
            return Ok(None);
        }
        let mut args = Vec::new();
        if self.match_token(TokenKind::RParen)? {
            return Ok(Some(args));
        }
        loop {
            args.push(self.parse_expression(Precedence::Anything)?);
            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(Some(args))
    }

    fn parse_builtin_args(
        &mut self,
        construct: &str,
        expected: usize,
        token: &Token,
    ) -> Result<Vec<NodeId>, ParseError> {
        let args = self.parse_args()?.unwrap_or_default();
        if args.len() != expected {
            return Err(ParseError::WrongArgumentCount {
                construct: construct.to_string(),
                expected,
                found: args.len(),
                position: token.position,
            });
        }
        Ok(args)
    }
}

/// Parses `input` with the default nesting limit.
pub fn parse(input: &str) -> Result<Ast, ParseError> {
    Parser::new(input).parse()
}
