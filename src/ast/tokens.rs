use std::fmt;

/// Location of a token in the source text.
///
/// Both fields are 1-based, so the first character of the input is at `1:1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Two-character operators
    /// Equality (`==`)
    EqEq,

    /// Inequality (`!=`)
    NotEq,

    /// Null-coalescing (`??`)
    ///
    /// # Examples
    /// ```text
    /// v.speed ?? 1
    /// ```
    Coalesce,

    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Greater than or equal (`>=`)
    GtEq,

    /// Less than or equal (`<=`)
    LtEq,

    /// Arrow (`->`)
    ///
    /// Evaluates the right side inside the environment produced by the left side.
    ///
    /// # Examples
    /// ```text
    /// c.other -> v.health
    /// ```
    Arrow,

    // Single-character operators and punctuation
    /// Greater than (`>`)
    Gt,

    /// Less than (`<`)
    Lt,

    /// Left parenthesis for grouping, calls and builtin arguments
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket for array indexing
    LBracket,

    /// Right bracket
    RBracket,

    /// Left brace opening a statement block
    LBrace,

    /// Right brace
    RBrace,

    /// Comma separating call arguments
    Comma,

    /// Assignment (`=`)
    Assign,

    /// Addition, or unary plus in prefix position
    Plus,

    /// Subtraction, or negation in prefix position
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Ternary condition marker
    Question,

    /// Ternary branch separator
    Colon,

    /// Statement separator
    Semicolon,

    /// Logical not
    Bang,

    // Keywords
    /// `return`
    Return,

    /// `continue`
    Continue,

    /// `break`
    Break,

    /// `for_each`
    ///
    /// # Examples
    /// ```text
    /// for_each(t.item, v.items, { t.sum = t.sum + t.item; })
    /// ```
    ForEach,

    /// `loop`
    ///
    /// # Examples
    /// ```text
    /// loop(10, { v.x = v.x + 1; })
    /// ```
    Loop,

    /// `this`
    This,

    /// `true`
    True,

    /// `false`
    False,

    // Literals and names
    /// String literal enclosed in single or double quotes
    String,

    /// Integer or decimal number
    Number,

    /// Identifier, possibly dotted
    ///
    /// # Examples
    /// ```text
    /// query.anim_time
    /// v.speed
    /// math.sin
    /// ```
    Name,

    /// End of input. Repeats indefinitely once reached.
    Eof,
}

impl TokenKind {
    /// Human readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            EqEq => "'=='",
            NotEq => "'!='",
            Coalesce => "'??'",
            AndAnd => "'&&'",
            OrOr => "'||'",
            GtEq => "'>='",
            LtEq => "'<='",
            Arrow => "'->'",
            Gt => "'>'",
            Lt => "'<'",
            LParen => "'('",
            RParen => "')'",
            LBracket => "'['",
            RBracket => "']'",
            LBrace => "'{'",
            RBrace => "'}'",
            Comma => "','",
            Assign => "'='",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Question => "'?'",
            Colon => "':'",
            Semicolon => "';'",
            Bang => "'!'",
            Return => "return",
            Continue => "continue",
            Break => "break",
            ForEach => "for_each",
            Loop => "loop",
            This => "this",
            True | False => "bool",
            String => "string",
            Number => "number",
            Name => "name",
            Eof => "end of input",
        }
    }

    /// Classifies a bare identifier as a keyword, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident.to_ascii_lowercase().as_str() {
            "return" => TokenKind::Return,
            "continue" => TokenKind::Continue,
            "break" => TokenKind::Break,
            "loop" => TokenKind::Loop,
            "for_each" => TokenKind::ForEach,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token: its kind, the source text it was read from, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: Position) -> Self {
        Token::new(TokenKind::Eof, "", position)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
