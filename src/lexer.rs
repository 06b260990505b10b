use thiserror::Error;

use crate::ast::{Position, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{text}' at {position}")]
    UnexpectedCharacter { text: String, position: Position },

    #[error("Unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

/// Turns MoLang source into tokens, one call to [`Lexer::next_token`] at a time.
///
/// Once the input is exhausted every further call yields an `Eof` token.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Identifiers may contain dots after the first character, so
    /// `query.anim_time` is a single token.
    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Strings have no escape sequences; the text runs to the matching quote.
    fn read_string(&mut self, quote: char, start: Position) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_number(&mut self, start: Position) -> Result<Token, LexError> {
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match number.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::new(TokenKind::Number, number, start)),
            _ => Err(LexError::InvalidNumber {
                text: number,
                position: start,
            }),
        }
    }

    /// Consumes one character and yields a token of `kind` whose text is `symbol`.
    fn single(&mut self, kind: TokenKind, symbol: &str, start: Position) -> Token {
        self.advance();
        Token::new(kind, symbol, start)
    }

    /// Matches a two-character operator if the next character is `second`.
    fn pair(
        &mut self,
        second: char,
        double: (TokenKind, &str),
        single: Option<(TokenKind, &str)>,
        start: Position,
    ) -> Result<Token, LexError> {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            return Ok(Token::new(double.0, double.1, start));
        }
        match single {
            Some((kind, symbol)) => Ok(self.single(kind, symbol, start)),
            None => Err(LexError::UnexpectedCharacter {
                text: self.current_char().map(String::from).unwrap_or_default(),
                position: start,
            }),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.here();

        let token = match self.current_char() {
            None => Token::eof(start),
            Some('=') => self.pair('=', (TokenKind::EqEq, "=="), Some((TokenKind::Assign, "=")), start)?,
            Some('!') => self.pair('=', (TokenKind::NotEq, "!="), Some((TokenKind::Bang, "!")), start)?,
            Some('?') => self.pair('?', (TokenKind::Coalesce, "??"), Some((TokenKind::Question, "?")), start)?,
            Some('&') => self.pair('&', (TokenKind::AndAnd, "&&"), None, start)?,
            Some('|') => self.pair('|', (TokenKind::OrOr, "||"), None, start)?,
            Some('>') => self.pair('=', (TokenKind::GtEq, ">="), Some((TokenKind::Gt, ">")), start)?,
            Some('<') => self.pair('=', (TokenKind::LtEq, "<="), Some((TokenKind::Lt, "<")), start)?,
            Some('-') => self.pair('>', (TokenKind::Arrow, "->"), Some((TokenKind::Minus, "-")), start)?,
            Some('(') => self.single(TokenKind::LParen, "(", start),
            Some(')') => self.single(TokenKind::RParen, ")", start),
            Some('[') => self.single(TokenKind::LBracket, "[", start),
            Some(']') => self.single(TokenKind::RBracket, "]", start),
            Some('{') => self.single(TokenKind::LBrace, "{", start),
            Some('}') => self.single(TokenKind::RBrace, "}", start),
            Some(',') => self.single(TokenKind::Comma, ",", start),
            Some('+') => self.single(TokenKind::Plus, "+", start),
            Some('*') => self.single(TokenKind::Star, "*", start),
            Some('/') => self.single(TokenKind::Slash, "/", start),
            Some(':') => self.single(TokenKind::Colon, ":", start),
            Some(';') => self.single(TokenKind::Semicolon, ";", start),
            Some(quote @ ('"' | '\'')) => {
                let text = self.read_string(quote, start)?;
                Token::new(TokenKind::String, text, start)
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(start)?,
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start)?
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Name);
                Token::new(kind, ident, start)
            }
            Some(ch) => {
                return Err(LexError::UnexpectedCharacter {
                    text: ch.to_string(),
                    position: start,
                });
            }
        };

        Ok(token)
    }
}

/// Lexes the whole input, including the trailing `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
