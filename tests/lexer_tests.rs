// tests/lexer_tests.rs

use molang::ast::{Position, TokenKind};
use molang::lexer::{LexError, Lexer, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
}

fn single(input: &str) -> TokenKind {
    let mut lexer = Lexer::new(input);
    let token = lexer.next_token().unwrap();
    assert!(lexer.next_token().unwrap().is(TokenKind::Eof), "trailing input for {}", input);
    token.kind
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        (",", TokenKind::Comma),
        ("=", TokenKind::Assign),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        ("?", TokenKind::Question),
        (":", TokenKind::Colon),
        (";", TokenKind::Semicolon),
        ("!", TokenKind::Bang),
        ("<", TokenKind::Lt),
        (">", TokenKind::Gt),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("==", TokenKind::EqEq),
        ("!=", TokenKind::NotEq),
        ("<=", TokenKind::LtEq),
        (">=", TokenKind::GtEq),
        ("&&", TokenKind::AndAnd),
        ("||", TokenKind::OrOr),
        ("??", TokenKind::Coalesce),
        ("->", TokenKind::Arrow),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    assert_eq!(
        kinds("< =="),
        vec![TokenKind::Lt, TokenKind::EqEq, TokenKind::Eof]
    );
    assert_eq!(kinds("= ="), vec![TokenKind::Assign, TokenKind::Assign, TokenKind::Eof]);
    assert_eq!(kinds("- >"), vec![TokenKind::Minus, TokenKind::Gt, TokenKind::Eof]);
    assert_eq!(kinds("?:"), vec![TokenKind::Question, TokenKind::Colon, TokenKind::Eof]);
}

#[test]
fn test_lone_ampersand_and_pipe() {
    assert!(matches!(
        tokenize("1 & 2"),
        Err(LexError::UnexpectedCharacter { .. })
    ));
    assert!(matches!(
        tokenize("1 | 2"),
        Err(LexError::UnexpectedCharacter { .. })
    ));
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords_case_insensitive() {
    let test_cases = vec![
        ("return", TokenKind::Return),
        ("RETURN", TokenKind::Return),
        ("break", TokenKind::Break),
        ("Continue", TokenKind::Continue),
        ("loop", TokenKind::Loop),
        ("for_each", TokenKind::ForEach),
        ("this", TokenKind::This),
        ("True", TokenKind::True),
        ("false", TokenKind::False),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_keyword_prefix_is_a_name() {
    assert_eq!(single("looper"), TokenKind::Name);
    assert_eq!(single("returned"), TokenKind::Name);
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_dotted_name_is_one_token() {
    let tokens = tokenize("query.anim_time").unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Name);
    assert_eq!(tokens[0].text, "query.anim_time");
}

#[test]
fn test_name_with_digits_and_underscores() {
    let tokens = tokenize("_v2.limb_0").unwrap();
    assert_eq!(tokens[0].text, "_v2.limb_0");
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    for (input, text) in [("42", "42"), ("0.5", "0.5"), (".25", ".25"), ("10.0", "10.0")] {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, text);
    }
}

#[test]
fn test_number_followed_by_dot() {
    // "1." has no digits after the dot, so the dot is not part of the number
    assert!(tokenize("1.").is_err());
}

#[test]
fn test_number_too_large() {
    let huge = "9".repeat(400);
    assert!(matches!(tokenize(&huge), Err(LexError::InvalidNumber { .. })));
}

#[test]
fn test_strings_both_quotes() {
    let tokens = tokenize(r#"'single' "double""#).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, "single");
    assert_eq!(tokens[1].text, "double");
}

#[test]
fn test_strings_have_no_escapes() {
    let tokens = tokenize(r#"'a\'"#).unwrap();
    assert_eq!(tokens[0].text, "a\\");
    let tokens = tokenize(r#"'say "hi"'"#).unwrap();
    assert_eq!(tokens[0].text, "say \"hi\"");
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        tokenize("v.x = 'oops"),
        Err(LexError::UnterminatedString {
            position: Position::new(1, 7)
        })
    );
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_positions_are_one_based() {
    let tokens = tokenize("v.x = 1;\n  v.y").unwrap();
    assert_eq!(tokens[0].position, Position::new(1, 1));
    assert_eq!(tokens[1].position, Position::new(1, 5));
    assert_eq!(tokens[2].position, Position::new(1, 7));
    assert_eq!(tokens[4].position, Position::new(2, 3));
}

#[test]
fn test_unexpected_character_position() {
    let err = tokenize("1 +\n  #").unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedCharacter {
            text: "#".to_string(),
            position: Position::new(2, 3)
        }
    );
    assert_eq!(err.position(), Position::new(2, 3));
}

#[test]
fn test_eof_repeats() {
    let mut lexer = Lexer::new("");
    assert!(lexer.next_token().unwrap().is(TokenKind::Eof));
    assert!(lexer.next_token().unwrap().is(TokenKind::Eof));
}

// ============================================================================
// Full Formulas
// ============================================================================

#[test]
fn test_full_formula() {
    assert_eq!(
        kinds("t.x = 0; loop(3, {t.x = t.x + 1;}); return t.x;"),
        vec![
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Loop,
            TokenKind::LParen,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::LBrace,
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::Name,
            TokenKind::Plus,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::RParen,
            TokenKind::Semicolon,
            TokenKind::Return,
            TokenKind::Name,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}
