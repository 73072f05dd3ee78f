//! Lexer for placement strings using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Sides
    #[token("top")]
    Top,
    #[token("bottom")]
    Bottom,
    #[token("left")]
    Left,
    #[token("right")]
    Right,

    // Alignments
    #[token("start")]
    Start,
    #[token("end")]
    End,

    #[token("-")]
    Dash,

    // Any other word, so unknown sides/alignments get a readable error
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),
}

/// Lex a placement string into tokens with spans.
///
/// Characters that start no token are yielded as `Err(())` with their span
/// instead of being dropped, so the parser can point at them.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}
