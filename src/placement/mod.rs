//! Placements and the algebra used to derive fallbacks from them

pub mod lexer;
pub mod types;

pub use types::*;

use crate::error::PlacementError;

use lexer::{lex, Span, Token};

const SIDES: &[&str] = &["top", "right", "bottom", "left"];
const ALIGNMENTS: &[&str] = &["start", "end"];

/// Parse a placement written as `side` or `side-alignment`
pub fn parse(source: &str) -> Result<Placement, PlacementError> {
    let mut tokens = lex(source);

    let side = match tokens.next() {
        Some((Ok(Token::Top), _)) => Side::Top,
        Some((Ok(Token::Right), _)) => Side::Right,
        Some((Ok(Token::Bottom), _)) => Side::Bottom,
        Some((Ok(Token::Left), _)) => Side::Left,
        Some((found, span)) => return Err(unexpected(source, &found, span, SIDES)),
        None => return Err(end_of_input(source.len(), SIDES)),
    };

    let alignment = match tokens.next() {
        None => None,
        Some((Ok(Token::Dash), dash)) => match tokens.next() {
            Some((Ok(Token::Start), _)) => Some(Alignment::Start),
            Some((Ok(Token::End), _)) => Some(Alignment::End),
            Some((found, span)) => return Err(unexpected(source, &found, span, ALIGNMENTS)),
            None => return Err(end_of_input(dash.end, ALIGNMENTS)),
        },
        Some((found, span)) => return Err(unexpected(source, &found, span, &["'-'"])),
    };

    if let Some((found, span)) = tokens.next() {
        return Err(unexpected(source, &found, span, &["end of input"]));
    }

    Ok(Placement::new(side, alignment))
}

fn unexpected(
    source: &str,
    found: &Result<Token, ()>,
    span: Span,
    expected: &[&str],
) -> PlacementError {
    let (found, span) = match found {
        Ok(token) => (format_token(token), span),
        Err(()) => match source.get(span.start..).and_then(|rest| rest.chars().next()) {
            // Cover the whole character, however many bytes it takes
            Some(c) => (
                format!("character '{}'", c),
                span.start..span.start + c.len_utf8(),
            ),
            None => ("input".to_string(), span),
        },
    };
    PlacementError::syntax(span, format!("Unexpected {}", found), expected)
}

fn end_of_input(at: usize, expected: &[&str]) -> PlacementError {
    PlacementError::syntax(at..at, "Unexpected end of input", expected)
}

/// Format a token for human-readable error messages
fn format_token(token: &Token) -> String {
    match token {
        Token::Top => "keyword 'top'".to_string(),
        Token::Bottom => "keyword 'bottom'".to_string(),
        Token::Left => "keyword 'left'".to_string(),
        Token::Right => "keyword 'right'".to_string(),
        Token::Start => "keyword 'start'".to_string(),
        Token::End => "keyword 'end'".to_string(),
        Token::Dash => "'-'".to_string(),
        Token::Word(w) => format!("word '{}'", w),
    }
}
